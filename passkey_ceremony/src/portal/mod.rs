//! Consumers wiring completed ceremonies into the portal's widgets

mod login;
mod settings;

pub use login::LoginNavigator;
pub use settings::PasskeySettings;
