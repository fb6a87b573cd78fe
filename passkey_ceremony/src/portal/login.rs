use crate::ceremony::{CeremonyConsumer, CeremonyError, CeremonyOutcome};
use crate::config::PASSKEY_LOGIN_REDIRECT;

/// Consumer for the login form: records where to navigate after success.
///
/// The page replaces its location with [`LoginNavigator::location`] once it is
/// set. A failed attempt leaves it unset; the orchestrator's error list holds
/// the message.
#[derive(Debug, Clone)]
pub struct LoginNavigator {
    redirect_to: String,
    location: Option<String>,
}

impl Default for LoginNavigator {
    fn default() -> Self {
        Self::with_redirect(PASSKEY_LOGIN_REDIRECT.as_str())
    }
}

impl LoginNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_redirect(redirect_to: impl Into<String>) -> Self {
        Self {
            redirect_to: redirect_to.into(),
            location: None,
        }
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

impl CeremonyConsumer for LoginNavigator {
    fn completed(&mut self, outcome: &CeremonyOutcome) {
        match outcome {
            CeremonyOutcome::Authenticated => {
                tracing::debug!("Login succeeded, redirecting to {}", self.redirect_to);
                self.location = Some(self.redirect_to.clone());
            }
            CeremonyOutcome::Registered(passkey) => {
                tracing::warn!(
                    "Login form received a registration result for {}",
                    passkey.id
                );
            }
        }
    }

    fn failed(&mut self, error: &CeremonyError) {
        tracing::debug!("Login failed: {}", error);
        self.location = None;
    }
}
