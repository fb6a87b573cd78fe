use std::{env, sync::LazyLock};

pub(crate) const LOGIN_BEGIN_PATH: &str = "/login/passkey/begin";
pub(crate) const LOGIN_FINISH_PATH: &str = "/login/passkey/finish";
pub(crate) const REGISTER_BEGIN_PATH: &str = "/passkey/add/begin";
pub(crate) const REGISTER_FINISH_PATH: &str = "/passkey/add/finish";
pub(crate) const PASSKEY_LIST_PATH: &str = "/passkey/list";
pub(crate) const PASSKEY_REMOVE_PATH: &str = "/passkey/remove";

/// Base URL of the membership portal the ceremony endpoints live under.
pub static PORTAL_ORIGIN: LazyLock<String> = LazyLock::new(|| {
    env::var("PORTAL_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string())
});

pub(crate) const DEFAULT_PREFETCH_MAX_AGE_SECS: u64 = 300;

/// Largest age `chrono::Duration` can hold, in whole seconds.
pub(crate) const PREFETCH_MAX_AGE_LIMIT_SECS: u64 = i64::MAX as u64 / 1000;

pub(crate) static PASSKEY_REQUEST_TIMEOUT: LazyLock<u64> =
    LazyLock::new(|| parse_secs("PASSKEY_REQUEST_TIMEOUT", 30, u64::MAX));

pub(crate) static PASSKEY_LOGIN_REDIRECT: LazyLock<String> = LazyLock::new(|| {
    env::var("PASSKEY_LOGIN_REDIRECT")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "/".to_string())
});

pub(crate) static PASSKEY_PREFETCH_MAX_AGE: LazyLock<u64> = LazyLock::new(|| {
    parse_secs(
        "PASSKEY_PREFETCH_MAX_AGE",
        DEFAULT_PREFETCH_MAX_AGE_SECS,
        PREFETCH_MAX_AGE_LIMIT_SECS,
    )
});

fn parse_secs(name: &str, default: u64, max: u64) -> u64 {
    match env::var(name) {
        Err(_) => default,
        Ok(v) => match v.parse::<u64>() {
            Ok(secs) if secs > 0 && secs <= max => secs,
            _ => {
                tracing::warn!("Invalid {}: {}. Using default '{}'", name, v, default);
                default
            }
        },
    }
}
