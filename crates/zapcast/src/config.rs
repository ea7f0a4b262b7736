//! CLI configuration — thin wrapper around `zapcast_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--gateway, --token, ...).

use std::time::Duration;

use secrecy::SecretString;

use zapcast_core::SessionConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use zapcast_config::{
    Config, Profile, config_path, keyring_account, load_config_or_default, save_config,
    KEYRING_SERVICE,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `SessionConfig` from the config file, profile, and CLI
/// overrides. Falls back to flags/env alone when no profile exists.
pub fn build_session_config(global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, global);
    }

    // No profile -- the gateway URL must come from a flag or env var.
    let url_str = global.gateway.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let base_url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "gateway".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let token = global.token.as_deref().map(SecretString::from);

    let mut config = SessionConfig::new(base_url, token);
    config.danger_accept_invalid_certs = global.insecure;
    config.timeout = Duration::from_secs(global.timeout);
    Ok(config)
}

/// Translate a `Profile` + global flags into a `SessionConfig`.
///
/// CLI flag overrides take priority over profile values.
fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<SessionConfig, CliError> {
    let url_str = global.gateway.as_deref().unwrap_or(&profile.gateway);
    let base_url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "gateway".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    // Token: flag > env/keyring/plaintext chain.
    let token = if let Some(ref flag) = global.token {
        Some(SecretString::from(flag.clone()))
    } else {
        zapcast_config::resolve_token(profile, profile_name).ok()
    };

    let mut config = SessionConfig::new(base_url, token);
    config.danger_accept_invalid_certs = global.insecure || profile.insecure.unwrap_or(false);
    config.timeout = Duration::from_secs(global.timeout);
    if let Some(secs) = profile.poll_interval {
        config.status_poll_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = profile.qr_interval {
        config.qr_reissue_interval = Duration::from_secs(secs);
    }
    Ok(config)
}
