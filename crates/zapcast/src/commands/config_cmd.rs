//! Config subcommand handlers.

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "gateway = \"{}\"", p.gateway);
        if p.token.is_some() {
            let _ = writeln!(out, "token = \"****\"");
        }
        if let Some(ref env) = p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(secs) = p.poll_interval {
            let _ = writeln!(out, "poll_interval = {secs}");
        }
        if let Some(secs) = p.qr_interval {
            let _ = writeln!(out, "qr_interval = {secs}");
        }
    }

    out
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Offer to store a token in the system keyring or return it for the
/// plaintext config field. Returns `Some(token)` for plaintext, `None`
/// when stored in the keyring.
fn prompt_token_storage(token: &str, profile_name: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where should the token be stored?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        let entry = keyring::Entry::new(config::KEYRING_SERVICE, &config::keyring_account(profile_name))
            .map_err(|e| CliError::Validation {
                field: "keyring".into(),
                reason: format!("cannot open keyring entry: {e}"),
            })?;
        entry.set_password(token).map_err(|e| CliError::Validation {
            field: "keyring".into(),
            reason: format!("cannot store token: {e}"),
        })?;
        eprintln!("Token stored in system keyring.");
        Ok(None)
    } else {
        Ok(Some(token.to_owned()))
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            output::print_output(&format_config_redacted(&cfg), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        ConfigCommand::Init => init(global),

        ConfigCommand::SetToken => set_token(global),
    }
}

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();

    let name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let gateway: String = Input::new()
        .with_prompt("Gateway URL")
        .interact_text()
        .map_err(prompt_err)?;

    // Validate early so a typo doesn't land in the config file.
    gateway
        .parse::<url::Url>()
        .map_err(|_| CliError::Validation {
            field: "gateway".into(),
            reason: format!("invalid URL: {gateway}"),
        })?;

    let token = rpassword::prompt_password("Bearer token (empty to skip): ").map_err(prompt_err)?;
    let plaintext_token = if token.is_empty() {
        None
    } else {
        prompt_token_storage(&token, &name)?
    };

    let profile = Profile {
        gateway,
        token: plaintext_token,
        insecure: global.insecure.then_some(true),
        ..Profile::default()
    };

    if cfg.default_profile.is_none() || cfg.profiles.is_empty() {
        cfg.default_profile = Some(name.clone());
    }
    cfg.profiles.insert(name.clone(), profile);
    config::save_config(&cfg)?;

    eprintln!(
        "Profile '{name}' written to {}",
        config::config_path().display()
    );
    Ok(())
}

fn set_token(global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();
    let name = config::active_profile_name(global, &cfg);
    if !cfg.profiles.contains_key(&name) {
        return Err(CliError::ProfileNotFound { name });
    }

    let token = rpassword::prompt_password("Bearer token: ").map_err(prompt_err)?;
    if token.is_empty() {
        return Err(CliError::Validation {
            field: "token".into(),
            reason: "token cannot be empty".into(),
        });
    }

    let plaintext = prompt_token_storage(&token, &name)?;
    if let Some(profile) = cfg.profiles.get_mut(&name) {
        profile.token = plaintext;
        config::save_config(&cfg)?;
    }
    Ok(())
}
