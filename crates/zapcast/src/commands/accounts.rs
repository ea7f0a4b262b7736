//! Account command handlers: list, switch, pair.

use std::collections::HashSet;
use std::time::Duration;

use owo_colors::OwoColorize;
use tabled::Tabled;
use zapcast_core::{Account, Session};

use crate::cli::{AccountsArgs, AccountsCommand, GlobalOpts, PairArgs};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "")]
    selected: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Connected")]
    connected: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Campaigns")]
    campaigns: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl AccountRow {
    fn new(account: &Account, current: Option<&str>) -> Self {
        Self {
            selected: if current == Some(account.phone_number.as_str()) {
                "*".into()
            } else {
                String::new()
            },
            phone: account.phone_number.clone(),
            connected: if account.is_connected() { "yes" } else { "no" }.into(),
            active: if account.is_active { "yes" } else { "no" }.into(),
            campaigns: account.campaign_count.to_string(),
            status: account.status_message.clone().unwrap_or_default(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: AccountsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AccountsCommand::List => list(session, global).await,
        AccountsCommand::Switch { phone_number } => switch(session, &phone_number, global).await,
        AccountsCommand::Pair(pair_args) => pair(session, &pair_args, global).await,
    }
}

async fn list(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    session.refresh_status().await?;
    let snap = session.snapshot();
    let current = snap.current().map(|a| a.phone_number.clone());

    let out = output::render_list(
        &global.output,
        &snap.accounts,
        |a| AccountRow::new(a, current.as_deref()),
        |a| a.phone_number.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn switch(session: &Session, phone_number: &str, global: &GlobalOpts) -> Result<(), CliError> {
    session.switch_account(phone_number).await?;
    let snap = session.snapshot();

    if !global.quiet {
        let message = snap.success().unwrap_or("Account switched");
        eprintln!("{message}");
    }

    // A re-auth switch comes back with a pairing code to scan.
    if snap.show_qr {
        if let Some(ref qr) = snap.qr_code {
            print_qr(qr, global);
        }
    }
    Ok(())
}

async fn pair(session: &Session, args: &PairArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Baseline of already-connected numbers, so we can tell when the
    // new device shows up. A dead gateway fails here, before pairing.
    session.refresh_status().await?;
    let baseline: HashSet<String> = session
        .snapshot()
        .accounts
        .iter()
        .filter(|a| a.is_connected())
        .map(|a| a.phone_number.clone())
        .collect();

    session.begin_pairing().await?;
    let snap = session.snapshot();
    let mut last_qr = snap.qr_code.clone();
    if let Some(ref qr) = last_qr {
        print_qr(qr, global);
    }

    if !args.watch {
        return Ok(());
    }

    // Watch mode: the status poll notices the paired device, and the
    // re-issue loop keeps the displayed code fresh until then.
    session.start().await;
    let mut rx = session.subscribe();
    let deadline = tokio::time::sleep(Duration::from_secs(args.watch_timeout));
    tokio::pin!(deadline);

    let result = loop {
        tokio::select! {
            () = &mut deadline => {
                break Err(CliError::PairingTimedOut {
                    seconds: args.watch_timeout,
                });
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let snap = rx.borrow_and_update().clone();
                if snap.qr_code != last_qr {
                    if let Some(ref qr) = snap.qr_code {
                        if !global.quiet {
                            eprintln!("New pairing code issued:");
                        }
                        print_qr(qr, global);
                    }
                    last_qr = snap.qr_code.clone();
                }
                let paired = snap
                    .accounts
                    .iter()
                    .find(|a| a.is_connected() && !baseline.contains(&a.phone_number));
                if let Some(account) = paired {
                    if !global.quiet {
                        eprintln!("Paired: {}", account.phone_number);
                    }
                    break Ok(());
                }
            }
        }
    };

    session.shutdown().await;
    result
}

/// Print a QR payload to stdout. The payload is the raw string the
/// gateway returns; pipe it into a terminal QR renderer to scan it.
fn print_qr(qr: &str, global: &GlobalOpts) {
    if !global.quiet {
        if output::should_color(&global.color) {
            eprintln!("{}", "Scan this code with WhatsApp:".bold());
        } else {
            eprintln!("Scan this code with WhatsApp:");
        }
    }
    println!("{qr}");
}
