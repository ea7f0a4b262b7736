//! Command dispatch: bridges CLI args -> session intents -> output.

pub mod accounts;
pub mod campaigns;
pub mod config_cmd;
pub mod util;

use zapcast_core::Session;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a gateway-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Accounts(args) => accounts::handle(session, args, global).await,
        Command::Campaigns(args) => campaigns::handle(session, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
