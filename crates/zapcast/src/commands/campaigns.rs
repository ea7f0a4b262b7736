//! Campaign command handlers.

use zapcast_core::{CampaignPatch, DispatchReport, MediaAttachment, Session};

use crate::cli::{CampaignsArgs, CampaignsCommand, GlobalOpts, SendArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    session: &Session,
    args: CampaignsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CampaignsCommand::Send(send_args) => send(session, send_args, global).await,
    }
}

async fn send(session: &Session, args: SendArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let recipients = if let Some(ref path) = args.to_file {
        util::read_recipients_file(path)?
    } else {
        args.recipients.clone()
    };

    let media = match args.media {
        Some(ref path) => Some(load_media(path)?),
        None => None,
    };

    session.update_campaign(CampaignPatch {
        campaign_name: Some(args.name.clone()),
        message: Some(args.message.clone()),
        recipients: Some(recipients.join("\n")),
        media: Some(media),
    });

    let count = session.snapshot().campaign.recipient_count();
    let prompt = format!("Send campaign '{}' to {count} recipient(s)?", args.name);
    if !util::confirm(&prompt, global.yes)? {
        return Ok(());
    }

    let report = session.send_campaign().await?;

    let out = output::render_single(
        &global.output,
        &report,
        |r: &DispatchReport| format!("Sent: {}, Failed: {}", r.total_sent, r.total_failed),
        |r| format!("{} {}", r.total_sent, r.total_failed),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

fn load_media(path: &std::path::Path) -> Result<MediaAttachment, CliError> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .ok_or_else(|| CliError::Validation {
            field: "media".into(),
            reason: format!("invalid file name: {}", path.display()),
        })?;

    Ok(MediaAttachment {
        file_name,
        content_type: util::guess_mime(path).map(str::to_owned),
        bytes,
    })
}
