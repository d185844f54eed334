//! `huelink pair`: run the link-button handshake and store the key.

use huelink_core::Session;

use crate::cli::{GlobalOpts, PairArgs};
use crate::config;
use crate::confirm::TerminalConfirmation;
use crate::error::CliError;

pub async fn handle(args: PairArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = Session::new(config::bridge_config(global)?);
    let cancel = session.cancellation_token();
    super::cancel_on_ctrl_c(cancel.clone());

    let mut confirm = TerminalConfirmation::new(cancel);
    let (_, paired) = session.credentials(&mut confirm, args.force).await?;

    if !global.quiet {
        let path = session.store().path().display();
        if paired {
            eprintln!("Paired with the bridge; credentials saved to {path}");
        } else {
            eprintln!("Already paired (credentials at {path}). Use --force to pair again.");
        }
    }
    Ok(())
}
