//! `huelink lights`: list the bridge's lights with stored credentials.

use huelink_core::Session;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::{config, output};

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let session = Session::new(config::bridge_config(global)?);
    let creds = session.stored_credentials()?;
    let clip = session.clip_client(&creds)?;
    let devices = session.discover(&clip).await?;

    let rendered = output::render_lights(global.output, &devices)?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}
