//! `huelink set`: pair if needed, discover, and color every light.

use huelink_core::command::resolve_inputs;
use huelink_core::{ColorSource, Session};

use crate::cli::{GlobalOpts, SetArgs};
use crate::confirm::TerminalConfirmation;
use crate::error::CliError;
use crate::{config, output};

pub async fn handle(args: SetArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let bridge = config::bridge_config(global)?;
    let (color, source) = resolve_inputs(args.values.as_slice(), bridge.default_color);
    if let ColorSource::Fallback { reason } = &source {
        if !global.quiet {
            eprintln!(
                "Using default color x={} y={} intensity={} ({reason})",
                color.x(),
                color.y(),
                color.intensity()
            );
        }
    }

    let session = Session::new(bridge);
    let cancel = session.cancellation_token();
    super::cancel_on_ctrl_c(cancel.clone());

    let mut confirm = TerminalConfirmation::new(cancel.clone());
    let report = session.apply(&color, &mut confirm).await?;

    if report.paired && !global.quiet {
        eprintln!(
            "Paired with the bridge; credentials saved to {}",
            session.store().path().display()
        );
    }
    let rendered = output::render_report(
        global.output,
        &report,
        output::should_color(global.color),
    )?;
    output::print_output(&rendered, global.quiet);

    if cancel.is_cancelled() {
        return Err(CliError::Cancelled {
            reason: "interrupted during dispatch".into(),
        });
    }
    let failed = report.failures().count();
    if failed > 0 {
        return Err(CliError::PartialFailure {
            failed,
            total: report.results.len(),
        });
    }
    if report.results.is_empty() && !global.quiet {
        eprintln!("The bridge reported no lights.");
    }
    Ok(())
}
