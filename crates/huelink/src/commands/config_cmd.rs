//! Config subcommand handlers.

use dialoguer::{Confirm, Input};

use huelink_config::{Config, bridge_url, save_config_to};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path(global);

    match args.command {
        ConfigCommand::Init => {
            if path.exists() {
                let overwrite = Confirm::new()
                    .with_prompt(format!("{} exists. Overwrite?", path.display()))
                    .default(false)
                    .interact()
                    .map_err(prompt_err)?;
                if !overwrite {
                    return Err(CliError::Cancelled {
                        reason: "kept the existing config file".into(),
                    });
                }
            }

            let bridge = match global.bridge {
                Some(ref bridge) => bridge.clone(),
                None => Input::new()
                    .with_prompt("Bridge address (IP or URL)")
                    .interact_text()
                    .map_err(prompt_err)?,
            };
            // Validate before writing anything.
            bridge_url(&bridge)?;

            let mut cfg = Config {
                bridge: Some(bridge),
                ..Config::default()
            };
            config::apply_overrides(&mut cfg, global);
            save_config_to(&cfg, &path)?;

            if !global.quiet {
                eprintln!("Config written to {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load(global)?;
            let rendered = match global.output {
                OutputFormat::Json => serde_json::to_string_pretty(&cfg)?,
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&cfg).map_err(|e| CliError::Validation {
                    field: "config".into(),
                    reason: format!("failed to serialize config: {e}"),
                })?,
            };
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }
    }
}
