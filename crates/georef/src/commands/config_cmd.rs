//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { service_url, force } => {
            let path = config::config_path();
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }

            let mut cfg = Config::default();
            cfg.service.url = service_url.or_else(|| global.url.clone());
            if let Some(timeout) = global.timeout {
                cfg.service.timeout_secs = timeout;
            }
            if cfg.service.url.is_some() {
                // Reject a URL the resolver could not use before writing it.
                georef_config::to_resolver_config(&cfg)?;
            }

            let written = config::save_config(&cfg)?;
            eprintln!("Wrote config to {}", written.display());
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::apply_overrides(config::load_config()?, global);
            let out = output::render_single(
                global.output,
                &cfg,
                |c| format!("{c:#?}"),
                |c| c.service.url.clone().unwrap_or_default(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
    }
}
