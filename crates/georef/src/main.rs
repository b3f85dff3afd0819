mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use georef_core::Resolver;

use crate::cli::{Cli, Command};
use crate::commands::Context;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Log to stderr so stdout stays clean for piped listings.
/// `RUST_LOG` wins over `-v` when set.
fn init_tracing(verbosity: u8) {
    let filter = ["warn", "info", "debug"]
        .get(usize::from(verbosity))
        .copied()
        .unwrap_or("trace");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // No service needed for these two.
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "georef", &mut std::io::stdout());
            Ok(())
        }

        lookup => {
            let resolver_config = config::resolve(&cli.global)?;
            let resolver = Resolver::connect(&resolver_config)?;
            let ctx = Context {
                resolver,
                url: resolver_config.service_url.to_string(),
                timeout: resolver_config.timeout,
                global: &cli.global,
            };

            tracing::debug!(url = %ctx.url, command = ?lookup, "running lookup");
            commands::dispatch(lookup, &ctx).await
        }
    }
}
