mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use panfly_core::Firewall;

use crate::cli::{Cli, Command};
use crate::commands::Ctx;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    // Ctrl-C cancels in-flight requests and job polls.
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::debug!("interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    if let Err(err) = run(cli, cancel).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli, cancel: CancellationToken) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "panfly", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = config::load_config_or_default();
            let resolved = config::resolve(&cli.global, &cfg)?;
            let firewall = Firewall::connect(&resolved.firewall)?;

            let ctx = Ctx {
                firewall,
                global: &cli.global,
                profile_name: &resolved.profile_name,
                cancel,
                color: output::should_color(cli.global.color),
            };

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &ctx)
                .await
                .map_err(|e| e.with_profile(&resolved.profile_name))
        }
    }
}
