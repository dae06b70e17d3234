//! Command dispatch: bridges CLI args -> `Firewall` queries -> output formatting.

pub mod config_cmd;
pub mod devices;
pub mod logs;
pub mod network;
pub mod policy;
pub mod sessions;
pub mod system;

use tokio_util::sync::CancellationToken;

use panfly_core::Firewall;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Everything a handler needs for one invocation.
pub struct Ctx<'a> {
    pub firewall: Firewall,
    pub global: &'a GlobalOpts,
    pub profile_name: &'a str,
    pub cancel: CancellationToken,
    pub color: bool,
}

/// Dispatch a connection-bound command to its handler.
pub async fn dispatch(cmd: Command, ctx: &Ctx<'_>) -> Result<(), CliError> {
    match cmd {
        Command::System(args) => system::handle(ctx, args).await,
        Command::Sessions(args) => sessions::handle(ctx, args).await,
        Command::Policy(args) => policy::handle(ctx, args).await,
        Command::Network(args) => network::handle(ctx, args).await,
        Command::Logs(args) => logs::handle(ctx, args).await,
        Command::Devices(args) => devices::handle(ctx, args).await,
        // Handled before a connection is built
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "offline command reached connection dispatch".into(),
        )),
    }
}
