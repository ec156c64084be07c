//! Command handlers.

mod block;
mod devices;
mod poll;
mod qos;
mod targets;
mod util;

use clap::CommandFactory;

use crate::cli::{Cli, Command, CompletionsArgs, GlobalOpts};
use crate::error::CliError;

/// Route a parsed command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Run(args) => poll::run(args, global).await,
        Command::PollOnce(args) => poll::once(args, global).await,
        Command::Devices(args) => devices::handle(args, global).await,
        Command::Targets => targets::handle(global),
        Command::Block(args) => block::handle(args, global).await,
        Command::Qos(args) => qos::handle(args, global).await,
        Command::Completions(args) => {
            completions(&args);
            Ok(())
        }
    }
}

fn completions(args: &CompletionsArgs) {
    let mut cmd = Cli::command();
    clap_complete::generate(args.shell, &mut cmd, "edgenet", &mut std::io::stdout());
}
