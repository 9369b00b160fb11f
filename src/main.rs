mod cli;
mod handlers;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use handlers::{command, repl, script, session};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let current = session::start(cli.config.as_deref(), cli.no_rc)?;
    let code = if let Some(line) = &cli.command {
        command::handle_command(&current, line)
    } else if let Some(path) = &cli.script {
        script::handle_script(&current, path, &cli.args)
    } else {
        repl::handle_repl(&current)?
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
