pub mod common; // Private helpers
pub mod env;
pub mod fs;
pub mod io;
pub mod session;

use crate::shell::commands::Registry;
use anyhow::Result;
use std::sync::Arc;

/// Registers every built-in that needs nothing from the session. `source`,
/// `history`, `alias`, `unalias` and `which` are wired up by the session
/// itself.
pub fn register_all_builtins(registry: &Registry) -> Result<()> {
    // IO
    registry.register(Arc::new(io::echo::EchoCommand))?;
    registry.register(Arc::new(io::cat::CatCommand))?;
    registry.register(Arc::new(io::grep::GrepCommand))?;
    registry.register(Arc::new(io::head::HeadCommand))?;
    registry.register(Arc::new(io::tail::TailCommand))?;
    registry.register(Arc::new(io::wc::WcCommand))?;
    registry.register(Arc::new(io::sort::SortCommand))?;

    // FS commands
    registry.register(Arc::new(fs::ls::LsCommand))?;
    registry.register(Arc::new(fs::mkdir::MkdirCommand))?;
    registry.register(Arc::new(fs::rm::RmCommand))?;
    registry.register(Arc::new(fs::touch::TouchCommand))?;
    registry.register(Arc::new(fs::cp::CpCommand))?;
    registry.register(Arc::new(fs::mv::MvCommand))?;

    // Env/Navigation
    registry.register(Arc::new(env::pwd::PwdCommand))?;
    registry.register(Arc::new(env::cd::CdCommand))?;
    registry.register(Arc::new(env::clear::ClearCommand))?;
    registry.register(Arc::new(env::env::EnvCommand))?;
    registry.register(Arc::new(env::date::DateCommand))?;
    registry.register(Arc::new(env::sleep::SleepCommand))?;
    registry.register(Arc::new(env::status::TrueCommand))?;
    registry.register(Arc::new(env::status::FalseCommand))?;
    registry.register(Arc::new(env::help::HelpCommand))?;
    registry.register(Arc::new(env::exit::ExitCommand))?;

    // Scripts
    registry.register(Arc::new(session::exec::ExecCommand))?;
    Ok(())
}
