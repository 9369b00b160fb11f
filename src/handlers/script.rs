use crate::handlers::session::Session;
use colored::*;
use lish::shell::error::exit_status;
use std::path::Path;

/// `lish FILE [ARGS..]`: runs the file in an interpreter of its own.
pub fn handle_script(session: &Session, path: &Path, args: &[String]) -> i32 {
    if !path.is_file() {
        eprintln!("{} Script not found: {}", "❌".red(), path.display());
        return 127;
    }
    match session.shell.exec_file(path, args) {
        Ok(code) => code,
        Err(e) => {
            session.shell.report_error(&e);
            exit_status(&e)
        }
    }
}
