use crate::handlers::session::Session;
use lish::shell::error::{ShellError, exit_status};

/// `lish -c LINE`: runs one line and reports its status.
pub fn handle_command(session: &Session, line: &str) -> i32 {
    match session.shell.run_line(line) {
        Ok(()) => session.shell.last_status(),
        Err(e) => {
            if let Some(ShellError::Exit(code)) = e.downcast_ref::<ShellError>() {
                return *code;
            }
            session.shell.report_error(&e);
            exit_status(&e)
        }
    }
}
