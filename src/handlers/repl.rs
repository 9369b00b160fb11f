use crate::handlers::completion::LishHelper;
use crate::handlers::session::Session;
use anyhow::{Context, Result};
use colored::*;
use lish::shell::error::ShellError;
use log::{debug, warn};
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::{Config, Editor};
use std::time::{Duration, Instant};

pub fn handle_repl(session: &Session) -> Result<i32> {
    let shell = &session.shell;
    let config = shell.config();

    let editor_config = Config::builder()
        .max_history_size(config.history.max_size)
        .context("Invalid history size")?
        .auto_add_history(false)
        .build();
    let mut editor: Editor<LishHelper, FileHistory> =
        Editor::with_config(editor_config).context("Failed to start the line editor")?;
    editor.set_helper(Some(LishHelper::new(shell)));

    let history_path = config.history.path();
    if history_path.exists() {
        if let Err(e) = editor.load_history(&history_path) {
            warn!("could not load history from {}: {}", history_path.display(), e);
        }
    }
    session.history.seed(editor.history().iter().cloned());

    eprintln!(
        "{} lish {} (type 'help' for commands, Ctrl-D to leave)",
        "🐚".cyan(),
        env!("CARGO_PKG_VERSION")
    );

    let code = loop {
        let prompt = config.prompt.render(shell.last_status());
        let line = match editor.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break shell.last_status(),
            Err(e) => {
                save_history(&mut editor, &history_path);
                return Err(e).context("Failed to read input");
            }
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        // `!prefix` repeats the latest history line starting with prefix
        let input = match input.strip_prefix('!').filter(|p| !p.is_empty()) {
            Some(prefix) => match session.history.search(prefix) {
                Some(found) => {
                    eprintln!("{}", found.dimmed());
                    found
                }
                None => {
                    eprintln!("{} no history entry starts with {}", "lish:".red().bold(), prefix);
                    continue;
                }
            },
            None => input.to_string(),
        };

        if let Err(e) = editor.add_history_entry(input.as_str()) {
            warn!("could not record history: {}", e);
        }
        session.history.add(&input);

        let started = Instant::now();
        let result = shell.run_line(&input);
        report_duration(started.elapsed(), config.prompt.slow_command_ms);

        if session.history.take_cleared() {
            if let Err(e) = editor.clear_history() {
                warn!("could not clear the editor history: {}", e);
            }
        }

        if let Err(e) = result {
            if let Some(ShellError::Exit(code)) = e.downcast_ref::<ShellError>() {
                break *code;
            }
            shell.report_error(&e);
        }
    };

    save_history(&mut editor, &history_path);
    Ok(code)
}

fn save_history(editor: &mut Editor<LishHelper, FileHistory>, path: &std::path::Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    match editor.save_history(path) {
        Ok(()) => debug!("history saved to {}", path.display()),
        Err(e) => warn!("could not save history to {}: {}", path.display(), e),
    }
}

fn report_duration(elapsed: Duration, threshold_ms: u64) {
    if threshold_ms > 0 && elapsed > Duration::from_millis(threshold_ms) {
        eprintln!("{}", format!("⏱ took {}", format_duration(elapsed)).dimmed());
    }
}

/// Two decimals in the largest unit that keeps the number small.
fn format_duration(d: Duration) -> String {
    if d < Duration::from_millis(1) {
        format!("{:.2}μs", d.as_secs_f64() * 1e6)
    } else if d < Duration::from_secs(1) {
        format!("{:.2}ms", d.as_secs_f64() * 1e3)
    } else if d < Duration::from_secs(60) {
        format!("{:.2}s", d.as_secs_f64())
    } else {
        format!("{:.2}m", d.as_secs_f64() / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_units() {
        assert_eq!(format_duration(Duration::from_micros(250)), "250.00μs");
        assert_eq!(format_duration(Duration::from_micros(150_700)), "150.70ms");
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.50s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1.50m");
    }
}
