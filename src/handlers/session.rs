use anyhow::{Context, Result};
use lish::config::{LishConfig, expand_home};
use lish::history::History;
use lish::shell::Shell;
use lish::shell::context::{SharedReader, SharedWriter};
use log::{debug, warn};
use std::env;
use std::path::Path;
use std::sync::Arc;

pub struct Session {
    pub shell: Shell,
    pub history: Arc<History>,
}

/// Loads the config, installs the interrupt handler and sources the rc
/// script. The REPL fills the history from its file later.
pub fn start(config_path: Option<&Path>, no_rc: bool) -> Result<Session> {
    let cwd = env::current_dir().context("Failed to determine the working directory")?;
    let config = LishConfig::load(config_path, &cwd)?;

    let history = Arc::new(History::new(config.history.max_size));
    let rc = config.rc.as_deref().map(expand_home);

    let shell = Shell::new(
        config,
        history.clone(),
        SharedReader::stdin(),
        SharedWriter::stdout(),
        SharedWriter::stderr(),
    )?;

    let cancel = shell.cancel_token();
    ctrlc::set_handler(move || cancel.cancel()).context("Failed to install the Ctrl-C handler")?;

    if let Some(rc) = rc.filter(|_| !no_rc) {
        if rc.is_file() {
            debug!("sourcing rc script {}", rc.display());
            if let Err(e) = shell.source_file(&rc) {
                shell.report_error(&e);
            }
        } else {
            warn!("rc script {} not found", rc.display());
        }
    }

    Ok(Session { shell, history })
}
