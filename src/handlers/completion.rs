use lish::shell::Shell;
use lish::shell::alias::Aliases;
use lish::shell::commands::Registry;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::sync::Arc;

/// Tab completion for the REPL: command names where a command goes,
/// paths everywhere else.
pub struct LishHelper {
    registry: Arc<Registry>,
    aliases: Arc<Aliases>,
    files: FilenameCompleter,
}

impl LishHelper {
    pub fn new(shell: &Shell) -> Self {
        Self {
            registry: shell.registry().clone(),
            aliases: shell.aliases().clone(),
            files: FilenameCompleter::new(),
        }
    }

    fn commands(&self, prefix: &str) -> Vec<Pair> {
        let mut names = self.registry.list();
        names.extend(self.aliases.list().into_iter().map(|(name, _)| name));
        names.sort();
        names.dedup();
        names
            .into_iter()
            .filter(|name| name.starts_with(prefix))
            .map(|name| Pair {
                display: name.clone(),
                replacement: format!("{} ", name),
            })
            .collect()
    }
}

/// Start of the word under the cursor and whether it sits where a
/// command name is expected.
fn word_at(line: &str, pos: usize) -> (usize, bool) {
    let head = &line[..pos];
    let start = head
        .rfind(|c: char| c.is_ascii_whitespace() || matches!(c, '|' | ';' | '&' | '<' | '>'))
        .map(|i| i + 1)
        .unwrap_or(0);
    let before = head[..start].trim_end();
    let command = before.is_empty() || before.ends_with(['|', ';', '&']);
    (start, command)
}

fn is_hidden(candidate: &Pair) -> bool {
    candidate
        .display
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .is_some_and(|name| name.starts_with('.'))
}

impl Completer for LishHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, command) = word_at(line, pos);
        let word = &line[start..pos];
        if command && !word.contains('/') {
            return Ok((start, self.commands(word)));
        }

        let (offset, mut candidates) = self.files.complete_path(line, pos)?;
        // dot files only when asked for
        let file_prefix = word.rsplit('/').next().unwrap_or(word);
        if !file_prefix.starts_with('.') {
            candidates.retain(|candidate| !is_hidden(candidate));
        }
        Ok((offset, candidates))
    }
}

impl Hinter for LishHelper {
    type Hint = String;
}

impl Highlighter for LishHelper {}

impl Validator for LishHelper {}

impl Helper for LishHelper {}
