use chrono::{DateTime, Local};
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Unknown for lines read back from the history file.
    pub timestamp: Option<DateTime<Local>>,
    pub line: String,
}

/// What the `history` builtin and `!prefix` see. The line editor owns the
/// history file; this only adds timestamps for the running session.
pub struct History {
    max_size: usize,
    entries: Mutex<Vec<Entry>>,
    cleared: AtomicBool,
}

impl History {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            entries: Mutex::new(Vec::new()),
            cleared: AtomicBool::new(false),
        }
    }

    /// Lines from an earlier session, oldest first.
    pub fn seed<I>(&self, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.extend(lines.into_iter().map(|line| Entry {
            timestamp: None,
            line,
        }));
        trim(&mut entries, self.max_size);
        debug!("history seeded with {} entries", entries.len());
    }

    pub fn add(&self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.push(Entry {
            timestamp: Some(Local::now()),
            line: line.to_string(),
        });
        trim(&mut entries, self.max_size);
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Most recent line starting with `prefix`.
    pub fn search(&self, prefix: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|entry| entry.line.starts_with(prefix))
            .map(|entry| entry.line.clone())
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.cleared.store(true, Ordering::SeqCst);
    }

    /// True once after `clear`, so the editor can drop its own copy.
    pub fn take_cleared(&self) -> bool {
        self.cleared.swap(false, Ordering::SeqCst)
    }
}

fn trim(entries: &mut Vec<Entry>, max_size: usize) {
    let excess = entries.len().saturating_sub(max_size);
    entries.drain(..excess);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_stamps_and_trims() {
        let history = History::new(3);
        for line in ["one", "two", "  ", "three", "four"] {
            history.add(line);
        }
        let entries = history.entries();
        let lines: Vec<_> = entries.iter().map(|e| e.line.as_str()).collect();
        assert_eq!(lines, vec!["two", "three", "four"]);
        assert!(entries.iter().all(|e| e.timestamp.is_some()));
    }

    #[test]
    fn test_seeded_lines_have_no_timestamp() {
        let history = History::new(2);
        history.seed(["a".to_string(), "b".to_string(), "c".to_string()]);
        history.add("d");
        let entries = history.entries();
        assert_eq!(entries[0].line, "c");
        assert_eq!(entries[0].timestamp, None);
        assert!(entries[1].timestamp.is_some());
    }

    #[test]
    fn test_search_and_clear() {
        let history = History::new(10);
        history.add("grep foo a.txt");
        history.add("ls");
        history.add("grep bar b.txt");

        assert_eq!(history.search("gr").as_deref(), Some("grep bar b.txt"));
        assert_eq!(history.search("cat"), None);

        assert!(!history.take_cleared());
        history.clear();
        assert!(history.entries().is_empty());
        assert!(history.take_cleared());
        assert!(!history.take_cleared());
    }
}
