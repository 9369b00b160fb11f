use crate::shell::commands::Registry;
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Advisory cancellation flag, set from the interrupt handler and polled by
/// long-running commands and script loops.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// SharedWriter allows cloning a writer handle (by sharing the underlying writer via Arc+Mutex)
#[derive(Clone)]
pub struct SharedWriter(Arc<Mutex<Box<dyn Write + Send>>>);

impl SharedWriter {
    pub fn new(w: Box<dyn Write + Send>) -> Self {
        Self(Arc::new(Mutex::new(w)))
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn stderr() -> Self {
        Self::new(Box::new(io::stderr()))
    }
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).flush()
    }
}

/// Same idea for the session's standard input.
#[derive(Clone)]
pub struct SharedReader(Arc<Mutex<Box<dyn Read + Send>>>);

impl SharedReader {
    pub fn new(r: Box<dyn Read + Send>) -> Self {
        Self(Arc::new(Mutex::new(r)))
    }

    pub fn stdin() -> Self {
        Self::new(Box::new(io::stdin()))
    }

    pub fn empty() -> Self {
        Self::new(Box::new(io::empty()))
    }
}

impl Read for SharedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).read(buf)
    }
}

/// Everything a command may touch while it runs. Each pipeline stage gets
/// its own context, so nothing in here needs locking by the command.
pub struct CommandContext<'a> {
    pub stdin: Box<dyn Read + Send>,
    pub stdout: Box<dyn Write + Send>,
    pub stderr: Box<dyn Write + Send>,
    pub cancel: CancelToken,
    pub registry: &'a Arc<Registry>,
}

impl<'a> CommandContext<'a> {
    pub fn check_cancelled(&self) -> anyhow::Result<()> {
        if self.cancel.is_cancelled() {
            return Err(crate::shell::error::ShellError::Interrupted.into());
        }
        Ok(())
    }
}

/// In-memory sink whose contents stay readable after the writer has been
/// handed to a command. Used for capturing output.
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let buf = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }

    pub fn writer(&self) -> SharedWriter {
        SharedWriter::new(Box::new(self.clone()))
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
