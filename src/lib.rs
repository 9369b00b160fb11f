//! lish: a small POSIX-like shell with a concurrent pipeline executor and a
//! tree-walking script interpreter.

pub mod config;
pub mod history;
pub mod script;
pub mod shell;
