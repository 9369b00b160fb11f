pub mod command;
pub mod completion;
pub mod repl;
pub mod script;
pub mod session;
