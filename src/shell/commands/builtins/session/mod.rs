pub mod alias;
pub mod exec;
pub mod history;
pub mod source;
pub mod which;
