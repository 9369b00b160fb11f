pub mod cd;
pub mod clear;
pub mod date;
pub mod env;
pub mod exit;
pub mod help;
pub mod pwd;
pub mod sleep;
pub mod status;
