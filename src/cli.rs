use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lish", version, about = "Lish: a small POSIX-like shell")]
pub struct Cli {
    /// Run one command line and exit
    #[arg(short = 'c', long = "command", value_name = "LINE", conflicts_with = "script")]
    pub command: Option<String>,

    /// Do not source the rc script from the config
    #[arg(long)]
    pub no_rc: bool,

    /// Config file (defaults to $LISH_CONFIG, then ~/.lish/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Script to run in an interpreter of its own
    pub script: Option<PathBuf>,

    /// Arguments bound to $1..$N of the script
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
