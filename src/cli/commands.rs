use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `synthrun` - run generated automation behind typed contracts and sandboxes.
#[derive(Parser, Debug)]
#[command(name = "synthrun")]
#[command(version)]
#[command(about = "Sandboxed execution core for generated automation.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.synthrun/config.toml, created on first run)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level regardless of config
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check a URL against the network policy without sending a request
    CheckUrl {
        url: String,
    },

    /// Send one HTTP request through the network sandbox
    Fetch {
        url: String,

        /// GET, POST, PUT, DELETE or HEAD
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Request header as `name:value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Request body
        #[arg(short, long)]
        data: Option<String>,
    },

    /// Run a program (argument vector, no shell) through the process sandbox
    Exec {
        /// Timeout in seconds (clamped to the configured maximum)
        #[arg(short, long)]
        timeout: Option<u64>,

        command: String,

        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run a declarative workflow file (TOML or JSON)
    Workflow {
        file: PathBuf,
    },

    /// List the registered tools and their parameter schemas
    Tools,
}
