// src/cli.rs
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use profile_form::Collection;

#[derive(Parser, Debug)]
#[command(name = "profile_tui", version, about = "Profile builder form in the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<Cmd>,

    /// Base url of the lookup backend (overrides `api.base_url`)
    #[arg(long, global = true, value_name = "URL")]
    pub api_base: Option<String>,

    /// Never contact the backend; bundled lists only
    #[arg(long, global = true)]
    pub offline: bool,

    /// Geo dataset in RON format (overrides `geo.dataset_path`)
    #[arg(long, global = true, value_name = "FILE")]
    pub geo: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    /// Run the interactive form (default)
    Run,
    /// Print a remote collection with timings
    Fetch {
        /// institutions, companies, roles or degrees
        collection: Collection,
    },
    /// List backend keys
    Keys {
        /// Glob pattern, `*` when omitted
        pattern: Option<String>,
    },
    /// Print the raw items stored under a backend key
    Key { key: String },
    /// Print the country list of the geo dataset
    Countries,
}

impl Cli {
    pub fn command_or_default(&self) -> Cmd {
        self.cmd.clone().unwrap_or(Cmd::Run)
    }
}
