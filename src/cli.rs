// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sandbox-deployer")]
#[command(about = "Track on-chain sandbox and instance deployments")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only final results
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Emit JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new deployer.yml configuration file
    Init {
        /// Operator API base URL to write into the config
        #[arg(long)]
        operator_api: Option<String>,

        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the current provision status for a call
    Status {
        /// Call id from the job submission receipt
        call_id: u64,
    },

    /// Follow a provision until it is ready or has failed
    Watch {
        /// Call id from the job submission receipt
        call_id: u64,
    },
}
