use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use nim_inventory::nim::ResourceKind;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "nim-inventory")]
#[command(about = "Inventory an AIX NIM master, its clients, VIOSes and resources")]
pub struct Cli {
    /// Settings file (YAML); defaults to the per-user config location
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides applied on top of the settings file.
#[derive(Args, Clone, Debug, Default)]
pub struct CollectArgs {
    /// Local niminfo file
    #[arg(short, long)]
    pub niminfo: Option<PathBuf>,

    /// Timeout in seconds for each remote c_rsh call
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Maximum number of hosts or resources queried at once
    #[arg(short, long)]
    pub parallelism: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect the full NIM inventory
    Inventory {
        #[command(flatten)]
        collect: CollectArgs,

        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Show only the local niminfo and oslevel
    Master {
        #[command(flatten)]
        collect: CollectArgs,

        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Collect standalone NIM clients
    Clients {
        #[command(flatten)]
        collect: CollectArgs,

        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Collect VIOS partitions
    Vioses {
        #[command(flatten)]
        collect: CollectArgs,

        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Collect NIM resources of one type
    Resources {
        /// Resource type
        #[arg(short = 'r', long = "type", value_enum)]
        kind: ResourceKind,

        #[command(flatten)]
        collect: CollectArgs,

        /// Output format (json, yaml, or pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Post the NIM inventory to an inventory API
    Post {
        /// Inventory API base URL
        #[arg(short, long, default_value = "http://localhost:6183")]
        url: String,

        #[command(flatten)]
        collect: CollectArgs,
    },
}
