use clap::{Parser, Subcommand};

/// Geodash — request-log heatmap dashboard backend
#[derive(Parser)]
#[command(name = "geodash", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the dashboard server
    Serve {
        /// Port to bind (overrides GEODASH_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Resolve a single IP address and print the result as JSON
    Resolve {
        ip: String,
    },
}
