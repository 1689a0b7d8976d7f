use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "starbased")]
pub struct Args {
    /// Node configuration file; created with defaults on first run.
    #[arg(long, default_value = "base.toml")]
    pub config: PathBuf,

    /// Address the HTTP surface listens on.
    #[arg(long, default_value = "127.0.0.1:5003")]
    pub listen: String,

    /// Hostname advertised in resolved service URLs.
    #[arg(long, default_value = "localhost")]
    pub hostname: String,

    /// Directory for durable announcement records.
    #[arg(long, default_value = ".starbase")]
    pub data_dir: PathBuf,
}

impl Args {
    pub fn failed_dir(&self) -> PathBuf {
        self.data_dir.join("failed_announcements")
    }

    pub fn accepted_dir(&self) -> PathBuf {
        self.data_dir.join("accepted_announcements")
    }
}
