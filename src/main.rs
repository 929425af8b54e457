//! Woopra relay - forwards newline-delimited JSON events from stdin.
//!
//! Configuration precedence: config file, then `WOOPRA_*` environment
//! variables, then command-line flags.

use clap::Parser;
use std::path::PathBuf;
use tokio::io::BufReader;

use woopra_tracking::{relay, Config, WoopraBackend};

#[derive(Debug, Parser)]
#[command(name = "woopra-relay", version, about = "Forward tracking events to woopra.com")]
struct Args {
    /// JSON configuration file.
    #[arg(long, env = "WOOPRA_CONFIG")]
    config: Option<PathBuf>,

    /// Project domain registered in Woopra (overrides the config file).
    #[arg(long)]
    url: Option<String>,

    /// Idle timeout in milliseconds (overrides the config file).
    #[arg(long)]
    idle_timeout: Option<u64>,

    /// Track over plain http.
    #[arg(long)]
    insecure: bool,
}

impl Args {
    fn load_config(&self) -> woopra_tracking::Result<Config> {
        self.load_config_with(|key| std::env::var(key).ok())
    }

    fn load_config_with<F>(&self, lookup: F) -> woopra_tracking::Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        config.apply_overrides(lookup)?;

        if let Some(url) = &self.url {
            config.woopra.url = Some(url.clone());
        }
        if let Some(idle_timeout) = self.idle_timeout {
            config.woopra.idle_timeout = idle_timeout;
        }
        if self.insecure {
            config.woopra.secure = false;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = args.load_config()?;

    woopra_tracking::observability::init_tracing_with(&config.observability);

    let backend = WoopraBackend::from_config(&config)?;
    tracing::info!(
        enabled = backend.is_enabled(),
        blacklisted = backend.event_black_list().len(),
        "woopra relay reading events from stdin"
    );

    let stats = relay(&backend, BufReader::new(tokio::io::stdin())).await?;
    tracing::info!(
        sent = stats.sent,
        skipped = stats.skipped,
        failed = stats.failed,
        "woopra relay finished"
    );

    Ok(())
}
