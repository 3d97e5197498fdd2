mod hosts;
mod recovery;
mod store;

use std::{net::IpAddr, path::PathBuf};

use anyhow::bail;
use clap::Parser;
use netrecover_config::RecoveryConfig;
use netrecover_trace::LogSink;
use tracing::debug;

#[derive(Debug, Parser)]
#[command(version, about = "Repairs routes, hosts file and interfaces left behind by a killed VPN client")]
struct Opt {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report what would change without changing anything
    #[arg(long)]
    dry_run: bool,

    /// Exit with an error when any route delete is rejected
    #[arg(long)]
    strict: bool,

    /// Leave network interfaces alone
    #[arg(long)]
    no_cycle: bool,

    /// Tunnel endpoint address whose routes are always removed
    #[arg(long)]
    sentinel: Option<IpAddr>,

    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Write logs to daily files in this directory instead of stdout
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

impl Opt {
    fn recovery_config(&self) -> anyhow::Result<RecoveryConfig> {
        let mut config = match &self.config {
            Some(path) => RecoveryConfig::load(path)?,
            None => RecoveryConfig::default(),
        };

        config.dry_run |= self.dry_run;
        config.strict |= self.strict;
        if self.no_cycle {
            config.cycle_interfaces = false;
        }
        if let Some(sentinel) = self.sentinel {
            config.sentinel = sentinel;
        }

        Ok(config)
    }

    fn log_sink(&self) -> LogSink {
        match &self.log_dir {
            Some(directory) => LogSink::File {
                directory: directory.clone(),
                prefix: "netrecover.log".to_string(),
            },
            None => LogSink::Stdout,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::parse();

    let level = netrecover_trace::parse_level(&opt.log_level)?;
    let _guard = netrecover_trace::init(&opt.log_sink(), level)?;

    let config = opt.recovery_config()?;
    debug!(?config, "configuration");

    if !netrecover_rtsock::is_privileged() {
        let command = std::env::args().collect::<Vec<_>>().join(" ");
        bail!("root privilege is required, run it like this: sudo {command}");
    }

    let report = recover(&config)?;

    if opt.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    recovery::check_outcome(&config, &report)
}

#[cfg(target_os = "macos")]
fn recover(config: &RecoveryConfig) -> anyhow::Result<recovery::RecoveryReport> {
    use netrecover_rtsock::{
        classify::RouteClassifier, handle::kernel_handle::KernelHandle, sweep::Sweeper,
    };

    let handle = KernelHandle::darwin()?;
    let mut sweeper =
        Sweeper::new(handle, RouteClassifier::new(config.sentinel)).dry_run(config.dry_run);
    let mut store = store::Scutil::default();

    recovery::run(config, &mut sweeper, &mut store)
}

#[cfg(not(target_os = "macos"))]
fn recover(_config: &RecoveryConfig) -> anyhow::Result<recovery::RecoveryReport> {
    bail!("the routing socket repair only runs on macOS")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netrecover.json");
        RecoveryConfig {
            strict: false,
            cycle_interfaces: true,
            ..Default::default()
        }
        .write(&path)
        .unwrap();

        let opt = Opt::parse_from([
            "netrecover",
            "--config",
            path.to_str().unwrap(),
            "--strict",
            "--no-cycle",
            "--sentinel",
            "203.0.113.9",
        ]);
        let config = opt.recovery_config().unwrap();

        assert!(config.strict);
        assert!(!config.cycle_interfaces);
        assert!(!config.dry_run);
        assert_eq!(config.sentinel.to_string(), "203.0.113.9");
    }

    #[test]
    fn test_default_options() {
        let opt = Opt::parse_from(["netrecover"]);

        assert_eq!(opt.log_level, "info");
        assert_eq!(opt.log_sink(), LogSink::Stdout);
        assert_eq!(opt.recovery_config().unwrap(), RecoveryConfig::default());
    }

    #[test]
    fn test_log_dir_selects_file_sink() {
        let opt = Opt::parse_from(["netrecover", "--log-dir", "/var/log/netrecover", "-l", "debug"]);

        assert_eq!(
            opt.log_sink(),
            LogSink::File {
                directory: PathBuf::from("/var/log/netrecover"),
                prefix: "netrecover.log".to_string(),
            }
        );
        assert!(netrecover_trace::parse_level(&opt.log_level).is_ok());
    }

    #[test]
    fn test_rejects_bad_sentinel() {
        assert!(Opt::try_parse_from(["netrecover", "--sentinel", "vpn.example"]).is_err());
    }
}
