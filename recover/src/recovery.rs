use std::fmt;

use anyhow::{bail, Context, Result};
use netrecover_config::RecoveryConfig;
use netrecover_rtsock::{
    core::kernel::Kernel,
    sweep::{SweepReport, Sweeper},
};
use serde::Serialize;
use tracing::info;

use crate::{
    hosts,
    store::{self, ConfigStore},
};

#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryReport {
    pub dry_run: bool,
    pub purged_keys: Vec<String>,
    pub hosts_restored: bool,
    pub routes: SweepReport,
    pub interfaces: Vec<String>,
}

impl fmt::Display for RecoveryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            writeln!(f, "dry run, nothing was changed")?;
        }
        writeln!(f, "store keys removed: {}", self.purged_keys.len())?;
        writeln!(
            f,
            "hosts file restored: {}",
            if self.hosts_restored { "yes" } else { "no" }
        )?;
        writeln!(f, "routes: {}", self.routes)?;
        write!(
            f,
            "interfaces cycled: {}",
            if self.interfaces.is_empty() {
                "none".to_string()
            } else {
                self.interfaces.join(", ")
            }
        )
    }
}

/// Store purge, hosts restore, route sweep and interface cycling, in that
/// order. The first failure ends the run.
pub fn run<K: Kernel, S: ConfigStore>(
    config: &RecoveryConfig,
    sweeper: &mut Sweeper<K>,
    store: &mut S,
) -> Result<RecoveryReport> {
    let mut report = RecoveryReport {
        dry_run: config.dry_run,
        ..Default::default()
    };

    report.purged_keys = store::purge(store, &config.vpn_keys, config.dry_run)
        .context("failed to remove VPN service configuration")?;

    report.hosts_restored = if config.dry_run {
        hosts::pending(&config.hosts_backup)
    } else {
        hosts::restore(&config.hosts_backup, &config.hosts_file)?
    };

    report.routes = sweeper.sweep().context("route repair aborted")?;

    if config.cycle_interfaces {
        report.interfaces = store::interfaces_to_cycle(store, &config.interface_root)
            .context("failed to list active interfaces")?;
        sweeper
            .cycle_interfaces(&report.interfaces[..])
            .context("interface cycling aborted")?;
    }

    info!(
        deleted = report.routes.deleted,
        rejected = report.routes.rejected,
        interfaces = report.interfaces.len(),
        "recovery finished"
    );

    Ok(report)
}

/// Rejected deletes only fail the run when `strict` is set.
pub fn check_outcome(config: &RecoveryConfig, report: &RecoveryReport) -> Result<()> {
    if config.strict && report.routes.rejected > 0 {
        bail!("{} route deletes were rejected", report.routes.rejected);
    }

    Ok(())
}
