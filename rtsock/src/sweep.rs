use std::fmt;

use serde::Serialize;

use crate::{
    classify::{RouteClassifier, Verdict},
    core::{kernel::Kernel, message::RouteRecords},
    error::RouteError,
    handle::kernel_handle::KernelHandle,
    types::{addr::Address, routing::RouteRecord},
};

/// Counts for one pass over the routing table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub scanned: usize,
    pub kept: usize,
    pub skipped: usize,
    pub default_routes: usize,
    /// Routes classified for deletion, sent or not.
    pub selected: usize,
    pub attempted: usize,
    pub deleted: usize,
    pub rejected: usize,
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scanned {} routes ({} default): kept {}, skipped {}, selected {}, deleted {}/{}, rejected {}",
            self.scanned,
            self.default_routes,
            self.kept,
            self.skipped,
            self.selected,
            self.deleted,
            self.attempted,
            self.rejected
        )
    }
}

pub struct Sweeper<K: Kernel> {
    pub handle: KernelHandle<K>,
    classifier: RouteClassifier,
    dry_run: bool,
}

impl<K: Kernel> Sweeper<K> {
    pub fn new(handle: KernelHandle<K>, classifier: RouteClassifier) -> Self {
        Self {
            handle,
            classifier,
            dry_run: false,
        }
    }

    /// Classify and report only, never write to the routing socket.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Snapshot the table, then delete every route the classifier selects.
    /// Rejected deletes are counted and the pass goes on. A malformed
    /// record stops the pass; deletes already sent stay in effect.
    pub fn sweep(&mut self) -> Result<SweepReport, RouteError> {
        let table = self.handle.handle_snapshot().dump()?;
        let mut report = SweepReport::default();

        for record in RouteRecords::from(&table[..]) {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    tracing::error!(
                        scanned = report.scanned,
                        deleted = report.deleted,
                        rejected = report.rejected,
                        error = %e,
                        "route scan aborted"
                    );
                    return Err(e);
                }
            };

            report.scanned += 1;
            self.visit(&record, &mut report)?;
        }

        tracing::info!(%report, "route scan complete");
        Ok(report)
    }

    fn visit(&mut self, record: &RouteRecord, report: &mut SweepReport) -> Result<(), RouteError> {
        let class = self.classifier.classify(record);
        if class.default_route {
            report.default_routes += 1;
        }

        let network = record.network();
        let gateway = record
            .gateway()
            .map(|gw| scoped_text(&self.handle.kernel, &gw.address))
            .unwrap_or_else(|| "-".to_string());
        let flags = record.flags();
        let index = record.header.index;
        let interface = self
            .handle
            .kernel
            .interface_name(index)
            .unwrap_or_else(|| format!("if#{index}"));

        let reason = match class.verdict {
            Verdict::Keep => {
                report.kept += 1;
                tracing::debug!(%network, %gateway, %flags, %interface, "route kept");
                return Ok(());
            }
            Verdict::SkipHostGateway => {
                report.skipped += 1;
                tracing::debug!(%network, %gateway, %flags, %interface, "host gateway route skipped");
                return Ok(());
            }
            Verdict::Delete(reason) => reason,
        };

        report.selected += 1;
        tracing::info!(
            %network,
            %gateway,
            %flags,
            %interface,
            %reason,
            default = class.default_route,
            "deleting route"
        );

        if self.dry_run {
            return Ok(());
        }

        report.attempted += 1;
        match self.handle.handle_route().delete(record) {
            Ok(seq) => {
                report.deleted += 1;
                tracing::debug!(%network, seq, "route deleted");
            }
            Err(e) if !e.is_fatal() => {
                report.rejected += 1;
                tracing::warn!(%network, error = %e, "route delete rejected");
            }
            Err(e) => return Err(e),
        }

        Ok(())
    }

    /// Cycles each interface in turn. Returns how many were cycled.
    pub fn cycle_interfaces<S: AsRef<str>>(&mut self, names: &[S]) -> Result<usize, RouteError> {
        let mut cycled = 0;

        for name in names {
            let name = name.as_ref();
            if self.dry_run {
                tracing::info!(interface = name, "would cycle interface");
                continue;
            }

            self.handle.handle_link().cycle(name)?;
            cycled += 1;
        }

        Ok(cycled)
    }
}

/// Numeric text with the IPv6 scope shown as the interface name when the
/// kernel knows it.
fn scoped_text<K: Kernel>(kernel: &K, address: &Address) -> String {
    if let Address::Inet6 { ip, scope_id } = address {
        let name = u16::try_from(*scope_id)
            .ok()
            .filter(|index| *index != 0)
            .and_then(|index| kernel.interface_name(index));
        if let Some(name) = name {
            return format!("{ip}%{name}");
        }
    }

    address.to_string()
}
