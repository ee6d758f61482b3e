use store_sqlite::{Db, ScanRunRow};
use tracing::{debug, warn};
use vault_core::*;

use crate::host::ingest_host;
use crate::plugin::PluginCatalog;
use crate::SyncOptions;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub hosts: usize,
    pub findings: usize,
    pub outputs: usize,
    pub compliance_checks: usize,
    pub plugins_inserted: usize,
    pub plugins_updated: usize,
    /// Buckets from the run's own summary, as stored on the run row.
    pub severity: SeverityBuckets,
    /// Sum of the per-host buckets; reported, never reconciled with `severity`.
    pub host_severity: SeverityBuckets,
}

/// Fetch one completed run and persist it with all of its hosts in a single
/// transaction. Any error drops the transaction, leaving no trace of the run.
pub async fn ingest_scan_run<S: ScanSource>(
    source: &S,
    db: &mut Db,
    opts: &SyncOptions,
    scan_id: ScanId,
    run_id: RunId,
) -> Result<RunStats, SyncError> {
    let detail = source.get_scan_run(scan_id, run_id).await?;
    let severity = SeverityBuckets::from_entries(&detail.vulnerabilities);
    let compliance = if opts.compliance {
        ComplianceBuckets::from_entries(&detail.compliance)
    } else {
        ComplianceBuckets::default()
    };
    debug!(scan_id, run_id, hosts = detail.hosts.len(), targets = ?detail.info.targets, "processing scan run");

    let tx = db.begin_run()?;
    tx.insert_scan_run(&ScanRunRow {
        scan_run_id: run_id,
        scan_id,
        scan_start: detail.info.scanner_start,
        scan_end: detail.info.scanner_end,
        targets: detail.info.targets.clone(),
        host_count: detail.info.hostcount,
        severity,
        compliance,
    })?;

    let mut catalog = PluginCatalog::new();
    let mut stats = RunStats { severity, ..RunStats::default() };
    for host in &detail.hosts {
        let h = ingest_host(source, opts, scan_id, host.host_id, run_id, &tx, &mut catalog).await?;
        stats.hosts += 1;
        stats.findings += h.findings;
        stats.outputs += h.outputs;
        stats.compliance_checks += h.compliance_checks;
        stats.host_severity += h.severity;
    }
    tx.commit()?;

    stats.plugins_inserted = catalog.inserted;
    stats.plugins_updated = catalog.updated;
    if stats.severity != stats.host_severity {
        warn!(
            scan_id,
            run_id,
            run = ?stats.severity.0,
            hosts = ?stats.host_severity.0,
            "run severity summary differs from the sum of its hosts"
        );
    }
    Ok(stats)
}
