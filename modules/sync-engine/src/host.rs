use store_sqlite::{HostRow, RunWriter};
use tracing::debug;
use vault_core::*;

use crate::plugin::PluginCatalog;
use crate::SyncOptions;

/// What one host contributed to its run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostStats {
    pub severity: SeverityBuckets,
    pub compliance: ComplianceBuckets,
    pub findings: usize,
    pub outputs: usize,
    pub compliance_checks: usize,
}

/// Fetch one host of a run and write it, its findings and (when enabled)
/// its compliance results through `tx`.
///
/// Each plugin is catalogued before the finding that references it.
pub async fn ingest_host<S: ScanSource>(
    source: &S,
    opts: &SyncOptions,
    scan_id: ScanId,
    host_id: HostId,
    run_id: RunId,
    tx: &RunWriter<'_>,
    catalog: &mut PluginCatalog,
) -> Result<HostStats, SyncError> {
    let host = source.get_host(scan_id, host_id, run_id).await?;
    debug!(scan_id, run_id, host_id, ip = %host.info.host_ip, findings = host.vulnerabilities.len(), "processing host");

    let mut stats = HostStats {
        severity: SeverityBuckets::from_entries(&host.vulnerabilities),
        ..HostStats::default()
    };
    let checks = if opts.compliance {
        host.compliance().map_err(|e| SyncError::malformed(format!("host {host_id} compliance"), e))?
    } else {
        Vec::new()
    };
    stats.compliance = ComplianceBuckets::from_entries(&checks);

    tx.insert_host(&HostRow {
        nessus_host_id: host_id,
        scan_run_id: run_id,
        scan_id,
        host_ip: host.info.host_ip.clone(),
        host_fqdn: host.info.host_fqdn.clone(),
        host_start: host.info.host_start.clone(),
        host_end: host.info.host_end.clone(),
        os: host.info.os.clone(),
        severity: stats.severity,
        compliance: stats.compliance,
    })?;

    for vuln in &host.vulnerabilities {
        let output = source.get_finding_output(scan_id, host_id, vuln.plugin_id, run_id).await?;
        catalog.sync(tx, &output.info.plugin_description)?;
        let host_vuln_id = tx.insert_host_vuln(host_id, run_id, vuln.plugin_id)?;
        for item in &output.outputs {
            for port in item.ports.keys() {
                tx.insert_vuln_output(host_vuln_id, port, item.plugin_output.as_deref())?;
                stats.outputs += 1;
            }
        }
        stats.findings += 1;
    }

    for check in &checks {
        let output = source.get_compliance_output(scan_id, host_id, check.plugin_id, run_id).await?;
        catalog.sync(tx, &output.info.plugin_description)?;
        let compliance_id = tx.insert_compliance(host_id, run_id, check.plugin_id, check.severity)?;
        for item in &output.outputs {
            tx.insert_compliance_output(compliance_id, item.plugin_output.as_deref())?;
        }
        stats.compliance_checks += 1;
    }

    Ok(stats)
}
