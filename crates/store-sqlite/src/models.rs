use serde::{Deserialize, Serialize};
use vault_core::{ComplianceBuckets, FolderId, HostId, PluginId, RunId, ScanId, SeverityBuckets};

pub type HostVulnId = i64;
pub type ComplianceRowId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderRow {
    pub folder_id: FolderId,
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRow {
    pub scan_id: ScanId,
    pub folder_id: Option<FolderId>,
    pub kind: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanRunRow {
    pub scan_run_id: RunId,
    pub scan_id: ScanId,
    pub scan_start: Option<i64>,
    pub scan_end: Option<i64>,
    pub targets: Option<String>,
    pub host_count: Option<i64>,
    pub severity: SeverityBuckets,
    pub compliance: ComplianceBuckets,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostRow {
    pub nessus_host_id: HostId,
    pub scan_run_id: RunId,
    pub scan_id: ScanId,
    pub host_ip: String,
    pub host_fqdn: Option<String>,
    pub host_start: Option<String>,
    pub host_end: Option<String>,
    pub os: Option<String>,
    pub severity: SeverityBuckets,
    pub compliance: ComplianceBuckets,
}

/// One plugin catalog entry; `plugin_id` is the natural key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginRow {
    pub plugin_id: PluginId,
    pub severity: Option<i64>,
    pub name: String,
    pub family: Option<String>,
    pub synopsis: Option<String>,
    pub description: Option<String>,
    pub solution: Option<String>,
    pub cvss_base_score: Option<String>,
    pub cvss3_base_score: Option<String>,
    pub cvss_vector: Option<String>,
    pub cvss3_vector: Option<String>,
    pub reference: Option<String>,
    pub pub_date: Option<String>,
    pub mod_date: Option<String>,
    pub policy_value: Option<String>,
}

/// Row counts per table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableCounts {
    pub folder: i64,
    pub scan: i64,
    pub scan_run: i64,
    pub host: i64,
    pub plugin: i64,
    pub host_vuln: i64,
    pub vuln_output: i64,
    pub compliance: i64,
    pub compliance_output: i64,
}

/// Summary of a stored run, joined with its scan name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOverview {
    pub scan_run_id: RunId,
    pub scan_id: ScanId,
    pub scan_name: Option<String>,
    pub scan_start: Option<i64>,
    pub scan_end: Option<i64>,
    pub host_count: Option<i64>,
    pub severity: SeverityBuckets,
}
