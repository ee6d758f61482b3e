//! Payload models for the scan source REST API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::de;
use crate::severity::Weighted;

pub type FolderId = i64;
pub type ScanId = i64;
pub type RunId = i64;
pub type HostId = i64;
pub type PluginId = i64;

pub const TRASH_FOLDER: &str = "trash";
pub const STATUS_COMPLETED: &str = "completed";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
}

impl Folder {
    pub fn is_trash(&self) -> bool {
        self.kind == TRASH_FOLDER
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FolderList {
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub folders: Vec<Folder>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scan {
    pub id: ScanId,
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub name: String,
}

/// `GET /scans`. The list is `null` when the scanner has no scans.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanList {
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub folders: Vec<Folder>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub scans: Vec<Scan>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanDetail {
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub history: Vec<RunSummary>,
}

/// One history entry of a scan: a candidate run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunSummary {
    pub history_id: RunId,
    pub status: String,
}

impl RunSummary {
    /// Only runs that finished completely are ever ingested.
    pub fn is_completed(&self) -> bool {
        self.status == STATUS_COMPLETED
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RunDetail {
    pub info: RunInfo,
    #[serde(deserialize_with = "de::null_as_default")]
    pub hosts: Vec<HostRef>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub vulnerabilities: Vec<SeverityCount>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub compliance: Vec<SeverityCount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunInfo {
    #[serde(default, deserialize_with = "de::opt_lenient_i64")]
    pub scanner_start: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_lenient_i64")]
    pub scanner_end: Option<i64>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub targets: Option<String>,
    #[serde(default, deserialize_with = "de::opt_lenient_i64")]
    pub hostcount: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HostRef {
    pub host_id: HostId,
}

/// Run-level severity summary entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeverityCount {
    #[serde(default, deserialize_with = "de::opt_lenient_i64")]
    pub severity: Option<i64>,
    #[serde(default)]
    pub count: i64,
}

/// Host-level finding or compliance entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FindingSummary {
    #[serde(deserialize_with = "de::lenient_i64")]
    pub plugin_id: PluginId,
    #[serde(default, deserialize_with = "de::opt_lenient_i64")]
    pub severity: Option<i64>,
    #[serde(default)]
    pub count: i64,
}

impl Weighted for SeverityCount {
    fn severity(&self) -> Option<i64> {
        self.severity
    }
    fn count(&self) -> i64 {
        self.count
    }
}

impl Weighted for FindingSummary {
    fn severity(&self) -> Option<i64> {
        self.severity
    }
    fn count(&self) -> i64 {
        self.count
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostDetail {
    pub info: HostInfo,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub vulnerabilities: Vec<FindingSummary>,
    /// Parsed on demand by [`HostDetail::compliance`].
    #[serde(rename = "compliance", default, deserialize_with = "de::null_as_default")]
    raw_compliance: Vec<serde_json::Value>,
}

impl HostDetail {
    pub fn compliance(&self) -> Result<Vec<FindingSummary>, serde_json::Error> {
        self.raw_compliance.iter().map(FindingSummary::deserialize).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostInfo {
    #[serde(rename = "host-ip")]
    pub host_ip: String,
    #[serde(rename = "host-fqdn", default, deserialize_with = "de::lenient_string")]
    pub host_fqdn: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub host_start: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub host_end: Option<String>,
    #[serde(rename = "operating-system", default, deserialize_with = "de::lenient_string")]
    pub os: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputInfo {
    #[serde(rename = "plugindescription")]
    pub plugin_description: PluginDescription,
}

/// `GET /scans/{id}/hosts/{host}/plugins/{plugin}`.
#[derive(Debug, Clone, Deserialize)]
pub struct FindingOutput {
    pub info: OutputInfo,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub outputs: Vec<FindingOutputItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FindingOutputItem {
    #[serde(default)]
    pub plugin_output: Option<String>,
    /// Keyed by port label such as `"443 / tcp / www"`.
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub ports: BTreeMap<String, serde_json::Value>,
}

/// `GET /scans/{id}/hosts/{host}/compliance/{compliance}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ComplianceOutput {
    pub info: OutputInfo,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub outputs: Vec<ComplianceOutputItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComplianceOutputItem {
    #[serde(default)]
    pub plugin_output: Option<String>,
}

/// Plugin definition embedded in finding and compliance outputs.
#[derive(Debug, Clone, Deserialize)]
pub struct PluginDescription {
    #[serde(rename = "pluginid", deserialize_with = "de::lenient_i64")]
    pub plugin_id: PluginId,
    #[serde(default, deserialize_with = "de::opt_lenient_i64")]
    pub severity: Option<i64>,
    #[serde(rename = "pluginname")]
    pub name: String,
    #[serde(default)]
    pluginfamily: Option<String>,
    #[serde(default)]
    plugin_family: Option<String>,
    #[serde(rename = "pluginattributes")]
    pub attributes: PluginAttributes,
}

impl PluginDescription {
    pub fn family(&self) -> Option<&str> {
        self.pluginfamily.as_deref().or(self.plugin_family.as_deref())
    }

    pub fn modification_date(&self) -> Option<&str> {
        self.attributes.plugin_information.plugin_modification_date.as_deref()
    }

    /// `see_also` flattened to newline-delimited text; `None` when absent.
    pub fn references(&self) -> Option<String> {
        self.attributes.see_also.as_ref().map(|refs| refs.join("\n"))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginAttributes {
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub synopsis: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub solution: Option<String>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub risk_information: RiskInformation,
    #[serde(default, deserialize_with = "de::opt_string_seq")]
    pub see_also: Option<Vec<String>>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub plugin_information: PluginInformation,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub policy_value: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RiskInformation {
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub cvss_base_score: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub cvss3_base_score: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub cvss_vector: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub cvss3_vector: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginInformation {
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub plugin_publication_date: Option<String>,
    #[serde(default, deserialize_with = "de::lenient_string")]
    pub plugin_modification_date: Option<String>,
}
