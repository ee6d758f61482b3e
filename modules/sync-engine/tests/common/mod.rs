#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use serde_json::{json, Value};
use vault_core::*;

/// In-memory scan source. Records every call and can be told to fail
/// specific calls by their label.
#[derive(Default)]
pub struct FakeSource {
    pub folders: Vec<Value>,
    pub scans: Vec<Value>,
    pub scan_details: HashMap<ScanId, Value>,
    pub runs: HashMap<(ScanId, RunId), Value>,
    pub hosts: HashMap<(ScanId, HostId, RunId), Value>,
    pub findings: HashMap<(ScanId, HostId, PluginId, RunId), Value>,
    pub compliance: HashMap<(ScanId, HostId, PluginId, RunId), Value>,
    pub calls: RefCell<Vec<String>>,
    pub fail: RefCell<HashSet<String>>,
}

impl FakeSource {
    fn call<T: serde::de::DeserializeOwned>(&self, label: String, payload: Option<&Value>) -> Result<T, SyncError> {
        self.calls.borrow_mut().push(label.clone());
        if self.fail.borrow().contains(&label) {
            return Err(SyncError::SourceUnavailable(format!("{label}: HTTP 503 Service Unavailable")));
        }
        let payload = payload.ok_or_else(|| SyncError::SourceUnavailable(format!("{label}: HTTP 404 Not Found")))?;
        serde_json::from_value(payload.clone()).map_err(|e| SyncError::malformed(label, e))
    }

    pub fn fail_on(&self, label: &str) {
        self.fail.borrow_mut().insert(label.to_string());
    }

    pub fn heal(&self) {
        self.fail.borrow_mut().clear();
    }

    pub fn take_calls(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    pub fn calls_mentioning_run(&self, run_id: RunId) -> Vec<String> {
        let needle = format!("run={run_id}");
        self.calls.borrow().iter().filter(|c| c.contains(&needle)).cloned().collect()
    }

    pub fn add_folder(&mut self, id: FolderId, kind: &str) {
        self.folders.push(json!({"id": id, "type": kind, "name": format!("folder {id}")}));
    }

    pub fn add_scan(&mut self, id: ScanId, folder_id: FolderId, history: &[(RunId, &str)]) {
        self.scans.push(json!({"id": id, "folder_id": folder_id, "type": "remote", "name": format!("scan {id}")}));
        let history: Vec<Value> = history.iter().map(|(h, s)| json!({"history_id": h, "status": s})).collect();
        self.scan_details.insert(id, json!({"info": {}, "history": history}));
    }

    /// A run whose summary lists `vulns` as (plugin_id, severity, count).
    pub fn add_run(&mut self, scan_id: ScanId, run_id: RunId, host_ids: &[HostId], vulns: &[(PluginId, i64, i64)]) {
        let hosts: Vec<Value> = host_ids.iter().map(|h| json!({"host_id": h, "hostname": format!("10.0.0.{h}")})).collect();
        let vulns: Vec<Value> = vulns.iter().map(|(p, s, c)| json!({"plugin_id": p, "severity": s, "count": c})).collect();
        self.runs.insert(
            (scan_id, run_id),
            json!({
                "info": {"scanner_start": 1_700_000_000, "scanner_end": 1_700_000_900, "targets": "10.0.0.0/24", "hostcount": host_ids.len()},
                "hosts": hosts,
                "vulnerabilities": vulns,
            }),
        );
    }

    pub fn add_host(&mut self, scan_id: ScanId, run_id: RunId, host_id: HostId, vulns: &[(PluginId, i64, i64)], compliance: &[(PluginId, i64)]) {
        let v: Vec<Value> = vulns.iter().map(|(p, s, c)| json!({"plugin_id": p, "severity": s, "count": c})).collect();
        let c: Vec<Value> = compliance.iter().map(|(p, s)| json!({"plugin_id": p, "severity": s, "count": 1})).collect();
        self.hosts.insert(
            (scan_id, host_id, run_id),
            json!({
                "info": {"host-ip": format!("10.0.0.{host_id}"), "host-fqdn": format!("host{host_id}.lan"), "host_start": "Mon Jan  1 10:00:00 2024", "operating-system": "Linux Kernel 5.15"},
                "vulnerabilities": v,
                "compliance": c,
            }),
        );
    }

    pub fn add_finding(&mut self, scan_id: ScanId, run_id: RunId, host_id: HostId, plugin_id: PluginId, mod_date: &str, ports: &[&str]) {
        let ports: serde_json::Map<String, Value> = ports.iter().map(|p| (p.to_string(), json!([{"hostname": "h"}]))).collect();
        self.findings.insert(
            (scan_id, host_id, plugin_id, run_id),
            json!({
                "info": {"plugindescription": plugin_description(plugin_id, mod_date)},
                "outputs": [{"plugin_output": format!("output of {plugin_id}"), "ports": ports}],
            }),
        );
    }

    pub fn add_compliance_output(&mut self, scan_id: ScanId, run_id: RunId, host_id: HostId, plugin_id: PluginId, outputs: &[&str]) {
        let outputs: Vec<Value> = outputs.iter().map(|o| json!({"plugin_output": o})).collect();
        self.compliance.insert(
            (scan_id, host_id, plugin_id, run_id),
            json!({
                "info": {"plugindescription": plugin_description(plugin_id, "2024/01/01")},
                "outputs": outputs,
            }),
        );
    }
}

pub fn plugin_description(plugin_id: PluginId, mod_date: &str) -> Value {
    json!({
        "pluginid": plugin_id.to_string(),
        "severity": 4,
        "pluginname": format!("plugin {plugin_id}"),
        "pluginfamily": "General",
        "pluginattributes": {
            "synopsis": format!("synopsis {mod_date}"),
            "description": "d",
            "solution": "s",
            "risk_information": {"cvss3_base_score": "9.8"},
            "see_also": ["https://example.org/advisory"],
            "plugin_information": {"plugin_publication_date": "2020/01/01", "plugin_modification_date": mod_date}
        }
    })
}

impl ScanSource for FakeSource {
    async fn list_folders(&self) -> Result<Vec<Folder>, SyncError> {
        let list: FolderList = self.call("folders".into(), Some(&json!({"folders": self.folders})))?;
        Ok(list.folders)
    }

    async fn list_scans(&self) -> Result<Vec<Scan>, SyncError> {
        let list: ScanList = self.call("scans".into(), Some(&json!({"folders": self.folders, "scans": self.scans})))?;
        Ok(list.scans)
    }

    async fn get_scan(&self, scan_id: ScanId) -> Result<ScanDetail, SyncError> {
        self.call(format!("scan={scan_id}"), self.scan_details.get(&scan_id))
    }

    async fn get_scan_run(&self, scan_id: ScanId, run_id: RunId) -> Result<RunDetail, SyncError> {
        self.call(format!("scan={scan_id} run={run_id}"), self.runs.get(&(scan_id, run_id)))
    }

    async fn get_host(&self, scan_id: ScanId, host_id: HostId, run_id: RunId) -> Result<HostDetail, SyncError> {
        self.call(format!("scan={scan_id} run={run_id} host={host_id}"), self.hosts.get(&(scan_id, host_id, run_id)))
    }

    async fn get_finding_output(&self, scan_id: ScanId, host_id: HostId, plugin_id: PluginId, run_id: RunId) -> Result<FindingOutput, SyncError> {
        self.call(
            format!("scan={scan_id} run={run_id} host={host_id} plugin={plugin_id}"),
            self.findings.get(&(scan_id, host_id, plugin_id, run_id)),
        )
    }

    async fn get_compliance_output(&self, scan_id: ScanId, host_id: HostId, compliance_id: PluginId, run_id: RunId) -> Result<ComplianceOutput, SyncError> {
        self.call(
            format!("scan={scan_id} run={run_id} host={host_id} compliance={compliance_id}"),
            self.compliance.get(&(scan_id, host_id, compliance_id, run_id)),
        )
    }
}

/// One folder, one scan, one completed run with one host and one critical
/// finding on port 443.
pub fn single_finding_source() -> FakeSource {
    let mut src = FakeSource::default();
    src.add_folder(1, "main");
    src.add_scan(10, 1, &[(100, "completed")]);
    src.add_run(10, 100, &[5], &[(200, 4, 1)]);
    src.add_host(10, 100, 5, &[(200, 4, 1)], &[]);
    src.add_finding(10, 100, 5, 200, "2024/01/01", &["443"]);
    src
}
