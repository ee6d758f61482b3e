//! Transactional writer for one scan run.
//!
//! Everything a run ingestion writes goes through a single [`RunWriter`].
//! Nothing becomes visible until [`RunWriter::commit`]; dropping the writer
//! rolls the whole run back.

use crate::{ComplianceRowId, Db, HostRow, HostVulnId, PluginRow, ScanRunRow, StoreError};
use rusqlite::{params, OptionalExtension, Transaction};
use vault_core::{HostId, PluginId, RunId};

pub struct RunWriter<'a> {
    tx: Transaction<'a>,
}

impl Db {
    /// Open the run transaction. The mutable borrow keeps it the only writer
    /// on this connection until it is committed or dropped.
    pub fn begin_run(&mut self) -> Result<RunWriter<'_>, StoreError> {
        Ok(RunWriter { tx: self.conn.transaction()? })
    }
}

impl RunWriter<'_> {
    pub fn insert_scan_run(&self, run: &ScanRunRow) -> Result<(), StoreError> {
        let s = &run.severity;
        let c = &run.compliance;
        self.tx.execute(
            "INSERT INTO scan_run(scan_run_id,scan_id,scan_start,scan_end,targets,host_count,
                critical_count,high_count,medium_count,low_count,info_count,
                comp_pass_count,comp_warning_count,comp_fail_count)
             VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?)",
            params![
                run.scan_run_id, run.scan_id, run.scan_start, run.scan_end, run.targets, run.host_count,
                s.critical(), s.high(), s.medium(), s.low(), s.info(),
                c.pass(), c.warning(), c.fail(),
            ],
        )?;
        Ok(())
    }

    pub fn insert_host(&self, host: &HostRow) -> Result<(), StoreError> {
        let s = &host.severity;
        let c = &host.compliance;
        self.tx.execute(
            "INSERT INTO host(nessus_host_id,scan_run_id,scan_id,host_ip,host_fqdn,host_start,host_end,os,
                critical_count,high_count,medium_count,low_count,info_count,
                comp_pass_count,comp_warning_count,comp_fail_count)
             VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)",
            params![
                host.nessus_host_id, host.scan_run_id, host.scan_id, host.host_ip, host.host_fqdn,
                host.host_start, host.host_end, host.os,
                s.critical(), s.high(), s.medium(), s.low(), s.info(),
                c.pass(), c.warning(), c.fail(),
            ],
        )?;
        Ok(())
    }

    /// `None` when the plugin is not catalogued yet; `Some(mod_date)` otherwise.
    pub fn find_plugin_mod_date(&self, plugin_id: PluginId) -> Result<Option<Option<String>>, StoreError> {
        let found = self
            .tx
            .query_row("SELECT mod_date FROM plugin WHERE plugin_id=?", [plugin_id], |r| r.get::<_, Option<String>>(0))
            .optional()?;
        Ok(found)
    }

    pub fn insert_plugin(&self, p: &PluginRow) -> Result<(), StoreError> {
        self.tx.execute(
            "INSERT INTO plugin(plugin_id,severity,name,family,synopsis,description,solution,
                cvss_base_score,cvss3_base_score,cvss_vector,cvss3_vector,ref,pub_date,mod_date,policy_value)
             VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?,?,?)",
            params![
                p.plugin_id, p.severity, p.name, p.family, p.synopsis, p.description, p.solution,
                p.cvss_base_score, p.cvss3_base_score, p.cvss_vector, p.cvss3_vector,
                p.reference, p.pub_date, p.mod_date, p.policy_value,
            ],
        )?;
        Ok(())
    }

    /// Overwrite every mutable column of an existing plugin.
    pub fn update_plugin(&self, p: &PluginRow) -> Result<(), StoreError> {
        let changed = self.tx.execute(
            "UPDATE plugin SET severity=?, name=?, family=?, synopsis=?, description=?, solution=?,
                cvss_base_score=?, cvss3_base_score=?, cvss_vector=?, cvss3_vector=?, ref=?,
                pub_date=?, mod_date=?, policy_value=?
             WHERE plugin_id=?",
            params![
                p.severity, p.name, p.family, p.synopsis, p.description, p.solution,
                p.cvss_base_score, p.cvss3_base_score, p.cvss_vector, p.cvss3_vector,
                p.reference, p.pub_date, p.mod_date, p.policy_value, p.plugin_id,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("plugin {}", p.plugin_id)));
        }
        Ok(())
    }

    /// Returns the generated finding id.
    pub fn insert_host_vuln(&self, host_id: HostId, run_id: RunId, plugin_id: PluginId) -> Result<HostVulnId, StoreError> {
        let id = self.tx.query_row(
            "INSERT INTO host_vuln(nessus_host_id,scan_run_id,plugin_id) VALUES (?,?,?) RETURNING id",
            params![host_id, run_id, plugin_id],
            |r| r.get(0),
        )?;
        Ok(id)
    }

    pub fn insert_vuln_output(&self, host_vuln_id: HostVulnId, port: &str, output: Option<&str>) -> Result<(), StoreError> {
        self.tx.execute(
            "INSERT INTO vuln_output(host_vuln_id,port,output) VALUES (?,?,?)",
            params![host_vuln_id, port, output],
        )?;
        Ok(())
    }

    /// Returns the generated compliance row id.
    pub fn insert_compliance(
        &self,
        host_id: HostId,
        run_id: RunId,
        plugin_id: PluginId,
        status: Option<i64>,
    ) -> Result<ComplianceRowId, StoreError> {
        let id = self.tx.query_row(
            "INSERT INTO compliance(nessus_host_id,scan_run_id,plugin_id,status) VALUES (?,?,?,?) RETURNING id",
            params![host_id, run_id, plugin_id, status],
            |r| r.get(0),
        )?;
        Ok(id)
    }

    pub fn insert_compliance_output(&self, compliance_id: ComplianceRowId, output: Option<&str>) -> Result<(), StoreError> {
        self.tx.execute(
            "INSERT INTO compliance_output(compliance_id,output) VALUES (?,?)",
            params![compliance_id, output],
        )?;
        Ok(())
    }

    pub fn commit(self) -> Result<(), StoreError> {
        self.tx.commit()?;
        Ok(())
    }
}
