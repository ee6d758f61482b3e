use crate::{Db, PluginRow, RunOverview, StoreError, TableCounts};
use rusqlite::{params, OptionalExtension};
use vault_core::{PluginId, RunId, SeverityBuckets};

impl Db {
    pub fn table_exists(&self, name: &str) -> Result<bool, StoreError> {
        let cnt: i64 = self.conn.query_row(
            "SELECT COUNT(1) FROM sqlite_master WHERE type='table' AND name=?",
            [name],
            |r| r.get(0),
        )?;
        Ok(cnt > 0)
    }

    /// A stored run id means the run was fully ingested.
    pub fn scan_run_exists(&self, run_id: RunId) -> Result<bool, StoreError> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM scan_run WHERE scan_run_id=?", [run_id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    pub fn table_counts(&self) -> Result<TableCounts, StoreError> {
        let count = |table: &str| -> Result<i64, StoreError> {
            Ok(self.conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
        };
        Ok(TableCounts {
            folder: count("folder")?,
            scan: count("scan")?,
            scan_run: count("scan_run")?,
            host: count("host")?,
            plugin: count("plugin")?,
            host_vuln: count("host_vuln")?,
            vuln_output: count("vuln_output")?,
            compliance: count("compliance")?,
            compliance_output: count("compliance_output")?,
        })
    }

    pub fn get_plugin(&self, plugin_id: PluginId) -> Result<Option<PluginRow>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT plugin_id,severity,name,family,synopsis,description,solution,
                    cvss_base_score,cvss3_base_score,cvss_vector,cvss3_vector,ref,pub_date,mod_date,policy_value
                 FROM plugin WHERE plugin_id=?",
                [plugin_id],
                |r| {
                    Ok(PluginRow {
                        plugin_id: r.get(0)?,
                        severity: r.get(1)?,
                        name: r.get(2)?,
                        family: r.get(3)?,
                        synopsis: r.get(4)?,
                        description: r.get(5)?,
                        solution: r.get(6)?,
                        cvss_base_score: r.get(7)?,
                        cvss3_base_score: r.get(8)?,
                        cvss_vector: r.get(9)?,
                        cvss3_vector: r.get(10)?,
                        reference: r.get(11)?,
                        pub_date: r.get(12)?,
                        mod_date: r.get(13)?,
                        policy_value: r.get(14)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Severity buckets of a run as stored at run level.
    pub fn run_severity(&self, run_id: RunId) -> Result<Option<SeverityBuckets>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT info_count,low_count,medium_count,high_count,critical_count FROM scan_run WHERE scan_run_id=?",
                [run_id],
                |r| Ok(SeverityBuckets([r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?])),
            )
            .optional()?;
        Ok(row)
    }

    /// Per-host severity buckets of a run summed together. Kept separate from
    /// [`Db::run_severity`]; the two are not reconciled.
    pub fn host_severity_totals(&self, run_id: RunId) -> Result<SeverityBuckets, StoreError> {
        let totals = self.conn.query_row(
            "SELECT COALESCE(SUM(info_count),0),COALESCE(SUM(low_count),0),COALESCE(SUM(medium_count),0),
                    COALESCE(SUM(high_count),0),COALESCE(SUM(critical_count),0)
             FROM host WHERE scan_run_id=?",
            [run_id],
            |r| Ok(SeverityBuckets([r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?])),
        )?;
        Ok(totals)
    }

    /// Most recent runs first, by scan start time then run id.
    pub fn latest_runs(&self, limit: usize) -> Result<Vec<RunOverview>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT r.scan_run_id, r.scan_id, s.name, r.scan_start, r.scan_end, r.host_count,
                    r.info_count, r.low_count, r.medium_count, r.high_count, r.critical_count
             FROM scan_run r LEFT JOIN scan s ON s.scan_id = r.scan_id
             ORDER BY r.scan_start DESC, r.scan_run_id DESC
             LIMIT ?",
        )?;
        let rows = stmt.query_map(params![limit as i64], |r| {
            Ok(RunOverview {
                scan_run_id: r.get(0)?,
                scan_id: r.get(1)?,
                scan_name: r.get(2)?,
                scan_start: r.get(3)?,
                scan_end: r.get(4)?,
                host_count: r.get(5)?,
                severity: SeverityBuckets([r.get(6)?, r.get(7)?, r.get(8)?, r.get(9)?, r.get(10)?]),
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
