use std::collections::HashSet;

use store_sqlite::{PluginRow, RunWriter};
use tracing::debug;
use vault_core::{PluginDescription, PluginId, SyncError};

/// What a catalog sync did to the stored plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginSync {
    Inserted,
    Updated,
    Unchanged,
}

pub fn plugin_row(desc: &PluginDescription) -> PluginRow {
    let attrs = &desc.attributes;
    let risk = &attrs.risk_information;
    PluginRow {
        plugin_id: desc.plugin_id,
        severity: desc.severity,
        name: desc.name.clone(),
        family: desc.family().map(str::to_string),
        synopsis: attrs.synopsis.clone(),
        description: attrs.description.clone(),
        solution: attrs.solution.clone(),
        cvss_base_score: risk.cvss_base_score.clone(),
        cvss3_base_score: risk.cvss3_base_score.clone(),
        cvss_vector: risk.cvss_vector.clone(),
        cvss3_vector: risk.cvss3_vector.clone(),
        reference: desc.references(),
        pub_date: attrs.plugin_information.plugin_publication_date.clone(),
        mod_date: desc.modification_date().map(str::to_string),
        policy_value: attrs.policy_value.clone(),
    }
}

/// Keeps the plugin table current for one run transaction.
///
/// Plugins are shared by every host and run, so most lookups find the stored
/// row already at the incoming modification date. Ids synced earlier in the
/// same run are not looked up again.
#[derive(Debug, Default)]
pub struct PluginCatalog {
    seen: HashSet<PluginId>,
    pub inserted: usize,
    pub updated: usize,
}

impl PluginCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the plugin if unknown, overwrite it if the stored modification
    /// date differs, otherwise leave the row untouched.
    pub fn sync(&mut self, tx: &RunWriter<'_>, desc: &PluginDescription) -> Result<PluginSync, SyncError> {
        if self.seen.contains(&desc.plugin_id) {
            return Ok(PluginSync::Unchanged);
        }
        let incoming = desc.modification_date();
        let outcome = match tx.find_plugin_mod_date(desc.plugin_id)? {
            None => {
                tx.insert_plugin(&plugin_row(desc))?;
                self.inserted += 1;
                PluginSync::Inserted
            }
            Some(stored) if stored.as_deref() == incoming => PluginSync::Unchanged,
            Some(stored) => {
                debug!(plugin_id = desc.plugin_id, from = ?stored, to = ?incoming, "plugin definition changed");
                tx.update_plugin(&plugin_row(desc))?;
                self.updated += 1;
                PluginSync::Updated
            }
        };
        self.seen.insert(desc.plugin_id);
        Ok(outcome)
    }
}
