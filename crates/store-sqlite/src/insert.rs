use crate::{Db, FolderRow, ScanRow, StoreError};
use rusqlite::params;

impl Db {
    /// Insert-or-update folders by natural id in one short transaction.
    pub fn upsert_folders(&mut self, folders: &[FolderRow]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        for f in folders {
            tx.execute(
                "INSERT INTO folder(folder_id,type,name) VALUES (?,?,?)
                 ON CONFLICT(folder_id) DO UPDATE SET type=excluded.type, name=excluded.name",
                params![f.folder_id, f.kind, f.name],
            )?;
        }
        tx.commit()?;
        Ok(folders.len())
    }

    /// Insert-or-update scans by natural id in one short transaction.
    pub fn upsert_scans(&mut self, scans: &[ScanRow]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        for s in scans {
            tx.execute(
                "INSERT INTO scan(scan_id,folder_id,type,name) VALUES (?,?,?,?)
                 ON CONFLICT(scan_id) DO UPDATE SET folder_id=excluded.folder_id, type=excluded.type, name=excluded.name",
                params![s.scan_id, s.folder_id, s.kind, s.name],
            )?;
        }
        tx.commit()?;
        Ok(scans.len())
    }
}
