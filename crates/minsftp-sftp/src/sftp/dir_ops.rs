// ── Directory operations ─────────────────────────────────────────────────────

use crate::sftp::error::{SftpError, SftpResult};
use crate::sftp::service::SftpClient;
use crate::sftp::transport::{RemoteDir, RemoteFs, Transport};
use crate::sftp::types::DirEntry;
use log::{debug, info, warn};

/// Paths are joined verbatim, with no normalisation of either side.
fn child_path(parent: &str, name: &str) -> String {
    format!("{}/{}", parent, name)
}

impl<T: Transport> SftpClient<T> {
    // ── List directory ───────────────────────────────────────────────────────

    /// Entries in the order the server sends them, without `.` and `..`.
    /// A directory that cannot be opened lists as empty.
    pub fn list_directory(&mut self, path: &str) -> SftpResult<Vec<DirEntry>> {
        let fs = self.fs()?;
        let mut dir = match fs.open_dir(path) {
            Ok(dir) => dir,
            Err(e) => {
                warn!("SFTP opendir '{}' failed: {}", path, e);
                return Ok(Vec::new());
            }
        };

        let mut entries = Vec::new();
        loop {
            match dir.read_entry() {
                Ok(Some(name)) if DirEntry::is_dot(&name) => {}
                Ok(Some(name)) => entries.push(DirEntry::new(name)),
                Ok(None) => break,
                Err(e) => {
                    warn!("SFTP readdir '{}' stopped after {} entries: {}", path, entries.len(), e);
                    break;
                }
            }
        }
        drop(dir);

        self.record(0, 0);
        Ok(entries)
    }

    // ── mkdir ────────────────────────────────────────────────────────────────

    pub fn create_dir(&mut self, path: &str) -> SftpResult<()> {
        let mode = self.config.dir_mode;
        let fs = self.fs()?;
        fs.mkdir(path, mode).map_err(|e| {
            warn!("SFTP mkdir '{}' failed: {}", path, e);
            SftpError::mkdir_failed(path, e)
        })?;
        self.record(0, 0);
        info!("SFTP mkdir: {} ({:o})", path, mode);
        Ok(())
    }

    // ── Delete directory tree recursively ────────────────────────────────────

    /// Remove `path` and everything below it. Stops at the first failure and
    /// leaves whatever was not yet removed in place. Returns the number of
    /// entries removed, `path` included.
    ///
    /// Entries are classified by stat'ing an opened handle, which follows
    /// symlinks: a link to a directory has its target's contents removed,
    /// then the `rmdir` of the link itself fails with `DeleteFailed`.
    pub fn delete_dir(&mut self, path: &str) -> SftpResult<u64> {
        let count = self.delete_tree(path)?;
        info!("SFTP recursive delete: {} ({} items)", path, count);
        Ok(count)
    }

    fn delete_tree(&mut self, path: &str) -> SftpResult<u64> {
        let mut count = 0u64;
        for entry in self.list_directory(path)? {
            let child = child_path(path, &entry.name);
            if self.is_directory(&child)? {
                count += self.delete_tree(&child)?;
            } else {
                self.delete_file(&child)?;
                count += 1;
            }
        }

        let fs = self.fs()?;
        fs.rmdir(path).map_err(|e| {
            warn!("SFTP rmdir '{}' failed: {}", path, e);
            SftpError::delete_failed(path, e)
        })?;
        self.record(0, 0);
        debug!("SFTP removed directory {}", path);
        Ok(count + 1)
    }

    // ── Copy directory tree recursively ──────────────────────────────────────

    /// Copy the tree at `old_path` to `new_path`, merging into an existing
    /// destination directory. Stops at the first failure without rolling back.
    /// Returns the number of files copied.
    pub fn copy_dir(&mut self, old_path: &str, new_path: &str) -> SftpResult<u64> {
        let count = self.copy_tree(old_path, new_path)?;
        info!("SFTP recursive copy: {} → {} ({} files)", old_path, new_path, count);
        Ok(count)
    }

    fn copy_tree(&mut self, old_path: &str, new_path: &str) -> SftpResult<u64> {
        self.ensure_dir(new_path)?;

        let mut count = 0u64;
        for entry in self.list_directory(old_path)? {
            let src = child_path(old_path, &entry.name);
            let dst = child_path(new_path, &entry.name);
            if self.is_directory(&src)? {
                count += self.copy_tree(&src, &dst)?;
            } else {
                self.copy_file(&src, &dst)?;
                count += 1;
            }
        }
        Ok(count)
    }

    /// mkdir that treats an existing directory as success.
    fn ensure_dir(&mut self, path: &str) -> SftpResult<()> {
        let mode = self.config.dir_mode;
        let fs = self.fs()?;
        match fs.mkdir(path, mode) {
            Ok(()) => {}
            Err(e) if e.is_already_exists() => {
                debug!("SFTP {} already exists, merging", path);
            }
            // SFTPv3 servers report EEXIST as a generic failure.
            Err(e) => match fs.open_dir(path) {
                Ok(_dir) => debug!("SFTP {} already exists, merging", path),
                Err(_) => {
                    warn!("SFTP mkdir '{}' failed: {}", path, e);
                    return Err(SftpError::mkdir_failed(path, e));
                }
            },
        }
        self.record(0, 0);
        Ok(())
    }
}
