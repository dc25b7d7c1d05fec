use crate::sftp::error::{SftpError, SftpResult};
use crate::sftp::service::SftpClient;
use crate::sftp::transport::{RemoteFile, RemoteFs, Transport};
use log::{debug, info, warn};
use std::io::{Read, Write};

/// Append a single `0` unless the buffer already ends in one.
pub fn null_terminate(data: &mut Vec<u8>) {
    if data.last() != Some(&0) {
        data.push(0);
    }
}

impl<T: Transport> SftpClient<T> {
    // ── Whole-file read ──────────────────────────────────────────────────────

    /// Read a remote file into memory in `buffer_size` chunks.
    pub fn read_bytes(&mut self, path: &str, terminate: bool) -> SftpResult<Vec<u8>> {
        let chunk_size = self.config.buffer_size.max(1);
        let fs = self.fs()?;
        let mut file = fs.open_read(path).map_err(|e| {
            warn!("SFTP open '{}' for read failed: {}", path, e);
            SftpError::open_failed(path, e)
        })?;

        let mut data = Vec::new();
        let mut chunk = vec![0u8; chunk_size];
        loop {
            match file.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => data.extend_from_slice(&chunk[..n]),
                Err(e) => {
                    warn!("SFTP read '{}' failed after {} bytes: {}", path, data.len(), e);
                    return Err(SftpError::read_failed(path, e));
                }
            }
        }
        drop(file);

        let total = data.len() as u64;
        if terminate {
            null_terminate(&mut data);
        }
        self.record(total, 0);
        debug!("SFTP read {} bytes from {}", total, path);
        Ok(data)
    }

    // ── Whole-file write ─────────────────────────────────────────────────────

    /// Create or truncate a remote file and write `data` in `buffer_size`
    /// chunks, advancing by whatever the remote reports as written.
    pub fn write_bytes(&mut self, path: &str, data: &[u8]) -> SftpResult<()> {
        let chunk_size = self.config.buffer_size.max(1);
        let mode = self.config.file_mode;
        let fs = self.fs()?;
        let mut file = fs.open_write(path, mode).map_err(|e| {
            warn!("SFTP open '{}' for write failed: {}", path, e);
            SftpError::open_failed(path, e)
        })?;

        let mut offset = 0usize;
        while offset < data.len() {
            let end = data.len().min(offset + chunk_size);
            match file.write(&data[offset..end]) {
                Ok(0) => {
                    warn!("SFTP write '{}' stalled at offset {}", path, offset);
                    return Err(SftpError::write_failed(path, "remote accepted zero bytes"));
                }
                Ok(n) => offset += n,
                Err(e) => {
                    warn!("SFTP write '{}' failed at offset {}: {}", path, offset, e);
                    return Err(SftpError::write_failed(path, e));
                }
            }
        }
        drop(file);

        self.record(0, data.len() as u64);
        debug!("SFTP wrote {} bytes to {}", data.len(), path);
        Ok(())
    }

    // ── rename ───────────────────────────────────────────────────────────────

    pub fn rename(&mut self, old_path: &str, new_path: &str) -> SftpResult<()> {
        let fs = self.fs()?;
        fs.rename(old_path, new_path).map_err(|e| {
            warn!("SFTP rename '{}' → '{}' failed: {}", old_path, new_path, e);
            SftpError::move_failed(old_path, new_path, e)
        })?;
        self.record(0, 0);
        info!("SFTP rename: {} → {}", old_path, new_path);
        Ok(())
    }

    // ── unlink (delete file) ─────────────────────────────────────────────────

    pub fn delete_file(&mut self, path: &str) -> SftpResult<()> {
        let fs = self.fs()?;
        fs.unlink(path).map_err(|e| {
            warn!("SFTP delete '{}' failed: {}", path, e);
            SftpError::delete_failed(path, e)
        })?;
        self.record(0, 0);
        info!("SFTP deleted file: {}", path);
        Ok(())
    }

    // ── Copy (read fully, then write) ────────────────────────────────────────

    /// The whole file is held in memory between the read and the write.
    pub fn copy_file(&mut self, old_path: &str, new_path: &str) -> SftpResult<()> {
        let data = self.read_bytes(old_path, false)?;
        self.write_bytes(new_path, &data)?;
        debug!("SFTP copied {} → {} ({} bytes)", old_path, new_path, data.len());
        Ok(())
    }

    // ── Directory test ───────────────────────────────────────────────────────

    /// `Ok(false)` when the path cannot be opened or stat'd at all.
    pub fn is_directory(&mut self, path: &str) -> SftpResult<bool> {
        let fs = self.fs()?;
        let verdict = match fs.open_read(path) {
            Ok(mut file) => match file.attributes() {
                Ok(attrs) => attrs.is_dir(),
                Err(e) => {
                    debug!("SFTP fstat '{}' failed: {}", path, e);
                    false
                }
            },
            // Servers that refuse read-opens on directories still allow opendir.
            Err(e) => match fs.open_dir(path) {
                Ok(_dir) => true,
                Err(_) => {
                    debug!("SFTP cannot classify '{}': {}", path, e);
                    false
                }
            },
        };
        self.record(0, 0);
        Ok(verdict)
    }

    // ── Checksum (SHA-256) ───────────────────────────────────────────────────

    pub fn checksum(&mut self, path: &str) -> SftpResult<String> {
        use sha2::{Digest, Sha256};

        let chunk_size = self.config.buffer_size.max(1);
        let fs = self.fs()?;
        let mut file = fs
            .open_read(path)
            .map_err(|e| SftpError::open_failed(path, e))?;

        let mut hasher = Sha256::new();
        let mut total = 0u64;
        let mut chunk = vec![0u8; chunk_size];
        loop {
            let n = file
                .read(&mut chunk)
                .map_err(|e| SftpError::read_failed(path, e))?;
            if n == 0 {
                break;
            }
            hasher.update(&chunk[..n]);
            total += n as u64;
        }
        drop(file);

        self.record(total, 0);
        Ok(hex::encode(hasher.finalize()))
    }
}
