//! Guild state snapshots using `MessagePack`.
//!
//! The in-memory store is exported to a [`StoreSnapshot`] and written to a
//! file on shutdown; the next start restores it. Rate-limit state is not
//! part of the snapshot.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use switchboard_engine::StoreSnapshot;
use switchboard_foundation::{Error, ErrorKind, Result};

/// Serializes a snapshot to `MessagePack` bytes.
///
/// Uses named serialization so fields can be added later.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_bytes(snapshot: &StoreSnapshot) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(snapshot)
        .map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
}

/// Deserializes a snapshot from `MessagePack` bytes.
///
/// # Errors
///
/// Returns an error if deserialization fails.
pub fn from_bytes(bytes: &[u8]) -> Result<StoreSnapshot> {
    rmp_serde::from_slice(bytes).map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
}

/// Writes a snapshot to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns an error if the file cannot be written or serialization fails.
pub fn save_to_file<P: AsRef<Path>>(snapshot: &StoreSnapshot, path: P) -> Result<()> {
    let path = path.as_ref();
    let io_error = |action: &str, e: std::io::Error| {
        Error::new(ErrorKind::Io(format!(
            "failed to {action} '{}': {e}",
            path.display()
        )))
    };

    let bytes = to_bytes(snapshot)?;
    let file = File::create(path).map_err(|e| io_error("create", e))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes).map_err(|e| io_error("write", e))?;
    writer.flush().map_err(|e| io_error("flush", e))?;
    Ok(())
}

/// Reads a snapshot from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or deserialization fails.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<StoreSnapshot> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to open '{}': {e}",
            path.display()
        )))
    })?;

    let mut bytes = Vec::new();
    BufReader::new(file).read_to_end(&mut bytes).map_err(|e| {
        Error::new(ErrorKind::Io(format!(
            "failed to read '{}': {e}",
            path.display()
        )))
    })?;
    from_bytes(&bytes)
}
