//! Artifact files on disk.
//!
//! Writes go to a temporary file in the target directory, which is synced
//! and then renamed over the target, so readers never observe a partial
//! artifact.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{DeserializationError, SerializationError};
use crate::serialize::{Artifact, PointEncoding};

/// Save with compressed points.
pub fn save<A: Artifact>(path: impl AsRef<Path>, artifact: &A) -> Result<(), SerializationError> {
    save_with(path, artifact, PointEncoding::Compressed)
}

pub fn save_with<A: Artifact>(
    path: impl AsRef<Path>,
    artifact: &A,
    encoding: PointEncoding,
) -> Result<(), SerializationError> {
    let path = path.as_ref();
    let io_err = |source| SerializationError::Io {
        path: Some(path.to_path_buf()),
        source,
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        artifact.write_with(&mut writer, encoding)?;
        writer.flush().map_err(io_err)?;
    }
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    debug!(path = %path.display(), kind = %A::KIND, %encoding, "artifact saved");
    Ok(())
}

pub fn load<A: Artifact>(path: impl AsRef<Path>) -> Result<A, DeserializationError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| DeserializationError::Io {
        path: Some(path.to_path_buf()),
        source,
    })?;
    let artifact = A::from_bytes(&bytes)?;
    debug!(path = %path.display(), kind = %A::KIND, bytes = bytes.len(), "artifact loaded");
    Ok(artifact)
}
