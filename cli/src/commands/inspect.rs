use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use constraints::CircuitDigest;
use proving::serialize::HEADER_LEN;
use proving::{ArtifactKind, Header};

/// What an artifact file claims to hold, read without decoding points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub header: Header,
    pub file_len: usize,
    /// Leading digest of keys and public witnesses.
    pub circuit: Option<CircuitDigest>,
}

impl fmt::Display for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = &self.header;
        writeln!(f, "kind:     {}", h.kind)?;
        writeln!(f, "curve:    {}", h.curve)?;
        writeln!(f, "encoding: {}", h.encoding)?;
        writeln!(f, "payload:  {} bytes", h.payload_len)?;
        if let Some(digest) = &self.circuit {
            writeln!(f, "circuit:  {digest}")?;
        }
        let expected = HEADER_LEN as u64 + h.payload_len;
        if self.file_len as u64 != expected {
            writeln!(f, "warning:  file is {} bytes, header implies {expected}", self.file_len)?;
        }
        Ok(())
    }
}

pub fn inspect_file(path: &Path) -> Result<Inspection> {
    let bytes = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let header = Header::from_bytes(&bytes).map_err(proving::Error::from)?;

    let payload = &bytes[HEADER_LEN..];
    let circuit = match header.kind {
        ArtifactKind::Proof => None,
        _ => payload
            .get(..32)
            .and_then(|d| <[u8; 32]>::try_from(d).ok())
            .map(CircuitDigest),
    };
    Ok(Inspection {
        header,
        file_len: bytes.len(),
        circuit,
    })
}

pub fn inspect_command(path: &Path) -> Result<()> {
    print!("{}", inspect_file(path)?);
    Ok(())
}
