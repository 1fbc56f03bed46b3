//! Binary encoding of keys, proofs and public witnesses.
//!
//! Every artifact starts with a fixed 24-byte header (little-endian):
//!
//! ```text
//! off  size  field
//!   0     4  magic "zkid"
//!   4     2  format version
//!   6     1  artifact kind (1 pk, 2 vk, 3 proof, 4 public witness)
//!   7     1  curve id (1 BN254, 2 BLS12-381)
//!   8     1  point encoding (0 compressed, 1 uncompressed)
//!   9     7  reserved, zero
//!  16     8  payload length
//! ```
//!
//! Keys and public witnesses carry the 32-byte circuit digest ahead of the
//! arkworks canonical encoding. A proof payload is exactly `2·|G1| + |G2|`.
//! Decoding validates every header field, the exact payload length, curve
//! and subgroup membership of every point, and rejects identity points in
//! proofs and verifying keys.

use std::fmt;
use std::io::{Read, Write};

use ark_ec::pairing::Pairing;
use ark_ec::AffineRepr;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize, Compress, Validate};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use constraints::{CircuitDigest, PublicWitness};
use serde::{Deserialize, Serialize};

use crate::curve::{CurveId, CurveScalar, SupportedCurve};
use crate::error::{DeserializationError, SerializationError};
use crate::keys::{Proof, ProvingKey, VerifyingKey};

pub const MAGIC: [u8; 4] = *b"zkid";
pub const FORMAT_VERSION: u16 = 1;
pub const HEADER_LEN: usize = 24;
const DIGEST_LEN: usize = 32;

// ============================================================================
// Header
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    ProvingKey,
    VerifyingKey,
    Proof,
    PublicWitness,
}

impl ArtifactKind {
    pub fn tag(self) -> u8 {
        match self {
            ArtifactKind::ProvingKey => 1,
            ArtifactKind::VerifyingKey => 2,
            ArtifactKind::Proof => 3,
            ArtifactKind::PublicWitness => 4,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(ArtifactKind::ProvingKey),
            2 => Some(ArtifactKind::VerifyingKey),
            3 => Some(ArtifactKind::Proof),
            4 => Some(ArtifactKind::PublicWitness),
            _ => None,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArtifactKind::ProvingKey => "proving key",
            ArtifactKind::VerifyingKey => "verifying key",
            ArtifactKind::Proof => "proof",
            ArtifactKind::PublicWitness => "public witness",
        })
    }
}

/// How curve points are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointEncoding {
    #[default]
    Compressed,
    Uncompressed,
}

impl PointEncoding {
    pub fn tag(self) -> u8 {
        match self {
            PointEncoding::Compressed => 0,
            PointEncoding::Uncompressed => 1,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(PointEncoding::Compressed),
            1 => Some(PointEncoding::Uncompressed),
            _ => None,
        }
    }

    fn compress(self) -> Compress {
        match self {
            PointEncoding::Compressed => Compress::Yes,
            PointEncoding::Uncompressed => Compress::No,
        }
    }
}

impl fmt::Display for PointEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PointEncoding::Compressed => "compressed",
            PointEncoding::Uncompressed => "uncompressed",
        })
    }
}

/// Decoded artifact header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub kind: ArtifactKind,
    pub curve: CurveId,
    pub encoding: PointEncoding,
    pub payload_len: u64,
}

impl Header {
    pub fn write<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_all(&MAGIC)?;
        w.write_u16::<LittleEndian>(FORMAT_VERSION)?;
        w.write_u8(self.kind.tag())?;
        w.write_u8(self.curve.tag())?;
        w.write_u8(self.encoding.tag())?;
        w.write_all(&[0u8; 7])?;
        w.write_u64::<LittleEndian>(self.payload_len)?;
        Ok(())
    }

    /// Read and validate a header. The kind and curve are checked against
    /// the expected type by [`Artifact::read_from`].
    pub fn read<R: Read>(r: &mut R) -> Result<Self, DeserializationError> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(DeserializationError::BadMagic(magic));
        }
        let version = r.read_u16::<LittleEndian>()?;
        if version != FORMAT_VERSION {
            return Err(DeserializationError::UnsupportedVersion(version));
        }
        let kind = r.read_u8()?;
        let kind = ArtifactKind::from_tag(kind).ok_or(DeserializationError::UnknownKind(kind))?;
        let curve = r.read_u8()?;
        let curve = CurveId::from_tag(curve).ok_or(DeserializationError::UnknownCurve(curve))?;
        let encoding = r.read_u8()?;
        let encoding =
            PointEncoding::from_tag(encoding).ok_or(DeserializationError::UnknownEncoding(encoding))?;
        let mut reserved = [0u8; 7];
        r.read_exact(&mut reserved)?;
        if reserved != [0u8; 7] {
            return Err(DeserializationError::ReservedBytes);
        }
        let payload_len = r.read_u64::<LittleEndian>()?;
        Ok(Self {
            kind,
            curve,
            encoding,
            payload_len,
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DeserializationError> {
        let mut cursor = bytes;
        Self::read(&mut cursor)
    }
}

// ============================================================================
// Artifact trait
// ============================================================================

/// A value with a headered binary encoding.
pub trait Artifact: Sized {
    const KIND: ArtifactKind;

    fn curve() -> CurveId;

    /// Exact payload size when it depends only on the encoding.
    fn fixed_payload_len(_encoding: PointEncoding) -> Option<usize> {
        None
    }

    fn payload_len(&self, encoding: PointEncoding) -> usize;

    fn write_payload<W: Write>(&self, w: &mut W, encoding: PointEncoding) -> Result<(), SerializationError>;

    /// Decode a complete payload; every byte must be consumed.
    fn read_payload(payload: &[u8], encoding: PointEncoding) -> Result<Self, DeserializationError>;

    fn write_with<W: Write>(&self, w: &mut W, encoding: PointEncoding) -> Result<(), SerializationError> {
        Header {
            kind: Self::KIND,
            curve: Self::curve(),
            encoding,
            payload_len: self.payload_len(encoding) as u64,
        }
        .write(w)?;
        self.write_payload(w, encoding)
    }

    /// Write with compressed points.
    fn write_to<W: Write>(&self, w: &mut W) -> Result<(), SerializationError> {
        self.write_with(w, PointEncoding::Compressed)
    }

    /// Write with uncompressed points: larger, faster to load.
    fn write_raw_to<W: Write>(&self, w: &mut W) -> Result<(), SerializationError> {
        self.write_with(w, PointEncoding::Uncompressed)
    }

    fn to_bytes_with(&self, encoding: PointEncoding) -> Result<Vec<u8>, SerializationError> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.payload_len(encoding));
        self.write_with(&mut out, encoding)?;
        Ok(out)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, SerializationError> {
        self.to_bytes_with(PointEncoding::Compressed)
    }

    /// Read one artifact from a stream, leaving any following bytes unread.
    fn read_from<R: Read>(r: &mut R) -> Result<Self, DeserializationError> {
        let header = Header::read(r)?;
        if header.kind != Self::KIND {
            return Err(DeserializationError::WrongKind {
                expected: Self::KIND,
                found: header.kind,
            });
        }
        if header.curve != Self::curve() {
            return Err(DeserializationError::CurveMismatch {
                expected: Self::curve(),
                found: header.curve,
            });
        }
        if let Some(expected) = Self::fixed_payload_len(header.encoding) {
            if header.payload_len != expected as u64 {
                return Err(DeserializationError::PayloadLength {
                    expected: expected as u64,
                    actual: header.payload_len,
                });
            }
        }

        let mut payload = Vec::new();
        r.by_ref().take(header.payload_len).read_to_end(&mut payload)?;
        if (payload.len() as u64) < header.payload_len {
            return Err(DeserializationError::Truncated);
        }
        Self::read_payload(&payload, header.encoding)
    }

    /// Decode exactly one artifact; trailing bytes are an error.
    fn from_bytes(bytes: &[u8]) -> Result<Self, DeserializationError> {
        let mut cursor = bytes;
        let artifact = Self::read_from(&mut cursor)?;
        if !cursor.is_empty() {
            return Err(DeserializationError::TrailingBytes(cursor.len()));
        }
        Ok(artifact)
    }
}

/// Decode an arkworks value that must fill `bytes` exactly.
fn decode_exact<T: CanonicalDeserialize>(bytes: &[u8], encoding: PointEncoding) -> Result<T, DeserializationError> {
    let mut cursor = bytes;
    let value = T::deserialize_with_mode(&mut cursor, encoding.compress(), Validate::Yes)?;
    if !cursor.is_empty() {
        return Err(DeserializationError::TrailingBytes(cursor.len()));
    }
    Ok(value)
}

/// Walks the length prefixes of a payload before arkworks decodes it.
///
/// arkworks sizes a `Vec` from its prefix up front, so every prefix must be
/// bounded by the bytes actually present.
struct PrefixScan<'a> {
    rest: &'a [u8],
}

impl<'a> PrefixScan<'a> {
    fn new(payload: &'a [u8]) -> Self {
        Self { rest: payload }
    }

    fn fixed(&mut self, len: usize) -> Result<(), DeserializationError> {
        if self.rest.len() < len {
            return Err(DeserializationError::Truncated);
        }
        self.rest = &self.rest[len..];
        Ok(())
    }

    fn vec(&mut self, elem_len: usize) -> Result<(), DeserializationError> {
        let count = self.rest.read_u64::<LittleEndian>()?;
        let len = usize::try_from(count)
            .ok()
            .and_then(|n| n.checked_mul(elem_len))
            .ok_or(DeserializationError::Truncated)?;
        self.fixed(len)
    }

    fn verifying_key<E: Pairing>(&mut self, encoding: PointEncoding) -> Result<(), DeserializationError> {
        let g1 = point_len::<E::G1Affine>(encoding);
        let g2 = point_len::<E::G2Affine>(encoding);
        // alpha_g1, beta_g2, gamma_g2, delta_g2, then gamma_abc_g1
        self.fixed(g1 + 3 * g2)?;
        self.vec(g1)
    }

    fn proving_key<E: Pairing>(&mut self, encoding: PointEncoding) -> Result<(), DeserializationError> {
        let g1 = point_len::<E::G1Affine>(encoding);
        let g2 = point_len::<E::G2Affine>(encoding);
        self.verifying_key::<E>(encoding)?;
        // beta_g1, delta_g1
        self.fixed(2 * g1)?;
        // a, b_g1, b_g2, h and l queries
        for elem_len in [g1, g1, g2, g1, g1] {
            self.vec(elem_len)?;
        }
        Ok(())
    }
}

fn split_digest(payload: &[u8]) -> Result<(CircuitDigest, &[u8]), DeserializationError> {
    if payload.len() < DIGEST_LEN {
        return Err(DeserializationError::Truncated);
    }
    let (digest, rest) = payload.split_at(DIGEST_LEN);
    let mut bytes = [0u8; DIGEST_LEN];
    bytes.copy_from_slice(digest);
    Ok((CircuitDigest(bytes), rest))
}

fn point_len<G: AffineRepr>(encoding: PointEncoding) -> usize {
    G::generator().serialized_size(encoding.compress())
}

// ============================================================================
// Implementations
// ============================================================================

impl<E: SupportedCurve> Artifact for ProvingKey<E> {
    const KIND: ArtifactKind = ArtifactKind::ProvingKey;

    fn curve() -> CurveId {
        E::ID
    }

    fn payload_len(&self, encoding: PointEncoding) -> usize {
        DIGEST_LEN + self.inner.serialized_size(encoding.compress())
    }

    fn write_payload<W: Write>(&self, w: &mut W, encoding: PointEncoding) -> Result<(), SerializationError> {
        w.write_all(self.digest.as_bytes())?;
        self.inner.serialize_with_mode(w, encoding.compress())?;
        Ok(())
    }

    fn read_payload(payload: &[u8], encoding: PointEncoding) -> Result<Self, DeserializationError> {
        let (digest, rest) = split_digest(payload)?;
        PrefixScan::new(rest).proving_key::<E>(encoding)?;
        let inner: ark_groth16::ProvingKey<E> = decode_exact(rest, encoding)?;
        let key = ProvingKey { inner, digest };
        if let Some(point) = key.verifying_key().identity_point() {
            return Err(DeserializationError::IdentityPoint(point));
        }
        if key.inner.delta_g1.is_zero() {
            return Err(DeserializationError::IdentityPoint("delta_g1"));
        }
        Ok(key)
    }
}

impl<E: SupportedCurve> Artifact for VerifyingKey<E> {
    const KIND: ArtifactKind = ArtifactKind::VerifyingKey;

    fn curve() -> CurveId {
        E::ID
    }

    fn payload_len(&self, encoding: PointEncoding) -> usize {
        DIGEST_LEN + self.inner.serialized_size(encoding.compress())
    }

    fn write_payload<W: Write>(&self, w: &mut W, encoding: PointEncoding) -> Result<(), SerializationError> {
        w.write_all(self.digest.as_bytes())?;
        self.inner.serialize_with_mode(w, encoding.compress())?;
        Ok(())
    }

    fn read_payload(payload: &[u8], encoding: PointEncoding) -> Result<Self, DeserializationError> {
        let (digest, rest) = split_digest(payload)?;
        PrefixScan::new(rest).verifying_key::<E>(encoding)?;
        let key = VerifyingKey {
            inner: decode_exact(rest, encoding)?,
            digest,
        };
        if let Some(point) = key.identity_point() {
            return Err(DeserializationError::IdentityPoint(point));
        }
        Ok(key)
    }
}

impl<E: SupportedCurve> Artifact for Proof<E> {
    const KIND: ArtifactKind = ArtifactKind::Proof;

    fn curve() -> CurveId {
        E::ID
    }

    fn fixed_payload_len(encoding: PointEncoding) -> Option<usize> {
        let g1 = point_len::<<E as Pairing>::G1Affine>(encoding);
        let g2 = point_len::<<E as Pairing>::G2Affine>(encoding);
        Some(2 * g1 + g2)
    }

    fn payload_len(&self, encoding: PointEncoding) -> usize {
        self.inner.serialized_size(encoding.compress())
    }

    fn write_payload<W: Write>(&self, w: &mut W, encoding: PointEncoding) -> Result<(), SerializationError> {
        self.inner.serialize_with_mode(w, encoding.compress())?;
        Ok(())
    }

    fn read_payload(payload: &[u8], encoding: PointEncoding) -> Result<Self, DeserializationError> {
        let proof = Proof {
            inner: decode_exact(payload, encoding)?,
        };
        if let Some(point) = proof.identity_point() {
            return Err(DeserializationError::IdentityPoint(point));
        }
        Ok(proof)
    }
}

impl<F: CurveScalar> Artifact for PublicWitness<F> {
    const KIND: ArtifactKind = ArtifactKind::PublicWitness;

    fn curve() -> CurveId {
        F::CURVE
    }

    fn payload_len(&self, encoding: PointEncoding) -> usize {
        DIGEST_LEN + self.values().serialized_size(encoding.compress())
    }

    fn write_payload<W: Write>(&self, w: &mut W, encoding: PointEncoding) -> Result<(), SerializationError> {
        w.write_all(self.circuit_digest().as_bytes())?;
        self.values().serialize_with_mode(w, encoding.compress())?;
        Ok(())
    }

    fn read_payload(payload: &[u8], encoding: PointEncoding) -> Result<Self, DeserializationError> {
        let (digest, rest) = split_digest(payload)?;
        PrefixScan::new(rest).vec(F::ZERO.serialized_size(encoding.compress()))?;
        let values: Vec<F> = decode_exact(rest, encoding)?;
        Ok(PublicWitness::new(digest, values))
    }
}
