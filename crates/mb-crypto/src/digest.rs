//! Attestation digests.
//!
//! A digest deterministically binds every field of a snapshot payload
//! together with the deployment context, so a signature over it cannot be
//! replayed against another deployment, another ledger instance, or a
//! modified payload. Variable-length fields are hashed individually before
//! inclusion; numeric fields enter as fixed-width little-endian bytes.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use mb_types::{AccountId, SnapshotPayload, TypeError};

/// Deployment context bound into every attestation digest.
///
/// [`SYSTEM_NAME`](Self::SYSTEM_NAME) and
/// [`PROTOCOL_VERSION`](Self::PROTOCOL_VERSION) are fixed; `realm` names the
/// deployment (e.g. `"prod-cn-north"`) and `ledger` is the identity the
/// verifying ledger instance answers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttestationDomain {
    realm: String,
    ledger: AccountId,
}

impl AttestationDomain {
    /// Protocol name bound into every digest.
    pub const SYSTEM_NAME: &'static str = "meterbook";
    /// Protocol version bound into every digest.
    pub const PROTOCOL_VERSION: &'static str = "1";

    pub fn new(realm: impl Into<String>, ledger: AccountId) -> Self {
        Self {
            realm: realm.into(),
            ledger,
        }
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn ledger(&self) -> &AccountId {
        &self.ledger
    }

    /// Hash of the deployment context alone.
    pub fn domain_digest(&self) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"mb-domain-v1:");
        hasher.update(blake3::hash(Self::SYSTEM_NAME.as_bytes()).as_bytes());
        hasher.update(blake3::hash(Self::PROTOCOL_VERSION.as_bytes()).as_bytes());
        hasher.update(blake3::hash(self.realm.as_bytes()).as_bytes());
        hasher.update(self.ledger.as_bytes());
        *hasher.finalize().as_bytes()
    }

    /// Digest a snapshot payload under this domain.
    ///
    /// Pure and stateless; the same payload and domain always produce the
    /// same digest, and any change to either produces a different one.
    pub fn snapshot_digest(&self, payload: &SnapshotPayload) -> SnapshotDigest {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"mb-snapshot-attest-v1:");
        hasher.update(&self.domain_digest());
        hasher.update(blake3::hash(payload.station.as_str().as_bytes()).as_bytes());
        hasher.update(blake3::hash(payload.date.as_str().as_bytes()).as_bytes());
        hasher.update(&payload.generated.tenths().to_le_bytes());
        hasher.update(&payload.grid_delivered.tenths().to_le_bytes());
        hasher.update(&payload.self_consumed.tenths().to_le_bytes());
        hasher.update(&payload.sample_count.to_le_bytes());
        hasher.update(payload.evidence_hash.as_bytes());
        SnapshotDigest(*hasher.finalize().as_bytes())
    }
}

/// The 32-byte digest a data team signs.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnapshotDigest([u8; 32]);

impl SnapshotDigest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short form (first 8 hex characters) for logs.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    pub fn from_raw(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for SnapshotDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SnapshotDigest({})", self.short_hex())
    }
}

impl fmt::Display for SnapshotDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for SnapshotDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SnapshotDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
