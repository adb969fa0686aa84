//! Ed25519 signing and signer recovery.
//!
//! An attestation carries the signer's public key next to the signature.
//! Recovery verifies the signature against the digest first and only then
//! derives the account identity from the key, so a tampered payload or a
//! wrong key never yields the original signer.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use mb_types::AccountId;

use crate::digest::SnapshotDigest;

/// Ed25519 signing key (private). Held by data teams, never by the ledger.
pub struct SigningKey(ed25519_dalek::SigningKey);

/// Ed25519 verifying key (public).
#[derive(Clone, PartialEq, Eq)]
pub struct VerifyingKey(ed25519_dalek::VerifyingKey);

/// Ed25519 signature over a snapshot digest.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(ed25519_dalek::Signature);

impl SigningKey {
    /// Generate a new random signing key.
    pub fn generate() -> Self {
        let mut csprng = rand::thread_rng();
        Self(ed25519_dalek::SigningKey::generate(&mut csprng))
    }

    /// Create from raw 32-byte secret.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(&bytes))
    }

    /// Parse from a hex-encoded 32-byte secret.
    pub fn from_hex(s: &str) -> Result<Self, AttestError> {
        let bytes = hex::decode(s).map_err(|_| AttestError::MalformedKey)?;
        let arr: [u8; 32] = bytes.try_into().map_err(|_| AttestError::MalformedKey)?;
        Ok(Self::from_bytes(arr))
    }

    /// The corresponding public verifying key.
    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(self.0.verifying_key())
    }

    /// The account identity this key signs as.
    pub fn account_id(&self) -> AccountId {
        self.verifying_key().account_id()
    }

    /// Sign a snapshot digest, producing a complete attestation.
    pub fn attest(&self, digest: &SnapshotDigest) -> Attestation {
        use ed25519_dalek::Signer;
        Attestation {
            signer: self.verifying_key(),
            signature: Signature(self.0.sign(digest.as_bytes())),
        }
    }

    /// Raw secret key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

impl VerifyingKey {
    /// Verify a signature over a digest.
    pub fn verify(
        &self,
        digest: &SnapshotDigest,
        signature: &Signature,
    ) -> Result<(), AttestError> {
        use ed25519_dalek::Verifier;
        self.0
            .verify(digest.as_bytes(), &signature.0)
            .map_err(|_| AttestError::BadSignature)
    }

    /// Derive the account identity bound to this key.
    pub fn account_id(&self) -> AccountId {
        AccountId::from_public_key(&self.0.to_bytes())
    }

    /// Raw public key bytes.
    pub fn as_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Create from raw 32-byte public key.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, AttestError> {
        let key = ed25519_dalek::VerifyingKey::from_bytes(&bytes)
            .map_err(|_| AttestError::MalformedKey)?;
        Ok(Self(key))
    }

    /// Parse from a hex-encoded 32-byte public key.
    pub fn from_hex(s: &str) -> Result<Self, AttestError> {
        let bytes = hex::decode(s).map_err(|_| AttestError::MalformedKey)?;
        let arr: [u8; 32] = bytes.try_into().map_err(|_| AttestError::MalformedKey)?;
        Self::from_bytes(arr)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_bytes())
    }
}

impl Signature {
    /// Raw 64-byte signature.
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_bytes()
    }

    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(ed25519_dalek::Signature::from_bytes(&bytes))
    }

    /// Parse from a hex-encoded 64-byte signature.
    pub fn from_hex(s: &str) -> Result<Self, AttestError> {
        let bytes = hex::decode(s).map_err(|_| AttestError::MalformedSignature)?;
        let arr: [u8; 64] = bytes
            .try_into()
            .map_err(|_| AttestError::MalformedSignature)?;
        Ok(Self::from_bytes(arr))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_bytes())
    }
}

/// A signed endorsement of one snapshot digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    /// Public key of the endorsing data team.
    pub signer: VerifyingKey,
    /// Signature over the digest.
    pub signature: Signature,
}

/// Recover the signer identity from an attestation, or fail.
///
/// Fails if the signature does not verify against the digest or the
/// derived identity is the null identity. No side effects; callable
/// independent of any ledger state.
pub fn recover_signer(
    digest: &SnapshotDigest,
    attestation: &Attestation,
) -> Result<AccountId, AttestError> {
    attestation
        .signer
        .verify(digest, &attestation.signature)?;
    let account = attestation.signer.account_id();
    if account.is_null() {
        return Err(AttestError::NullIdentity);
    }
    Ok(account)
}

/// Errors from attestation handling.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AttestError {
    #[error("malformed public key")]
    MalformedKey,
    #[error("malformed signature")]
    MalformedSignature,
    #[error("signature does not verify against the digest")]
    BadSignature,
    #[error("recovered identity is the null identity")]
    NullIdentity,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey(<redacted>)")
    }
}

impl std::fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VerifyingKey({})", self.to_hex())
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({}...)", hex::encode(&self.0.to_bytes()[..8]))
    }
}

impl Serialize for VerifyingKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for VerifyingKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::AttestationDomain;
    use mb_types::{
        ContentHash, DateKey, EnergyTenths, SnapshotPayload, StationId, EXPECTED_SAMPLE_COUNT,
    };

    fn domain() -> AttestationDomain {
        AttestationDomain::new("test-realm", AccountId::from_raw([7; 32]))
    }

    fn payload() -> SnapshotPayload {
        SnapshotPayload {
            station: StationId::new("STATION-001").unwrap(),
            date: DateKey::new("2025-01-15").unwrap(),
            generated: EnergyTenths::new(61234),
            grid_delivered: EnergyTenths::new(50000),
            self_consumed: EnergyTenths::new(11234),
            sample_count: EXPECTED_SAMPLE_COUNT,
            evidence_hash: ContentHash::of_bytes(b"readings.csv"),
        }
    }

    #[test]
    fn recover_returns_original_signer() {
        let key = SigningKey::generate();
        let digest = domain().snapshot_digest(&payload());
        let attestation = key.attest(&digest);
        let recovered = recover_signer(&digest, &attestation).unwrap();
        assert_eq!(recovered, key.account_id());
    }

    #[test]
    fn recover_fails_on_altered_payload() {
        let key = SigningKey::generate();
        let digest = domain().snapshot_digest(&payload());
        let attestation = key.attest(&digest);

        let mut altered = payload();
        altered.grid_delivered = EnergyTenths::new(50001);
        let altered_digest = domain().snapshot_digest(&altered);

        assert_eq!(
            recover_signer(&altered_digest, &attestation),
            Err(AttestError::BadSignature)
        );
    }

    #[test]
    fn recover_fails_on_foreign_domain() {
        let key = SigningKey::generate();
        let digest = domain().snapshot_digest(&payload());
        let attestation = key.attest(&digest);

        let other = AttestationDomain::new("other-realm", AccountId::from_raw([7; 32]));
        let foreign_digest = other.snapshot_digest(&payload());
        assert!(recover_signer(&foreign_digest, &attestation).is_err());
    }

    #[test]
    fn recover_fails_with_swapped_signer() {
        let signer = SigningKey::generate();
        let other = SigningKey::generate();
        let digest = domain().snapshot_digest(&payload());
        let mut attestation = signer.attest(&digest);
        attestation.signer = other.verifying_key();
        assert_eq!(
            recover_signer(&digest, &attestation),
            Err(AttestError::BadSignature)
        );
    }

    #[test]
    fn signing_key_hex_roundtrip() {
        let key = SigningKey::generate();
        let restored = SigningKey::from_hex(&hex::encode(key.as_bytes())).unwrap();
        assert_eq!(key.account_id(), restored.account_id());
    }

    #[test]
    fn malformed_key_hex_is_rejected() {
        assert_eq!(
            SigningKey::from_hex("not hex").unwrap_err(),
            AttestError::MalformedKey
        );
        assert_eq!(
            VerifyingKey::from_hex("abcd").unwrap_err(),
            AttestError::MalformedKey
        );
    }

    #[test]
    fn malformed_signature_hex_is_rejected() {
        assert_eq!(
            Signature::from_hex("00ff").unwrap_err(),
            AttestError::MalformedSignature
        );
    }

    #[test]
    fn attestation_serde_roundtrip() {
        let key = SigningKey::generate();
        let digest = domain().snapshot_digest(&payload());
        let attestation = key.attest(&digest);
        let json = serde_json::to_string(&attestation).unwrap();
        let parsed: Attestation = serde_json::from_str(&json).unwrap();
        assert_eq!(attestation, parsed);
        assert!(recover_signer(&digest, &parsed).is_ok());
    }

    #[test]
    fn attestation_serde_rejects_invalid_key() {
        let json = format!(
            "{{\"signer\":\"{}\",\"signature\":\"{}\"}}",
            "ff".repeat(31),
            "00".repeat(64)
        );
        assert!(serde_json::from_str::<Attestation>(&json).is_err());
    }

    #[test]
    fn debug_redacts_signing_key() {
        let key = SigningKey::generate();
        assert!(format!("{key:?}").contains("redacted"));
    }
}
