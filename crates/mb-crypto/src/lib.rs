//! Attestation cryptography for Meterbook.
//!
//! Provides the domain-separated BLAKE3 digest that binds a snapshot
//! payload to one deployment, Ed25519 signing of that digest, and signer
//! recovery. All operations wrap established libraries — no custom
//! cryptography — and none touch ledger state.

pub mod digest;
pub mod signer;

pub use digest::{AttestationDomain, SnapshotDigest};
pub use signer::{recover_signer, AttestError, Attestation, Signature, SigningKey, VerifyingKey};
