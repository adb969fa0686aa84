use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mb",
    about = "Meterbook — settlement-of-record ledger for generation stations",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a data-team signing key
    Keygen(KeygenArgs),
    /// Derive the account id of a public key
    Account(AccountArgs),
    /// Hash an evidence artifact (CSV, PDF)
    HashEvidence(HashEvidenceArgs),
    /// Compute the attestation digest of a snapshot payload
    Digest(DigestArgs),
    /// Sign a snapshot payload, producing an attestation
    Attest(AttestArgs),
    /// Verify an attestation against a snapshot payload
    Verify(VerifyArgs),
    /// Start the Meterbook ledger server
    Serve(ServeArgs),
}

/// Attestation domain shared by digest, attest, and verify.
#[derive(Args)]
pub struct DomainArgs {
    /// Deployment name bound into the digest
    #[arg(long, default_value = "dev")]
    pub realm: String,
    /// Ledger instance account (hex), null if omitted
    #[arg(long)]
    pub ledger: Option<String>,
}

#[derive(Args)]
pub struct KeygenArgs {
    /// Write the secret key hex to a file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct AccountArgs {
    /// Ed25519 public key, hex
    pub pubkey: String,
}

#[derive(Args)]
pub struct HashEvidenceArgs {
    /// Evidence file to hash
    pub file: PathBuf,
}

#[derive(Args)]
pub struct DigestArgs {
    /// Snapshot payload JSON file
    pub payload: PathBuf,
    #[command(flatten)]
    pub domain: DomainArgs,
}

#[derive(Args)]
pub struct AttestArgs {
    /// Snapshot payload JSON file
    pub payload: PathBuf,
    /// Signing key: secret hex, or @path to a key file
    #[arg(short, long)]
    pub key: String,
    #[command(flatten)]
    pub domain: DomainArgs,
    /// Write the attestation JSON to a file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// Snapshot payload JSON file
    pub payload: PathBuf,
    /// Attestation JSON file
    pub attestation: PathBuf,
    #[command(flatten)]
    pub domain: DomainArgs,
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Override the bind address
    #[arg(long)]
    pub bind: Option<String>,
    /// Override the attestation realm
    #[arg(long)]
    pub realm: Option<String>,
    /// Override the bootstrap admin account (hex)
    #[arg(long)]
    pub admin: Option<String>,
    /// Override the notice archive path
    #[arg(long)]
    pub archive: Option<PathBuf>,
}
