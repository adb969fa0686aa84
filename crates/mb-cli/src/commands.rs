use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;

use mb_crypto::{recover_signer, Attestation, AttestationDomain, SigningKey, VerifyingKey};
use mb_server::{MbServer, ServerConfig};
use mb_types::{AccountId, ContentHash, SnapshotPayload};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Keygen(args) => cmd_keygen(args),
        Command::Account(args) => cmd_account(args),
        Command::HashEvidence(args) => cmd_hash_evidence(args),
        Command::Digest(args) => cmd_digest(args),
        Command::Attest(args) => cmd_attest(args),
        Command::Verify(args) => cmd_verify(args),
        Command::Serve(args) => cmd_serve(args),
    }
}

fn cmd_keygen(args: KeygenArgs) -> anyhow::Result<()> {
    let key = SigningKey::generate();
    let secret_hex = hex::encode(key.as_bytes());

    match &args.out {
        Some(path) => {
            fs::write(path, format!("{secret_hex}\n"))
                .with_context(|| format!("writing {}", path.display()))?;
            println!("{} Secret key written to {}", "✓".green().bold(), path.display().to_string().bold());
        }
        None => println!("Secret:  {}", secret_hex.red()),
    }
    println!("Public:  {}", key.verifying_key().to_hex().cyan());
    println!("Account: {}", key.account_id().to_hex().yellow());
    Ok(())
}

fn cmd_account(args: AccountArgs) -> anyhow::Result<()> {
    let key = VerifyingKey::from_hex(&args.pubkey).context("parsing public key")?;
    println!("{}", key.account_id().to_hex().yellow());
    Ok(())
}

fn cmd_hash_evidence(args: HashEvidenceArgs) -> anyhow::Result<()> {
    let bytes = fs::read(&args.file).with_context(|| format!("reading {}", args.file.display()))?;
    let hash = ContentHash::of_bytes(&bytes);
    println!("{}", hash.to_hex().cyan());
    Ok(())
}

fn cmd_digest(args: DigestArgs) -> anyhow::Result<()> {
    let domain = domain(&args.domain)?;
    let payload = load_payload(&args.payload)?;
    let digest = domain.snapshot_digest(&payload);
    println!("{}", digest.to_hex().cyan());
    Ok(())
}

fn cmd_attest(args: AttestArgs) -> anyhow::Result<()> {
    let domain = domain(&args.domain)?;
    let payload = load_payload(&args.payload)?;
    let key = load_key(&args.key)?;

    let digest = domain.snapshot_digest(&payload);
    let attestation = key.attest(&digest);
    let json = serde_json::to_string_pretty(&attestation)?;

    match &args.out {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            println!("{} Attestation written to {}", "✓".green().bold(), path.display().to_string().bold());
        }
        None => println!("{json}"),
    }
    println!("Digest:  {}", digest.to_hex().cyan());
    println!("Signer:  {}", key.account_id().to_hex().yellow());
    Ok(())
}

fn cmd_verify(args: VerifyArgs) -> anyhow::Result<()> {
    let domain = domain(&args.domain)?;
    let payload = load_payload(&args.payload)?;
    let text = fs::read_to_string(&args.attestation)
        .with_context(|| format!("reading {}", args.attestation.display()))?;
    let attestation: Attestation = serde_json::from_str(&text).context("parsing attestation")?;

    let digest = domain.snapshot_digest(&payload);
    match recover_signer(&digest, &attestation) {
        Ok(signer) => {
            println!("{} Attestation valid", "✓".green().bold());
            println!("Signer: {}", signer.to_hex().yellow());
            Ok(())
        }
        Err(e) => bail!("attestation rejected: {e}"),
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.bind_addr = bind.parse().context("parsing --bind")?;
    }
    if let Some(realm) = args.realm {
        config.realm = realm;
    }
    if let Some(admin) = &args.admin {
        config.admin_account = AccountId::from_hex(admin).context("parsing --admin")?;
    }
    if let Some(archive) = args.archive {
        config.archive_path = Some(archive);
    }

    let server = MbServer::new(config)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

/// Build the attestation domain from CLI flags.
fn domain(args: &DomainArgs) -> anyhow::Result<AttestationDomain> {
    let ledger = match &args.ledger {
        Some(hex) => AccountId::from_hex(hex).context("parsing --ledger")?,
        None => AccountId::null(),
    };
    Ok(AttestationDomain::new(args.realm.clone(), ledger))
}

fn load_payload(path: &Path) -> anyhow::Result<SnapshotPayload> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).context("parsing snapshot payload")
}

/// Accepts a raw secret hex string, or `@path` naming a key file.
fn load_key(arg: &str) -> anyhow::Result<SigningKey> {
    let hex_str = match arg.strip_prefix('@') {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("reading key file {path}"))?
            .trim()
            .to_string(),
        None => arg.to_string(),
    };
    SigningKey::from_hex(&hex_str).context("parsing signing key")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mb_types::{DateKey, EnergyTenths, StationId, EXPECTED_SAMPLE_COUNT};

    fn payload_json() -> String {
        let payload = SnapshotPayload {
            station: StationId::new("STATION-001").unwrap(),
            date: DateKey::new("2025-01-15").unwrap(),
            generated: EnergyTenths::new(61_234),
            grid_delivered: EnergyTenths::new(50_000),
            self_consumed: EnergyTenths::new(11_234),
            sample_count: EXPECTED_SAMPLE_COUNT,
            evidence_hash: ContentHash::of_bytes(b"readings.csv"),
        };
        serde_json::to_string(&payload).unwrap()
    }

    #[test]
    fn load_key_from_hex_and_file() {
        let key = SigningKey::generate();
        let secret = hex::encode(key.as_bytes());

        let from_hex = load_key(&secret).unwrap();
        assert_eq!(from_hex.account_id(), key.account_id());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("team.key");
        fs::write(&path, format!("{secret}\n")).unwrap();
        let from_file = load_key(&format!("@{}", path.display())).unwrap();
        assert_eq!(from_file.account_id(), key.account_id());
    }

    #[test]
    fn load_key_rejects_garbage() {
        assert!(load_key("not hex").is_err());
        assert!(load_key("@/nonexistent/team.key").is_err());
    }

    #[test]
    fn payload_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.json");
        fs::write(&path, payload_json()).unwrap();

        let payload = load_payload(&path).unwrap();
        assert_eq!(payload.station.as_str(), "STATION-001");
        assert_eq!(payload.sample_count, EXPECTED_SAMPLE_COUNT);
    }

    #[test]
    fn attest_then_verify_workflow() {
        // The full data-team flow: payload file + key, attest, verify.
        let dir = tempfile::tempdir().unwrap();
        let payload_path = dir.path().join("payload.json");
        fs::write(&payload_path, payload_json()).unwrap();

        let key = SigningKey::generate();
        let key_path = dir.path().join("team.key");
        fs::write(&key_path, hex::encode(key.as_bytes())).unwrap();
        let att_path = dir.path().join("att.json");

        let domain_args = DomainArgs {
            realm: "test-realm".into(),
            ledger: None,
        };
        cmd_attest(AttestArgs {
            payload: payload_path.clone(),
            key: format!("@{}", key_path.display()),
            domain: DomainArgs {
                realm: "test-realm".into(),
                ledger: None,
            },
            out: Some(att_path.clone()),
        })
        .unwrap();

        cmd_verify(VerifyArgs {
            payload: payload_path.clone(),
            attestation: att_path.clone(),
            domain: domain_args,
        })
        .unwrap();

        // A different realm must reject the same attestation.
        let err = cmd_verify(VerifyArgs {
            payload: payload_path,
            attestation: att_path,
            domain: DomainArgs {
                realm: "other-realm".into(),
                ledger: None,
            },
        })
        .unwrap_err();
        assert!(err.to_string().contains("attestation rejected"));
    }

    #[test]
    fn domain_parses_ledger_account() {
        let account = AccountId::from_raw([7; 32]);
        let d = domain(&DomainArgs {
            realm: "prod".into(),
            ledger: Some(account.to_hex()),
        })
        .unwrap();
        assert_eq!(*d.ledger(), account);
        assert_eq!(d.realm(), "prod");
    }
}
