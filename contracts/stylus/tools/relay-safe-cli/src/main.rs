use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy_primitives::{keccak256, Address, U256};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use relay_safe_signer::{BundleBuilder, OfflineVerifier, OwnerKey};
use relay_safe_types::hashing;
use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod documents;

use documents::{parse_digest, parse_hex, read_json, write_json_atomic, ActionFile, SignatureFile};

/// Operator tooling for relay-safe accounts: fingerprint actions, sign them with owner keys,
/// pack bundles for a relayer and pre-validate bundles before submission.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the fingerprint and pre-hash bytes of an action at a nonce.
    HashAction {
        #[command(flatten)]
        account: AccountArgs,

        /// Action JSON document.
        #[arg(long)]
        action: PathBuf,

        /// Nonce the action will be executed under.
        #[arg(long)]
        nonce: U256,
    },

    /// Print the fingerprint owners or `isValidSignature` use for a message.
    HashMessage {
        #[command(flatten)]
        account: AccountArgs,

        /// Message bytes as hex.
        #[arg(long)]
        message: String,
    },

    /// Sign a fingerprint with an owner key.
    Sign {
        #[command(flatten)]
        key: KeyArgs,

        /// 32-byte fingerprint as hex.
        #[arg(long)]
        digest: String,

        /// Write the signature document here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Combine signature documents into one bundle, sorted by signer.
    Pack {
        /// Signature documents produced by `sign` (or hand-written contract entries).
        #[arg(required = true)]
        signatures: Vec<PathBuf>,

        /// Write the bundle document here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Check a bundle against an owner set without a chain. Delegate entries are rejected.
    Verify {
        #[command(flatten)]
        account: AccountArgs,

        /// 32-byte fingerprint as hex.
        #[arg(long)]
        digest: String,

        /// Bundle as hex.
        #[arg(long)]
        bundle: String,

        /// Owner addresses, comma separated.
        #[arg(long, value_delimiter = ',', required = true)]
        owners: Vec<Address>,

        #[arg(long)]
        threshold: usize,
    },
}

#[derive(Args, Debug)]
struct AccountArgs {
    /// Deployed account address (the EIP-712 verifying contract).
    #[arg(long, env = "SAFE_ADDRESS")]
    safe_address: Address,

    #[arg(long, env = "CHAIN_ID")]
    chain_id: u64,
}

#[derive(Args, Debug)]
struct KeyArgs {
    /// Path to a file containing the owner private key.
    #[arg(long, env = "PRIV_KEY_PATH", conflicts_with = "private_key")]
    private_key_path: Option<PathBuf>,

    /// Owner private key (hex string, 0x...).
    #[arg(long, env = "PKEY", conflicts_with = "private_key_path")]
    private_key: Option<String>,
}

impl KeyArgs {
    fn load(&self) -> Result<OwnerKey> {
        let raw = if let Some(ref path) = self.private_key_path {
            fs::read_to_string(path)
                .with_context(|| format!("failed reading key file {}", path.display()))?
        } else if let Some(ref key) = self.private_key {
            key.clone()
        } else {
            return Err(anyhow!(
                "missing owner key: provide --private-key-path or --private-key (or set PRIV_KEY_PATH/PKEY)"
            ));
        };
        OwnerKey::from_hex(&raw).context("failed loading owner key")
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(tracing::Level::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::HashAction {
            account,
            action,
            nonce,
        } => hash_action(&account, &action, nonce),
        Command::HashMessage { account, message } => hash_message(&account, &message),
        Command::Sign { key, digest, out } => sign(&key, &digest, out),
        Command::Pack { signatures, out } => pack(&signatures, out),
        Command::Verify {
            account,
            digest,
            bundle,
            owners,
            threshold,
        } => verify(&account, &digest, &bundle, owners, threshold),
    }
}

fn hash_action(account: &AccountArgs, path: &Path, nonce: U256) -> Result<()> {
    let document: ActionFile = read_json(path)?;
    let action = document.to_action()?;
    let domain = hashing::domain_separator(account.chain_id, account.safe_address);
    let encoded = hashing::encode_action_data(domain, &action, nonce);
    let fingerprint = keccak256(&encoded);
    debug!(%domain, %nonce, "hashed action");

    emit(
        None,
        &json!({
            "domainSeparator": domain,
            "nonce": nonce.to_string(),
            "encoded": format!("0x{}", hex::encode(&encoded)),
            "txHash": fingerprint,
        }),
    )
}

fn hash_message(account: &AccountArgs, message: &str) -> Result<()> {
    let message = parse_hex(message)?;
    let domain = hashing::domain_separator(account.chain_id, account.safe_address);
    emit(
        None,
        &json!({
            "domainSeparator": domain,
            "messageHash": hashing::message_hash(domain, &message),
        }),
    )
}

fn sign(key: &KeyArgs, digest: &str, out: Option<PathBuf>) -> Result<()> {
    let key = key.load()?;
    let digest = parse_digest(digest)?;
    let entry = key.sign_digest(digest).context("signing failed")?;
    info!(signer = %key.address(), %digest, "signed fingerprint");

    let document = SignatureFile::from_entry(key.address(), &entry);
    let value = serde_json::to_value(&document).context("failed serialising signature")?;
    emit(out, &value)
}

fn pack(paths: &[PathBuf], out: Option<PathBuf>) -> Result<()> {
    let mut builder = BundleBuilder::new();
    for path in paths {
        let document: SignatureFile = read_json(path)?;
        let entry = document
            .to_entry()
            .with_context(|| format!("invalid signature in {}", path.display()))?;
        builder
            .add(document.signer(), entry)
            .with_context(|| format!("cannot add {}", path.display()))?;
    }
    let signers: Vec<Address> = builder.signers().collect();
    info!(count = signers.len(), "packed bundle");

    emit(
        out,
        &json!({
            "signers": signers,
            "signatures": format!("0x{}", hex::encode(builder.build())),
        }),
    )
}

fn verify(
    account: &AccountArgs,
    digest: &str,
    bundle: &str,
    owners: Vec<Address>,
    threshold: usize,
) -> Result<()> {
    if threshold == 0 || threshold > owners.len() {
        bail!("threshold {threshold} is invalid for {} owners", owners.len());
    }
    let digest = parse_digest(digest)?;
    let bundle = parse_hex(bundle)?;
    let verifier = OfflineVerifier::new(account.chain_id, account.safe_address, owners, threshold);

    match verifier.check(digest, &[], &bundle) {
        Ok(()) => {
            println!("valid");
            Ok(())
        }
        Err(err) => bail!("bundle rejected: {err:?}"),
    }
}

fn emit(out: Option<PathBuf>, value: &Value) -> Result<()> {
    match out {
        Some(path) => {
            write_json_atomic(&path, value)?;
            println!("Wrote {}", path.display());
        }
        None => {
            let pretty = serde_json::to_string_pretty(value).context("failed serialising output")?;
            println!("{pretty}");
        }
    }
    Ok(())
}
