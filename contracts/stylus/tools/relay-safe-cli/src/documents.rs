//! JSON documents exchanged between operators, and how they are written to disk.

use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy_primitives::{Address, Bytes, B256, U256};
use anyhow::{anyhow, bail, Context, Result};
use relay_safe_types::{decode_signatures, Action, CallType, RefundAsset, SignatureEntry, SIGNATURE_LEN};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Action fields under their Solidity names. Numbers are decimal or `0x` hex strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionFile {
    pub to: Address,
    #[serde(default)]
    pub value: U256,
    #[serde(default)]
    pub data: Bytes,
    /// 0 = call, 1 = delegatecall.
    #[serde(default)]
    pub operation: u8,
    #[serde(default)]
    pub safe_tx_gas: U256,
    #[serde(default)]
    pub data_gas: U256,
    #[serde(default)]
    pub gas_price: U256,
    /// Zero address pays in the native asset.
    #[serde(default)]
    pub gas_token: Address,
}

impl ActionFile {
    pub fn to_action(&self) -> Result<Action> {
        let call_type = CallType::try_from(self.operation)
            .map_err(|_| anyhow!("unsupported operation {}", self.operation))?;
        Ok(Action::call(self.to, self.value, self.data.to_vec())
            .with_call_type(call_type)
            .with_refund(
                self.safe_tx_gas,
                self.data_gas,
                self.gas_price,
                RefundAsset::from(self.gas_token),
            ))
    }
}

/// One owner's contribution to a bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SignatureFile {
    /// 65-byte `r || s || v` by an EOA owner.
    Ecdsa { signer: Address, signature: Bytes },
    /// Payload for a delegate validator contract that is itself an owner.
    Contract { validator: Address, signature: Bytes },
}

impl SignatureFile {
    pub fn from_entry(signer: Address, entry: &SignatureEntry) -> Self {
        match entry {
            SignatureEntry::Ecdsa { r, s, v } => {
                let mut signature = Vec::with_capacity(SIGNATURE_LEN);
                signature.extend_from_slice(r.as_slice());
                signature.extend_from_slice(s.as_slice());
                signature.push(*v);
                SignatureFile::Ecdsa {
                    signer,
                    signature: signature.into(),
                }
            }
            SignatureEntry::Contract { validator, signature } => SignatureFile::Contract {
                validator: *validator,
                signature: signature.clone().into(),
            },
        }
    }

    pub fn signer(&self) -> Address {
        match self {
            SignatureFile::Ecdsa { signer, .. } => *signer,
            SignatureFile::Contract { validator, .. } => *validator,
        }
    }

    pub fn to_entry(&self) -> Result<SignatureEntry> {
        match self {
            SignatureFile::Ecdsa { signature, .. } => {
                if signature.len() != SIGNATURE_LEN {
                    bail!("ECDSA signature must be {SIGNATURE_LEN} bytes, got {}", signature.len());
                }
                if signature[SIGNATURE_LEN - 1] == 0 {
                    bail!("v = 0 marks a delegate entry; use type \"contract\"");
                }
                let mut entries = decode_signatures(signature, 1)
                    .map_err(|err| anyhow!("malformed signature: {err:?}"))?;
                entries.pop().ok_or_else(|| anyhow!("empty signature"))
            }
            SignatureFile::Contract { validator, signature } => Ok(SignatureEntry::Contract {
                validator: *validator,
                signature: signature.to_vec(),
            }),
        }
    }
}

/// `0x`-prefixed or bare hex.
pub fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let trimmed = input.trim();
    let raw = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(raw).with_context(|| format!("invalid hex {trimmed:?}"))
}

pub fn parse_digest(input: &str) -> Result<B256> {
    let bytes = parse_hex(input)?;
    if bytes.len() != 32 {
        bail!("digest must be 32 bytes, got {}", bytes.len());
    }
    Ok(B256::from_slice(&bytes))
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed parsing JSON in {}", path.display()))
}

pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.exists() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }

    let serialised = serde_json::to_string_pretty(value).context("failed serialising JSON")?;
    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, serialised.as_bytes())
        .with_context(|| format!("failed writing temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("failed replacing {}", path.display()))?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
