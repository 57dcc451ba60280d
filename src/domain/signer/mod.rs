//! Signer resolution
//!
//! Key material arrives as an opaque string (env var or wallet file). It is
//! classified by structure into exactly one [`KeyMaterial`] variant, tried in
//! a fixed priority order:
//!
//! 1. RSA JWK: a JSON object exposing both `n` and `d` → native signer
//! 2. Raw hex: 64 hex digits, optionally `0x`-prefixed → EVM signer
//!
//! The JWK check runs first so that a hex-looking field inside a larger JSON
//! document is never mistaken for a raw secp256k1 key.

mod arweave;
mod evm;

pub use arweave::{ArweaveSigner, Jwk, WALLET_BITS};
pub use evm::EvmSigner;

use regex::Regex;
use std::sync::LazyLock;

use crate::domain::network::Network;
use crate::error::SignerError;

static HEX_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0x)?[0-9a-fA-F]{64}$").expect("hex key pattern is valid")
});

/// Structurally classified key material
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    Jwk(Jwk),
    /// 32 secret bytes parsed from hex
    Hex([u8; 32]),
}

impl KeyMaterial {
    pub fn parse(material: &str) -> Result<Self, SignerError> {
        if let Some(jwk) = parse_jwk(material) {
            return Ok(Self::Jwk(jwk));
        }
        if let Some(secret) = parse_hex_key(material) {
            return Ok(Self::Hex(secret));
        }
        Err(SignerError::InvalidKeyMaterial)
    }
}

/// Accepts a JSON object carrying string `n` and `d` fields
fn parse_jwk(material: &str) -> Option<Jwk> {
    let value: serde_json::Value = serde_json::from_str(material.trim()).ok()?;
    let object = value.as_object()?;
    object.get("n")?.as_str()?;
    object.get("d")?.as_str()?;
    serde_json::from_value(value).ok()
}

fn parse_hex_key(material: &str) -> Option<[u8; 32]> {
    let trimmed = material.trim();
    if !HEX_KEY.is_match(trimmed) {
        return None;
    }
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let mut secret = [0u8; 32];
    hex::decode_to_slice(digits, &mut secret).ok()?;
    Some(secret)
}

/// Signer used for every signed operation of a run
#[derive(Debug)]
pub enum Signer {
    Arweave(ArweaveSigner),
    Evm(EvmSigner),
}

impl Signer {
    /// Resolve key material into a signer.
    ///
    /// Hex keys are bound to `network_hint` when it names an EVM network and
    /// to Ethereum otherwise. JWKs always sign for Arweave.
    pub fn resolve(material: &str, network_hint: Option<Network>) -> Result<Self, SignerError> {
        match KeyMaterial::parse(material)? {
            KeyMaterial::Jwk(jwk) => Ok(Self::Arweave(ArweaveSigner::new(jwk))),
            KeyMaterial::Hex(secret) => {
                let network = match network_hint {
                    Some(Network::Polygon) => Network::Polygon,
                    _ => Network::Ethereum,
                };
                Ok(Self::Evm(EvmSigner::from_secret(&secret, network)?))
            }
        }
    }

    pub fn network(&self) -> Network {
        match self {
            Self::Arweave(_) => Network::Arweave,
            Self::Evm(signer) => signer.network(),
        }
    }

    /// EVM signatures are deterministic, so identical uploads collide
    /// unless tagged with something unique
    pub fn is_evm(&self) -> bool {
        matches!(self, Self::Evm(_))
    }

    pub fn address(&self) -> Result<String, SignerError> {
        match self {
            Self::Arweave(signer) => signer.address(),
            Self::Evm(signer) => Ok(signer.address()),
        }
    }

    /// Public key in the form the storage network expects as owner
    pub fn owner(&self) -> String {
        match self {
            Self::Arweave(signer) => signer.owner().to_string(),
            Self::Evm(signer) => signer.owner(),
        }
    }

    pub fn signature_type(&self) -> &'static str {
        match self {
            Self::Arweave(_) => "arweave",
            Self::Evm(_) => "ethereum",
        }
    }

    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        match self {
            Self::Arweave(signer) => signer.sign(message),
            Self::Evm(signer) => signer.sign(message),
        }
    }
}
