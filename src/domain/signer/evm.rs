//! secp256k1 signer for EVM-compatible networks.

use k256::ecdsa::SigningKey;
use sha3::{Digest, Keccak256};
use std::fmt;

use crate::domain::network::Network;
use crate::error::SignerError;

pub struct EvmSigner {
    key: SigningKey,
    network: Network,
}

impl fmt::Debug for EvmSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EvmSigner({}, {}, [REDACTED])", self.network, self.address())
    }
}

/// EIP-191 personal message hash
fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(format!("\x19Ethereum Signed Message:\n{}", message.len()).as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

impl EvmSigner {
    pub fn from_secret(secret: &[u8; 32], network: Network) -> Result<Self, SignerError> {
        let key = SigningKey::from_slice(secret)
            .map_err(|e| SignerError::InvalidSecret(e.to_string()))?;
        Ok(Self { key, network })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Uncompressed SEC1 public key, `0x`-prefixed hex
    pub fn owner(&self) -> String {
        let point = self.key.verifying_key().to_encoded_point(false);
        format!("0x{}", hex::encode(point.as_bytes()))
    }

    /// Last 20 bytes of keccak256 over the uncompressed public key
    pub fn address(&self) -> String {
        let point = self.key.verifying_key().to_encoded_point(false);
        let digest = Keccak256::digest(&point.as_bytes()[1..]);
        format!("0x{}", hex::encode(&digest[12..]))
    }

    /// 65-byte `r || s || v` signature over the personal message hash
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        let hash = personal_message_hash(message);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&hash)
            .map_err(|e| SignerError::Signing(e.to_string()))?;

        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(recovery_id.to_byte() + 27);
        Ok(bytes)
    }
}
