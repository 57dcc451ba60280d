//! Native network signer backed by an RSA JWK.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand_chacha::ChaCha20Rng;
use rand_core::{OsRng, SeedableRng};
use rsa::pss::SigningKey;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::SignerError;

/// Modulus size of generated wallets
pub const WALLET_BITS: usize = 4096;

/// RSA private key in JSON Web Key form. Numbers are base64url big-endian.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    #[serde(default = "default_kty")]
    pub kty: String,
    pub n: String,
    #[serde(default = "default_exponent")]
    pub e: String,
    pub d: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qi: Option<String>,
}

fn default_kty() -> String {
    "RSA".to_string()
}

fn default_exponent() -> String {
    "AQAB".to_string()
}

impl fmt::Debug for Jwk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Jwk({}, [REDACTED])", &self.n[..self.n.len().min(8)])
    }
}

fn decode_number(field: &str, value: &str) -> Result<BigUint, SignerError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(value.trim_end_matches('='))
        .map_err(|e| SignerError::Signing(format!("JWK field `{field}` is not base64url: {e}")))?;
    Ok(BigUint::from_bytes_be(&bytes))
}

fn encode_number(value: &BigUint) -> String {
    URL_SAFE_NO_PAD.encode(value.to_bytes_be())
}

impl Jwk {
    /// Derive a wallet deterministically from a 32-byte seed
    pub fn from_seed(seed: [u8; 32], bits: usize) -> Result<Self, SignerError> {
        let mut rng = ChaCha20Rng::from_seed(seed);
        let key = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| SignerError::Signing(format!("RSA key generation failed: {e}")))?;
        Self::from_private_key(&key)
    }

    fn from_private_key(key: &RsaPrivateKey) -> Result<Self, SignerError> {
        let [p, q] = key.primes() else {
            return Err(SignerError::Signing(
                "generated key does not have two primes".to_string(),
            ));
        };
        let one = BigUint::from(1u32);
        let two = BigUint::from(2u32);
        let d = key.d();

        let dp = d % &(p - &one);
        let dq = d % &(q - &one);
        // p is prime, so q^(p-2) mod p is the inverse of q
        let qi = q.modpow(&(p - &two), p);

        Ok(Self {
            kty: default_kty(),
            n: encode_number(key.n()),
            e: encode_number(key.e()),
            d: encode_number(d),
            p: Some(encode_number(p)),
            q: Some(encode_number(q)),
            dp: Some(encode_number(&dp)),
            dq: Some(encode_number(&dq)),
            qi: Some(encode_number(&qi)),
        })
    }

    fn to_private_key(&self) -> Result<RsaPrivateKey, SignerError> {
        let (Some(p), Some(q)) = (&self.p, &self.q) else {
            return Err(SignerError::Signing(
                "JWK lacks the prime factors `p` and `q`".to_string(),
            ));
        };
        RsaPrivateKey::from_components(
            decode_number("n", &self.n)?,
            decode_number("e", &self.e)?,
            decode_number("d", &self.d)?,
            vec![decode_number("p", p)?, decode_number("q", q)?],
        )
        .map_err(|e| SignerError::Signing(format!("invalid RSA key: {e}")))
    }
}

/// Signs with RSA-PSS/SHA-256 as the native network requires
#[derive(Debug)]
pub struct ArweaveSigner {
    jwk: Jwk,
}

impl ArweaveSigner {
    pub fn new(jwk: Jwk) -> Self {
        Self { jwk }
    }

    /// Wallet address: base64url(sha256(modulus bytes))
    pub fn address(&self) -> Result<String, SignerError> {
        let modulus = URL_SAFE_NO_PAD
            .decode(self.jwk.n.trim_end_matches('='))
            .map_err(|e| SignerError::Signing(format!("JWK modulus is not base64url: {e}")))?;
        Ok(URL_SAFE_NO_PAD.encode(Sha256::digest(&modulus)))
    }

    pub fn owner(&self) -> &str {
        &self.jwk.n
    }

    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, SignerError> {
        let signing_key = SigningKey::<Sha256>::new(self.jwk.to_private_key()?);
        let signature = signing_key
            .try_sign_with_rng(&mut OsRng, message)
            .map_err(|e| SignerError::Signing(e.to_string()))?;
        Ok(signature.to_vec())
    }
}
