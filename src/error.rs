//! Centralized error types for perma-deploy
//!
//! Uses thiserror for typed errors that can be matched on,
//! while still being compatible with anyhow for propagation.

use thiserror::Error;

/// Fatal deployment errors. Every variant aborts the run with exit code 1.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Config file not found: {path}. Run `perma-deploy init` first")]
    ConfigMissing { path: String },

    #[error("No key material found. Set DEPLOY_KEY or run `perma-deploy init` to create a wallet")]
    KeyMissing,

    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(#[from] SignerError),

    #[error("Build command failed: `{command}` ({status})")]
    BuildFailed { command: String, status: String },

    #[error("Deploy folder '{path}' is empty or does not exist")]
    EmptyDeployFolder { path: String },

    #[error("Invalid base64 seed - {0}")]
    InvalidSeed(String),
}

/// Signer resolution and signing errors
#[derive(Error, Debug)]
pub enum SignerError {
    #[error("expected an RSA JWK (with `n` and `d`) or a 64-digit hex private key")]
    InvalidKeyMaterial,

    #[error("hex key is not a valid secp256k1 secret: {0}")]
    InvalidSecret(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

/// Object upload errors. Never fatal: callers downgrade them to the
/// `upload-failed` sentinel.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("upload timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("upload request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upload rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode tags: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error(transparent)]
    Signing(#[from] SignerError),
}

/// Name registry errors. Reported as warnings only
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("registry request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("registry rejected update with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("failed to encode record: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error(transparent)]
    Signing(#[from] SignerError),
}
