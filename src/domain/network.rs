//! Target networks a deployment can be signed for.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Signing network. `Arweave` uses the native RSA wallet, the others are
/// EVM-compatible and use a secp256k1 key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Arweave,
    Ethereum,
    Polygon,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arweave => "arweave",
            Self::Ethereum => "ethereum",
            Self::Polygon => "polygon",
        }
    }

    /// Path segment the upload service uses to select the paying token
    pub fn upload_token(&self) -> &'static str {
        match self {
            Self::Arweave => "arweave",
            Self::Ethereum => "ethereum",
            Self::Polygon => "pol",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
