//! Request signing shared by the upload and registry adapters.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::RequestBuilder;
use sha2::{Digest, Sha256};

use crate::domain::Signer;
use crate::error::SignerError;

pub const HEADER_OWNER: &str = "x-owner";
pub const HEADER_ADDRESS: &str = "x-signer-address";
pub const HEADER_SIGNATURE_TYPE: &str = "x-signature-type";
pub const HEADER_SIGNATURE: &str = "x-signature";

/// Identity and signature headers for a request payload.
///
/// The signature covers sha256 over all `parts` concatenated in order.
pub fn sign_request(
    request: RequestBuilder,
    signer: &Signer,
    parts: &[&[u8]],
) -> Result<RequestBuilder, SignerError> {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let signature = signer.sign(&digest)?;

    Ok(request
        .header(HEADER_OWNER, signer.owner())
        .header(HEADER_ADDRESS, signer.address()?)
        .header(HEADER_SIGNATURE_TYPE, signer.signature_type())
        .header(HEADER_SIGNATURE, URL_SAFE_NO_PAD.encode(signature)))
}
