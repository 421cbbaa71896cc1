//! Single-signer aggsig signatures, used for the device's partial signature on a transaction kernel.

use crate::cryptography::context::ZkpContext;
use crate::cryptography::keys::{PrivateKey, COMPRESSED_PUBLIC_KEY_SIZE};
use crate::error::CryptoError;
use log::{debug, error};
use secp256k1zkp::{aggsig, Message};

pub const MESSAGE_SIZE: usize = 32;
pub const SINGLE_SIGNER_SIGNATURE_SIZE: usize = 64;

/// Signs `message` with `private_key` and `secret_nonce`, returning a 64-byte compact signature.
///
/// `public_nonce` is the sum of all signers' public nonces and `public_key` the sum of their public keys; both feed
/// the challenge. When no public nonce is given the library uses the one of `secret_nonce` alone. Both points must be
/// well formed and not the identity.
pub fn create_single_signer_signature(
    message: &[u8; MESSAGE_SIZE],
    private_key: &PrivateKey,
    secret_nonce: &PrivateKey,
    public_nonce: Option<&[u8; COMPRESSED_PUBLIC_KEY_SIZE]>,
    public_key: &[u8; COMPRESSED_PUBLIC_KEY_SIZE],
) -> Result<[u8; SINGLE_SIGNER_SIGNATURE_SIZE], CryptoError> {
    debug!("Creating single-signer signature (public nonce supplied: {})", public_nonce.is_some());
    let ctx = ZkpContext::signing();
    let public_nonce = public_nonce.map(|nonce| ctx.public_key(nonce)).transpose()?;
    let public_key = ctx.public_key(public_key)?;
    let secret_key = ctx.secret_key(private_key.as_bytes())?;
    let secret_nonce = ctx.secret_key(secret_nonce.as_bytes())?;
    let message =
        Message::from_slice(message).map_err(|_| CryptoError::InvalidParameters("message is not 32 bytes"))?;

    let signature = aggsig::sign_single(
        &ctx,
        &message,
        &secret_key,
        Some(&secret_nonce),
        None,
        public_nonce.as_ref(),
        Some(&public_key),
        public_nonce.as_ref(),
    )
    .map_err(|e| {
        error!("Aggsig signing failed: {e:?}");
        CryptoError::InternalError("aggsig signing failed")
    })?;
    Ok(signature.serialize_compact(&ctx))
}
