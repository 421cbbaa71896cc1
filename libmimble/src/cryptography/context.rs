//! Operation-scoped secp256k1-zkp contexts.
//!
//! Every primitive that needs the zkp library (Pedersen commitments, the switch-commitment transform, bulletproof
//! steps and aggsig signing) creates a [`ZkpContext`] with only the capabilities it needs, uses it, and lets it drop
//! at the end of the operation. Nothing is cached between calls, so the context, its scratch space and the secret
//! keys handed to it all share the lifetime of a single request.
//!
//! Secret keys passed to the library are built with [`ZkpContext::secret_key`]. The library's `SecretKey` type wipes
//! itself on drop, so copies made for by-value library calls are released together with the context.

use crate::error::CryptoError;
use secp256k1zkp::key::{PublicKey, SecretKey, ZERO_KEY};
use secp256k1zkp::{ContextFlag, Secp256k1};
use std::ops::Deref;

pub(crate) struct ZkpContext {
    secp: Secp256k1,
}

impl ZkpContext {
    /// A context that can create Pedersen commitments, switch commitments and bulletproofs.
    pub fn commit() -> Self {
        Self { secp: Secp256k1::with_caps(ContextFlag::Commit) }
    }

    /// A context that can sign and verify.
    pub fn signing() -> Self {
        Self { secp: Secp256k1::with_caps(ContextFlag::Full) }
    }

    /// Converts 32 bytes into a library secret key. The all-zero vector is accepted as the zero key, since blinding
    /// factor sums may legitimately cancel out.
    pub fn secret_key(&self, bytes: &[u8; 32]) -> Result<SecretKey, CryptoError> {
        if bytes.iter().all(|b| *b == 0) {
            return Ok(ZERO_KEY);
        }
        SecretKey::from_slice(&self.secp, bytes)
            .map_err(|_| CryptoError::InvalidParameters("not a valid secp256k1 secret scalar"))
    }

    /// Parses a compressed public key, rejecting malformed encodings and the all-zero (identity) key.
    pub fn public_key(&self, bytes: &[u8]) -> Result<PublicKey, CryptoError> {
        let key = PublicKey::from_slice(&self.secp, bytes)
            .map_err(|_| CryptoError::InvalidParameters("not a valid secp256k1 public key"))?;
        if !key.is_valid() {
            return Err(CryptoError::InvalidParameters("public key is the identity"));
        }
        Ok(key)
    }

    /// Serializes a library public key in 33-byte compressed form.
    pub fn serialize_public_key(&self, key: &PublicKey) -> Result<[u8; 33], CryptoError> {
        let serialized = key.serialize_vec(&self.secp, true);
        if serialized.len() != 33 {
            return Err(CryptoError::InternalError("unexpected compressed public key length"));
        }
        let mut result = [0u8; 33];
        result.copy_from_slice(&serialized[..]);
        Ok(result)
    }
}

impl Deref for ZkpContext {
    type Target = Secp256k1;

    fn deref(&self) -> &Secp256k1 {
        &self.secp
    }
}

/// Copies a library secret key out into a plain array. The caller owns the result and must wipe it.
pub(crate) fn secret_key_bytes(key: &SecretKey) -> [u8; 32] {
    let mut result = [0u8; 32];
    result.copy_from_slice(&key[..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_vector_is_the_zero_key() {
        let ctx = ZkpContext::commit();
        let key = ctx.secret_key(&[0u8; 32]).unwrap();
        assert_eq!(secret_key_bytes(&key), [0u8; 32]);
    }

    #[test]
    fn overflowing_scalar_is_rejected() {
        let ctx = ZkpContext::commit();
        assert!(ctx.secret_key(&[0xffu8; 32]).unwrap_err().is_invalid_parameters());
    }

    #[test]
    fn public_key_round_trip() {
        let ctx = ZkpContext::signing();
        let generator = hex::decode("0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798").unwrap();
        let key = ctx.public_key(&generator).unwrap();
        assert_eq!(ctx.serialize_public_key(&key).unwrap().to_vec(), generator);
        assert!(ctx.public_key(&[0u8; 33]).is_err());
    }
}
