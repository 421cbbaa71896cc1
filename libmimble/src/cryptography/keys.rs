use crate::error::CryptoError;
use k256::elliptic_curve::ff::PrimeField;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{ProjectivePoint, Scalar};
use std::fmt::Debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const SECP256K1_PRIVATE_KEY_SIZE: usize = 32;
pub const CHAIN_CODE_SIZE: usize = 32;
pub const COMPRESSED_PUBLIC_KEY_SIZE: usize = 33;
pub const UNCOMPRESSED_PUBLIC_KEY_SIZE: usize = 65;
pub const ED25519_PUBLIC_KEY_SIZE: usize = 32;

/// A 32-byte secret scalar. The backing storage is overwritten when the value is dropped.
///
/// Neither `Copy` nor `Clone`.
#[derive(PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; SECP256K1_PRIVATE_KEY_SIZE]);

impl PrivateKey {
    /// Wraps `bytes` after checking that they form a valid secp256k1 secret key.
    pub fn from_bytes(bytes: &[u8; SECP256K1_PRIVATE_KEY_SIZE]) -> Result<Self, CryptoError> {
        if !is_valid_secp256k1_private_key(bytes) {
            return Err(CryptoError::InvalidParameters("not a valid secp256k1 private key"));
        }
        Ok(Self(*bytes))
    }

    /// Wraps bytes that came out of a derivation step. An invalid scalar at this point is an internal error rather
    /// than a caller error.
    pub(crate) fn from_derived(bytes: &[u8]) -> Result<Self, CryptoError> {
        if !is_valid_secp256k1_private_key(bytes) {
            return Err(CryptoError::InternalError("derived scalar is not a valid secp256k1 private key"));
        }
        let mut key = [0u8; SECP256K1_PRIVATE_KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; SECP256K1_PRIVATE_KEY_SIZE] {
        &self.0
    }

    pub(crate) fn as_scalar(&self) -> Result<Scalar, CryptoError> {
        scalar_from_bytes(&self.0).ok_or(CryptoError::InternalError("private key is out of range"))
    }

    /// The 33-byte SEC1 compressed public key for this secret on secp256k1.
    pub fn public_key(&self) -> Result<[u8; COMPRESSED_PUBLIC_KEY_SIZE], CryptoError> {
        let point = ProjectivePoint::GENERATOR * self.as_scalar()?;
        let encoded = point.to_affine().to_encoded_point(true);
        let mut result = [0u8; COMPRESSED_PUBLIC_KEY_SIZE];
        result.copy_from_slice(encoded.as_bytes());
        Ok(result)
    }
}

impl Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey(***)")
    }
}

#[derive(PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ChainCode([u8; CHAIN_CODE_SIZE]);

impl ChainCode {
    pub(crate) fn from_slice(bytes: &[u8]) -> Self {
        let mut code = [0u8; CHAIN_CODE_SIZE];
        code.copy_from_slice(&bytes[..CHAIN_CODE_SIZE]);
        Self(code)
    }

    pub fn as_bytes(&self) -> &[u8; CHAIN_CODE_SIZE] {
        &self.0
    }
}

impl Debug for ChainCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ChainCode(***)")
    }
}

/// A secp256k1 private key and its chain code, mutated in place as a derivation path is walked.
#[derive(Debug, PartialEq, Eq)]
pub struct ExtendedPrivateKey {
    pub(crate) private_key: PrivateKey,
    pub(crate) chain_code: ChainCode,
}

impl ExtendedPrivateKey {
    /// Splits a 64-byte HMAC-SHA512 node into key (low half) and chain code (high half).
    pub(crate) fn from_node(node: &[u8; 64]) -> Result<Self, CryptoError> {
        let private_key = PrivateKey::from_derived(&node[..SECP256K1_PRIVATE_KEY_SIZE])?;
        let chain_code = ChainCode::from_slice(&node[SECP256K1_PRIVATE_KEY_SIZE..]);
        Ok(Self { private_key, chain_code })
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn chain_code(&self) -> &ChainCode {
        &self.chain_code
    }

    pub fn into_private_key(self) -> PrivateKey {
        let Self { private_key, .. } = self;
        private_key
    }
}

/// Interprets 32 big-endian bytes as a secp256k1 scalar, rejecting values at or above the group order.
pub(crate) fn scalar_from_bytes(bytes: &[u8; 32]) -> Option<Scalar> {
    Scalar::from_repr((*bytes).into()).into_option()
}

pub(crate) fn scalar_to_bytes(scalar: &Scalar) -> [u8; 32] {
    let mut result = [0u8; 32];
    result.copy_from_slice(&scalar.to_bytes());
    result
}

/// True if `key` is 32 bytes, nonzero and strictly less than the secp256k1 group order.
pub fn is_valid_secp256k1_private_key(key: &[u8]) -> bool {
    let Ok(bytes) = <&[u8; SECP256K1_PRIVATE_KEY_SIZE]>::try_from(key) else {
        return false;
    };
    match scalar_from_bytes(bytes) {
        Some(scalar) => !bool::from(scalar.is_zero()),
        None => false,
    }
}

/// True if `key` is a 33-byte compressed or 65-byte uncompressed SEC1 encoding of a point on secp256k1.
pub fn is_valid_secp256k1_public_key(key: &[u8]) -> bool {
    if key.len() != COMPRESSED_PUBLIC_KEY_SIZE && key.len() != UNCOMPRESSED_PUBLIC_KEY_SIZE {
        return false;
    }
    k256::PublicKey::from_sec1_bytes(key).is_ok()
}

/// True if `key` is 32 bytes and decompresses to a point on Ed25519.
pub fn is_valid_ed25519_public_key(key: &[u8]) -> bool {
    let Ok(bytes) = <[u8; ED25519_PUBLIC_KEY_SIZE]>::try_from(key) else {
        return false;
    };
    curve25519_dalek::edwards::CompressedEdwardsY(bytes).decompress().is_some()
}

/// Expands a compressed secp256k1 public key to its 65-byte uncompressed form.
pub fn uncompress_secp256k1_public_key(
    key: &[u8; COMPRESSED_PUBLIC_KEY_SIZE],
) -> Result<[u8; UNCOMPRESSED_PUBLIC_KEY_SIZE], CryptoError> {
    let public_key = k256::PublicKey::from_sec1_bytes(key)
        .map_err(|_| CryptoError::InvalidParameters("not a valid secp256k1 public key"))?;
    let encoded = public_key.to_encoded_point(false);
    let mut result = [0u8; UNCOMPRESSED_PUBLIC_KEY_SIZE];
    result.copy_from_slice(encoded.as_bytes());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVE_ORDER: &str = "fffffffffffffffffffffffffffffffebaaedce6af48a03bbfd25e8cd0364141";

    fn order() -> [u8; 32] {
        let mut n = [0u8; 32];
        hex::decode_to_slice(CURVE_ORDER, &mut n).unwrap();
        n
    }

    #[test]
    fn private_key_validity() {
        let mut one = [0u8; 32];
        one[31] = 1;
        assert!(is_valid_secp256k1_private_key(&one));
        assert!(!is_valid_secp256k1_private_key(&[0u8; 32]));
        assert!(!is_valid_secp256k1_private_key(&order()));
        let mut below = order();
        below[31] -= 1;
        assert!(is_valid_secp256k1_private_key(&below));
        assert!(!is_valid_secp256k1_private_key(&[1u8; 31]));
        assert!(!is_valid_secp256k1_private_key(&[1u8; 33]));
    }

    #[test]
    fn public_key_of_one_is_generator() {
        let mut one = [0u8; 32];
        one[31] = 1;
        let key = PrivateKey::from_bytes(&one).unwrap();
        let public = key.public_key().unwrap();
        assert_eq!(hex::encode(public), "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798");
        assert!(is_valid_secp256k1_public_key(&public));
        let uncompressed = uncompress_secp256k1_public_key(&public).unwrap();
        assert_eq!(uncompressed[0], 0x04);
        assert!(is_valid_secp256k1_public_key(&uncompressed));
        assert_eq!(&uncompressed[1..33], &public[1..]);
    }

    #[test]
    fn public_key_validity() {
        assert!(!is_valid_secp256k1_public_key(&[2u8; 32]));
        let mut bad = [0u8; 33];
        bad[0] = 0x05;
        assert!(!is_valid_secp256k1_public_key(&bad));
        assert!(uncompress_secp256k1_public_key(&bad).is_err());
    }

    #[test]
    fn ed25519_public_key_validity() {
        let hex_p = "4dd896d542721742aff8671ba42aff0c4c846bea79065cf39a191bbeb11ea634";
        let good = hex::decode(hex_p).unwrap();
        assert!(is_valid_ed25519_public_key(&good));
        let hex_bad = "4dd896d542721742aff8671ba42aff0c4c846bea79065cf39a191bbeb11ea635";
        assert!(!is_valid_ed25519_public_key(&hex::decode(hex_bad).unwrap()));
        assert!(!is_valid_ed25519_public_key(&good[..31]));
    }

    #[test]
    fn debug_is_redacted() {
        let mut one = [0u8; 32];
        one[31] = 1;
        let key = PrivateKey::from_bytes(&one).unwrap();
        assert_eq!(format!("{key:?}"), "PrivateKey(***)");
    }
}
