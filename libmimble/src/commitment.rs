//! Pedersen commitments and the per-commitment nonces used when building range proofs.

use crate::blinding::BlindingFactor;
use crate::cryptography::context::ZkpContext;
use crate::cryptography::keys::{is_valid_secp256k1_private_key, COMPRESSED_PUBLIC_KEY_SIZE};
use crate::derivation::Keychain;
use crate::error::CryptoError;
use blake2::{Blake2b, Blake2bMac};
use digest::consts::U32;
use digest::{Digest, Mac};
use log::{debug, error};
use std::fmt::{Debug, Display};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

pub const COMMITMENT_SIZE: usize = 33;
pub const NONCE_SIZE: usize = 32;

const COMMITMENT_EVEN_PREFIX: u8 = 0x08;
const COMMITMENT_ODD_PREFIX: u8 = 0x09;

type Blake2b256 = Blake2b<U32>;
type Blake2bMac256 = Blake2bMac<U32>;

/// A serialized Pedersen commitment: a `0x08`/`0x09` parity prefix followed by the x-coordinate of the point.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Commitment([u8; COMMITMENT_SIZE]);

impl Commitment {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if !commitment_is_valid(bytes) {
            return Err(CryptoError::InvalidParameters("not a valid commitment"));
        }
        let mut commitment = [0u8; COMMITMENT_SIZE];
        commitment.copy_from_slice(bytes);
        Ok(Self(commitment))
    }

    pub fn as_bytes(&self) -> &[u8; COMMITMENT_SIZE] {
        &self.0
    }

    pub(crate) fn to_library(self) -> secp256k1zkp::pedersen::Commitment {
        secp256k1zkp::pedersen::Commitment(self.0)
    }
}

impl Debug for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Commitment({})", hex::encode(self.0))
    }
}

impl Display for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// True if `bytes` is a 33-byte commitment whose x-coordinate lies on secp256k1.
pub fn commitment_is_valid(bytes: &[u8]) -> bool {
    if bytes.len() != COMMITMENT_SIZE {
        return false;
    }
    let parity = match bytes[0] {
        COMMITMENT_EVEN_PREFIX => 0x02,
        COMMITMENT_ODD_PREFIX => 0x03,
        _ => return false,
    };
    let mut point = [0u8; COMPRESSED_PUBLIC_KEY_SIZE];
    point[0] = parity;
    point[1..].copy_from_slice(&bytes[1..]);
    k256::PublicKey::from_sec1_bytes(&point).is_ok()
}

/// Commits to `value` with `blinding_factor` over the standard `G` and `H` generators.
pub fn commit_value(value: u64, blinding_factor: &BlindingFactor) -> Result<Commitment, CryptoError> {
    let ctx = ZkpContext::commit();
    let blind = ctx.secret_key(blinding_factor.as_bytes())?;
    let commitment = ctx.commit(value, blind).map_err(|e| {
        error!("Pedersen commitment failed: {e:?}");
        CryptoError::InternalError("Pedersen commitment failed")
    })?;
    Commitment::from_bytes(&commitment.0)
        .map_err(|_| CryptoError::InternalError("commitment library produced an invalid commitment"))
}

/// A 32-byte range proof nonce. Always a valid secp256k1 scalar.
#[derive(PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Nonce([u8; NONCE_SIZE]);

impl Nonce {
    pub fn from_bytes(bytes: &[u8; NONCE_SIZE]) -> Result<Self, CryptoError> {
        if !is_valid_secp256k1_private_key(bytes) {
            return Err(CryptoError::InvalidParameters("nonce is not a valid secp256k1 scalar"));
        }
        Ok(Self(*bytes))
    }

    pub fn as_bytes(&self) -> &[u8; NONCE_SIZE] {
        &self.0
    }
}

impl Debug for Nonce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Nonce(***)")
    }
}

/// `Blake2b-256(key = commitment, data = Blake2b-256(secret))`.
fn commitment_nonce(secret: &[u8], commitment: &Commitment) -> Result<Nonce, CryptoError> {
    let mut inner = Zeroizing::new([0u8; NONCE_SIZE]);
    inner.copy_from_slice(&Blake2b256::digest(secret));

    let mut mac = Blake2bMac256::new_from_slice(commitment.as_bytes())
        .map_err(|_| CryptoError::InternalError("Blake2b key rejected"))?;
    mac.update(&inner[..]);
    let mut output = mac.finalize().into_bytes();
    let mut nonce = Zeroizing::new([0u8; NONCE_SIZE]);
    nonce.copy_from_slice(&output);
    output.as_mut_slice().zeroize();

    Nonce::from_bytes(&nonce).map_err(|_| CryptoError::InternalError("derived nonce is not a valid scalar"))
}

impl Keychain {
    /// The nonce that lets the wallet rewind a range proof on `commitment`. Derived from the account root public key,
    /// so any holder of the account's public key can recompute it.
    pub fn rewind_nonce(&self, account: u32, commitment: &Commitment) -> Result<Nonce, CryptoError> {
        debug!("Deriving rewind nonce for account {account}");
        let public_key = self.account_public_key(account)?;
        commitment_nonce(&public_key, commitment)
    }

    /// The nonce only this seed can reproduce, used as the range proof's own randomness.
    pub fn private_nonce(&self, account: u32, commitment: &Commitment) -> Result<Nonce, CryptoError> {
        debug!("Deriving private nonce for account {account}");
        let root = self.private_key_and_chain_code(account)?;
        commitment_nonce(root.private_key().as_bytes(), commitment)
    }
}
