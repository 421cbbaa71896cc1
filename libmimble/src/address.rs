//! Address keys and the Ed25519 to X25519 conversion.
//!
//! Address keys hang off a second derivation tree seeded from the account. The account's blinding factor for the fixed
//! value 713 is hashed into a fresh node, and one more child step with the address index produces the key. The child
//! step always runs on secp256k1 so that every curve shares the same chaining. The resulting 32 bytes are then used
//! as a secp256k1 scalar for MQS addresses, or as an Ed25519 secret key for Tor addresses.

use crate::blinding::SwitchType;
use crate::cryptography::keys::{ExtendedPrivateKey, PrivateKey, COMPRESSED_PUBLIC_KEY_SIZE, ED25519_PUBLIC_KEY_SIZE};
use crate::derivation::{derive_child_key, hmac_sha512, Keychain};
use crate::error::CryptoError;
use crate::mqs::{mqs_address_from_public_key, MQS_ADDRESS_SIZE};
use crate::tor::{tor_address_from_public_key, TOR_ADDRESS_SIZE};
use curve25519_dalek::edwards::CompressedEdwardsY;
use ed25519_dalek::SigningKey;
use log::debug;
use sha2::{Digest, Sha512};
use x25519_dalek::StaticSecret;
use zeroize::Zeroizing;

/// Value of the blinding factor that seeds the address tree.
const ADDRESS_PRIVATE_KEY_BLINDING_FACTOR_VALUE: u64 = 713;
const ADDRESS_PRIVATE_KEY_HASH_KEY: &[u8] = b"Grinbox_seed";
/// Index of the address key behind the account's Tor and MQS addresses.
pub const DEFAULT_ADDRESS_INDEX: u32 = 0;
pub const X25519_KEY_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressCurve {
    Secp256k1,
    Ed25519,
}

/// A derived address key, tagged with the curve it is meant for.
#[derive(Debug, PartialEq, Eq)]
pub struct AddressPrivateKey {
    curve: AddressCurve,
    key: PrivateKey,
}

impl AddressPrivateKey {
    pub fn curve(&self) -> AddressCurve {
        self.curve
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.key.as_bytes()
    }

    /// The compressed secp256k1 public key. Only defined for secp256k1 address keys.
    pub fn secp256k1_public_key(&self) -> Result<[u8; COMPRESSED_PUBLIC_KEY_SIZE], CryptoError> {
        match self.curve {
            AddressCurve::Secp256k1 => self.key.public_key(),
            AddressCurve::Ed25519 => Err(CryptoError::InvalidParameters("address key is not a secp256k1 key")),
        }
    }

    /// The Ed25519 signing key, with the address key as its secret seed. Only defined for Ed25519 address keys.
    pub fn ed25519_signing_key(&self) -> Result<SigningKey, CryptoError> {
        match self.curve {
            AddressCurve::Ed25519 => Ok(SigningKey::from_bytes(self.key.as_bytes())),
            AddressCurve::Secp256k1 => Err(CryptoError::InvalidParameters("address key is not an Ed25519 key")),
        }
    }
}

impl Keychain {
    pub fn address_private_key(
        &self,
        account: u32,
        index: u32,
        curve: AddressCurve,
    ) -> Result<AddressPrivateKey, CryptoError> {
        debug!("Deriving {curve:?} address key {index} for account {account}");
        let blinding_factor = self.derive_blinding_factor(
            account,
            ADDRESS_PRIVATE_KEY_BLINDING_FACTOR_VALUE,
            &[],
            SwitchType::Regular,
        )?;
        let node = hmac_sha512(ADDRESS_PRIVATE_KEY_HASH_KEY, &[&blinding_factor.as_bytes()[..]])?;
        let mut key = ExtendedPrivateKey::from_node(&node)?;
        derive_child_key(&mut key, &[index])?;
        Ok(AddressPrivateKey { curve, key: key.into_private_key() })
    }

    /// The Ed25519 public key behind the account's Tor address.
    pub fn ed25519_public_key(&self, account: u32) -> Result<[u8; ED25519_PUBLIC_KEY_SIZE], CryptoError> {
        let key = self.address_private_key(account, DEFAULT_ADDRESS_INDEX, AddressCurve::Ed25519)?;
        Ok(key.ed25519_signing_key()?.verifying_key().to_bytes())
    }

    pub fn tor_address(&self, account: u32) -> Result<[u8; TOR_ADDRESS_SIZE], CryptoError> {
        Ok(tor_address_from_public_key(&self.ed25519_public_key(account)?))
    }

    /// The secp256k1 public key behind the account's MQS address.
    pub fn mqs_public_key(&self, account: u32) -> Result<[u8; COMPRESSED_PUBLIC_KEY_SIZE], CryptoError> {
        let key = self.address_private_key(account, DEFAULT_ADDRESS_INDEX, AddressCurve::Secp256k1)?;
        key.secp256k1_public_key()
    }

    pub fn mqs_address(&self, account: u32) -> Result<[u8; MQS_ADDRESS_SIZE], CryptoError> {
        mqs_address_from_public_key(self.currency(), &self.mqs_public_key(account)?)
    }
}

/// Converts an Ed25519 secret key into the X25519 secret with the same scalar: the clamped low half of
/// `SHA-512(secret)`.
pub fn x25519_private_key_from_ed25519_private_key(secret: &[u8; 32]) -> StaticSecret {
    let mut hash = Sha512::digest(secret);
    let mut scalar = Zeroizing::new([0u8; X25519_KEY_SIZE]);
    scalar.copy_from_slice(&hash[..X25519_KEY_SIZE]);
    hash.as_mut_slice().fill(0);
    scalar[0] &= 248;
    scalar[31] &= 127;
    scalar[31] |= 64;
    StaticSecret::from(*scalar)
}

/// Maps an Ed25519 public key to its X25519 counterpart, `u = (1 + y) / (1 - y)`.
pub fn x25519_public_key_from_ed25519_public_key(
    public_key: &[u8; ED25519_PUBLIC_KEY_SIZE],
) -> Result<x25519_dalek::PublicKey, CryptoError> {
    let point = CompressedEdwardsY(*public_key)
        .decompress()
        .ok_or(CryptoError::InvalidParameters("not a valid Ed25519 public key"))?;
    Ok(x25519_dalek::PublicKey::from(point.to_montgomery().to_bytes()))
}
