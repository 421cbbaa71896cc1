//! MQS (MWC messaging) addresses: Base58Check over two currency version bytes followed by a compressed secp256k1
//! public key.

use crate::config::CurrencyInfo;
use crate::cryptography::keys::{is_valid_secp256k1_public_key, COMPRESSED_PUBLIC_KEY_SIZE};
use crate::error::CryptoError;
use log::warn;

pub const MQS_ADDRESS_SIZE: usize = 52;
const MQS_VERSION_SIZE: usize = 2;
const DECODED_MQS_ADDRESS_SIZE: usize = MQS_VERSION_SIZE + COMPRESSED_PUBLIC_KEY_SIZE;

fn mqs_version(currency: &CurrencyInfo) -> Result<[u8; MQS_VERSION_SIZE], CryptoError> {
    currency
        .mqs_version
        .map(|(a, b)| [a, b])
        .ok_or(CryptoError::InvalidParameters("currency has no MQS addresses"))
}

pub fn mqs_address_from_public_key(
    currency: &CurrencyInfo,
    public_key: &[u8; COMPRESSED_PUBLIC_KEY_SIZE],
) -> Result<[u8; MQS_ADDRESS_SIZE], CryptoError> {
    let mut decoded = [0u8; DECODED_MQS_ADDRESS_SIZE];
    decoded[..MQS_VERSION_SIZE].copy_from_slice(&mqs_version(currency)?);
    decoded[MQS_VERSION_SIZE..].copy_from_slice(public_key);
    let encoded = bs58::encode(decoded).with_check().into_string();
    let mut address = [0u8; MQS_ADDRESS_SIZE];
    if encoded.len() != MQS_ADDRESS_SIZE {
        return Err(CryptoError::InternalError("MQS address has an unexpected length"));
    }
    address.copy_from_slice(encoded.as_bytes());
    Ok(address)
}

/// Decodes `address` for `currency` and returns its compressed public key.
pub fn public_key_from_mqs_address(
    currency: &CurrencyInfo,
    address: &[u8],
) -> Result<[u8; COMPRESSED_PUBLIC_KEY_SIZE], CryptoError> {
    let version = mqs_version(currency)?;
    if address.len() != MQS_ADDRESS_SIZE {
        return Err(CryptoError::InvalidParameters("MQS address has the wrong length"));
    }
    let decoded = bs58::decode(address)
        .with_check(None)
        .into_vec()
        .map_err(|_| CryptoError::InvalidParameters("MQS address is not valid Base58Check"))?;
    if decoded.len() != DECODED_MQS_ADDRESS_SIZE {
        return Err(CryptoError::InvalidParameters("MQS address decodes to the wrong length"));
    }
    if decoded[..MQS_VERSION_SIZE] != version {
        return Err(CryptoError::InvalidParameters("MQS address is for a different network"));
    }
    let public_key = &decoded[MQS_VERSION_SIZE..];
    if !is_valid_secp256k1_public_key(public_key) {
        return Err(CryptoError::InvalidParameters("MQS address does not contain a valid public key"));
    }
    let mut result = [0u8; COMPRESSED_PUBLIC_KEY_SIZE];
    result.copy_from_slice(public_key);
    Ok(result)
}

pub fn is_valid_mqs_address(currency: &CurrencyInfo, address: &[u8]) -> bool {
    match public_key_from_mqs_address(currency, address) {
        Ok(_) => true,
        Err(e) => {
            warn!("Rejected MQS address: {e}");
            false
        }
    }
}
