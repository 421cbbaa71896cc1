//! AES-CBC with an always-present padding block.
//!
//! The plaintext is padded up to the next block boundary with bytes whose value is the pad length. Aligned input
//! still gets a full block of padding, so the ciphertext is always strictly longer than the plaintext. The IV is all
//! zeros; callers use a fresh key per message.

use crate::error::CryptoError;
use aes::{Aes128, Aes192, Aes256};
use cbc::cipher::block_padding::NoPadding;
use cbc::cipher::{BlockCipher, BlockEncryptMut, KeyInit, KeyIvInit};
use log::{debug, error};

pub const AES_BLOCK_SIZE: usize = 16;

pub fn encrypted_data_length(data_length: usize) -> usize {
    data_length + AES_BLOCK_SIZE - data_length % AES_BLOCK_SIZE
}

/// Pads and encrypts `data` with `key` (16, 24 or 32 bytes) into the front of `result`, returning the ciphertext
/// length.
pub fn encrypt_data(result: &mut [u8], data: &[u8], key: &[u8]) -> Result<usize, CryptoError> {
    let encrypt: fn(&[u8], &mut [u8]) -> Result<(), CryptoError> = match key.len() {
        16 => cbc_encrypt::<Aes128>,
        24 => cbc_encrypt::<Aes192>,
        32 => cbc_encrypt::<Aes256>,
        _ => return Err(CryptoError::InvalidParameters("AES key must be 16, 24 or 32 bytes")),
    };
    let length = encrypted_data_length(data.len());
    if result.len() < length {
        return Err(CryptoError::InvalidParameters("encryption output buffer is too small"));
    }
    debug!("Encrypting {} bytes with a {}-bit key", data.len(), key.len() * 8);
    let buffer = &mut result[..length];
    buffer[..data.len()].copy_from_slice(data);
    // at most AES_BLOCK_SIZE, so it fits a byte
    let pad = (length - data.len()) as u8;
    buffer[data.len()..].fill(pad);

    if let Err(e) = encrypt(key, buffer) {
        buffer.fill(0);
        return Err(e);
    }
    Ok(length)
}

/// Encrypts the block-aligned `buffer` in place. The key schedule is wiped when the encryptor drops.
fn cbc_encrypt<C>(key: &[u8], buffer: &mut [u8]) -> Result<(), CryptoError>
where
    C: BlockCipher + BlockEncryptMut + KeyInit,
{
    let iv = [0u8; AES_BLOCK_SIZE];
    let encryptor = cbc::Encryptor::<C>::new_from_slices(key, &iv)
        .map_err(|_| CryptoError::InvalidParameters("AES key has an invalid length"))?;
    let length = buffer.len();
    encryptor.encrypt_padded_mut::<NoPadding>(buffer, length).map_err(|_| {
        error!("AES-CBC encryption rejected a block-aligned buffer");
        CryptoError::InternalError("AES-CBC encryption failed")
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbc::cipher::BlockDecryptMut;
    use rand::RngCore;

    fn decrypt(ciphertext: &[u8], key: &[u8; 32]) -> Vec<u8> {
        let iv = [0u8; AES_BLOCK_SIZE];
        let mut buffer = ciphertext.to_vec();
        let decryptor = cbc::Decryptor::<Aes256>::new_from_slices(key, &iv).unwrap();
        decryptor.decrypt_padded_mut::<NoPadding>(&mut buffer).unwrap().to_vec()
    }

    #[test]
    fn output_is_always_longer_than_input() {
        assert_eq!(encrypted_data_length(0), 16);
        assert_eq!(encrypted_data_length(1), 16);
        assert_eq!(encrypted_data_length(15), 16);
        assert_eq!(encrypted_data_length(16), 32);
        assert_eq!(encrypted_data_length(17), 32);
        for n in 0..100 {
            let length = encrypted_data_length(n);
            assert!(length > n);
            assert_eq!(length % AES_BLOCK_SIZE, 0);
        }
    }

    #[test]
    fn aligned_input_gets_a_full_padding_block() {
        let key = [0x42u8; 32];
        let data = [7u8; 16];
        let mut result = [0u8; 32];
        assert_eq!(encrypt_data(&mut result, &data, &key).unwrap(), 32);
        let plaintext = decrypt(&result, &key);
        assert_eq!(&plaintext[..16], &data);
        assert_eq!(&plaintext[16..], &[16u8; 16]);
    }

    #[test]
    fn random_round_trips() {
        let mut rng = rand::rng();
        let mut key = [0u8; 32];
        rng.fill_bytes(&mut key);
        for n in [0usize, 1, 5, 15, 31, 33, 64] {
            let mut data = vec![0u8; n];
            rng.fill_bytes(&mut data);
            let mut result = vec![0u8; encrypted_data_length(n)];
            encrypt_data(&mut result, &data, &key).unwrap();
            let plaintext = decrypt(&result, &key);
            let pad = plaintext.len() - n;
            assert_eq!(&plaintext[..n], &data[..]);
            assert!(plaintext[n..].iter().all(|b| *b as usize == pad));
        }
    }

    #[test]
    fn all_aes_key_sizes_are_accepted() {
        let data = b"payment proof";
        for key_length in [16, 24, 32] {
            let key = vec![1u8; key_length];
            let mut result = [0u8; 16];
            assert_eq!(encrypt_data(&mut result, data, &key).unwrap(), 16);
        }
        let mut result = [0u8; 16];
        assert!(encrypt_data(&mut result, data, &[1u8; 20]).unwrap_err().is_invalid_parameters());
    }

    #[test]
    fn bad_key_leaves_the_output_untouched() {
        let mut result = [0xaau8; 32];
        let err = encrypt_data(&mut result, b"never written", &[1u8; 20]).unwrap_err();
        assert!(err.is_invalid_parameters());
        assert!(result.iter().all(|b| *b == 0xaa));
    }

    #[test]
    fn small_output_buffer_is_rejected() {
        let mut result = [0u8; 16];
        assert!(encrypt_data(&mut result, &[0u8; 16], &[0u8; 16]).unwrap_err().is_invalid_parameters());
    }

    #[test]
    fn cbc_with_zero_iv_matches_nist_vector() {
        // NIST SP 800-38A F.2.1, first block: with a zero IV the first CBC block is plain AES of the plaintext xor IV.
        let key = hex::decode("2b7e151628aed2a6abf7158809cf4f3c").unwrap();
        let iv = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let block = hex::decode("6bc1bee22e409f96e93d7e117393172a").unwrap();
        let data: Vec<u8> = block.iter().zip(iv.iter()).map(|(b, i)| b ^ i).collect();
        let mut result = [0u8; 32];
        encrypt_data(&mut result, &data, &key).unwrap();
        assert_eq!(hex::encode(&result[..16]), "7649abac8119b246cee98e9b12e9197d");
    }
}
