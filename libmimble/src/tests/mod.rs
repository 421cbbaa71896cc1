use crate::config::CurrencyInfo;
use crate::derivation::{Keychain, Seed, SEED_SIZE};

mod transaction_tests;

/// The keychain most unit tests run against: a fixed seed on MimbleWimble Coin mainnet.
pub(crate) fn test_keychain() -> Keychain {
    keychain(7, CurrencyInfo::mimblewimble_coin())
}

pub(crate) fn keychain(seed_byte: u8, currency: CurrencyInfo) -> Keychain {
    Keychain::new(Seed::from_bytes([seed_byte; SEED_SIZE]), currency)
}
