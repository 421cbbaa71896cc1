pub mod address;
pub mod aggsig;
pub mod blinding;
pub mod bulletproof;
pub mod commitment;
pub mod config;
pub mod cryptography;
pub mod derivation;
pub mod encryption;
pub mod error;
pub mod mqs;
pub mod payment_proof;
pub mod tor;

#[cfg(test)]
mod tests;

pub use config::CurrencyInfo;
pub use derivation::{Keychain, Seed};
pub use error::{ConfigError, CryptoError};
