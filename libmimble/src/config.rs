//! Currency configuration.
//!
//! Every MimbleWimble currency the device supports differs only in a handful of constants: the BIP44 coin type used
//! for key derivation, the version bytes of its MQS addresses, and which address schemes it accepts in payment
//! proofs. [`CurrencyInfo`] captures those constants. The built-in presets cover MimbleWimble Coin and Grin; other
//! forks can be described in a RON file and loaded with [`CurrencyInfo::load`].
//!
//! ```ron
//! CurrencyInfo(
//!     name: "MimbleWimble Coin",
//!     bip44_coin_type: 593,
//!     mqs_version: Some((1, 69)),
//!     mqs_address_payment_proof_allowed: true,
//!     tor_address_payment_proof_allowed: true,
//!     ed25519_address_payment_proof_allowed: false,
//! )
//! ```

use crate::derivation::HARDENED_PATH_MASK;
use crate::error::ConfigError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    /// Human-readable currency name.
    pub name: String,
    /// The coin type element of the `m/44'/coin_type'/account'/0/0` derivation path.
    pub bip44_coin_type: u32,
    /// The two version bytes that prefix a public key in an MQS address. `None` if the currency has no MQS addresses.
    #[serde(default)]
    pub mqs_version: Option<(u8, u8)>,
    pub mqs_address_payment_proof_allowed: bool,
    pub tor_address_payment_proof_allowed: bool,
    pub ed25519_address_payment_proof_allowed: bool,
}

impl CurrencyInfo {
    pub fn mimblewimble_coin() -> Self {
        Self {
            name: "MimbleWimble Coin".into(),
            bip44_coin_type: 593,
            mqs_version: Some((1, 69)),
            mqs_address_payment_proof_allowed: true,
            tor_address_payment_proof_allowed: true,
            ed25519_address_payment_proof_allowed: false,
        }
    }

    pub fn mimblewimble_coin_floonet() -> Self {
        Self { name: "MimbleWimble Coin Floonet".into(), mqs_version: Some((1, 121)), ..Self::mimblewimble_coin() }
    }

    pub fn grin() -> Self {
        Self {
            name: "Grin".into(),
            bip44_coin_type: 592,
            mqs_version: None,
            mqs_address_payment_proof_allowed: false,
            tor_address_payment_proof_allowed: false,
            ed25519_address_payment_proof_allowed: true,
        }
    }

    pub fn grin_testnet() -> Self {
        Self { name: "Grin Testnet".into(), ..Self::grin() }
    }

    /// Parses a currency description in RON format and checks it for consistency.
    pub fn from_ron_str(s: &str) -> Result<Self, ConfigError> {
        let info: CurrencyInfo = ron::from_str(s)?;
        info.validate()?;
        Ok(info)
    }

    /// Loads a currency description from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading currency configuration from {}", path.display());
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bip44_coin_type & HARDENED_PATH_MASK != 0 {
            return Err(ConfigError::InvalidValue(format!(
                "coin type {} collides with the hardened path marker",
                self.bip44_coin_type
            )));
        }
        if self.mqs_address_payment_proof_allowed && self.mqs_version.is_none() {
            return Err(ConfigError::InvalidValue("MQS payment proofs are allowed but no MQS version is set".into()));
        }
        Ok(())
    }
}

impl Default for CurrencyInfo {
    fn default() -> Self {
        Self::mimblewimble_coin()
    }
}
