//! Wallet metadata shape checks.
//!
//! Method shape is enforced by the `Wallet` trait; this covers the metadata a
//! trait cannot constrain.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::wallet::contract::Wallet;
use crate::wallet::types::WalletCipher;

const MAX_REPORTED_ICON_CHARS: usize = 48;

static ICON_DATA_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:image/(svg\+xml|png|jpeg|webp|gif);base64,[A-Za-z0-9+/]+={0,2}$")
        .expect("icon data URL pattern is valid")
});

/// Validates wallet metadata.
///
/// Returns the first violation found.
pub fn validate_wallet(wallet: &dyn Wallet) -> Result<(), WalletShapeError> {
    if wallet.name().trim().is_empty() {
        return Err(WalletShapeError::EmptyName);
    }
    validate_icon(wallet.icon())?;
    validate_ciphers(wallet.ciphers())
}

/// Checks that `icon` is a base64 image data URL.
pub fn validate_icon(icon: &str) -> Result<(), WalletShapeError> {
    if ICON_DATA_URL.is_match(icon) {
        return Ok(());
    }
    let mut shown: String = icon.chars().take(MAX_REPORTED_ICON_CHARS).collect();
    if icon.chars().count() > MAX_REPORTED_ICON_CHARS {
        shown.push_str("...");
    }
    Err(WalletShapeError::InvalidIcon(shown))
}

fn validate_ciphers(ciphers: &[WalletCipher]) -> Result<(), WalletShapeError> {
    if ciphers.is_empty() {
        return Err(WalletShapeError::MissingCiphers);
    }
    let mut seen = BTreeSet::new();
    for cipher in ciphers {
        if !seen.insert(*cipher) {
            return Err(WalletShapeError::DuplicateCipher(*cipher));
        }
    }
    Ok(())
}

/// Wallet metadata violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletShapeError {
    EmptyName,
    /// Holds a truncated copy of the offending icon value.
    InvalidIcon(String),
    MissingCiphers,
    DuplicateCipher(WalletCipher),
}

impl Display for WalletShapeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "wallet name must not be empty"),
            Self::InvalidIcon(value) => {
                write!(f, "wallet icon must be a base64 image data URL: {value}")
            }
            Self::MissingCiphers => write!(f, "wallet must advertise at least one cipher"),
            Self::DuplicateCipher(cipher) => write!(f, "wallet cipher listed twice: {cipher}"),
        }
    }
}

impl Error for WalletShapeError {}
