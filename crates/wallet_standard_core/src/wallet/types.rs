//! Value types shared by the wallet capability contract.
//!
//! # Responsibility
//! - Define the closed enumerations wallets and apps exchange (versions,
//!   ciphers, networks).
//! - Define option/result records for connect and per-account operations.
//!
//! # Invariants
//! - Every enumeration has one stable string id used for parsing and serde.
//! - Result records preserve positional correspondence with their inputs.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use crate::wallet::contract::WalletAccount;

/// Opaque byte payload (public keys, transactions, signatures, ciphertexts).
pub type Bytes = Vec<u8>;

/// Stable string id for wallet API version `1.0.0`.
pub const WALLET_VERSION_1_0_0: &str = "1.0.0";
/// Stable string id for the NaCl box cipher.
pub const CIPHER_X25519_XSALSA20_POLY1305: &str = "x25519-xsalsa20-poly1305";
/// Stable string id for mainnet.
pub const NETWORK_MAINNET: &str = "mainnet";
/// Stable string id for devnet.
pub const NETWORK_DEVNET: &str = "devnet";
/// Stable string id for testnet.
pub const NETWORK_TESTNET: &str = "testnet";

/// Versions of the wallet API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WalletVersion {
    #[serde(rename = "1.0.0")]
    V1_0_0,
}

impl WalletVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1_0_0 => WALLET_VERSION_1_0_0,
        }
    }
}

impl Display for WalletVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses one wallet API version string.
pub fn parse_wallet_version(value: &str) -> Result<WalletVersion, ParseValueError> {
    match non_empty(value, "wallet version")? {
        WALLET_VERSION_1_0_0 => Ok(WalletVersion::V1_0_0),
        other => Err(ParseValueError::Unsupported {
            kind: "wallet version",
            value: other.to_string(),
        }),
    }
}

/// Ciphers supported by wallets for encryption and decryption.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum WalletCipher {
    /// Default for NaCl.
    #[default]
    #[serde(rename = "x25519-xsalsa20-poly1305")]
    X25519Xsalsa20Poly1305,
}

impl WalletCipher {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::X25519Xsalsa20Poly1305 => CIPHER_X25519_XSALSA20_POLY1305,
        }
    }
}

impl Display for WalletCipher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses one cipher id.
pub fn parse_wallet_cipher(value: &str) -> Result<WalletCipher, ParseValueError> {
    match non_empty(value, "cipher")? {
        CIPHER_X25519_XSALSA20_POLY1305 => Ok(WalletCipher::X25519Xsalsa20Poly1305),
        other => Err(ParseValueError::Unsupported {
            kind: "cipher",
            value: other.to_string(),
        }),
    }
}

/// Cluster to simulate and send transactions against.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum WalletNetwork {
    /// e.g. https://api.mainnet-beta.solana.com
    #[default]
    Mainnet,
    /// e.g. https://api.devnet.solana.com
    Devnet,
    /// e.g. https://api.testnet.solana.com
    Testnet,
}

impl WalletNetwork {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => NETWORK_MAINNET,
            Self::Devnet => NETWORK_DEVNET,
            Self::Testnet => NETWORK_TESTNET,
        }
    }
}

impl Display for WalletNetwork {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses one network name. Names are case-sensitive lowercase ids.
pub fn parse_wallet_network(value: &str) -> Result<WalletNetwork, ParseValueError> {
    match non_empty(value, "network")? {
        NETWORK_MAINNET => Ok(WalletNetwork::Mainnet),
        NETWORK_DEVNET => Ok(WalletNetwork::Devnet),
        NETWORK_TESTNET => Ok(WalletNetwork::Testnet),
        other => Err(ParseValueError::Unsupported {
            kind: "network",
            value: other.to_string(),
        }),
    }
}

fn non_empty<'a>(value: &'a str, kind: &'static str) -> Result<&'a str, ParseValueError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(ParseValueError::Empty(kind));
    }
    Ok(normalized)
}

/// Parse errors for stable string ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseValueError {
    Empty(&'static str),
    Unsupported { kind: &'static str, value: String },
}

impl Display for ParseValueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(kind) => write!(f, "{kind} value must not be empty"),
            Self::Unsupported { kind, value } => write!(f, "{kind} is unsupported: {value}"),
        }
    }
}

impl Error for ParseValueError {}

/// Options to configure connecting.
///
/// With `public_keys`:
/// - only requested accounts the wallet recognizes are returned;
/// - already-authorized accounts are returned without prompting;
/// - unless `silent`, the wallet may prompt for the rest.
///
/// Without `public_keys`:
/// - `silent == false` prompts the user to select accounts;
/// - `silent == true` returns existing authorizations only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_keys: Option<Vec<Bytes>>,
    #[serde(default)]
    pub silent: bool,
}

impl ConnectOptions {
    /// Connect without prompting.
    pub fn silent() -> Self {
        Self {
            public_keys: None,
            silent: true,
        }
    }

    /// Connect to specific accounts.
    pub fn with_public_keys(public_keys: Vec<Bytes>) -> Self {
        Self {
            public_keys: Some(public_keys),
            silent: false,
        }
    }
}

/// Result of connecting.
#[derive(Clone)]
pub struct ConnectResult {
    /// Accounts the app has been authorized to use.
    pub accounts: Vec<Arc<dyn WalletAccount>>,
    /// True when the wallet holds accounts beyond `accounts`.
    pub has_more_accounts: bool,
}

impl ConnectResult {
    pub fn public_keys(&self) -> Vec<Bytes> {
        self.accounts
            .iter()
            .map(|account| account.public_key().to_vec())
            .collect()
    }
}

impl Debug for ConnectResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectResult")
            .field("accounts", &self.accounts.len())
            .field("has_more_accounts", &self.has_more_accounts)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignTransactionOptions {
    /// Cluster to simulate against; mainnet when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<WalletNetwork>,
}

/// Signed, serialized transactions.
///
/// Whole transactions are returned rather than signatures so multisig and
/// meta-transaction wallets can hand back a modified transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignTransactionResult {
    pub transactions: Vec<Bytes>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignAndSendTransactionOptions {
    /// Cluster to simulate and send against; mainnet when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<WalletNetwork>,
}

/// "Primary" signatures of sent transactions, as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignAndSendTransactionResult {
    pub signatures: Vec<Bytes>,
}

/// Signatures over arbitrary byte payloads, as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignResult {
    pub signatures: Vec<Bytes>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptOptions {
    /// Preferred cipher. Advisory: the wallet may pick another supported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cipher: Option<WalletCipher>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptResult {
    /// Ciphertexts, one per cleartext.
    pub data: Vec<Bytes>,
    /// Nonces, one per ciphertext.
    pub nonce: Vec<Bytes>,
    /// Cipher actually used.
    pub cipher: WalletCipher,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptOptions {
    /// Cipher the ciphertexts were produced with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cipher: Option<WalletCipher>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptResult {
    /// Cleartexts, one per ciphertext.
    pub data: Vec<Bytes>,
    /// Cipher used for decryption.
    pub cipher: WalletCipher,
}

/// Serializable metadata snapshot of one wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletInfo {
    pub version: WalletVersion,
    pub name: String,
    pub icon: String,
    pub ciphers: Vec<WalletCipher>,
}
