//! Capability contract every registered wallet implements.
//!
//! # Responsibility
//! - Define the `Wallet` and `WalletAccount` trait seams.
//! - Define the error taxonomy surfaced by capability operations.
//!
//! # Invariants
//! - Authorization state is private to the wallet implementation.
//! - Per-account operations return exactly one output per input, in order.
//! - A refused authorization is terminal for that call; nothing retries it.

use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::events::{EventKind, Unsubscribe};
use crate::wallet::types::{
    Bytes, ConnectOptions, ConnectResult, DecryptOptions, DecryptResult, EncryptOptions,
    EncryptResult, SignAndSendTransactionOptions, SignAndSendTransactionResult, SignResult,
    SignTransactionOptions, SignTransactionResult, WalletCipher, WalletInfo, WalletVersion,
};

/// Stable name of the accounts-changed wallet event.
pub const WALLET_EVENT_ACCOUNTS_CHANGED: &str = "accountsChanged";

/// Events emitted by wallets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WalletEvent {
    /// Accounts in the wallet changed; the app should call `connect` again.
    AccountsChanged,
}

impl EventKind for WalletEvent {
    fn as_str(self) -> &'static str {
        match self {
            Self::AccountsChanged => WALLET_EVENT_ACCOUNTS_CHANGED,
        }
    }
}

/// Callback for wallet events. The events carry no payload.
pub type WalletListener = Arc<dyn Fn() + Send + Sync>;

/// Wallet provider discovered through the registry.
#[async_trait]
pub trait Wallet: Send + Sync {
    fn version(&self) -> WalletVersion;

    /// Display name, canonical to the wallet provider.
    fn name(&self) -> &str;

    /// Data URL holding a base64-encoded SVG or raster image.
    fn icon(&self) -> &str;

    /// Ciphers supported for `encrypt`/`decrypt`.
    fn ciphers(&self) -> &[WalletCipher];

    /// Connects to one or more accounts in the wallet.
    ///
    /// # Errors
    /// - `AuthorizationRefused` when the user declines the prompt.
    async fn connect(&self, options: ConnectOptions) -> WalletResult<ConnectResult>;

    /// Subscribes to wallet events.
    fn on(&self, event: WalletEvent, listener: WalletListener) -> Unsubscribe;

    /// Metadata snapshot for display and diagnostics.
    fn info(&self) -> WalletInfo {
        WalletInfo {
            version: self.version(),
            name: self.name().to_string(),
            icon: self.icon().to_string(),
            ciphers: self.ciphers().to_vec(),
        }
    }
}

/// Account the app has been authorized to use.
///
/// Handles are created fresh by each successful `connect`; they stop working
/// once the wallet revokes the authorization.
#[async_trait]
pub trait WalletAccount: Send + Sync {
    /// Public key matching the secret key used to sign/encrypt/decrypt.
    fn public_key(&self) -> &[u8];

    /// Signs one or more serialized, possibly partially signed transactions.
    async fn sign_transaction(
        &self,
        transactions: Vec<Bytes>,
        options: SignTransactionOptions,
    ) -> WalletResult<SignTransactionResult>;

    /// Signs one or more serialized transactions and sends them to the network.
    async fn sign_and_send_transaction(
        &self,
        transactions: Vec<Bytes>,
        options: SignAndSendTransactionOptions,
    ) -> WalletResult<SignAndSendTransactionResult>;

    /// Signs one or more arbitrary byte arrays.
    ///
    /// Not called `sign_message` to avoid confusion with transaction messages.
    async fn sign(&self, data: Vec<Bytes>) -> WalletResult<SignResult>;

    /// Encrypts cleartexts with a secret shared with `public_key`.
    async fn encrypt(
        &self,
        public_key: Bytes,
        data: Vec<Bytes>,
        options: EncryptOptions,
    ) -> WalletResult<EncryptResult>;

    /// Decrypts ciphertexts with a secret shared with `public_key`.
    async fn decrypt(
        &self,
        public_key: Bytes,
        data: Vec<Bytes>,
        nonce: Vec<Bytes>,
        options: DecryptOptions,
    ) -> WalletResult<DecryptResult>;
}

/// Capability operation result alias.
pub type WalletResult<T> = Result<T, WalletError>;

/// Capability operation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// User or wallet declined the authorization prompt.
    AuthorizationRefused,
    /// Account authorization was revoked after `connect`.
    AccountNotAuthorized,
    /// Operation received zero inputs.
    EmptyInput(&'static str),
    /// `decrypt` received differing ciphertext and nonce counts.
    NonceCountMismatch { data: usize, nonce: usize },
    UnsupportedCipher(WalletCipher),
    /// Backend broke positional correspondence.
    OutputCountMismatch {
        operation: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Failure reported by the key-holding backend.
    Backend(String),
}

impl Display for WalletError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthorizationRefused => write!(f, "authorization was refused"),
            Self::AccountNotAuthorized => write!(f, "account is not authorized"),
            Self::EmptyInput(operation) => {
                write!(f, "{operation} requires at least one input")
            }
            Self::NonceCountMismatch { data, nonce } => write!(
                f,
                "decrypt requires one nonce per ciphertext: {data} ciphertexts, {nonce} nonces"
            ),
            Self::UnsupportedCipher(cipher) => write!(f, "cipher is unsupported: {cipher}"),
            Self::OutputCountMismatch {
                operation,
                expected,
                actual,
            } => write!(
                f,
                "{operation} returned {actual} outputs for {expected} inputs"
            ),
            Self::Backend(message) => write!(f, "wallet backend failed: {message}"),
        }
    }
}

impl Error for WalletError {}
