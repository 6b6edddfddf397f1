//! Wallet discovery registry and capability contract.
//!
//! Wallet providers register into one shared registry at the well-known
//! `solana.wallets` location; applications enumerate it, subscribe to later
//! registrations, and call capability operations directly on the wallets.

pub mod events;
pub mod logging;
pub mod registry;
pub mod wallet;

pub use events::{Emitter, EventKind, Listener, Unsubscribe};
pub use logging::{
    default_log_level, flush_logging, init_logging, init_logging_with, logging_status,
    LoggingConfig,
};
pub use registry::global::{
    global, initialize, try_install, wallets, GlobalScope, GlobalSolana, InitializationConflict,
};
pub use registry::wallets::{
    parse_registry_version, RegistryEvent, RegistryVersion, RegistryVersionError, WalletRegistry,
};
pub use wallet::contract::{
    Wallet, WalletAccount, WalletError, WalletEvent, WalletListener, WalletResult,
};
pub use wallet::standard::{
    AuthorizationPrompt, AuthorizationRequest, KeyringBackend, SealedPayload, StandardWallet,
};
pub use wallet::types::{
    parse_wallet_cipher, parse_wallet_network, parse_wallet_version, Bytes, ConnectOptions,
    ConnectResult, DecryptOptions, DecryptResult, EncryptOptions, EncryptResult,
    ParseValueError, SignAndSendTransactionOptions, SignAndSendTransactionResult, SignResult,
    SignTransactionOptions, SignTransactionResult, WalletCipher, WalletInfo, WalletNetwork,
    WalletVersion,
};
pub use wallet::validate::{validate_icon, validate_wallet, WalletShapeError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
