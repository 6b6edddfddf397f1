//! CLI smoke entry point.
//!
//! # Responsibility
//! - Exercise the registry end to end: initialize, register, list, connect.
//! - Keep output deterministic (JSON lines) for quick local sanity checks.
//!
//! Logging is enabled when `WALLET_STANDARD_LOG_DIR` is set.

use async_trait::async_trait;
use futures::executor::block_on;
use log::info;
use serde_json::json;
use std::process::ExitCode;
use std::sync::Arc;
use wallet_standard_core::{
    core_version, flush_logging, init_logging_with, initialize, AuthorizationPrompt,
    AuthorizationRequest, Bytes, ConnectOptions, KeyringBackend, LoggingConfig, RegistryEvent,
    SealedPayload, StandardWallet, Wallet, WalletCipher, WalletNetwork,
};

const DEMO_ICON: &str = "data:image/svg+xml;base64,PHN2ZyB4bWxucz0iaHR0cDovL3d3dy53My5vcmcvMjAwMC9zdmciLz4=";

/// Placeholder keyring: echoes payloads instead of doing cryptography.
struct EchoKeyring {
    keys: Vec<Bytes>,
}

#[async_trait]
impl KeyringBackend for EchoKeyring {
    fn public_keys(&self) -> Vec<Bytes> {
        self.keys.clone()
    }

    async fn sign_transactions(
        &self,
        _signer: &[u8],
        transactions: &[Bytes],
        _network: WalletNetwork,
    ) -> Result<Vec<Bytes>, String> {
        Ok(transactions.to_vec())
    }

    async fn sign_and_send_transactions(
        &self,
        signer: &[u8],
        transactions: &[Bytes],
        _network: WalletNetwork,
    ) -> Result<Vec<Bytes>, String> {
        Ok(transactions.iter().map(|_| signer.to_vec()).collect())
    }

    async fn sign_messages(&self, signer: &[u8], data: &[Bytes]) -> Result<Vec<Bytes>, String> {
        Ok(data.iter().map(|_| signer.to_vec()).collect())
    }

    async fn encrypt(
        &self,
        _signer: &[u8],
        _peer: &[u8],
        _cipher: WalletCipher,
        data: &[Bytes],
    ) -> Result<Vec<SealedPayload>, String> {
        Ok(data
            .iter()
            .map(|cleartext| SealedPayload {
                ciphertext: cleartext.clone(),
                nonce: Vec::new(),
            })
            .collect())
    }

    async fn decrypt(
        &self,
        _signer: &[u8],
        _peer: &[u8],
        _cipher: WalletCipher,
        data: &[Bytes],
        _nonce: &[Bytes],
    ) -> Result<Vec<Bytes>, String> {
        Ok(data.to_vec())
    }
}

/// Approves the first candidate, like a user picking one account.
struct ApproveFirst;

#[async_trait]
impl AuthorizationPrompt for ApproveFirst {
    async fn authorize(&self, request: AuthorizationRequest) -> Option<Vec<Bytes>> {
        Some(request.candidates.into_iter().take(1).collect())
    }
}

fn main() -> ExitCode {
    match LoggingConfig::from_env().and_then(|config| match config {
        Some(config) => init_logging_with(config),
        None => Ok(()),
    }) {
        Ok(()) => {}
        Err(err) => {
            eprintln!("wallet_standard_cli logging error: {err}");
            return ExitCode::FAILURE;
        }
    }

    println!("{}", json!({ "core_version": core_version() }));

    let registry = initialize();
    let unsubscribe = registry.on(RegistryEvent::Registered, |wallets| {
        for wallet in wallets {
            println!("{}", json!({ "registered": wallet.name() }));
        }
    });

    let wallet = Arc::new(StandardWallet::new(
        "Demo Wallet",
        DEMO_ICON,
        vec![WalletCipher::X25519Xsalsa20Poly1305],
        Arc::new(EchoKeyring {
            keys: vec![vec![1; 32], vec![2; 32]],
        }),
        Arc::new(ApproveFirst),
    ));
    registry.register([wallet as Arc<dyn Wallet>]);
    unsubscribe.unsubscribe();

    for wallet in registry.get() {
        match serde_json::to_string(&wallet.info()) {
            Ok(line) => println!("{line}"),
            Err(err) => {
                eprintln!("wallet_standard_cli serialize error: {err}");
                return ExitCode::FAILURE;
            }
        }

        for options in [ConnectOptions::silent(), ConnectOptions::default()] {
            let silent = options.silent;
            match block_on(wallet.connect(options)) {
                Ok(result) => println!(
                    "{}",
                    json!({
                        "wallet": wallet.name(),
                        "silent": silent,
                        "accounts": result.accounts.len(),
                        "has_more_accounts": result.has_more_accounts,
                    })
                ),
                Err(err) => println!(
                    "{}",
                    json!({ "wallet": wallet.name(), "silent": silent, "error": err.to_string() })
                ),
            }
        }
    }

    info!("event=cli_done module=cli status=ok wallets={}", registry.len());
    flush_logging();
    ExitCode::SUCCESS
}
