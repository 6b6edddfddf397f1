//! Reference wallet implementing the account authorization state model.
//!
//! # Responsibility
//! - Track which held accounts the app is authorized to use.
//! - Gate every account operation on that authorization.
//! - Delegate key material and cryptography to a `KeyringBackend`, and user
//!   interaction to an `AuthorizationPrompt`.
//!
//! # Invariants
//! - Silent connects never reach the prompt.
//! - Explicit public keys select the recognized, authorized subset; unknown
//!   keys are skipped, a declined prompt fails the whole call.
//! - Revocation emits `accountsChanged` and invalidates existing handles.
//! - Authorization never outlives the backend holding the key.
//! - Logs carry names and counts only, never key or payload bytes.

use async_trait::async_trait;
use log::{info, warn};
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::events::{Emitter, Unsubscribe};
use crate::wallet::contract::{
    Wallet, WalletAccount, WalletError, WalletEvent, WalletListener, WalletResult,
};
use crate::wallet::types::{
    Bytes, ConnectOptions, ConnectResult, DecryptOptions, DecryptResult, EncryptOptions,
    EncryptResult, SignAndSendTransactionOptions, SignAndSendTransactionResult, SignResult,
    SignTransactionOptions, SignTransactionResult, WalletCipher, WalletNetwork, WalletVersion,
};

/// One ciphertext with the nonce it was sealed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedPayload {
    pub ciphertext: Bytes,
    pub nonce: Bytes,
}

/// Key-holding collaborator performing the actual cryptography.
///
/// Every batch method must return one output per input, in order.
#[async_trait]
pub trait KeyringBackend: Send + Sync {
    /// Public keys of held accounts, in display order.
    fn public_keys(&self) -> Vec<Bytes>;

    async fn sign_transactions(
        &self,
        signer: &[u8],
        transactions: &[Bytes],
        network: WalletNetwork,
    ) -> Result<Vec<Bytes>, String>;

    /// Signs and submits; returns the primary signature of each transaction.
    async fn sign_and_send_transactions(
        &self,
        signer: &[u8],
        transactions: &[Bytes],
        network: WalletNetwork,
    ) -> Result<Vec<Bytes>, String>;

    async fn sign_messages(&self, signer: &[u8], data: &[Bytes]) -> Result<Vec<Bytes>, String>;

    async fn encrypt(
        &self,
        signer: &[u8],
        peer: &[u8],
        cipher: WalletCipher,
        data: &[Bytes],
    ) -> Result<Vec<SealedPayload>, String>;

    async fn decrypt(
        &self,
        signer: &[u8],
        peer: &[u8],
        cipher: WalletCipher,
        data: &[Bytes],
        nonce: &[Bytes],
    ) -> Result<Vec<Bytes>, String>;
}

/// Authorization request shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    pub wallet_name: String,
    /// Held accounts the user may approve.
    pub candidates: Vec<Bytes>,
    /// True when the app named these accounts itself.
    pub requested_by_app: bool,
}

/// User-facing authorization collaborator.
#[async_trait]
pub trait AuthorizationPrompt: Send + Sync {
    /// Returns the approved subset of `request.candidates`, or `None` when the
    /// user declines.
    async fn authorize(&self, request: AuthorizationRequest) -> Option<Vec<Bytes>>;
}

struct WalletState {
    name: String,
    ciphers: Vec<WalletCipher>,
    backend: Arc<dyn KeyringBackend>,
    authorized: Mutex<Vec<Bytes>>,
    events: Emitter<WalletEvent, ()>,
}

impl WalletState {
    fn authorized(&self) -> MutexGuard<'_, Vec<Bytes>> {
        self.authorized
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn is_authorized(&self, public_key: &[u8]) -> bool {
        self.authorized().iter().any(|key| key == public_key)
    }

    fn holds(&self, public_key: &[u8]) -> bool {
        self.backend
            .public_keys()
            .iter()
            .any(|key| key == public_key)
    }

    /// Drops authorizations for keys the backend no longer holds.
    fn retain_held(&self, held: &[Bytes]) {
        let pruned = {
            let mut authorized = self.authorized();
            let before = authorized.len();
            authorized.retain(|key| held.contains(key));
            before - authorized.len()
        };
        if pruned > 0 {
            info!(
                "event=authorization_pruned module=wallet status=ok wallet={} pruned={}",
                self.name, pruned
            );
        }
    }

    fn authorize_all(&self, keys: impl IntoIterator<Item = Bytes>) {
        let mut authorized = self.authorized();
        for key in keys {
            if !authorized.contains(&key) {
                authorized.push(key);
            }
        }
    }
}

/// In-process wallet honoring the connect/authorization contract.
pub struct StandardWallet {
    icon: String,
    state: Arc<WalletState>,
    prompt: Arc<dyn AuthorizationPrompt>,
}

impl StandardWallet {
    pub fn new(
        name: impl Into<String>,
        icon: impl Into<String>,
        ciphers: Vec<WalletCipher>,
        backend: Arc<dyn KeyringBackend>,
        prompt: Arc<dyn AuthorizationPrompt>,
    ) -> Self {
        Self {
            icon: icon.into(),
            state: Arc::new(WalletState {
                name: name.into(),
                ciphers,
                backend,
                authorized: Mutex::new(Vec::new()),
                events: Emitter::new(),
            }),
            prompt,
        }
    }

    /// Public keys the app is currently authorized to use and the backend
    /// still holds.
    pub fn authorized_public_keys(&self) -> Vec<Bytes> {
        let held = self.state.backend.public_keys();
        self.state
            .authorized()
            .iter()
            .filter(|key| held.contains(key))
            .cloned()
            .collect()
    }

    /// Revokes one account. Returns whether it was authorized.
    pub fn revoke(&self, public_key: &[u8]) -> bool {
        let removed = {
            let mut authorized = self.state.authorized();
            let before = authorized.len();
            authorized.retain(|key| key != public_key);
            before != authorized.len()
        };
        if removed {
            info!(
                "event=authorization_revoked module=wallet status=ok wallet={} revoked=1",
                self.state.name
            );
            self.notify_accounts_changed();
        }
        removed
    }

    /// Revokes every account. Returns how many were authorized.
    pub fn revoke_all(&self) -> usize {
        let revoked = std::mem::take(&mut *self.state.authorized()).len();
        if revoked > 0 {
            info!(
                "event=authorization_revoked module=wallet status=ok wallet={} revoked={}",
                self.state.name, revoked
            );
            self.notify_accounts_changed();
        }
        revoked
    }

    /// Emits `accountsChanged`, e.g. after the backend gained or lost keys.
    ///
    /// Authorizations for keys the backend no longer holds are dropped first.
    pub fn notify_accounts_changed(&self) {
        self.state.retain_held(&self.state.backend.public_keys());
        self.state.events.emit(WalletEvent::AccountsChanged, &());
    }

    async fn request_authorization(
        &self,
        candidates: Vec<Bytes>,
        requested_by_app: bool,
    ) -> WalletResult<Vec<Bytes>> {
        let request = AuthorizationRequest {
            wallet_name: self.state.name.clone(),
            candidates: candidates.clone(),
            requested_by_app,
        };
        match self.prompt.authorize(request).await {
            Some(approved) => Ok(approved
                .into_iter()
                .filter(|key| candidates.contains(key))
                .collect()),
            None => {
                warn!(
                    "event=wallet_connect module=wallet status=refused wallet={} candidates={}",
                    self.state.name,
                    candidates.len()
                );
                Err(WalletError::AuthorizationRefused)
            }
        }
    }

    fn account(&self, public_key: Bytes) -> Arc<dyn WalletAccount> {
        Arc::new(StandardAccount {
            public_key,
            state: Arc::clone(&self.state),
        })
    }
}

#[async_trait]
impl Wallet for StandardWallet {
    fn version(&self) -> WalletVersion {
        WalletVersion::V1_0_0
    }

    fn name(&self) -> &str {
        &self.state.name
    }

    fn icon(&self) -> &str {
        &self.icon
    }

    fn ciphers(&self) -> &[WalletCipher] {
        &self.state.ciphers
    }

    async fn connect(&self, options: ConnectOptions) -> WalletResult<ConnectResult> {
        let held = dedup(self.state.backend.public_keys());
        self.state.retain_held(&held);

        let selected = match options.public_keys {
            Some(requested) => {
                let recognized: Vec<Bytes> = dedup(requested)
                    .into_iter()
                    .filter(|key| held.contains(key))
                    .collect();
                let missing: Vec<Bytes> = recognized
                    .iter()
                    .filter(|key| !self.state.is_authorized(key))
                    .cloned()
                    .collect();
                if !missing.is_empty() && !options.silent {
                    let approved = self.request_authorization(missing, true).await?;
                    self.state.authorize_all(approved);
                }
                recognized
                    .into_iter()
                    .filter(|key| self.state.is_authorized(key))
                    .collect::<Vec<_>>()
            }
            None => {
                if !options.silent && !held.is_empty() {
                    let approved = self.request_authorization(held.clone(), false).await?;
                    self.state.authorize_all(approved);
                }
                held.iter()
                    .filter(|key| self.state.is_authorized(key))
                    .cloned()
                    .collect::<Vec<_>>()
            }
        };

        let has_more_accounts = held.iter().any(|key| !selected.contains(key));
        info!(
            "event=wallet_connect module=wallet status=ok wallet={} silent={} returned={} has_more={}",
            self.state.name,
            options.silent,
            selected.len(),
            has_more_accounts
        );
        Ok(ConnectResult {
            accounts: selected.into_iter().map(|key| self.account(key)).collect(),
            has_more_accounts,
        })
    }

    fn on(&self, event: WalletEvent, listener: WalletListener) -> Unsubscribe {
        self.state
            .events
            .subscribe(event, Arc::new(move |_: &()| listener()))
    }
}

impl Debug for StandardWallet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardWallet")
            .field("name", &self.state.name)
            .field("ciphers", &self.state.ciphers)
            .field("authorized", &self.state.authorized().len())
            .finish()
    }
}

struct StandardAccount {
    public_key: Bytes,
    state: Arc<WalletState>,
}

impl StandardAccount {
    fn require_authorized(&self) -> WalletResult<()> {
        if self.state.is_authorized(&self.public_key) && self.state.holds(&self.public_key) {
            Ok(())
        } else {
            Err(WalletError::AccountNotAuthorized)
        }
    }
}

#[async_trait]
impl WalletAccount for StandardAccount {
    fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    async fn sign_transaction(
        &self,
        transactions: Vec<Bytes>,
        options: SignTransactionOptions,
    ) -> WalletResult<SignTransactionResult> {
        require_inputs("sign_transaction", &transactions)?;
        self.require_authorized()?;
        let signed = self
            .state
            .backend
            .sign_transactions(
                &self.public_key,
                &transactions,
                options.network.unwrap_or_default(),
            )
            .await
            .map_err(WalletError::Backend)?;
        require_outputs("sign_transaction", transactions.len(), signed.len())?;
        Ok(SignTransactionResult {
            transactions: signed,
        })
    }

    async fn sign_and_send_transaction(
        &self,
        transactions: Vec<Bytes>,
        options: SignAndSendTransactionOptions,
    ) -> WalletResult<SignAndSendTransactionResult> {
        require_inputs("sign_and_send_transaction", &transactions)?;
        self.require_authorized()?;
        let signatures = self
            .state
            .backend
            .sign_and_send_transactions(
                &self.public_key,
                &transactions,
                options.network.unwrap_or_default(),
            )
            .await
            .map_err(WalletError::Backend)?;
        require_outputs(
            "sign_and_send_transaction",
            transactions.len(),
            signatures.len(),
        )?;
        Ok(SignAndSendTransactionResult { signatures })
    }

    async fn sign(&self, data: Vec<Bytes>) -> WalletResult<SignResult> {
        require_inputs("sign", &data)?;
        self.require_authorized()?;
        let signatures = self
            .state
            .backend
            .sign_messages(&self.public_key, &data)
            .await
            .map_err(WalletError::Backend)?;
        require_outputs("sign", data.len(), signatures.len())?;
        Ok(SignResult { signatures })
    }

    async fn encrypt(
        &self,
        public_key: Bytes,
        data: Vec<Bytes>,
        options: EncryptOptions,
    ) -> WalletResult<EncryptResult> {
        require_inputs("encrypt", &data)?;
        self.require_authorized()?;
        let cipher = negotiate_cipher(options.cipher, &self.state.ciphers)?;
        let sealed = self
            .state
            .backend
            .encrypt(&self.public_key, &public_key, cipher, &data)
            .await
            .map_err(WalletError::Backend)?;
        require_outputs("encrypt", data.len(), sealed.len())?;
        let (data, nonce) = sealed
            .into_iter()
            .map(|payload| (payload.ciphertext, payload.nonce))
            .unzip();
        Ok(EncryptResult {
            data,
            nonce,
            cipher,
        })
    }

    async fn decrypt(
        &self,
        public_key: Bytes,
        data: Vec<Bytes>,
        nonce: Vec<Bytes>,
        options: DecryptOptions,
    ) -> WalletResult<DecryptResult> {
        require_inputs("decrypt", &data)?;
        if data.len() != nonce.len() {
            return Err(WalletError::NonceCountMismatch {
                data: data.len(),
                nonce: nonce.len(),
            });
        }
        self.require_authorized()?;
        let cipher = options
            .cipher
            .or_else(|| self.state.ciphers.first().copied())
            .unwrap_or_default();
        if !self.state.ciphers.contains(&cipher) {
            return Err(WalletError::UnsupportedCipher(cipher));
        }
        let cleartexts = self
            .state
            .backend
            .decrypt(&self.public_key, &public_key, cipher, &data, &nonce)
            .await
            .map_err(WalletError::Backend)?;
        require_outputs("decrypt", data.len(), cleartexts.len())?;
        Ok(DecryptResult {
            data: cleartexts,
            cipher,
        })
    }
}

/// Picks the preferred cipher when supported, else the wallet's first one.
fn negotiate_cipher(
    preferred: Option<WalletCipher>,
    supported: &[WalletCipher],
) -> WalletResult<WalletCipher> {
    match preferred {
        Some(cipher) if supported.contains(&cipher) => Ok(cipher),
        _ => supported
            .first()
            .copied()
            .ok_or(WalletError::UnsupportedCipher(preferred.unwrap_or_default())),
    }
}

fn require_inputs(operation: &'static str, inputs: &[Bytes]) -> WalletResult<()> {
    if inputs.is_empty() {
        return Err(WalletError::EmptyInput(operation));
    }
    Ok(())
}

fn require_outputs(operation: &'static str, expected: usize, actual: usize) -> WalletResult<()> {
    if expected != actual {
        return Err(WalletError::OutputCountMismatch {
            operation,
            expected,
            actual,
        });
    }
    Ok(())
}

fn dedup(keys: Vec<Bytes>) -> Vec<Bytes> {
    let mut unique: Vec<Bytes> = Vec::with_capacity(keys.len());
    for key in keys {
        if !unique.contains(&key) {
            unique.push(key);
        }
    }
    unique
}
