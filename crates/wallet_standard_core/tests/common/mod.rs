#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wallet_standard_core::{
    AuthorizationPrompt, AuthorizationRequest, Bytes, ConnectOptions, ConnectResult,
    KeyringBackend, SealedPayload, StandardWallet, Unsubscribe, Wallet, WalletCipher,
    WalletEvent, WalletListener, WalletNetwork, WalletResult, WalletVersion,
};

pub const SVG_ICON: &str = "data:image/svg+xml;base64,PHN2Zz48L3N2Zz4=";

/// Metadata-only wallet for registry tests.
pub struct StubWallet {
    name: String,
    icon: String,
    ciphers: Vec<WalletCipher>,
}

impl StubWallet {
    pub fn new(name: &str) -> Arc<dyn Wallet> {
        Arc::new(Self {
            name: name.to_string(),
            icon: SVG_ICON.to_string(),
            ciphers: vec![WalletCipher::X25519Xsalsa20Poly1305],
        })
    }

    pub fn with_icon(name: &str, icon: &str) -> Arc<dyn Wallet> {
        Arc::new(Self {
            name: name.to_string(),
            icon: icon.to_string(),
            ciphers: Vec::new(),
        })
    }
}

#[async_trait]
impl Wallet for StubWallet {
    fn version(&self) -> WalletVersion {
        WalletVersion::V1_0_0
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn icon(&self) -> &str {
        &self.icon
    }

    fn ciphers(&self) -> &[WalletCipher] {
        &self.ciphers
    }

    async fn connect(&self, _options: ConnectOptions) -> WalletResult<ConnectResult> {
        Ok(ConnectResult {
            accounts: Vec::new(),
            has_more_accounts: false,
        })
    }

    fn on(&self, _event: WalletEvent, _listener: WalletListener) -> Unsubscribe {
        Unsubscribe::noop()
    }
}

pub fn names(wallets: &[Arc<dyn Wallet>]) -> Vec<String> {
    wallets.iter().map(|w| w.name().to_string()).collect()
}

/// Deterministic stand-in for real key material.
///
/// - signatures: `[signer[0], payload...]`
/// - signed transactions: payload with `0xAA` appended
/// - ciphertext: payload bytes xor `peer[0]`, nonce `[index]`
pub struct FakeKeyring {
    keys: Mutex<Vec<Bytes>>,
    pub drop_last_output: bool,
}

impl FakeKeyring {
    pub fn new(keys: Vec<Bytes>) -> Self {
        Self {
            keys: Mutex::new(keys),
            drop_last_output: false,
        }
    }

    /// Simulates the key being removed from the keyring out-of-band.
    pub fn remove_key(&self, public_key: &[u8]) {
        self.keys
            .lock()
            .expect("keys lock")
            .retain(|key| key != public_key);
    }

    fn finish<T>(&self, mut outputs: Vec<T>) -> Result<Vec<T>, String> {
        if self.drop_last_output {
            outputs.pop();
        }
        Ok(outputs)
    }
}

#[async_trait]
impl KeyringBackend for FakeKeyring {
    fn public_keys(&self) -> Vec<Bytes> {
        self.keys.lock().expect("keys lock").clone()
    }

    async fn sign_transactions(
        &self,
        _signer: &[u8],
        transactions: &[Bytes],
        _network: WalletNetwork,
    ) -> Result<Vec<Bytes>, String> {
        self.finish(
            transactions
                .iter()
                .map(|tx| {
                    let mut signed = tx.clone();
                    signed.push(0xAA);
                    signed
                })
                .collect(),
        )
    }

    async fn sign_and_send_transactions(
        &self,
        signer: &[u8],
        transactions: &[Bytes],
        network: WalletNetwork,
    ) -> Result<Vec<Bytes>, String> {
        if network != WalletNetwork::Mainnet {
            return Err(format!("cluster unreachable: {network}"));
        }
        self.finish(
            transactions
                .iter()
                .map(|tx| signature(signer, tx))
                .collect(),
        )
    }

    async fn sign_messages(&self, signer: &[u8], data: &[Bytes]) -> Result<Vec<Bytes>, String> {
        self.finish(data.iter().map(|item| signature(signer, item)).collect())
    }

    async fn encrypt(
        &self,
        _signer: &[u8],
        peer: &[u8],
        _cipher: WalletCipher,
        data: &[Bytes],
    ) -> Result<Vec<SealedPayload>, String> {
        self.finish(
            data.iter()
                .enumerate()
                .map(|(index, cleartext)| SealedPayload {
                    ciphertext: xor(cleartext, peer),
                    nonce: vec![index as u8],
                })
                .collect(),
        )
    }

    async fn decrypt(
        &self,
        _signer: &[u8],
        peer: &[u8],
        _cipher: WalletCipher,
        data: &[Bytes],
        _nonce: &[Bytes],
    ) -> Result<Vec<Bytes>, String> {
        self.finish(data.iter().map(|ciphertext| xor(ciphertext, peer)).collect())
    }
}

fn signature(signer: &[u8], payload: &[u8]) -> Bytes {
    let mut out = vec![signer.first().copied().unwrap_or_default()];
    out.extend_from_slice(payload);
    out
}

fn xor(data: &[u8], peer: &[u8]) -> Bytes {
    let mask = peer.first().copied().unwrap_or_default();
    data.iter().map(|byte| byte ^ mask).collect()
}

/// What the scripted user does when prompted.
#[derive(Clone)]
pub enum PromptReply {
    ApproveAll,
    Approve(Vec<Bytes>),
    Decline,
}

/// Prompt that records every request and answers from a script.
pub struct ScriptedPrompt {
    reply: Mutex<PromptReply>,
    calls: AtomicUsize,
    requests: Mutex<Vec<AuthorizationRequest>>,
}

impl ScriptedPrompt {
    pub fn new(reply: PromptReply) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(reply),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn set_reply(&self, reply: PromptReply) {
        *self.reply.lock().expect("reply lock") = reply;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<AuthorizationRequest> {
        self.requests.lock().expect("requests lock").last().cloned()
    }
}

#[async_trait]
impl AuthorizationPrompt for ScriptedPrompt {
    async fn authorize(&self, request: AuthorizationRequest) -> Option<Vec<Bytes>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        let reply = self.reply.lock().expect("reply lock").clone();
        match reply {
            PromptReply::ApproveAll => Some(request.candidates),
            PromptReply::Approve(keys) => Some(keys),
            PromptReply::Decline => None,
        }
    }
}

pub fn key(tag: u8) -> Bytes {
    vec![tag; 32]
}

pub fn standard_wallet(keys: Vec<Bytes>, prompt: Arc<ScriptedPrompt>) -> StandardWallet {
    StandardWallet::new(
        "Test Wallet",
        SVG_ICON,
        vec![WalletCipher::X25519Xsalsa20Poly1305],
        Arc::new(FakeKeyring::new(keys)),
        prompt,
    )
}
