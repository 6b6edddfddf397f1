mod common;

use common::{key, standard_wallet, FakeKeyring, PromptReply, ScriptedPrompt, SVG_ICON};
use futures::executor::block_on;
use std::sync::Arc;
use wallet_standard_core::{
    ConnectOptions, DecryptOptions, EncryptOptions, SignAndSendTransactionOptions,
    SignTransactionOptions, StandardWallet, Wallet, WalletAccount, WalletCipher, WalletError,
    WalletNetwork,
};

fn connected(wallet: &StandardWallet) -> Arc<dyn WalletAccount> {
    let result = block_on(wallet.connect(ConnectOptions::default())).expect("connect");
    Arc::clone(&result.accounts[0])
}

fn approving_wallet() -> StandardWallet {
    standard_wallet(vec![key(5)], ScriptedPrompt::new(PromptReply::ApproveAll))
}

#[test]
fn sign_preserves_count_and_position() {
    let wallet = approving_wallet();
    let account = connected(&wallet);

    let result = block_on(account.sign(vec![vec![1], vec![2, 3]])).expect("sign");

    assert_eq!(result.signatures, vec![vec![5, 1], vec![5, 2, 3]]);
}

#[test]
fn sign_transaction_returns_whole_transactions() {
    let wallet = approving_wallet();
    let account = connected(&wallet);

    let result = block_on(account.sign_transaction(
        vec![vec![9], vec![8]],
        SignTransactionOptions {
            network: Some(WalletNetwork::Devnet),
        },
    ))
    .expect("sign transaction");

    assert_eq!(result.transactions, vec![vec![9, 0xAA], vec![8, 0xAA]]);
}

#[test]
fn sign_and_send_defaults_to_mainnet() {
    let wallet = approving_wallet();
    let account = connected(&wallet);

    let result = block_on(
        account.sign_and_send_transaction(vec![vec![4]], SignAndSendTransactionOptions::default()),
    )
    .expect("mainnet send");
    assert_eq!(result.signatures, vec![vec![5, 4]]);

    let err = block_on(account.sign_and_send_transaction(
        vec![vec![4]],
        SignAndSendTransactionOptions {
            network: Some(WalletNetwork::Testnet),
        },
    ))
    .expect_err("backend failure surfaces");
    assert_eq!(
        err,
        WalletError::Backend("cluster unreachable: testnet".to_string())
    );
}

#[test]
fn encrypt_returns_cipher_and_one_nonce_per_ciphertext() {
    let wallet = approving_wallet();
    let account = connected(&wallet);
    let peer = vec![0x0F; 32];

    let sealed = block_on(account.encrypt(
        peer.clone(),
        vec![vec![0x01], vec![0x02, 0x03]],
        EncryptOptions::default(),
    ))
    .expect("encrypt");

    assert_eq!(sealed.cipher, WalletCipher::X25519Xsalsa20Poly1305);
    assert_eq!(sealed.data.len(), 2);
    assert_eq!(sealed.nonce, vec![vec![0], vec![1]]);

    let opened = block_on(account.decrypt(
        peer,
        sealed.data,
        sealed.nonce,
        DecryptOptions {
            cipher: Some(sealed.cipher),
        },
    ))
    .expect("decrypt");
    assert_eq!(opened.data, vec![vec![0x01], vec![0x02, 0x03]]);
}

#[test]
fn empty_inputs_are_rejected() {
    let wallet = approving_wallet();
    let account = connected(&wallet);

    assert_eq!(
        block_on(account.sign(Vec::new())).expect_err("empty sign"),
        WalletError::EmptyInput("sign")
    );
    assert_eq!(
        block_on(account.encrypt(vec![1], Vec::new(), EncryptOptions::default()))
            .expect_err("empty encrypt"),
        WalletError::EmptyInput("encrypt")
    );
}

#[test]
fn decrypt_requires_one_nonce_per_ciphertext() {
    let wallet = approving_wallet();
    let account = connected(&wallet);

    let err = block_on(account.decrypt(
        vec![1],
        vec![vec![1], vec![2]],
        vec![vec![0]],
        DecryptOptions::default(),
    ))
    .expect_err("nonce mismatch");

    assert_eq!(err, WalletError::NonceCountMismatch { data: 2, nonce: 1 });
}

#[test]
fn wallet_without_ciphers_cannot_encrypt_or_decrypt() {
    let wallet = StandardWallet::new(
        "No Cipher Wallet",
        SVG_ICON,
        Vec::new(),
        Arc::new(FakeKeyring::new(vec![key(5)])),
        ScriptedPrompt::new(PromptReply::ApproveAll),
    );
    let account = connected(&wallet);

    let err = block_on(account.encrypt(vec![1], vec![vec![1]], EncryptOptions::default()))
        .expect_err("encrypt without ciphers");
    assert!(matches!(err, WalletError::UnsupportedCipher(_)));

    let err = block_on(account.decrypt(
        vec![1],
        vec![vec![1]],
        vec![vec![0]],
        DecryptOptions::default(),
    ))
    .expect_err("decrypt without ciphers");
    assert!(matches!(err, WalletError::UnsupportedCipher(_)));
}

#[test]
fn revoked_account_handle_stops_working() {
    let wallet = approving_wallet();
    let account = connected(&wallet);

    assert!(wallet.revoke(account.public_key()));
    let err = block_on(account.sign(vec![vec![1]])).expect_err("revoked account");

    assert_eq!(err, WalletError::AccountNotAuthorized);
}

#[test]
fn backend_breaking_correspondence_is_reported() {
    let mut keyring = FakeKeyring::new(vec![key(5)]);
    keyring.drop_last_output = true;
    let wallet = StandardWallet::new(
        "Lossy Wallet",
        SVG_ICON,
        vec![WalletCipher::X25519Xsalsa20Poly1305],
        Arc::new(keyring),
        ScriptedPrompt::new(PromptReply::ApproveAll),
    );
    let account = connected(&wallet);

    let err = block_on(account.sign(vec![vec![1], vec![2]])).expect_err("lossy backend");

    assert_eq!(
        err,
        WalletError::OutputCountMismatch {
            operation: "sign",
            expected: 2,
            actual: 1,
        }
    );
}

#[test]
fn key_removed_from_backend_loses_authorization() {
    let keyring = Arc::new(FakeKeyring::new(vec![key(1), key(2)]));
    let wallet = StandardWallet::new(
        "Shrinking Wallet",
        SVG_ICON,
        vec![WalletCipher::X25519Xsalsa20Poly1305],
        keyring.clone(),
        ScriptedPrompt::new(PromptReply::ApproveAll),
    );
    let result = block_on(wallet.connect(ConnectOptions::default())).expect("connect");
    let removed = Arc::clone(&result.accounts[0]);
    assert_eq!(removed.public_key(), key(1).as_slice());

    keyring.remove_key(&key(1));

    let err = block_on(removed.sign(vec![vec![7]])).expect_err("removed key must not sign");
    assert_eq!(err, WalletError::AccountNotAuthorized);

    wallet.notify_accounts_changed();
    assert_eq!(wallet.authorized_public_keys(), vec![key(2)]);

    let silent = block_on(wallet.connect(ConnectOptions::silent())).expect("silent connect");
    assert_eq!(silent.public_keys(), vec![key(2)]);
    assert!(!silent.has_more_accounts);

    let kept = Arc::clone(&silent.accounts[0]);
    let signed = block_on(kept.sign(vec![vec![7]])).expect("held key still signs");
    assert_eq!(signed.signatures, vec![vec![2, 7]]);
}
