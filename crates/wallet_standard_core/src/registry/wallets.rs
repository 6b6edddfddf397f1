//! Shared wallet discovery registry.
//!
//! # Responsibility
//! - Keep the ordered list of registered wallets.
//! - Notify subscribers of each registration batch.
//!
//! # Invariants
//! - The list only grows and keeps registration order; duplicates are kept.
//! - `get` returns an independent snapshot.
//! - `registered` fires with exactly the new batch, before `register` returns.
//! - No replay: late subscribers only see later batches.

use log::{info, warn};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::events::{Emitter, EventKind, Unsubscribe};
use crate::wallet::contract::Wallet;
use crate::wallet::validate::validate_wallet;

/// Stable string id for registry API version `1.0.0`.
pub const REGISTRY_VERSION_1_0_0: &str = "1.0.0";
/// Stable name of the registration event.
pub const REGISTRY_EVENT_REGISTERED: &str = "registered";

/// Versions of the registry API shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegistryVersion {
    V1_0_0,
}

impl RegistryVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1_0_0 => REGISTRY_VERSION_1_0_0,
        }
    }
}

impl Display for RegistryVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses one registry version string.
pub fn parse_registry_version(value: &str) -> Result<RegistryVersion, RegistryVersionError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(RegistryVersionError::EmptyVersion);
    }
    match normalized {
        REGISTRY_VERSION_1_0_0 => Ok(RegistryVersion::V1_0_0),
        other => Err(RegistryVersionError::UnsupportedVersion(other.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryVersionError {
    EmptyVersion,
    UnsupportedVersion(String),
}

impl Display for RegistryVersionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyVersion => write!(f, "registry version must not be empty"),
            Self::UnsupportedVersion(value) => {
                write!(f, "registry version is unsupported: {value}")
            }
        }
    }
}

impl Error for RegistryVersionError {}

/// Events emitted by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegistryEvent {
    /// One or more wallets were registered; payload is that batch only.
    Registered,
}

impl EventKind for RegistryEvent {
    fn as_str(self) -> &'static str {
        match self {
            Self::Registered => REGISTRY_EVENT_REGISTERED,
        }
    }
}

/// Wallet discovery registry.
pub struct WalletRegistry {
    version: RegistryVersion,
    wallets: Mutex<Vec<Arc<dyn Wallet>>>,
    events: Emitter<RegistryEvent, [Arc<dyn Wallet>]>,
}

impl Default for WalletRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletRegistry {
    pub fn new() -> Self {
        Self {
            version: RegistryVersion::V1_0_0,
            wallets: Mutex::new(Vec::new()),
            events: Emitter::new(),
        }
    }

    pub fn version(&self) -> RegistryVersion {
        self.version
    }

    /// Returns a snapshot of registered wallets in registration order.
    pub fn get(&self) -> Vec<Arc<dyn Wallet>> {
        self.wallets().clone()
    }

    /// Appends `wallets` and emits `registered` with exactly that batch.
    ///
    /// Wallets with invalid metadata are flagged in the log and still
    /// accepted. An empty batch appends nothing but still emits.
    pub fn register<I>(&self, wallets: I)
    where
        I: IntoIterator<Item = Arc<dyn Wallet>>,
    {
        let batch: Vec<Arc<dyn Wallet>> = wallets.into_iter().collect();

        for wallet in &batch {
            if let Err(err) = validate_wallet(wallet.as_ref()) {
                warn!(
                    "event=wallet_shape_flagged module=registry status=accepted wallet={} reason={}",
                    wallet.name(),
                    err
                );
            }
        }

        let total = {
            let mut registered = self.wallets();
            registered.extend(batch.iter().cloned());
            registered.len()
        };
        info!(
            "event=wallet_registered module=registry status=ok count={} total={}",
            batch.len(),
            total
        );

        self.events.emit(RegistryEvent::Registered, batch.as_slice());
    }

    /// Subscribes `listener` to `event`.
    ///
    /// Past events are not replayed; call `get` first to see wallets that
    /// registered earlier.
    pub fn on<F>(&self, event: RegistryEvent, listener: F) -> Unsubscribe
    where
        F: Fn(&[Arc<dyn Wallet>]) + Send + Sync + 'static,
    {
        self.events.subscribe(event, Arc::new(listener))
    }

    pub fn len(&self) -> usize {
        self.wallets().len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets().is_empty()
    }

    pub fn listener_count(&self, event: RegistryEvent) -> usize {
        self.events.listener_count(event)
    }

    fn wallets(&self) -> MutexGuard<'_, Vec<Arc<dyn Wallet>>> {
        self.wallets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Debug for WalletRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .wallets()
            .iter()
            .map(|wallet| wallet.name().to_string())
            .collect();
        f.debug_struct("WalletRegistry")
            .field("version", &self.version)
            .field("wallets", &names)
            .field("listeners", &self.events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        parse_registry_version, RegistryEvent, RegistryVersion, RegistryVersionError,
        WalletRegistry,
    };
    use crate::wallet::contract::Wallet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn new_registry_is_empty_with_fixed_version() {
        let registry = WalletRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.version(), RegistryVersion::V1_0_0);
        assert_eq!(registry.version().as_str(), "1.0.0");
    }

    #[test]
    fn empty_batch_appends_nothing_but_still_emits() {
        let registry = WalletRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let batch_sizes = Arc::new(AtomicUsize::new(0));
        let (calls_in, sizes_in) = (Arc::clone(&calls), Arc::clone(&batch_sizes));
        registry.on(RegistryEvent::Registered, move |wallets| {
            calls_in.fetch_add(1, Ordering::SeqCst);
            sizes_in.fetch_add(wallets.len(), Ordering::SeqCst);
        });

        registry.register(Vec::<Arc<dyn Wallet>>::new());

        assert_eq!(registry.len(), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(batch_sizes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn parses_registry_versions() {
        assert_eq!(
            parse_registry_version(" 1.0.0 ").expect("version parse"),
            RegistryVersion::V1_0_0
        );
        assert_eq!(
            parse_registry_version("").expect_err("empty version must fail"),
            RegistryVersionError::EmptyVersion
        );
        assert_eq!(
            parse_registry_version("0.9.0").expect_err("unknown version must fail"),
            RegistryVersionError::UnsupportedVersion("0.9.0".to_string())
        );
    }
}
