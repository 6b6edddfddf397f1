//! Well-known global location of the registry (`solana.wallets`).
//!
//! # Responsibility
//! - Create the `solana` namespace and the registry under it at most once.
//! - Let every later initializer reuse the existing registry.
//!
//! # Invariants
//! - Both bindings are write-once; once set, nothing replaces them.
//! - The first initializer wins; later installs get `InitializationConflict`.
//! - Registry identity is stable for the process lifetime.

use log::{debug, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use crate::registry::wallets::WalletRegistry;

static PROCESS_SCOPE: GlobalScope = GlobalScope::new();

/// Host global namespace holding the write-once `solana` binding.
///
/// One process-wide instance backs [`initialize`]; separate instances model
/// isolated hosts.
pub struct GlobalScope {
    solana: OnceCell<GlobalSolana>,
}

/// The `solana` namespace holding the write-once `wallets` binding.
pub struct GlobalSolana {
    wallets: OnceCell<Arc<WalletRegistry>>,
}

impl GlobalSolana {
    fn new() -> Self {
        Self {
            wallets: OnceCell::new(),
        }
    }

    /// Registry bound at `solana.wallets`, if any.
    pub fn wallets(&self) -> Option<Arc<WalletRegistry>> {
        self.wallets.get().cloned()
    }
}

impl Default for GlobalScope {
    fn default() -> Self {
        Self::new()
    }
}

impl GlobalScope {
    pub const fn new() -> Self {
        Self {
            solana: OnceCell::new(),
        }
    }

    /// The `solana` namespace, if created.
    pub fn solana(&self) -> Option<&GlobalSolana> {
        self.solana.get()
    }

    /// Registry at `solana.wallets`, if created.
    pub fn wallets(&self) -> Option<Arc<WalletRegistry>> {
        self.solana().and_then(GlobalSolana::wallets)
    }

    /// Returns the registry, creating the namespace and registry if absent.
    pub fn initialize(&self) -> Arc<WalletRegistry> {
        if let Some(existing) = self.wallets() {
            debug!(
                "event=registry_reused module=registry status=ok version={}",
                existing.version()
            );
            return existing;
        }
        self.bind(|| Arc::new(WalletRegistry::new())).0
    }

    /// Installs `registry` at `solana.wallets`.
    ///
    /// # Errors
    /// - `InitializationConflict` carrying the existing registry when another
    ///   instance is already bound. Installing the bound instance again is Ok.
    pub fn try_install(
        &self,
        registry: Arc<WalletRegistry>,
    ) -> Result<Arc<WalletRegistry>, InitializationConflict> {
        let (bound, created) = self.bind(|| Arc::clone(&registry));
        if created || Arc::ptr_eq(&bound, &registry) {
            return Ok(bound);
        }
        info!(
            "event=registry_install_rejected module=registry status=conflict version={}",
            bound.version()
        );
        Err(InitializationConflict { existing: bound })
    }

    fn bind(&self, make: impl FnOnce() -> Arc<WalletRegistry>) -> (Arc<WalletRegistry>, bool) {
        let solana = self.solana.get_or_init(GlobalSolana::new);
        let mut created = false;
        let bound = solana.wallets.get_or_init(|| {
            created = true;
            make()
        });
        if created {
            info!(
                "event=registry_created module=registry status=ok version={}",
                bound.version()
            );
        }
        (Arc::clone(bound), created)
    }
}

impl Debug for GlobalScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalScope")
            .field("wallets", &self.wallets())
            .finish()
    }
}

/// Process-wide global scope.
pub fn global() -> &'static GlobalScope {
    &PROCESS_SCOPE
}

/// Returns the process-wide registry, creating it on first call.
pub fn initialize() -> Arc<WalletRegistry> {
    PROCESS_SCOPE.initialize()
}

/// Process-wide registry, if any initializer has run.
pub fn wallets() -> Option<Arc<WalletRegistry>> {
    PROCESS_SCOPE.wallets()
}

/// Installs `registry` as the process-wide registry if none exists.
pub fn try_install(
    registry: Arc<WalletRegistry>,
) -> Result<Arc<WalletRegistry>, InitializationConflict> {
    PROCESS_SCOPE.try_install(registry)
}

/// Another registry already occupies `solana.wallets`.
pub struct InitializationConflict {
    pub existing: Arc<WalletRegistry>,
}

impl Debug for InitializationConflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationConflict")
            .field("existing", &self.existing)
            .finish()
    }
}

impl Display for InitializationConflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "solana.wallets already initialized with version {}",
            self.existing.version()
        )
    }
}

impl Error for InitializationConflict {}
