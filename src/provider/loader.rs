//! Init-once-per-credential provider loading.
//!
//! One `ProviderLoader` is created by the application and handed to every
//! controller. Each credential gets exactly one provider instance, shared by
//! reference; concurrent loads of the same credential wait on a per-credential
//! slot so only one initialization is ever in flight.

use crate::model::{Credential, InitError};
use crate::provider::SharedProvider;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

type Factory = dyn Fn(&Credential) -> Result<SharedProvider, InitError> + Send + Sync;
type Slot = Arc<Mutex<Option<SharedProvider>>>;

/// Shared, lazily-initializing provider registry.
pub struct ProviderLoader {
    factory: Box<Factory>,
    slots: Mutex<HashMap<Credential, Slot>>,
    initializations: AtomicUsize,
}

impl ProviderLoader {
    /// Create a loader that builds providers with `factory`.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn(&Credential) -> Result<SharedProvider, InitError> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            slots: Mutex::new(HashMap::new()),
            initializations: AtomicUsize::new(0),
        }
    }

    /// Loader that hands out `provider` for any credential.
    pub fn with_provider(provider: SharedProvider) -> Self {
        Self::new(move |_| Ok(provider.clone()))
    }

    /// Get the provider for `credential`, initializing it on first use.
    ///
    /// Failed loads are logged and not cached, so a later caller may retry.
    ///
    /// # Errors
    ///
    /// `InitError::MissingCredential` when the credential is absent or blank,
    /// or whatever the factory returned.
    pub fn load(&self, credential: Option<&str>) -> Result<SharedProvider, InitError> {
        let credential = Credential::from_optional(credential).map_err(|_| {
            error!("Places provider credential is missing");
            InitError::MissingCredential
        })?;

        let slot = {
            let mut slots = self
                .slots
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            slots.entry(credential.clone()).or_default().clone()
        };

        let mut guard = slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(provider) = guard.as_ref() {
            return Ok(provider.clone());
        }

        debug!(credential = %credential.redacted(), "Loading places provider");
        self.initializations.fetch_add(1, Ordering::SeqCst);
        match (self.factory)(&credential) {
            Ok(provider) => {
                *guard = Some(provider.clone());
                Ok(provider)
            }
            Err(e) => {
                error!(credential = %credential.redacted(), error = %e, "Places provider failed to load");
                Err(e)
            }
        }
    }

    /// How many times the factory has run.
    pub fn initializations(&self) -> usize {
        self.initializations.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for ProviderLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderLoader")
            .field("initializations", &self.initializations())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ScriptedProvider;
    use std::sync::atomic::AtomicBool;
    use std::thread;
    use std::time::Duration;

    fn scripted_factory() -> impl Fn(&Credential) -> Result<SharedProvider, InitError> + Send + Sync
    {
        |_| Ok(Arc::new(ScriptedProvider::new()) as SharedProvider)
    }

    #[test]
    fn missing_credential_fails_without_calling_factory() {
        let loader = ProviderLoader::new(scripted_factory());
        assert_eq!(loader.load(None).err(), Some(InitError::MissingCredential));
        assert_eq!(loader.load(Some("   ")).err(), Some(InitError::MissingCredential));
        assert_eq!(loader.initializations(), 0);
    }

    #[test]
    fn same_credential_shares_one_instance() {
        let loader = ProviderLoader::new(scripted_factory());
        let a = loader.load(Some("key-1")).unwrap();
        let b = loader.load(Some("key-1")).unwrap();

        assert!(Arc::ptr_eq(&a, &b), "Both callers should get the same provider");
        assert_eq!(loader.initializations(), 1);
    }

    #[test]
    fn different_credentials_get_separate_instances() {
        let loader = ProviderLoader::new(scripted_factory());
        let a = loader.load(Some("key-1")).unwrap();
        let b = loader.load(Some("key-2")).unwrap();

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(loader.initializations(), 2);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let fail_first = AtomicBool::new(true);
        let loader = ProviderLoader::new(move |_| {
            if fail_first.swap(false, Ordering::SeqCst) {
                Err(InitError::Load("script failed".into()))
            } else {
                Ok(Arc::new(ScriptedProvider::new()) as SharedProvider)
            }
        });

        assert!(loader.load(Some("key")).is_err());
        assert!(loader.load(Some("key")).is_ok(), "Second attempt should retry");
        assert_eq!(loader.initializations(), 2);
    }

    #[test]
    fn concurrent_loads_initialize_once() {
        let loader = Arc::new(ProviderLoader::new(|_| {
            thread::sleep(Duration::from_millis(20));
            Ok(Arc::new(ScriptedProvider::new()) as SharedProvider)
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let loader = loader.clone();
                thread::spawn(move || loader.load(Some("shared-key")).map(|_| ()))
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }

        assert_eq!(loader.initializations(), 1, "Only one load may be in flight");
    }

    #[test]
    fn with_provider_returns_given_instance() {
        let provider: SharedProvider = Arc::new(ScriptedProvider::new());
        let loader = ProviderLoader::with_provider(provider.clone());
        let loaded = loader.load(Some("anything")).unwrap();
        assert!(Arc::ptr_eq(&provider, &loaded));
    }
}
