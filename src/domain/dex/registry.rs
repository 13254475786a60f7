//! Adapter registry and the atomically swappable config/registry snapshot

use arc_swap::ArcSwap;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::exchanges::types::DexKind;
use crate::exchanges::{create_adapter, DexAdapter};
use crate::shared::errors::{DexError, DexResult};

/// Name -> adapter map; built once, then only read
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn DexAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapters for every enabled DEX entry; entries that fail to build are skipped
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();

        for dex in config.enabled_dexes() {
            let kind = match dex.name.parse::<DexKind>() {
                Ok(kind) => kind,
                Err(_) => {
                    warn!(dex = %dex.name, "unknown dex type, skipping");
                    continue;
                }
            };

            match create_adapter(kind, dex.clone()) {
                Ok(adapter) => registry.register(dex.name.clone(), adapter),
                Err(e) => warn!(dex = %dex.name, error = %e, "failed to create adapter, skipping"),
            }
        }

        info!(adapters = registry.len(), "adapter registry built");
        registry
    }

    /// Replaces any adapter already registered under `name`
    pub fn register(&mut self, name: impl Into<String>, adapter: Arc<dyn DexAdapter>) {
        self.adapters.insert(name.into(), adapter);
    }

    pub fn get(&self, name: &str) -> DexResult<Arc<dyn DexAdapter>> {
        self.adapters
            .get(name)
            .cloned()
            .ok_or_else(|| DexError::AdapterNotFound(name.to_string()))
    }

    pub fn list(&self) -> BTreeSet<String> {
        self.adapters.keys().cloned().collect()
    }

    pub fn get_all(&self) -> &HashMap<String, Arc<dyn DexAdapter>> {
        &self.adapters
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

/// Config and the registry built from it, always observed together
pub struct RegistrySnapshot {
    pub config: Config,
    pub registry: AdapterRegistry,
}

impl RegistrySnapshot {
    pub fn build(config: Config) -> Self {
        let registry = AdapterRegistry::from_config(&config);
        Self { config, registry }
    }
}

/// Lock-free holder of the current snapshot; reload swaps config and registry in one store
pub struct RegistryHandle {
    current: ArcSwap<RegistrySnapshot>,
}

impl RegistryHandle {
    pub fn new(config: Config) -> Self {
        Self {
            current: ArcSwap::from_pointee(RegistrySnapshot::build(config)),
        }
    }

    pub fn load(&self) -> Arc<RegistrySnapshot> {
        self.current.load_full()
    }

    pub fn reload(&self, config: Config) {
        let snapshot = RegistrySnapshot::build(config);
        info!(adapters = snapshot.registry.len(), "registry reloaded");
        self.current.store(Arc::new(snapshot));
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::config::DexConfig;

    #[test]
    fn test_from_config_registers_enabled() {
        let registry = AdapterRegistry::from_config(&all_dexes());
        let names: Vec<String> = registry.list().into_iter().collect();
        assert_eq!(names, vec!["pumpfun", "pumpswap", "raydium"]);

        for (name, adapter) in registry.get_all() {
            assert_eq!(adapter.name(), name);
            assert_eq!(adapter.config().name, *name);
        }
    }

    #[test]
    fn test_from_config_skips_broken_entries() {
        let mut disabled = DexConfig::new("pumpfun", PUMPFUN_PROGRAM);
        disabled.enabled = false;
        let cfg = config(vec![
            DexConfig::new("raydium", RAYDIUM_PROGRAM),
            disabled,
            DexConfig::new("pumpswap", PUMPSWAP_PROGRAM),
            DexConfig::new("orca", RAYDIUM_PROGRAM),
        ]);

        let registry = AdapterRegistry::from_config(&cfg);
        assert_eq!(registry.len(), 1);
        assert!(registry.get("raydium").is_ok());
        assert!(registry.get("pumpswap").is_err());
    }

    #[test]
    fn test_get_missing_adapter() {
        let registry = AdapterRegistry::new();
        match registry.get("nonexistent") {
            Err(DexError::AdapterNotFound(name)) => assert_eq!(name, "nonexistent"),
            _ => panic!("expected AdapterNotFound"),
        }
    }

    #[test]
    fn test_get_returns_same_instance() {
        let registry = AdapterRegistry::from_config(&all_dexes());
        let a = registry.get("raydium").unwrap();
        let b = registry.get("raydium").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = AdapterRegistry::from_config(&all_dexes());
        let replacement = create_adapter(DexKind::Pumpfun, DexConfig::new("raydium", PUMPFUN_PROGRAM)).unwrap();
        registry.register("raydium", replacement.clone());

        assert_eq!(registry.len(), 3);
        assert!(Arc::ptr_eq(&registry.get("raydium").unwrap(), &replacement));
    }

    #[test]
    fn test_reload_swaps_whole_snapshot() {
        let handle = RegistryHandle::new(all_dexes());
        let before = handle.load();
        assert_eq!(before.registry.len(), 3);

        handle.reload(config(vec![DexConfig::new("raydium", RAYDIUM_PROGRAM)]));
        let after = handle.load();

        assert_eq!(after.registry.list().len(), 1);
        assert_eq!(after.config.dexes.len(), 1);
        // readers holding the old snapshot keep a consistent view
        assert_eq!(before.registry.len(), 3);
        assert_eq!(before.config.dexes.len(), 3);
    }
}
