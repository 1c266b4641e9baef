//! Registry dispatching a pool's `DexFamily` to its `PositionAdapter`
//! implementation (§9 "Dynamic dispatch over DEX families").

use crate::error::{AdapterError, Result};
use crate::position_adapter::PositionAdapter;
use std::collections::HashMap;
use std::sync::Arc;
use tendril_core::DexFamily;

#[derive(Default, Clone)]
pub struct PositionAdapterRegistry {
    adapters: HashMap<DexFamily, Arc<dyn PositionAdapter>>,
}

impl PositionAdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, family: DexFamily, adapter: Arc<dyn PositionAdapter>) {
        self.adapters.insert(family, adapter);
    }

    pub fn get(&self, family: DexFamily) -> Result<Arc<dyn PositionAdapter>> {
        self.adapters
            .get(&family)
            .cloned()
            .ok_or_else(|| AdapterError::UnknownDexFamily(family.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position_adapter::MockPositionAdapter;

    #[test]
    fn test_register_and_get() {
        let mut registry = PositionAdapterRegistry::new();
        registry.register(DexFamily::V3, Arc::new(MockPositionAdapter::new()));
        assert!(registry.get(DexFamily::V3).is_ok());
    }

    #[test]
    fn test_missing_family_errors() {
        let registry = PositionAdapterRegistry::new();
        assert!(matches!(
            registry.get(DexFamily::Lb),
            Err(AdapterError::UnknownDexFamily(_))
        ));
    }
}
