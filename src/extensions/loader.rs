#![cfg(feature = "extensions")]
//! Extension auto-discovery and loading via inventory pattern
//!
//! Extensions self-register by implementing ExtensionLoader and using
//! inventory::submit! macro. No cfg attributes needed.

use crate::error::Result;
use crate::extensions::registry::TypeRegistry;

/// Trait for self-registering extensions
pub trait ExtensionLoader: Send + Sync {
    /// Extension name (e.g., "point", "ipaddress")
    fn name(&self) -> &str;

    /// Register the extension's types. Any failure aborts loading.
    fn load_types(&self, registry: &TypeRegistry) -> Result<()>;
}

inventory::collect!(&'static dyn ExtensionLoader);

/// Load all registered extensions into the registry
///
/// If `enabled_names` is provided, only load extensions matching those names.
/// If `enabled_names` is None, load all registered extensions.
pub fn load_all_extensions(registry: &TypeRegistry, enabled_names: Option<&[String]>) -> Result<usize> {
    let mut loaded = 0;
    for loader in inventory::iter::<&'static dyn ExtensionLoader> {
        // Check if extension is enabled (if a filter is provided)
        if let Some(enabled) = enabled_names {
            if !enabled.iter().any(|name| name == loader.name()) {
                tracing::debug!("Skipping disabled extension: {}", loader.name());
                continue;
            }
        }

        tracing::info!("Loading extension: {}", loader.name());
        loader.load_types(registry)?;
        loaded += 1;
    }
    Ok(loaded)
}

/// Names of every extension linked into the binary
pub fn available_extensions() -> Vec<&'static str> {
    inventory::iter::<&'static dyn ExtensionLoader>
        .into_iter()
        .map(|loader| loader.name())
        .collect()
}
