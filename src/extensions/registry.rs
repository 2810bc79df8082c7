use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::info;

use super::{TypeCategory, TypeExtension};
use crate::declaration::{DeclarationSummary, TypeOperatorDeclaration};
use crate::error::{Error, Result};

/// A type whose operator declaration has been sealed and published
#[derive(Debug)]
pub struct RegisteredType {
    name: String,
    category: TypeCategory,
    declaration: Arc<TypeOperatorDeclaration>,
}

impl RegisteredType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> TypeCategory {
        self.category
    }

    pub fn declaration(&self) -> &Arc<TypeOperatorDeclaration> {
        &self.declaration
    }
}

/// Per-type operator catalog.
///
/// Declarations are built outside the lock and only published once `build()`
/// has succeeded, so readers never observe a partially registered type.
pub struct TypeRegistry {
    types: RwLock<HashMap<String, Arc<RegisteredType>>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        TypeRegistry {
            types: RwLock::new(HashMap::new()),
        }
    }

    pub fn register(&self, ext: &dyn TypeExtension) -> Result<Arc<RegisteredType>> {
        let name = ext.type_name().to_string();
        if self.types.read().contains_key(&name) {
            return Err(Error::DuplicateType(name));
        }

        let declaration = TypeOperatorDeclaration::extract(&name, ext.native_type(), ext.operators())?;
        let registered = Arc::new(RegisteredType {
            name: name.clone(),
            category: ext.type_category(),
            declaration: Arc::new(declaration),
        });

        match self.types.write().entry(name) {
            Entry::Occupied(entry) => Err(Error::DuplicateType(entry.key().clone())),
            Entry::Vacant(entry) => {
                info!(
                    type_name = %registered.name,
                    comparable = registered.declaration.is_comparable(),
                    orderable = registered.declaration.is_orderable(),
                    "registered type operators"
                );
                entry.insert(registered.clone());
                Ok(registered)
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<RegisteredType>> {
        self.types.read().get(name).cloned()
    }

    pub fn declaration(&self, name: &str) -> Option<Arc<TypeOperatorDeclaration>> {
        self.get(name).map(|t| t.declaration.clone())
    }

    /// Registered type names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.types.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }

    pub fn report(&self) -> CatalogReport {
        let types = self
            .names()
            .into_iter()
            .filter_map(|name| self.get(&name))
            .map(|t| TypeReport {
                name: t.name.clone(),
                category: t.category,
                operators: t.declaration.summary(),
            })
            .collect();
        CatalogReport { types }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable snapshot of the catalog
#[derive(Debug, Clone, Serialize)]
pub struct CatalogReport {
    pub types: Vec<TypeReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeReport {
    pub name: String,
    pub category: TypeCategory,
    pub operators: DeclarationSummary,
}
