pub mod registry;
pub mod builtin;
pub mod loader;

use serde::Serialize;

use crate::operator::ScalarOperator;
use crate::types::NativeType;

/// Type categories reported alongside each registered type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TypeCategory {
    Numeric,
    String,
    Boolean,
    Composite,
}

/// A logical type and the native operator implementations it declares
pub trait TypeExtension: Send + Sync {
    /// Type name (e.g., "bigint", "point")
    fn type_name(&self) -> &str;

    /// Native representation the operators are written against
    fn native_type(&self) -> NativeType;

    fn type_category(&self) -> TypeCategory;

    /// Operator implementations, tagged with the operator they implement.
    /// Called once per registration.
    fn operators(&self) -> Vec<ScalarOperator>;
}
