//! Type operator declarations for a columnar engine.
//!
//! Each logical type registers native implementations of its fundamental
//! scalar operators (equality, hashing, ordering, null handling). Every
//! implementation is tagged with the invocation convention it expects,
//! validated against the type's native representation, and sealed into an
//! immutable [`TypeOperatorDeclaration`] that dispatch code queries by
//! convention.

pub mod block;
pub mod classify;
pub mod config;
pub mod convention;
pub mod declaration;
pub mod error;
pub mod extensions;
pub mod function;
pub mod operator;
pub mod types;

pub use block::{ArrayBlock, Block};
pub use classify::classify;
pub use convention::{ArgumentConvention, InvocationConvention, ReturnConvention};
pub use declaration::{DeclarationSummary, TypeOperatorDeclaration, TypeOperatorDeclarationBuilder};
pub use error::{Error, Result, SignatureIssue};
pub use function::{Arg, Marker, NativeFunction, Parameter, Signature};
pub use operator::{OperatorKind, OperatorMethodHandle, ScalarOperator};
pub use types::{Datum, NativeType, ParamType};
