use serde::Serialize;
use std::fmt;

use crate::convention::InvocationConvention;
use crate::error::Result;
use crate::function::{Arg, NativeFunction};
use crate::types::{Datum, NativeType};

/// Fundamental scalar operators a type may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatorKind {
    Equal,
    HashCode,
    #[serde(rename = "XX_HASH_64")]
    XxHash64,
    IsDistinctFrom,
    Indeterminate,
    ComparisonUnorderedLast,
    ComparisonUnorderedFirst,
    LessThan,
    LessThanOrEqual,
}

impl OperatorKind {
    pub const COUNT: usize = 9;

    pub const ALL: [OperatorKind; OperatorKind::COUNT] = [
        OperatorKind::Equal,
        OperatorKind::HashCode,
        OperatorKind::XxHash64,
        OperatorKind::IsDistinctFrom,
        OperatorKind::Indeterminate,
        OperatorKind::ComparisonUnorderedLast,
        OperatorKind::ComparisonUnorderedFirst,
        OperatorKind::LessThan,
        OperatorKind::LessThanOrEqual,
    ];

    /// Number of logical operands
    pub const fn arity(self) -> usize {
        match self {
            OperatorKind::HashCode | OperatorKind::XxHash64 | OperatorKind::Indeterminate => 1,
            _ => 2,
        }
    }

    /// Native type returned under FAIL_ON_NULL (boxed under NULLABLE_RETURN)
    pub const fn return_type(self) -> NativeType {
        match self {
            OperatorKind::HashCode
            | OperatorKind::XxHash64
            | OperatorKind::ComparisonUnorderedLast
            | OperatorKind::ComparisonUnorderedFirst => NativeType::Long,
            _ => NativeType::Boolean,
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            OperatorKind::Equal => "EQUAL",
            OperatorKind::HashCode => "HASH_CODE",
            OperatorKind::XxHash64 => "XX_HASH_64",
            OperatorKind::IsDistinctFrom => "IS_DISTINCT_FROM",
            OperatorKind::Indeterminate => "INDETERMINATE",
            OperatorKind::ComparisonUnorderedLast => "COMPARISON_UNORDERED_LAST",
            OperatorKind::ComparisonUnorderedFirst => "COMPARISON_UNORDERED_FIRST",
            OperatorKind::LessThan => "LESS_THAN",
            OperatorKind::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A native implementation paired with the convention it is called with.
///
/// No validation happens here; whether the pair is consistent depends on the
/// type's native representation and is checked by the declaration builder.
#[derive(Debug)]
pub struct OperatorMethodHandle {
    convention: InvocationConvention,
    function: NativeFunction,
}

impl OperatorMethodHandle {
    pub fn new(convention: InvocationConvention, function: NativeFunction) -> Self {
        OperatorMethodHandle {
            convention,
            function,
        }
    }

    pub fn convention(&self) -> &InvocationConvention {
        &self.convention
    }

    pub fn function(&self) -> &NativeFunction {
        &self.function
    }

    pub fn invoke(&self, args: &[Arg<'_>]) -> Result<Option<Datum>> {
        self.function.call(args)
    }
}

/// Native function offered for registration, optionally tagged with the
/// operator it implements. Untagged functions are helpers and are skipped.
#[derive(Debug)]
pub struct ScalarOperator {
    kind: Option<OperatorKind>,
    function: NativeFunction,
}

impl ScalarOperator {
    pub fn new(kind: OperatorKind, function: NativeFunction) -> Self {
        ScalarOperator {
            kind: Some(kind),
            function,
        }
    }

    pub fn helper(function: NativeFunction) -> Self {
        ScalarOperator {
            kind: None,
            function,
        }
    }

    pub fn kind(&self) -> Option<OperatorKind> {
        self.kind
    }

    pub fn function(&self) -> &NativeFunction {
        &self.function
    }

    pub fn into_parts(self) -> (Option<OperatorKind>, NativeFunction) {
        (self.kind, self.function)
    }
}
