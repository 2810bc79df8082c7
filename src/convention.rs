//! Invocation conventions: how operands are passed to, and results returned
//! from, a native operator implementation.

use serde::Serialize;
use std::fmt;

use crate::error::{Error, Result};

/// How one logical operand is passed to a native implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArgumentConvention {
    /// The native value; the caller guarantees it is not null
    NeverNull,
    /// The native value followed by a boolean null flag. The value is
    /// unspecified when the flag is set.
    NullFlag,
    /// The boxed form of the native value; absence encodes null
    BoxedNullable,
    /// A block followed by an int position within it
    BlockPosition,
    /// Behavioural argument, never valid for type operators
    Function,
}

impl ArgumentConvention {
    /// Number of native parameters this convention occupies
    pub const fn parameter_count(self) -> usize {
        match self {
            ArgumentConvention::NeverNull => 1,
            ArgumentConvention::NullFlag => 2,
            ArgumentConvention::BoxedNullable => 1,
            ArgumentConvention::BlockPosition => 2,
            ArgumentConvention::Function => 1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ArgumentConvention::NeverNull => "NEVER_NULL",
            ArgumentConvention::NullFlag => "NULL_FLAG",
            ArgumentConvention::BoxedNullable => "BOXED_NULLABLE",
            ArgumentConvention::BlockPosition => "BLOCK_POSITION",
            ArgumentConvention::Function => "FUNCTION",
        }
    }
}

impl fmt::Display for ArgumentConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a native implementation returns its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnConvention {
    /// Native primitive return; the operator never produces null
    FailOnNull,
    /// Boxed return; null is a valid result
    NullableReturn,
}

impl ReturnConvention {
    pub const fn is_nullable(self) -> bool {
        matches!(self, ReturnConvention::NullableReturn)
    }

    pub const fn name(self) -> &'static str {
        match self {
            ReturnConvention::FailOnNull => "FAIL_ON_NULL",
            ReturnConvention::NullableReturn => "NULLABLE_RETURN",
        }
    }
}

impl fmt::Display for ReturnConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Full calling shape of an operator implementation: one argument convention
/// per operand plus a return convention
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InvocationConvention {
    arguments: Vec<ArgumentConvention>,
    return_convention: ReturnConvention,
}

impl InvocationConvention {
    /// Fails unless there are exactly one or two argument conventions
    pub fn new(arguments: Vec<ArgumentConvention>, return_convention: ReturnConvention) -> Result<Self> {
        if arguments.is_empty() || arguments.len() > 2 {
            return Err(Error::InvalidConvention(arguments.len()));
        }
        Ok(InvocationConvention {
            arguments,
            return_convention,
        })
    }

    pub fn unary(argument: ArgumentConvention, return_convention: ReturnConvention) -> Self {
        InvocationConvention {
            arguments: vec![argument],
            return_convention,
        }
    }

    pub fn binary(
        left: ArgumentConvention,
        right: ArgumentConvention,
        return_convention: ReturnConvention,
    ) -> Self {
        InvocationConvention {
            arguments: vec![left, right],
            return_convention,
        }
    }

    pub fn arguments(&self) -> &[ArgumentConvention] {
        &self.arguments
    }

    pub fn argument(&self, index: usize) -> Option<ArgumentConvention> {
        self.arguments.get(index).copied()
    }

    pub fn return_convention(&self) -> ReturnConvention {
        self.return_convention
    }

    /// Total native parameters implied by the argument conventions
    pub fn parameter_count(&self) -> usize {
        self.arguments.iter().map(|a| a.parameter_count()).sum()
    }
}

impl fmt::Display for InvocationConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, argument) in self.arguments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", argument)?;
        }
        write!(f, "){}", self.return_convention)
    }
}
