use thiserror::Error as ThisError;

use crate::operator::OperatorKind;
use crate::types::ParamType;

pub type Result<T> = std::result::Result<T, Error>;

/// Registration failures. None of these are recoverable: a type whose
/// operator set fails validation must not be registered at all.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Unexpected signature for {kind} operator {name}: {issue}")]
    InvalidOperatorSignature {
        kind: OperatorKind,
        name: String,
        issue: SignatureIssue,
    },

    #[error("{kind} operator {name} does not match its convention: {message}")]
    ArgumentConventionMismatch {
        kind: OperatorKind,
        name: String,
        message: String,
    },

    #[error("Session is not supported in type operators: {kind} operator {name}")]
    ForbiddenContextParameter { kind: OperatorKind, name: String },

    #[error("{supplied} operators can not be supplied without {}", kind_list(.required))]
    MissingRequiredOperator {
        supplied: OperatorKind,
        required: &'static [OperatorKind],
    },

    #[error("{0} does not contain any operators")]
    EmptyOperatorBatch(String),

    #[error("Invocation convention must have 1 or 2 arguments, got {0}")]
    InvalidConvention(usize),

    #[error("Type {0} is already registered")]
    DuplicateType(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Why a structural signature could not be classified
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum SignatureIssue {
    #[error("operator has no parameters")]
    NoParameters,

    #[error("unexpected parameter at position {0}")]
    Unclassifiable(usize),

    #[error("{0} parameters left after the second operand")]
    TrailingParameters(usize),

    #[error("function arguments are not supported in type operators")]
    FunctionArgument,

    #[error("expected operator to return {0}")]
    ReturnType(ParamType),
}

fn kind_list(kinds: &[OperatorKind]) -> String {
    kinds
        .iter()
        .map(|k| k.name())
        .collect::<Vec<_>>()
        .join(" or ")
}
