//! Infers the invocation convention of a native implementation from its
//! declared structural signature.

use tracing::debug;

use crate::convention::{ArgumentConvention, InvocationConvention, ReturnConvention};
use crate::error::{Error, Result, SignatureIssue};
use crate::function::{Marker, NativeFunction, Parameter};
use crate::operator::OperatorKind;
use crate::types::{NativeType, ParamType};

/// Classify `function` as an implementation of `kind` for a type whose
/// native representation is `native_type`.
///
/// Operands are classified left to right; a second operand is only
/// classified if the first does not consume every parameter. Checking the
/// operand count against the operator's arity is left to the builder.
pub fn classify(
    kind: OperatorKind,
    native_type: NativeType,
    function: &NativeFunction,
) -> Result<InvocationConvention> {
    let signature = function.signature();
    let params = signature.params();

    if params.iter().any(|p| p.ty == ParamType::Session) {
        return Err(Error::ForbiddenContextParameter {
            kind,
            name: function.name().to_string(),
        });
    }
    if params.iter().any(|p| p.ty == ParamType::Function) {
        return Err(invalid(kind, function, SignatureIssue::FunctionArgument));
    }

    let return_convention = classify_return(kind, function)?;

    if params.is_empty() {
        return Err(invalid(kind, function, SignatureIssue::NoParameters));
    }

    let left = next_argument(native_type, params, 0)
        .ok_or_else(|| invalid(kind, function, SignatureIssue::Unclassifiable(0)))?;
    let consumed = left.parameter_count();
    if consumed == params.len() {
        debug!(%kind, function = %function.name(), convention = %left, "classified unary operator");
        return Ok(InvocationConvention::unary(left, return_convention));
    }

    let right = next_argument(native_type, &params[consumed..], consumed)
        .ok_or_else(|| invalid(kind, function, SignatureIssue::Unclassifiable(consumed)))?;
    let consumed = consumed + right.parameter_count();
    if consumed != params.len() {
        return Err(invalid(
            kind,
            function,
            SignatureIssue::TrailingParameters(params.len() - consumed),
        ));
    }

    debug!(
        %kind,
        function = %function.name(),
        left = %left,
        right = %right,
        "classified binary operator"
    );
    Ok(InvocationConvention::binary(left, right, return_convention))
}

fn classify_return(kind: OperatorKind, function: &NativeFunction) -> Result<ReturnConvention> {
    let signature = function.signature();
    let expected = kind.return_type();

    if !signature.is_nullable_return() && signature.return_type() == expected.native() {
        Ok(ReturnConvention::FailOnNull)
    } else if signature.is_nullable_return() && signature.return_type() == expected.boxed() {
        Ok(ReturnConvention::NullableReturn)
    } else {
        let wanted = if signature.is_nullable_return() {
            expected.boxed()
        } else {
            expected.native()
        };
        Err(invalid(kind, function, SignatureIssue::ReturnType(wanted)))
    }
}

/// Classify the operand starting at the head of `params`. A parameter whose
/// marker selects a rule is not retried under a later one.
fn next_argument(
    native_type: NativeType,
    params: &[Parameter],
    offset: usize,
) -> Option<ArgumentConvention> {
    let first = params.first()?;
    let second = params.get(1);

    let convention = match first.marker {
        Marker::Nullable => {
            (first.ty == native_type.boxed()).then_some(ArgumentConvention::BoxedNullable)
        }
        Marker::BlockPosition => second
            .filter(|index| {
                index.marker == Marker::BlockIndex
                    && first.ty == ParamType::Block
                    && index.ty == NativeType::Int.native()
            })
            .map(|_| ArgumentConvention::BlockPosition),
        _ => match second {
            Some(flag) if flag.marker == Marker::IsNull => (first.ty == native_type.native()
                && flag.ty == NativeType::Boolean.native())
            .then_some(ArgumentConvention::NullFlag),
            _ => (first.ty == native_type.native()).then_some(ArgumentConvention::NeverNull),
        },
    };

    if convention.is_none() {
        debug!(position = offset, ty = %first.ty, "parameter does not start any argument convention");
    }
    convention
}

fn invalid(kind: OperatorKind, function: &NativeFunction, issue: SignatureIssue) -> Error {
    Error::InvalidOperatorSignature {
        kind,
        name: function.to_string(),
        issue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::Signature;
    use crate::types::Datum;
    use ArgumentConvention::*;
    use ReturnConvention::*;

    fn function(signature: Signature) -> NativeFunction {
        NativeFunction::new("op", signature, |_| Ok(Some(Datum::Boolean(true))))
    }

    fn boolean() -> Signature {
        Signature::returning(NativeType::Boolean.native())
    }

    fn classify_long(kind: OperatorKind, signature: Signature) -> Result<InvocationConvention> {
        classify(kind, NativeType::Long, &function(signature))
    }

    #[test]
    fn test_never_null_binary() {
        let convention = classify_long(
            OperatorKind::Equal,
            boolean().value(NativeType::Long).value(NativeType::Long),
        )
        .expect("classification failed");
        assert_eq!(convention, InvocationConvention::binary(NeverNull, NeverNull, FailOnNull));
    }

    #[test]
    fn test_mixed_operands() {
        let convention = classify_long(
            OperatorKind::IsDistinctFrom,
            boolean().value(NativeType::Long).nullable(NativeType::Long),
        )
        .expect("classification failed");
        assert_eq!(convention, InvocationConvention::binary(NeverNull, BoxedNullable, FailOnNull));

        let convention = classify_long(
            OperatorKind::Equal,
            boolean().block_position().value_with_null_flag(NativeType::Long),
        )
        .expect("classification failed");
        assert_eq!(convention, InvocationConvention::binary(BlockPosition, NullFlag, FailOnNull));
    }

    #[test]
    fn test_unary_conventions() {
        let long = || Signature::returning(NativeType::Long.native());

        let convention = classify_long(OperatorKind::XxHash64, long().value(NativeType::Long))
            .expect("classification failed");
        assert_eq!(convention, InvocationConvention::unary(NeverNull, FailOnNull));

        let convention = classify_long(OperatorKind::HashCode, long().block_position())
            .expect("classification failed");
        assert_eq!(convention, InvocationConvention::unary(BlockPosition, FailOnNull));

        let convention = classify_long(
            OperatorKind::Indeterminate,
            boolean().value_with_null_flag(NativeType::Long),
        )
        .expect("classification failed");
        assert_eq!(convention, InvocationConvention::unary(NullFlag, FailOnNull));
    }

    #[test]
    fn test_nullable_return() {
        let convention = classify_long(
            OperatorKind::Equal,
            Signature::returning(NativeType::Boolean.boxed())
                .nullable_return()
                .nullable(NativeType::Long)
                .nullable(NativeType::Long),
        )
        .expect("classification failed");
        assert_eq!(
            convention,
            InvocationConvention::binary(BoxedNullable, BoxedNullable, NullableReturn)
        );
    }

    #[test]
    fn test_wrong_return_type() {
        // hash must return long
        let err = classify_long(OperatorKind::HashCode, boolean().value(NativeType::Long))
            .expect_err("boolean hash accepted");
        assert!(matches!(
            err,
            Error::InvalidOperatorSignature { issue: SignatureIssue::ReturnType(ParamType::Native(NativeType::Long)), .. }
        ));

        // boxed return without the nullable marker
        let err = classify_long(
            OperatorKind::Equal,
            Signature::returning(NativeType::Boolean.boxed())
                .value(NativeType::Long)
                .value(NativeType::Long),
        )
        .expect_err("unmarked boxed return accepted");
        assert!(matches!(
            err,
            Error::InvalidOperatorSignature { issue: SignatureIssue::ReturnType(_), .. }
        ));
    }

    #[test]
    fn test_unmarked_null_flag_rejected() {
        let err = classify_long(
            OperatorKind::Equal,
            boolean()
                .value(NativeType::Long)
                .value(NativeType::Boolean)
                .value(NativeType::Long),
        )
        .expect_err("unmarked flag accepted");
        assert!(matches!(
            err,
            Error::InvalidOperatorSignature { kind: OperatorKind::Equal, issue: SignatureIssue::Unclassifiable(1), .. }
        ));
    }

    #[test]
    fn test_marker_mismatch_is_not_retried() {
        // nullable marker on a plain long does not fall back to NEVER_NULL
        let err = classify_long(
            OperatorKind::Equal,
            boolean()
                .param(NativeType::Long.native(), Marker::Nullable)
                .value(NativeType::Long),
        )
        .expect_err("mismatched nullable accepted");
        assert!(matches!(
            err,
            Error::InvalidOperatorSignature { issue: SignatureIssue::Unclassifiable(0), .. }
        ));

        // block without its index marker
        let err = classify_long(
            OperatorKind::HashCode,
            Signature::returning(NativeType::Long.native())
                .param(ParamType::Block, Marker::BlockPosition)
                .value(NativeType::Int),
        )
        .expect_err("block without index accepted");
        assert!(matches!(
            err,
            Error::InvalidOperatorSignature { issue: SignatureIssue::Unclassifiable(0), .. }
        ));

        // null flag after a boxed value is neither NULL_FLAG nor BOXED_NULLABLE
        let err = classify_long(
            OperatorKind::Indeterminate,
            boolean()
                .param(NativeType::Long.boxed(), Marker::None)
                .param(NativeType::Boolean.native(), Marker::IsNull),
        )
        .expect_err("boxed value with null flag accepted");
        assert!(matches!(
            err,
            Error::InvalidOperatorSignature { issue: SignatureIssue::Unclassifiable(0), .. }
        ));

        // flag marker on a non-boolean does not fall back to NEVER_NULL
        let err = classify_long(
            OperatorKind::HashCode,
            Signature::returning(NativeType::Long.native())
                .value(NativeType::Long)
                .param(NativeType::Long.native(), Marker::IsNull),
        )
        .expect_err("long null flag accepted");
        assert!(matches!(
            err,
            Error::InvalidOperatorSignature { issue: SignatureIssue::Unclassifiable(0), .. }
        ));
    }

    #[test]
    fn test_trailing_parameters() {
        let err = classify_long(
            OperatorKind::Equal,
            boolean()
                .value(NativeType::Long)
                .value(NativeType::Long)
                .value(NativeType::Long),
        )
        .expect_err("three operands accepted");
        assert!(matches!(
            err,
            Error::InvalidOperatorSignature { issue: SignatureIssue::TrailingParameters(1), .. }
        ));
    }

    #[test]
    fn test_no_parameters() {
        let err = classify_long(OperatorKind::Equal, boolean()).expect_err("empty accepted");
        assert!(matches!(
            err,
            Error::InvalidOperatorSignature { issue: SignatureIssue::NoParameters, .. }
        ));
    }

    #[test]
    fn test_function_argument_has_distinct_issue() {
        let err = classify_long(
            OperatorKind::Equal,
            boolean()
                .value(NativeType::Long)
                .param(ParamType::Function, Marker::None),
        )
        .expect_err("function argument accepted");
        assert!(matches!(
            err,
            Error::InvalidOperatorSignature { issue: SignatureIssue::FunctionArgument, .. }
        ));
    }

    #[test]
    fn test_session_rejected_anywhere() {
        for signature in [
            boolean().param(ParamType::Session, Marker::None).value(NativeType::Long).value(NativeType::Long),
            boolean().value(NativeType::Long).value(NativeType::Long).param(ParamType::Session, Marker::None),
        ] {
            let err = classify_long(OperatorKind::Equal, signature).expect_err("session accepted");
            assert!(matches!(err, Error::ForbiddenContextParameter { .. }));
        }
    }

    #[test]
    fn test_native_type_must_match() {
        let err = classify(
            OperatorKind::Equal,
            NativeType::Double,
            &function(boolean().value(NativeType::Long).value(NativeType::Long)),
        )
        .expect_err("long operator accepted for double");
        assert!(matches!(err, Error::InvalidOperatorSignature { .. }));
    }
}
