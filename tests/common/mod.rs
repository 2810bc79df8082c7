#![allow(dead_code)]

use typeop::{
    ArgumentConvention, Datum, InvocationConvention, NativeFunction, NativeType, OperatorKind,
    OperatorMethodHandle, ReturnConvention, ScalarOperator, Signature,
};

/// Signature returning the native type `kind` expects under FAIL_ON_NULL
pub fn returning(kind: OperatorKind) -> Signature {
    Signature::returning(kind.return_type().native())
}

/// Function whose body is never expected to run
pub fn stub(name: &str, signature: Signature) -> NativeFunction {
    NativeFunction::new(name, signature, |_| {
        Err(typeop::Error::InvalidArgument("stub called".into()))
    })
}

/// `(int64, int64) -> bool` equality over plain values
pub fn int64_equal() -> NativeFunction {
    NativeFunction::new(
        "int64_equal",
        returning(OperatorKind::Equal)
            .value(NativeType::Long)
            .value(NativeType::Long),
        |args| Ok(Some(Datum::Boolean(args[0].long()? == args[1].long()?))),
    )
}

/// `(int64) -> int64` hash
pub fn int64_hash(name: &str) -> NativeFunction {
    NativeFunction::new(
        name,
        Signature::returning(NativeType::Long.native()).value(NativeType::Long),
        |args| Ok(Some(Datum::Long(args[0].long()?.wrapping_mul(31)))),
    )
}

/// `(int64, int64) -> bool` less-than
pub fn int64_less_than() -> NativeFunction {
    NativeFunction::new(
        "int64_less_than",
        returning(OperatorKind::LessThan)
            .value(NativeType::Long)
            .value(NativeType::Long),
        |args| Ok(Some(Datum::Boolean(args[0].long()? < args[1].long()?))),
    )
}

/// `(int64, int64) -> int64` comparison
pub fn int64_compare(name: &str) -> NativeFunction {
    NativeFunction::new(
        name,
        Signature::returning(NativeType::Long.native())
            .value(NativeType::Long)
            .value(NativeType::Long),
        |args| Ok(Some(Datum::Long(args[0].long()?.cmp(&args[1].long()?) as i64))),
    )
}

pub fn never_null_binary() -> InvocationConvention {
    InvocationConvention::binary(
        ArgumentConvention::NeverNull,
        ArgumentConvention::NeverNull,
        ReturnConvention::FailOnNull,
    )
}

pub fn never_null_unary() -> InvocationConvention {
    InvocationConvention::unary(ArgumentConvention::NeverNull, ReturnConvention::FailOnNull)
}

pub fn handle(convention: InvocationConvention, function: NativeFunction) -> OperatorMethodHandle {
    OperatorMethodHandle::new(convention, function)
}

/// A complete, valid operator batch for a 64-bit integer type
pub fn int64_batch() -> Vec<ScalarOperator> {
    vec![
        ScalarOperator::new(OperatorKind::Equal, int64_equal()),
        ScalarOperator::new(OperatorKind::HashCode, int64_hash("int64_hash_code")),
        ScalarOperator::new(OperatorKind::XxHash64, int64_hash("int64_xx_hash64")),
        ScalarOperator::new(
            OperatorKind::ComparisonUnorderedLast,
            int64_compare("int64_comparison_unordered_last"),
        ),
        ScalarOperator::new(OperatorKind::LessThan, int64_less_than()),
        ScalarOperator::new(
            OperatorKind::XxHash64,
            stub(
                "int64_xx_hash64_block",
                Signature::returning(NativeType::Long.native()).block_position(),
            ),
        ),
        ScalarOperator::helper(int64_hash("int64_mix")),
    ]
}
