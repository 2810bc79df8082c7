//! Sealed per-type operator declarations and the builder that validates them.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::classify::classify;
use crate::convention::{ArgumentConvention, InvocationConvention, ReturnConvention};
use crate::error::{Error, Result, SignatureIssue};
use crate::function::Signature;
use crate::operator::{OperatorKind, OperatorMethodHandle, ScalarOperator};
use crate::types::{NativeType, ParamType};

type OperatorSets = [Vec<OperatorMethodHandle>; OperatorKind::COUNT];

fn empty_sets() -> OperatorSets {
    std::array::from_fn(|_| Vec::new())
}

/// Immutable set of operator implementations declared by one type.
///
/// The builder has already enforced every invariant; dispatch code trusts
/// it without re-validating.
#[derive(Debug)]
pub struct TypeOperatorDeclaration {
    native_type: NativeType,
    operators: OperatorSets,
}

impl TypeOperatorDeclaration {
    pub fn builder(native_type: NativeType) -> TypeOperatorDeclarationBuilder {
        TypeOperatorDeclarationBuilder::new(native_type)
    }

    /// Declaration with no operators at all
    pub fn empty(native_type: NativeType) -> Self {
        TypeOperatorDeclaration {
            native_type,
            operators: empty_sets(),
        }
    }

    /// Build a declaration from a batch of tagged native functions
    pub fn extract(
        source: &str,
        native_type: NativeType,
        operators: impl IntoIterator<Item = ScalarOperator>,
    ) -> Result<Self> {
        let mut builder = TypeOperatorDeclaration::builder(native_type);
        builder.add_operators(source, operators)?;
        builder.build()
    }

    pub fn native_type(&self) -> NativeType {
        self.native_type
    }

    pub fn is_comparable(&self) -> bool {
        !self.operators(OperatorKind::Equal).is_empty()
    }

    pub fn is_orderable(&self) -> bool {
        !self.operators(OperatorKind::ComparisonUnorderedLast).is_empty()
    }

    /// Every implementation of `kind`, in registration order
    pub fn operators(&self, kind: OperatorKind) -> &[OperatorMethodHandle] {
        &self.operators[kind.index()]
    }

    pub fn conventions(&self, kind: OperatorKind) -> impl Iterator<Item = &InvocationConvention> {
        self.operators(kind).iter().map(|h| h.convention())
    }

    /// Implementation of `kind` callable with exactly `convention`.
    /// A miss is expected; callers fall back to another convention.
    pub fn find(
        &self,
        kind: OperatorKind,
        convention: &InvocationConvention,
    ) -> Option<&OperatorMethodHandle> {
        self.operators(kind).iter().find(|h| h.convention() == convention)
    }

    pub fn summary(&self) -> DeclarationSummary {
        let operators = OperatorKind::ALL
            .iter()
            .filter(|kind| !self.operators(**kind).is_empty())
            .map(|kind| {
                let conventions: Vec<String> =
                    self.conventions(*kind).map(|c| c.to_string()).collect();
                (*kind, conventions)
            })
            .collect();
        DeclarationSummary {
            native_type: self.native_type,
            comparable: self.is_comparable(),
            orderable: self.is_orderable(),
            operators,
        }
    }
}

/// Serializable view of a declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeclarationSummary {
    pub native_type: NativeType,
    pub comparable: bool,
    pub orderable: bool,
    pub operators: BTreeMap<OperatorKind, Vec<String>>,
}

impl DeclarationSummary {
    pub fn count(&self, kind: OperatorKind) -> usize {
        self.operators.get(&kind).map_or(0, Vec::len)
    }
}

/// Single-use accumulator for a [`TypeOperatorDeclaration`]. Every handle is
/// validated as it is added; cross-operator invariants are checked by
/// [`build`](Self::build), which consumes the builder.
pub struct TypeOperatorDeclarationBuilder {
    native_type: NativeType,
    operators: OperatorSets,
}

macro_rules! operator_adders {
    ($($kind:ident => $single:ident, $batch:ident;)+) => {
        $(
            pub fn $single(&mut self, operator: OperatorMethodHandle) -> Result<&mut Self> {
                self.add(OperatorKind::$kind, operator)
            }

            pub fn $batch(
                &mut self,
                operators: impl IntoIterator<Item = OperatorMethodHandle>,
            ) -> Result<&mut Self> {
                self.add_all(OperatorKind::$kind, operators)
            }
        )+
    };
}

impl TypeOperatorDeclarationBuilder {
    pub fn new(native_type: NativeType) -> Self {
        TypeOperatorDeclarationBuilder {
            native_type,
            operators: empty_sets(),
        }
    }

    operator_adders! {
        Equal => add_equal, add_equal_operators;
        HashCode => add_hash_code, add_hash_code_operators;
        XxHash64 => add_xx_hash64, add_xx_hash64_operators;
        IsDistinctFrom => add_distinct_from, add_distinct_from_operators;
        Indeterminate => add_indeterminate, add_indeterminate_operators;
        ComparisonUnorderedLast => add_comparison_unordered_last, add_comparison_unordered_last_operators;
        ComparisonUnorderedFirst => add_comparison_unordered_first, add_comparison_unordered_first_operators;
        LessThan => add_less_than, add_less_than_operators;
        LessThanOrEqual => add_less_than_or_equal, add_less_than_or_equal_operators;
    }

    /// Validate and add one implementation of `kind`
    pub fn add(&mut self, kind: OperatorKind, operator: OperatorMethodHandle) -> Result<&mut Self> {
        self.verify(kind, &operator)?;
        debug!(
            %kind,
            function = %operator.function().name(),
            convention = %operator.convention(),
            "accepted operator"
        );
        self.operators[kind.index()].push(operator);
        Ok(self)
    }

    /// Validate every implementation before accepting any of them
    pub fn add_all(
        &mut self,
        kind: OperatorKind,
        operators: impl IntoIterator<Item = OperatorMethodHandle>,
    ) -> Result<&mut Self> {
        let operators: Vec<_> = operators.into_iter().collect();
        for operator in &operators {
            self.verify(kind, operator)?;
        }
        self.operators[kind.index()].extend(operators);
        Ok(self)
    }

    /// Classify every tagged function in `operators` and add it under its
    /// kind. Nothing is added unless the whole batch is valid. Untagged
    /// helpers are skipped, but a batch with no tagged function at all is
    /// rejected: registering a type through this entry point with zero
    /// operators is treated as a mistake by the caller.
    pub fn add_operators(
        &mut self,
        source: &str,
        operators: impl IntoIterator<Item = ScalarOperator>,
    ) -> Result<&mut Self> {
        let mut accepted: Vec<(OperatorKind, OperatorMethodHandle)> = Vec::new();
        for operator in operators {
            let (kind, function) = operator.into_parts();
            let Some(kind) = kind else {
                continue;
            };
            let convention = classify(kind, self.native_type, &function)?;
            let handle = OperatorMethodHandle::new(convention, function);
            self.verify(kind, &handle)?;
            accepted.push((kind, handle));
        }
        if accepted.is_empty() {
            return Err(Error::EmptyOperatorBatch(source.to_string()));
        }

        debug!(source, operators = accepted.len(), "accepted operator batch");
        for (kind, handle) in accepted {
            self.operators[kind.index()].push(handle);
        }
        Ok(self)
    }

    fn verify(&self, kind: OperatorKind, operator: &OperatorMethodHandle) -> Result<()> {
        let convention = operator.convention();
        let function = operator.function();
        let signature = function.signature();
        let mismatch = |message: String| Error::ArgumentConventionMismatch {
            kind,
            name: function.to_string(),
            message,
        };

        if convention.arguments().len() != kind.arity() {
            return Err(mismatch(format!(
                "Expected {} arguments, but got {}",
                kind.arity(),
                convention.arguments().len()
            )));
        }

        if signature.params().iter().any(|p| p.ty == ParamType::Session) {
            return Err(Error::ForbiddenContextParameter {
                kind,
                name: function.to_string(),
            });
        }

        if convention.parameter_count() != signature.param_count() {
            return Err(mismatch(format!(
                "Expected {} method parameters, but got {}",
                convention.parameter_count(),
                signature.param_count()
            )));
        }

        let mut index = 0;
        for argument in convention.arguments() {
            match self.check_argument(*argument, signature, index) {
                Ok(()) => {}
                Err(ArgumentProblem::Function) => {
                    return Err(Error::InvalidOperatorSignature {
                        kind,
                        name: function.to_string(),
                        issue: SignatureIssue::FunctionArgument,
                    });
                }
                Err(ArgumentProblem::Mismatch(message)) => return Err(mismatch(message)),
            }
            index += argument.parameter_count();
        }

        let expected = kind.return_type();
        let actual = signature.return_type();
        match convention.return_convention() {
            ReturnConvention::FailOnNull if actual != expected.native() => Err(mismatch(format!(
                "Expected return type to be {}, but is {}",
                expected.native(),
                actual
            ))),
            ReturnConvention::NullableReturn if actual != expected.boxed() => {
                Err(mismatch(format!(
                    "Expected return type to be {}, but is {}",
                    expected.boxed(),
                    actual
                )))
            }
            _ => Ok(()),
        }
    }

    fn check_argument(
        &self,
        argument: ArgumentConvention,
        signature: &Signature,
        index: usize,
    ) -> std::result::Result<(), ArgumentProblem> {
        let native = self.native_type;
        // parameter counts were checked first, so two-parameter conventions have both
        let first = signature.param_type(index);
        let second = signature.param_type(index + 1);

        let expect = |ok: bool, message: String| {
            if ok {
                Ok(())
            } else {
                Err(ArgumentProblem::Mismatch(message))
            }
        };
        let describe = |ty: Option<ParamType>| ty.map_or("nothing".to_string(), |t| t.to_string());

        match argument {
            ArgumentConvention::NeverNull => expect(
                first == Some(native.native()),
                format!("Expected argument type to be {}, but is {}", native, describe(first)),
            ),
            ArgumentConvention::NullFlag => {
                expect(
                    first == Some(native.native()),
                    format!("Expected argument type to be {}, but is {}", native, describe(first)),
                )?;
                expect(
                    second == Some(NativeType::Boolean.native()),
                    "Expected null flag parameter to be followed by a boolean parameter".to_string(),
                )
            }
            ArgumentConvention::BoxedNullable => expect(
                first == Some(native.boxed()),
                format!(
                    "Expected argument type to be {}, but is {}",
                    native.boxed(),
                    describe(first)
                ),
            ),
            ArgumentConvention::BlockPosition => expect(
                first == Some(ParamType::Block) && second == Some(NativeType::Int.native()),
                "Expected BLOCK_POSITION argument to have parameters block and int".to_string(),
            ),
            ArgumentConvention::Function => Err(ArgumentProblem::Function),
        }
    }

    /// Enforce cross-operator invariants and seal the declaration
    pub fn build(self) -> Result<TypeOperatorDeclaration> {
        let present = |kind: OperatorKind| !self.operators[kind.index()].is_empty();

        if !present(OperatorKind::Equal) {
            for supplied in [OperatorKind::HashCode, OperatorKind::XxHash64] {
                if present(supplied) {
                    return Err(Error::MissingRequiredOperator {
                        supplied,
                        required: &[OperatorKind::Equal],
                    });
                }
            }
        } else if !present(OperatorKind::XxHash64) {
            return Err(Error::MissingRequiredOperator {
                supplied: OperatorKind::Equal,
                required: &[OperatorKind::XxHash64],
            });
        }

        if !present(OperatorKind::ComparisonUnorderedLast)
            && !present(OperatorKind::ComparisonUnorderedFirst)
        {
            for supplied in [OperatorKind::LessThan, OperatorKind::LessThanOrEqual] {
                if present(supplied) {
                    return Err(Error::MissingRequiredOperator {
                        supplied,
                        required: &[
                            OperatorKind::ComparisonUnorderedLast,
                            OperatorKind::ComparisonUnorderedFirst,
                        ],
                    });
                }
            }
        }

        let declaration = TypeOperatorDeclaration {
            native_type: self.native_type,
            operators: self.operators,
        };
        debug!(
            native_type = %declaration.native_type,
            comparable = declaration.is_comparable(),
            orderable = declaration.is_orderable(),
            "sealed type operator declaration"
        );
        Ok(declaration)
    }
}

enum ArgumentProblem {
    Function,
    Mismatch(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::{Marker, NativeFunction};
    use crate::types::Datum;
    use ArgumentConvention::*;
    use ReturnConvention::*;

    fn function(name: &str, signature: Signature) -> NativeFunction {
        NativeFunction::new(name, signature, |_| Ok(Some(Datum::Boolean(false))))
    }

    fn handle(convention: InvocationConvention, signature: Signature) -> OperatorMethodHandle {
        OperatorMethodHandle::new(convention, function("op", signature))
    }

    fn long_equal() -> OperatorMethodHandle {
        handle(
            InvocationConvention::binary(NeverNull, NeverNull, FailOnNull),
            Signature::returning(NativeType::Boolean.native())
                .value(NativeType::Long)
                .value(NativeType::Long),
        )
    }

    fn long_hash() -> OperatorMethodHandle {
        handle(
            InvocationConvention::unary(NeverNull, FailOnNull),
            Signature::returning(NativeType::Long.native()).value(NativeType::Long),
        )
    }

    fn long_less_than() -> OperatorMethodHandle {
        long_equal()
    }

    #[test]
    fn test_empty_builder_builds() {
        let declaration = TypeOperatorDeclaration::builder(NativeType::Long)
            .build()
            .expect("empty declaration");
        assert!(!declaration.is_comparable());
        assert!(!declaration.is_orderable());
        assert_eq!(
            declaration.summary(),
            TypeOperatorDeclaration::empty(NativeType::Long).summary()
        );
    }

    #[test]
    fn test_wrong_argument_count() {
        let mut builder = TypeOperatorDeclaration::builder(NativeType::Long);
        let err = builder.add_equal(long_hash()).err().expect("unary equal accepted");
        assert!(matches!(err, Error::ArgumentConventionMismatch { kind: OperatorKind::Equal, .. }));
    }

    #[test]
    fn test_parameter_count_mismatch() {
        // NULL_FLAG claimed, but the callable only has the value
        let mut builder = TypeOperatorDeclaration::builder(NativeType::Long);
        let err = builder
            .add_hash_code(handle(
                InvocationConvention::unary(NullFlag, FailOnNull),
                Signature::returning(NativeType::Long.native()).value(NativeType::Long),
            ))
            .err()
            .expect("short null flag accepted");
        assert!(matches!(err, Error::ArgumentConventionMismatch { .. }));
    }

    #[test]
    fn test_claimed_convention_is_reverified() {
        let mut builder = TypeOperatorDeclaration::builder(NativeType::Long);

        // BOXED_NULLABLE claimed over a plain long
        let err = builder
            .add_equal(handle(
                InvocationConvention::binary(NeverNull, BoxedNullable, FailOnNull),
                Signature::returning(NativeType::Boolean.native())
                    .value(NativeType::Long)
                    .value(NativeType::Long),
            ))
            .err()
            .expect("boxed mismatch accepted");
        assert!(matches!(err, Error::ArgumentConventionMismatch { .. }));

        // BLOCK_POSITION claimed over (long, int)
        let err = builder
            .add_xx_hash64(handle(
                InvocationConvention::unary(BlockPosition, FailOnNull),
                Signature::returning(NativeType::Long.native())
                    .value(NativeType::Long)
                    .value(NativeType::Int),
            ))
            .err()
            .expect("block mismatch accepted");
        assert!(matches!(err, Error::ArgumentConventionMismatch { .. }));

        // NULL_FLAG whose flag is not a boolean
        let err = builder
            .add_indeterminate(handle(
                InvocationConvention::unary(NullFlag, FailOnNull),
                Signature::returning(NativeType::Boolean.native())
                    .value(NativeType::Long)
                    .value(NativeType::Long),
            ))
            .err()
            .expect("long null flag accepted");
        assert!(matches!(err, Error::ArgumentConventionMismatch { .. }));
    }

    #[test]
    fn test_function_convention_rejected() {
        let mut builder = TypeOperatorDeclaration::builder(NativeType::Long);
        let err = builder
            .add_hash_code(handle(
                InvocationConvention::unary(Function, FailOnNull),
                Signature::returning(NativeType::Long.native()).param(ParamType::Function, Marker::None),
            ))
            .err()
            .expect("function convention accepted");
        assert!(matches!(
            err,
            Error::InvalidOperatorSignature { issue: SignatureIssue::FunctionArgument, .. }
        ));
    }

    #[test]
    fn test_return_convention_checked() {
        let mut builder = TypeOperatorDeclaration::builder(NativeType::Long);
        let err = builder
            .add_equal(handle(
                InvocationConvention::binary(NeverNull, NeverNull, NullableReturn),
                Signature::returning(NativeType::Boolean.native())
                    .value(NativeType::Long)
                    .value(NativeType::Long),
            ))
            .err()
            .expect("native return accepted as nullable");
        assert!(matches!(err, Error::ArgumentConventionMismatch { .. }));

        builder
            .add_equal(handle(
                InvocationConvention::binary(NeverNull, NeverNull, NullableReturn),
                Signature::returning(NativeType::Boolean.boxed())
                    .nullable_return()
                    .value(NativeType::Long)
                    .value(NativeType::Long),
            ))
            .expect("boxed return rejected");
    }

    #[test]
    fn test_batch_add_is_all_or_nothing() {
        let mut builder = TypeOperatorDeclaration::builder(NativeType::Long);
        let result = builder.add_equal_operators([long_equal(), long_hash()]);
        assert!(result.is_err());

        builder.add_xx_hash64(long_hash()).expect("xxhash rejected");
        let err = builder.build().expect_err("xxhash without equal built");
        assert!(matches!(
            err,
            Error::MissingRequiredOperator { supplied: OperatorKind::XxHash64, .. }
        ));
    }

    #[test]
    fn test_equal_requires_xx_hash64() {
        let mut builder = TypeOperatorDeclaration::builder(NativeType::Long);
        builder
            .add_equal(long_equal())
            .and_then(|b| b.add_hash_code(long_hash()))
            .expect("add failed");
        let err = builder.build().expect_err("equal without xxhash built");
        assert!(matches!(
            err,
            Error::MissingRequiredOperator { supplied: OperatorKind::Equal, required } if required == [OperatorKind::XxHash64]
        ));
    }

    #[test]
    fn test_less_than_or_equal_requires_comparison() {
        let mut builder = TypeOperatorDeclaration::builder(NativeType::Long);
        builder.add_less_than_or_equal(long_less_than()).expect("add failed");
        let err = builder.build().expect_err("ordering without comparison built");
        assert!(matches!(
            err,
            Error::MissingRequiredOperator { supplied: OperatorKind::LessThanOrEqual, .. }
        ));
    }

    #[test]
    fn test_comparison_first_is_enough_for_ordering() {
        let mut builder = TypeOperatorDeclaration::builder(NativeType::Long);
        builder
            .add_comparison_unordered_first(handle(
                InvocationConvention::binary(NeverNull, NeverNull, FailOnNull),
                Signature::returning(NativeType::Long.native())
                    .value(NativeType::Long)
                    .value(NativeType::Long),
            ))
            .and_then(|b| b.add_less_than(long_less_than()))
            .expect("add failed");
        let declaration = builder.build().expect("build failed");

        // orderable only tracks the unordered-last comparison
        assert!(!declaration.is_orderable());
        assert_eq!(declaration.operators(OperatorKind::LessThan).len(), 1);
    }

    #[test]
    fn test_find_by_convention() {
        let mut builder = TypeOperatorDeclaration::builder(NativeType::Long);
        builder
            .add_equal(long_equal())
            .and_then(|b| b.add_xx_hash64(long_hash()))
            .expect("add failed");
        let declaration = builder.build().expect("build failed");

        let never_null = InvocationConvention::binary(NeverNull, NeverNull, FailOnNull);
        let block = InvocationConvention::binary(BlockPosition, BlockPosition, FailOnNull);
        assert!(declaration.find(OperatorKind::Equal, &never_null).is_some());
        assert!(declaration.find(OperatorKind::Equal, &block).is_none());
        assert!(declaration.find(OperatorKind::LessThan, &never_null).is_none());

        let summary = declaration.summary();
        assert_eq!(summary.count(OperatorKind::Equal), 1);
        assert_eq!(summary.count(OperatorKind::HashCode), 0);
        assert_eq!(
            summary.operators.get(&OperatorKind::XxHash64),
            Some(&vec!["(NEVER_NULL)FAIL_ON_NULL".to_string()])
        );
    }

    #[test]
    fn test_add_operators_requires_a_tagged_function() {
        let mut builder = TypeOperatorDeclaration::builder(NativeType::Long);
        let err = builder
            .add_operators(
                "helpers",
                [ScalarOperator::helper(function(
                    "unused",
                    Signature::returning(NativeType::Long.native()).value(NativeType::Long),
                ))],
            )
            .err()
            .expect("helper-only batch accepted");
        assert!(matches!(err, Error::EmptyOperatorBatch(source) if source == "helpers"));
    }

    #[test]
    fn test_add_operators_is_all_or_nothing() {
        let batch = [
            ScalarOperator::new(
                OperatorKind::Equal,
                function(
                    "equal",
                    Signature::returning(NativeType::Boolean.native())
                        .value(NativeType::Long)
                        .value(NativeType::Long),
                ),
            ),
            ScalarOperator::new(
                OperatorKind::XxHash64,
                function(
                    "xx_hash64",
                    Signature::returning(NativeType::Long.native()).value(NativeType::Long),
                ),
            ),
            // classifies as binary, rejected by the arity check
            ScalarOperator::new(
                OperatorKind::HashCode,
                function(
                    "hash_code",
                    Signature::returning(NativeType::Long.native())
                        .value(NativeType::Long)
                        .value(NativeType::Long),
                ),
            ),
        ];

        let mut builder = TypeOperatorDeclaration::builder(NativeType::Long);
        let err = builder.add_operators("long", batch).err().expect("binary hash accepted");
        assert!(matches!(
            err,
            Error::ArgumentConventionMismatch { kind: OperatorKind::HashCode, .. }
        ));

        let declaration = builder.build().expect("untouched builder rejected");
        assert!(!declaration.is_comparable());
        assert!(declaration.operators(OperatorKind::XxHash64).is_empty());
    }
}
