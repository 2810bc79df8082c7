use std::cmp::Ordering;
use std::sync::Arc;
use xxhash_rust::xxh64::xxh64;

use super::{TypeCategory, TypeExtension};
use crate::error::{Error, Result};
use crate::function::{Arg, NativeFunction, Signature};
use crate::operator::{OperatorKind, ScalarOperator};
use crate::types::{Datum, NativeType};

/// Hash of a null position
const NULL_HASH_CODE: i64 = 0;

/// Native scalar whose operators are generated by [`scalar_operators`]
trait NativeScalar: Sized + Send + Sync + 'static {
    const NATIVE: NativeType;

    fn read(datum: &Datum) -> Result<Self>;

    fn equal(&self, other: &Self) -> bool;

    fn not_distinct(&self, other: &Self) -> bool {
        self.equal(other)
    }

    fn hash_code(&self) -> i64;

    fn xx_hash64(&self) -> i64;

    /// Total order; `nan_last` decides where unordered values sort
    fn compare(&self, other: &Self, nan_last: bool) -> Ordering;

    fn less_than(&self, other: &Self) -> bool {
        self.compare(other, true) == Ordering::Less
    }

    fn less_than_or_equal(&self, other: &Self) -> bool {
        self.compare(other, true) != Ordering::Greater
    }
}

fn wrong_native(expected: NativeType, datum: &Datum) -> Error {
    Error::InvalidArgument(format!("expected {} value, got {:?}", expected, datum))
}

impl NativeScalar for i64 {
    const NATIVE: NativeType = NativeType::Long;

    fn read(datum: &Datum) -> Result<Self> {
        datum.as_long().ok_or_else(|| wrong_native(Self::NATIVE, datum))
    }

    fn equal(&self, other: &Self) -> bool {
        self == other
    }

    fn hash_code(&self) -> i64 {
        long_hash(*self)
    }

    fn xx_hash64(&self) -> i64 {
        xxh64(&self.to_le_bytes(), 0) as i64
    }

    fn compare(&self, other: &Self, _nan_last: bool) -> Ordering {
        self.cmp(other)
    }
}

impl NativeScalar for f64 {
    const NATIVE: NativeType = NativeType::Double;

    fn read(datum: &Datum) -> Result<Self> {
        datum.as_double().ok_or_else(|| wrong_native(Self::NATIVE, datum))
    }

    fn equal(&self, other: &Self) -> bool {
        self == other
    }

    fn not_distinct(&self, other: &Self) -> bool {
        (self.is_nan() && other.is_nan()) || self == other
    }

    fn hash_code(&self) -> i64 {
        long_hash(canonical_bits(*self))
    }

    fn xx_hash64(&self) -> i64 {
        xxh64(&canonical_bits(*self).to_le_bytes(), 0) as i64
    }

    fn compare(&self, other: &Self, nan_last: bool) -> Ordering {
        match (self.is_nan(), other.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) if nan_last => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, true) if nan_last => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.partial_cmp(other).unwrap_or(Ordering::Equal),
        }
    }

    // NaN is never less than anything
    fn less_than(&self, other: &Self) -> bool {
        self < other
    }

    fn less_than_or_equal(&self, other: &Self) -> bool {
        self <= other
    }
}

impl NativeScalar for bool {
    const NATIVE: NativeType = NativeType::Boolean;

    fn read(datum: &Datum) -> Result<Self> {
        datum.as_bool().ok_or_else(|| wrong_native(Self::NATIVE, datum))
    }

    fn equal(&self, other: &Self) -> bool {
        self == other
    }

    fn hash_code(&self) -> i64 {
        if *self { 1231 } else { 1237 }
    }

    fn xx_hash64(&self) -> i64 {
        xxh64(&[*self as u8], 0) as i64
    }

    fn compare(&self, other: &Self, _nan_last: bool) -> Ordering {
        self.cmp(other)
    }
}

impl NativeScalar for Arc<[u8]> {
    const NATIVE: NativeType = NativeType::Slice;

    fn read(datum: &Datum) -> Result<Self> {
        datum
            .as_slice()
            .cloned()
            .ok_or_else(|| wrong_native(Self::NATIVE, datum))
    }

    fn equal(&self, other: &Self) -> bool {
        self[..] == other[..]
    }

    fn hash_code(&self) -> i64 {
        self.xx_hash64()
    }

    fn xx_hash64(&self) -> i64 {
        xxh64(self, 0) as i64
    }

    fn compare(&self, other: &Self, _nan_last: bool) -> Ordering {
        self[..].cmp(&other[..])
    }
}

fn long_hash(value: i64) -> i64 {
    value
        .wrapping_mul(0xC2B2AE3D27D4EB4Fu64 as i64)
        .rotate_left(31)
        .wrapping_mul(0x9E3779B185EBCA87u64 as i64)
}

/// Bits of a double with -0.0 folded into 0.0 and every NaN folded into one
fn canonical_bits(value: f64) -> i64 {
    if value == 0.0 {
        0
    } else if value.is_nan() {
        f64::NAN.to_bits() as i64
    } else {
        value.to_bits() as i64
    }
}

fn never_null<T: NativeScalar>(arg: &Arg<'_>) -> Result<T> {
    T::read(arg.datum()?)
}

fn boxed<T: NativeScalar>(arg: &Arg<'_>) -> Result<Option<T>> {
    arg.boxed()?.map(T::read).transpose()
}

/// Value of a BLOCK_POSITION pair, None when the position is null
fn at_position<T: NativeScalar>(block: &Arg<'_>, position: &Arg<'_>) -> Result<Option<T>> {
    let block = block.block()?;
    let position = position.position()?;
    if block.is_null(position) {
        return Ok(None);
    }
    block
        .value(position)
        .ok_or_else(|| Error::InvalidArgument(format!("position {} is out of range", position)))
        .and_then(T::read)
        .map(Some)
}

fn non_null_at<T: NativeScalar>(block: &Arg<'_>, position: &Arg<'_>) -> Result<T> {
    at_position(block, position)?
        .ok_or_else(|| Error::InvalidArgument("unexpected null position".into()))
}

fn ordering(ordering: Ordering) -> Datum {
    Datum::Long(match ordering {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    })
}

fn distinct<T: NativeScalar>(left: Option<T>, right: Option<T>) -> bool {
    match (left, right) {
        (None, None) => false,
        (Some(l), Some(r)) => !l.not_distinct(&r),
        _ => true,
    }
}

/// The standard operator set for a scalar native type, offered in the
/// conventions the engine calls most: plain values for interpreted code and
/// block positions for vectorized loops.
fn scalar_operators<T: NativeScalar>(type_name: &str) -> Vec<ScalarOperator> {
    let native = T::NATIVE;
    let boolean = || Signature::returning(NativeType::Boolean.native());
    let long = || Signature::returning(NativeType::Long.native());
    let name = |operator: &str| format!("{}_{}", type_name, operator);

    vec![
        ScalarOperator::new(
            OperatorKind::Equal,
            NativeFunction::new(name("equal"), boolean().value(native).value(native), |args| {
                let (left, right) = (never_null::<T>(&args[0])?, never_null::<T>(&args[1])?);
                Ok(Some(Datum::Boolean(left.equal(&right))))
            }),
        ),
        // null positions compare as unknown
        ScalarOperator::new(
            OperatorKind::Equal,
            NativeFunction::new(
                name("equal_block"),
                Signature::returning(NativeType::Boolean.boxed())
                    .nullable_return()
                    .block_position()
                    .block_position(),
                |args| {
                    let left = at_position::<T>(&args[0], &args[1])?;
                    let right = at_position::<T>(&args[2], &args[3])?;
                    Ok(left.zip(right).map(|(l, r)| Datum::Boolean(l.equal(&r))))
                },
            ),
        ),
        ScalarOperator::new(
            OperatorKind::HashCode,
            NativeFunction::new(name("hash_code"), long().value(native), |args| {
                Ok(Some(Datum::Long(never_null::<T>(&args[0])?.hash_code())))
            }),
        ),
        ScalarOperator::new(
            OperatorKind::XxHash64,
            NativeFunction::new(name("xx_hash64"), long().value(native), |args| {
                Ok(Some(Datum::Long(never_null::<T>(&args[0])?.xx_hash64())))
            }),
        ),
        ScalarOperator::new(
            OperatorKind::XxHash64,
            NativeFunction::new(name("xx_hash64_block"), long().block_position(), |args| {
                let hash = at_position::<T>(&args[0], &args[1])?
                    .map_or(NULL_HASH_CODE, |v| v.xx_hash64());
                Ok(Some(Datum::Long(hash)))
            }),
        ),
        ScalarOperator::new(
            OperatorKind::IsDistinctFrom,
            NativeFunction::new(
                name("distinct_from"),
                boolean().nullable(native).nullable(native),
                |args| {
                    let (left, right) = (boxed::<T>(&args[0])?, boxed::<T>(&args[1])?);
                    Ok(Some(Datum::Boolean(distinct(left, right))))
                },
            ),
        ),
        ScalarOperator::new(
            OperatorKind::IsDistinctFrom,
            NativeFunction::new(
                name("distinct_from_block"),
                boolean().block_position().block_position(),
                |args| {
                    let left = at_position::<T>(&args[0], &args[1])?;
                    let right = at_position::<T>(&args[2], &args[3])?;
                    Ok(Some(Datum::Boolean(distinct(left, right))))
                },
            ),
        ),
        ScalarOperator::new(
            OperatorKind::Indeterminate,
            NativeFunction::new(
                name("indeterminate"),
                boolean().value_with_null_flag(native),
                |args| Ok(Some(Datum::Boolean(args[1].boolean()?))),
            ),
        ),
        ScalarOperator::new(
            OperatorKind::ComparisonUnorderedLast,
            NativeFunction::new(
                name("comparison_unordered_last"),
                long().value(native).value(native),
                |args| {
                    let (left, right) = (never_null::<T>(&args[0])?, never_null::<T>(&args[1])?);
                    Ok(Some(ordering(left.compare(&right, true))))
                },
            ),
        ),
        ScalarOperator::new(
            OperatorKind::ComparisonUnorderedLast,
            NativeFunction::new(
                name("comparison_unordered_last_block"),
                long().block_position().block_position(),
                |args| {
                    let left = non_null_at::<T>(&args[0], &args[1])?;
                    let right = non_null_at::<T>(&args[2], &args[3])?;
                    Ok(Some(ordering(left.compare(&right, true))))
                },
            ),
        ),
        ScalarOperator::new(
            OperatorKind::ComparisonUnorderedFirst,
            NativeFunction::new(
                name("comparison_unordered_first"),
                long().value(native).value(native),
                |args| {
                    let (left, right) = (never_null::<T>(&args[0])?, never_null::<T>(&args[1])?);
                    Ok(Some(ordering(left.compare(&right, false))))
                },
            ),
        ),
        ScalarOperator::new(
            OperatorKind::LessThan,
            NativeFunction::new(name("less_than"), boolean().value(native).value(native), |args| {
                let (left, right) = (never_null::<T>(&args[0])?, never_null::<T>(&args[1])?);
                Ok(Some(Datum::Boolean(left.less_than(&right))))
            }),
        ),
        ScalarOperator::new(
            OperatorKind::LessThanOrEqual,
            NativeFunction::new(
                name("less_than_or_equal"),
                boolean().value(native).value(native),
                |args| {
                    let (left, right) = (never_null::<T>(&args[0])?, never_null::<T>(&args[1])?);
                    Ok(Some(Datum::Boolean(left.less_than_or_equal(&right))))
                },
            ),
        ),
    ]
}

/// Built-in 64-bit integer type
pub struct BigintType;

impl TypeExtension for BigintType {
    fn type_name(&self) -> &str {
        "bigint"
    }

    fn native_type(&self) -> NativeType {
        NativeType::Long
    }

    fn type_category(&self) -> TypeCategory {
        TypeCategory::Numeric
    }

    fn operators(&self) -> Vec<ScalarOperator> {
        scalar_operators::<i64>(self.type_name())
    }
}

/// Built-in double precision type
pub struct DoubleType;

impl TypeExtension for DoubleType {
    fn type_name(&self) -> &str {
        "double"
    }

    fn native_type(&self) -> NativeType {
        NativeType::Double
    }

    fn type_category(&self) -> TypeCategory {
        TypeCategory::Numeric
    }

    fn operators(&self) -> Vec<ScalarOperator> {
        scalar_operators::<f64>(self.type_name())
    }
}

/// Built-in boolean type
pub struct BooleanType;

impl TypeExtension for BooleanType {
    fn type_name(&self) -> &str {
        "boolean"
    }

    fn native_type(&self) -> NativeType {
        NativeType::Boolean
    }

    fn type_category(&self) -> TypeCategory {
        TypeCategory::Boolean
    }

    fn operators(&self) -> Vec<ScalarOperator> {
        scalar_operators::<bool>(self.type_name())
    }
}

/// Built-in variable width string type
pub struct VarcharType;

impl TypeExtension for VarcharType {
    fn type_name(&self) -> &str {
        "varchar"
    }

    fn native_type(&self) -> NativeType {
        NativeType::Slice
    }

    fn type_category(&self) -> TypeCategory {
        TypeCategory::String
    }

    fn operators(&self) -> Vec<ScalarOperator> {
        scalar_operators::<Arc<[u8]>>(self.type_name())
    }
}

/// Register all built-in types
pub fn register_builtin_types(registry: &super::registry::TypeRegistry) -> Result<()> {
    registry.register(&BigintType)?;
    registry.register(&DoubleType)?;
    registry.register(&BooleanType)?;
    registry.register(&VarcharType)?;
    Ok(())
}
