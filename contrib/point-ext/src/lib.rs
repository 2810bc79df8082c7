//! Point type extension for typeop
//!
//! Declares a 2D point type that is comparable but not orderable:
//! - EQUAL / IS_DISTINCT_FROM in scalar and block-position conventions
//! - HASH_CODE / XX_HASH_64 over the coordinate bits
//! - INDETERMINATE, true when either coordinate is NaN
//!
//! Auto-registers with typeop via inventory pattern (no cfg attributes needed)

use std::sync::Arc;
use xxhash_rust::xxh64::xxh64;

use typeop::extensions::loader::ExtensionLoader;
use typeop::extensions::registry::TypeRegistry;
use typeop::extensions::{TypeCategory, TypeExtension};
use typeop::{Arg, Datum, Error, NativeFunction, NativeType, OperatorKind, Result, ScalarOperator, Signature};

pub const POINT: NativeType = NativeType::Object("point");

/// 2D Cartesian point (x, y)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn to_datum(self) -> Datum {
        Datum::Object(Arc::new(self))
    }

    /// Hash input; points that compare equal produce the same bytes
    fn bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&canonical_bits(self.x).to_le_bytes());
        bytes[8..].copy_from_slice(&canonical_bits(self.y).to_le_bytes());
        bytes
    }

    /// Coordinate-wise equality where NaN matches NaN
    fn not_distinct(&self, other: &Self) -> bool {
        let same = |a: f64, b: f64| (a.is_nan() && b.is_nan()) || a == b;
        same(self.x, other.x) && same(self.y, other.y)
    }
}

/// -0.0 folded into 0.0 and every NaN folded into one value
fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0
    } else if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

fn read(datum: &Datum) -> Result<Point> {
    datum
        .downcast_ref::<Point>()
        .copied()
        .ok_or_else(|| Error::InvalidArgument("expected point value".to_string()))
}

fn point(arg: &Arg<'_>) -> Result<Point> {
    read(arg.datum()?)
}

fn point_at(block: &Arg<'_>, position: &Arg<'_>) -> Result<Option<Point>> {
    let block = block.block()?;
    let position = position.position()?;
    match block.value(position) {
        Some(datum) => read(datum).map(Some),
        None if block.is_null(position) => Ok(None),
        None => Err(Error::InvalidArgument(format!("position {} is out of range", position))),
    }
}

/// Point type extension
pub struct PointType;

impl TypeExtension for PointType {
    fn type_name(&self) -> &str {
        "point"
    }

    fn native_type(&self) -> NativeType {
        POINT
    }

    fn type_category(&self) -> TypeCategory {
        TypeCategory::Composite
    }

    fn operators(&self) -> Vec<ScalarOperator> {
        let boolean = || Signature::returning(NativeType::Boolean.native());
        let long = || Signature::returning(NativeType::Long.native());

        vec![
            ScalarOperator::new(
                OperatorKind::Equal,
                NativeFunction::new("point_equal", boolean().value(POINT).value(POINT), |args| {
                    Ok(Some(Datum::Boolean(point(&args[0])? == point(&args[1])?)))
                }),
            ),
            ScalarOperator::new(
                OperatorKind::Equal,
                NativeFunction::new(
                    "point_equal_block",
                    Signature::returning(NativeType::Boolean.boxed())
                        .nullable_return()
                        .block_position()
                        .block_position(),
                    |args| {
                        let left = point_at(&args[0], &args[1])?;
                        let right = point_at(&args[2], &args[3])?;
                        Ok(left.zip(right).map(|(l, r)| Datum::Boolean(l == r)))
                    },
                ),
            ),
            ScalarOperator::new(
                OperatorKind::HashCode,
                NativeFunction::new("point_hash_code", long().value(POINT), |args| {
                    Ok(Some(Datum::Long(xxh64(&point(&args[0])?.bytes(), 0) as i64)))
                }),
            ),
            ScalarOperator::new(
                OperatorKind::XxHash64,
                NativeFunction::new("point_xx_hash64", long().value(POINT), |args| {
                    Ok(Some(Datum::Long(xxh64(&point(&args[0])?.bytes(), 0) as i64)))
                }),
            ),
            ScalarOperator::new(
                OperatorKind::IsDistinctFrom,
                NativeFunction::new(
                    "point_distinct_from",
                    boolean().nullable(POINT).nullable(POINT),
                    |args| {
                        let left = args[0].boxed()?.map(read).transpose()?;
                        let right = args[1].boxed()?.map(read).transpose()?;
                        let distinct = match (left, right) {
                            (None, None) => false,
                            (Some(l), Some(r)) => !l.not_distinct(&r),
                            _ => true,
                        };
                        Ok(Some(Datum::Boolean(distinct)))
                    },
                ),
            ),
            ScalarOperator::new(
                OperatorKind::Indeterminate,
                NativeFunction::new(
                    "point_indeterminate",
                    boolean().value_with_null_flag(POINT),
                    |args| {
                        if args[1].boolean()? {
                            return Ok(Some(Datum::Boolean(true)));
                        }
                        let p = point(&args[0])?;
                        Ok(Some(Datum::Boolean(p.x.is_nan() || p.y.is_nan())))
                    },
                ),
            ),
            // helper, not an operator
            ScalarOperator::helper(NativeFunction::new(
                "point_magnitude",
                Signature::returning(NativeType::Double.native()).value(POINT),
                |args| {
                    let p = point(&args[0])?;
                    Ok(Some(Datum::Double((p.x * p.x + p.y * p.y).sqrt())))
                },
            )),
        ]
    }
}

// ============================================================================
// Auto-discovery registration via inventory pattern
// ============================================================================

/// Point extension loader - self-registers with typeop
#[derive(Default)]
pub struct PointExtLoader;

impl PointExtLoader {
    /// Const singleton instance for inventory registration
    pub const INSTANCE: Self = PointExtLoader;
}

impl ExtensionLoader for PointExtLoader {
    fn name(&self) -> &str {
        "point"
    }

    fn load_types(&self, registry: &TypeRegistry) -> Result<()> {
        registry.register(&PointType)?;
        Ok(())
    }
}

// Auto-register this extension via inventory
// Uses a static reference that can be constructed at compile time
inventory::submit! {
    &PointExtLoader::INSTANCE as &'static dyn ExtensionLoader
}
