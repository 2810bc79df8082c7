//! Native operator implementations: a callable paired with the structural
//! signature it was declared with.

use std::fmt;

use crate::block::Block;
use crate::error::{Error, Result};
use crate::types::{Datum, NativeType, ParamType};

/// Structural annotation carried by a single parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Marker {
    #[default]
    None,
    /// Parameter is the boxed form and may be null
    Nullable,
    /// Parameter is a block; the next parameter is its position
    BlockPosition,
    /// Parameter is the position paired with a preceding block
    BlockIndex,
    /// Parameter is the null flag for the preceding value
    IsNull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    pub ty: ParamType,
    pub marker: Marker,
}

/// Declared structural signature of a native implementation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Parameter>,
    return_type: ParamType,
    nullable_return: bool,
}

impl Signature {
    pub fn returning(return_type: ParamType) -> Self {
        Signature {
            params: Vec::new(),
            return_type,
            nullable_return: false,
        }
    }

    /// Add a parameter with an explicit marker
    pub fn param(mut self, ty: ParamType, marker: Marker) -> Self {
        self.params.push(Parameter { ty, marker });
        self
    }

    /// Plain native value
    pub fn value(self, native: NativeType) -> Self {
        self.param(ParamType::Native(native), Marker::None)
    }

    /// Native value followed by its null flag
    pub fn value_with_null_flag(self, native: NativeType) -> Self {
        self.param(ParamType::Native(native), Marker::None)
            .param(ParamType::Native(NativeType::Boolean), Marker::IsNull)
    }

    /// Nullable boxed value
    pub fn nullable(self, native: NativeType) -> Self {
        self.param(ParamType::Boxed(native), Marker::Nullable)
    }

    /// Block followed by an int position
    pub fn block_position(self) -> Self {
        self.param(ParamType::Block, Marker::BlockPosition)
            .param(ParamType::Native(NativeType::Int), Marker::BlockIndex)
    }

    /// Implementation may return null
    pub fn nullable_return(mut self) -> Self {
        self.nullable_return = true;
        self
    }

    pub fn params(&self) -> &[Parameter] {
        &self.params
    }

    pub fn param_type(&self, index: usize) -> Option<ParamType> {
        self.params.get(index).map(|p| p.ty)
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn return_type(&self) -> ParamType {
        self.return_type
    }

    pub fn is_nullable_return(&self) -> bool {
        self.nullable_return
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param.ty)?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}

/// One argument passed to a native implementation
#[derive(Clone)]
pub enum Arg<'a> {
    Value(Datum),
    /// Null boxed value
    Null,
    Block(&'a dyn Block),
}

impl<'a> Arg<'a> {
    pub fn is_null(&self) -> bool {
        matches!(self, Arg::Null)
    }

    pub fn datum(&self) -> Result<&Datum> {
        match self {
            Arg::Value(datum) => Ok(datum),
            Arg::Null => Err(Error::InvalidArgument("expected a value, got null".into())),
            Arg::Block(_) => Err(Error::InvalidArgument("expected a value, got a block".into())),
        }
    }

    /// Boxed value, None when null
    pub fn boxed(&self) -> Result<Option<&Datum>> {
        match self {
            Arg::Null => Ok(None),
            _ => self.datum().map(Some),
        }
    }

    pub fn boolean(&self) -> Result<bool> {
        self.datum()?.as_bool().ok_or_else(|| mismatch("boolean"))
    }

    pub fn long(&self) -> Result<i64> {
        self.datum()?.as_long().ok_or_else(|| mismatch("long"))
    }

    pub fn double(&self) -> Result<f64> {
        self.datum()?.as_double().ok_or_else(|| mismatch("double"))
    }

    /// Position argument of a BLOCK_POSITION pair
    pub fn position(&self) -> Result<usize> {
        let position = self.datum()?.as_int().ok_or_else(|| mismatch("int"))?;
        usize::try_from(position)
            .map_err(|_| Error::InvalidArgument(format!("negative position {}", position)))
    }

    pub fn block(&self) -> Result<&'a dyn Block> {
        match self {
            Arg::Block(block) => Ok(*block),
            _ => Err(mismatch("block")),
        }
    }
}

impl fmt::Debug for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(datum) => f.debug_tuple("Value").field(datum).finish(),
            Arg::Null => f.write_str("Null"),
            Arg::Block(block) => write!(f, "Block(len={})", block.len()),
        }
    }
}

impl From<Datum> for Arg<'_> {
    fn from(datum: Datum) -> Self {
        Arg::Value(datum)
    }
}

fn mismatch(expected: &str) -> Error {
    Error::InvalidArgument(format!("expected {} argument", expected))
}

type Body = dyn for<'a, 'b> Fn(&'b [Arg<'a>]) -> Result<Option<Datum>> + Send + Sync;

/// Callable native implementation carrying its own structural signature.
///
/// The body returns `Some` for every non-null result; FAIL_ON_NULL
/// implementations never return `None`.
pub struct NativeFunction {
    name: String,
    signature: Signature,
    body: Box<Body>,
}

impl NativeFunction {
    pub fn new<F>(name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: for<'a, 'b> Fn(&'b [Arg<'a>]) -> Result<Option<Datum>> + Send + Sync + 'static,
    {
        NativeFunction {
            name: name.into(),
            signature,
            body: Box::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn call(&self, args: &[Arg<'_>]) -> Result<Option<Datum>> {
        if args.len() != self.signature.param_count() {
            return Err(Error::InvalidArgument(format!(
                "{} expects {} arguments, got {}",
                self.name,
                self.signature.param_count(),
                args.len()
            )));
        }
        (self.body)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("signature", &self.signature.to_string())
            .finish()
    }
}

impl fmt::Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.signature)
    }
}
