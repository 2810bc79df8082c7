use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// In-memory representation the engine uses for values of a logical type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NativeType {
    Boolean,
    /// 32-bit integer, also the type of a block position
    Int,
    Long,
    Double,
    Slice,
    /// Opaque representation owned by an extension type (e.g. "point")
    Object(&'static str),
}

impl NativeType {
    /// Parameter type of the plain native value
    pub const fn native(self) -> ParamType {
        ParamType::Native(self)
    }

    /// Parameter type of the nullable (boxed) form
    pub const fn boxed(self) -> ParamType {
        ParamType::Boxed(self)
    }
}

impl fmt::Display for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeType::Boolean => write!(f, "boolean"),
            NativeType::Int => write!(f, "int"),
            NativeType::Long => write!(f, "long"),
            NativeType::Double => write!(f, "double"),
            NativeType::Slice => write!(f, "slice"),
            NativeType::Object(name) => write!(f, "object<{}>", name),
        }
    }
}

/// Structural kind of a single native parameter or return value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ParamType {
    Native(NativeType),
    Boxed(NativeType),
    Block,
    /// Connector session; never allowed in type operators
    Session,
    /// Behavioural (lambda) argument; never allowed in type operators
    Function,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Native(native) => write!(f, "{}", native),
            ParamType::Boxed(native) => write!(f, "{}?", native),
            ParamType::Block => write!(f, "block"),
            ParamType::Session => write!(f, "session"),
            ParamType::Function => write!(f, "function"),
        }
    }
}

/// A single native value
#[derive(Debug, Clone)]
pub enum Datum {
    Boolean(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Slice(Arc<[u8]>),
    // Extension values (stored as Arc<dyn Any> for type-safe downcasting)
    Object(Arc<dyn Any + Send + Sync>),
}

impl Datum {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Datum::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Datum::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Datum::Long(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Datum::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_slice(&self) -> Option<&Arc<[u8]>> {
        match self {
            Datum::Slice(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Datum::Object(data) => data.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl From<bool> for Datum {
    fn from(v: bool) -> Self {
        Datum::Boolean(v)
    }
}

impl From<i32> for Datum {
    fn from(v: i32) -> Self {
        Datum::Int(v)
    }
}

impl From<i64> for Datum {
    fn from(v: i64) -> Self {
        Datum::Long(v)
    }
}

impl From<f64> for Datum {
    fn from(v: f64) -> Self {
        Datum::Double(v)
    }
}

impl From<&[u8]> for Datum {
    fn from(v: &[u8]) -> Self {
        Datum::Slice(Arc::from(v))
    }
}

impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Datum::Slice(Arc::from(v.as_bytes()))
    }
}
