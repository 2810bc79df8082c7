use crate::types::Datum;

/// Columnar batch of values of one type, addressed by position.
///
/// This is the minimal surface BLOCK_POSITION operators need. Positions are
/// valid in `[0, len)`.
pub trait Block: Send + Sync {
    /// Number of positions in the block
    fn len(&self) -> usize;

    /// Is the value at `position` null
    fn is_null(&self, position: usize) -> bool;

    /// Native value at `position`, or None when it is null or out of range
    fn value(&self, position: usize) -> Option<&Datum>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Block backed by a vector of optional values
#[derive(Debug, Clone, Default)]
pub struct ArrayBlock {
    values: Vec<Option<Datum>>,
}

impl ArrayBlock {
    pub fn new(values: Vec<Option<Datum>>) -> Self {
        ArrayBlock { values }
    }

    /// Block with no null positions
    pub fn from_values<T: Into<Datum>>(values: impl IntoIterator<Item = T>) -> Self {
        ArrayBlock {
            values: values.into_iter().map(|v| Some(v.into())).collect(),
        }
    }
}

impl Block for ArrayBlock {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn is_null(&self, position: usize) -> bool {
        matches!(self.values.get(position), Some(None))
    }

    fn value(&self, position: usize) -> Option<&Datum> {
        self.values.get(position).and_then(|v| v.as_ref())
    }
}
