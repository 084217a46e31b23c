//! DXF stream reader trait and the code/value pair type

use crate::error::Result;
use crate::types::Handle;
use encoding_rs::Encoding;

/// A DXF group code/value pair
#[derive(Debug, Clone, PartialEq)]
pub struct DxfCodePair {
    /// The DXF group code
    pub code: i32,
    /// Value text, trimmed
    pub value: String,
}

impl DxfCodePair {
    pub fn new(code: i32, value: impl Into<String>) -> Self {
        Self {
            code,
            value: value.into(),
        }
    }

    /// `true` for the `0 <name>` pair that starts an entity, object or marker
    pub fn is_start(&self, name: &str) -> bool {
        self.code == 0 && self.value == name
    }

    pub fn as_i16(&self) -> Option<i16> {
        self.value.trim().parse::<i16>().ok()
    }

    /// Integer flag as boolean (non-zero is `true`)
    pub fn as_bool(&self) -> Option<bool> {
        self.value.trim().parse::<i32>().ok().map(|v| v != 0)
    }

    pub fn as_handle(&self) -> Option<Handle> {
        Handle::parse_hex(&self.value)
    }
}

/// Trait for reading DXF code/value pairs from a stream
pub trait DxfStreamReader {
    /// Read the next code/value pair
    fn read_pair(&mut self) -> Result<Option<DxfCodePair>>;

    /// Push a pair back to be read again on next read_pair call
    fn push_back(&mut self, pair: DxfCodePair);

    /// Reset the reader to the beginning
    fn reset(&mut self) -> Result<()>;

    /// Set the fallback encoding for non-UTF-8 text
    fn set_encoding(&mut self, encoding: &'static Encoding);
}
