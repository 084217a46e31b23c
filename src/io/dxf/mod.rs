//! DXF (Drawing Exchange Format) reading

mod code_page;
mod reader;

pub use code_page::encoding_from_code_page;
pub use reader::{DxfCodePair, DxfReader, DxfReaderConfiguration, DxfStreamReader, DxfTextReader};
