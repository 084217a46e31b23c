//! I/O: DXF reading, drawing discovery and CSV output

pub mod csv_writer;
pub mod dxf;
pub mod files;

pub use csv_writer::CsvWriter;
pub use dxf::DxfReader;
