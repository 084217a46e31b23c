//! # sheetlist
//!
//! Batch plotting and drawing list extraction from CAD title blocks.
//!
//! For every paper space layout of every drawing in a folder, sheetlist
//! finds the title block, reads its sheet number, title and latest
//! revision, keeps every other attribute as an extra column, and writes the
//! whole set as a CSV drawing list. Layouts are plotted to PDF through an
//! external plot command and merged into one combined PDF.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sheetlist::{batch, Config, TitleBlockRules};
//! use sheetlist::io::csv_writer::CsvWriter;
//!
//! let config = Config::default();
//! let rules = TitleBlockRules::from_config(&config)?;
//! let list = batch::scan(&["E-101.dxf".into()], &rules);
//!
//! for row in &list.rows {
//!     println!("{} {}", row.sheet_number, row.title);
//! }
//! CsvWriter::new().write_file(&list, "Drawing List.csv".as_ref())?;
//! # Ok::<(), sheetlist::SheetListError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`io::dxf`] reads the parts of a DXF file title blocks live in
//!   (block definitions, INSERT/ATTRIB sequences, layouts) into a [`Drawing`]
//! - [`titleblock`] selects title blocks and assembles the drawing list
//!   through the [`AttributeReader`] trait
//! - [`plot`], [`pdf`] and [`io::csv_writer`] produce the outputs
//! - [`batch`] ties the steps together for a folder of drawings

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod batch;
pub mod config;
pub mod drawing;
pub mod error;
pub mod io;
pub mod notification;
pub mod pdf;
pub mod plot;
pub mod titleblock;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use drawing::Drawing;
pub use error::{Result, SheetListError};
pub use notification::{Notification, NotificationCollection, NotificationType};
pub use types::Handle;

// Re-export title block resolution
pub use titleblock::{
    AttributeReader, BlockInstance, DrawingList, DrawingListAssembler, DrawingListRow,
    RevisionRecord, TitleBlockRules,
};

// Re-export I/O types
pub use io::dxf::DxfReader;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
