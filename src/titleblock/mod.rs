//! Title block resolution and drawing list assembly
//!
//! For every paper space layout the block references are read through an
//! [`AttributeReader`], the title block is selected by name or attribute
//! patterns ([`BlockMatcher`]), its latest revision slot is read
//! ([`latest_revision`]) and the remaining attributes become extra columns
//! ([`RowBuilder`]). [`DrawingListAssembler`] collects the rows and the
//! column set across a whole run.

pub mod assembler;
pub mod attributes;
pub mod matcher;
pub mod revision;
pub mod row;
pub mod rules;
pub mod schema;

pub use assembler::{resolve_layout, DrawingList, DrawingListAssembler, DrawingOutcome, LayoutOutcome};
pub use attributes::{Attribute, AttributeReader, BlockInstance, LayoutInfo};
pub use matcher::{BlockMatcher, MatchMethod, TitleBlockMatch};
pub use revision::{latest_revision, RevisionField, RevisionRecord, RevisionTemplate};
pub use row::{DrawingListRow, PlotResult, RowBuilder};
pub use rules::{normalize_key, normalize_name, FieldMatcher, TitleBlockRules};
pub use schema::{Schema, SchemaAccumulator, CANONICAL_COLUMNS};
