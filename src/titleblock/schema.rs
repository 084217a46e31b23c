//! Drawing list columns

use indexmap::IndexSet;

use super::row::DrawingListRow;

pub const SHEET_NUMBER: &str = "Sheet Number";
pub const SHEET_NAME: &str = "Sheet Name";
pub const REVISION_NUMBER: &str = "Revision Number";
pub const REVISION_DATE: &str = "Revision Date";
pub const REVISION_DESCRIPTION: &str = "Revision Description";
pub const REVISION_BY: &str = "Revision By";

/// Fixed leading columns of every drawing list
pub const CANONICAL_COLUMNS: [&str; 6] = [
    SHEET_NUMBER,
    SHEET_NAME,
    REVISION_NUMBER,
    REVISION_DATE,
    REVISION_DESCRIPTION,
    REVISION_BY,
];

/// Provenance column holding the drawing file name
pub const DRAWING_COLUMN: &str = "DWG File";
/// Provenance column holding the layout name
pub const LAYOUT_COLUMN: &str = "Layout";

pub const PLOT_SUCCESSFUL: &str = "Plot Successful";
pub const PLOT_STATUS: &str = "Status";
pub const PLOT_ERROR: &str = "Error";
pub const INDIVIDUAL_PDF: &str = "Individual PDF";

/// Columns the CSV writer may add in front of the schema
pub const SOURCE_COLUMNS: [&str; 2] = [DRAWING_COLUMN, LAYOUT_COLUMN];

/// Plot result columns, written after the canonical columns when a run plots
pub const PLOT_COLUMNS: [&str; 4] = [PLOT_SUCCESSFUL, PLOT_STATUS, PLOT_ERROR, INDIVIDUAL_PDF];

fn contains_ignore_case(columns: &[&str], name: &str) -> bool {
    let name = name.trim();
    columns.iter().any(|column| column.eq_ignore_ascii_case(name))
}

/// Whether `name` equals a canonical column name, ignoring case
pub fn is_canonical_column(name: &str) -> bool {
    contains_ignore_case(&CANONICAL_COLUMNS, name)
}

/// Whether `name` is taken by a canonical, source or plot column, ignoring
/// case. Extra columns never use a reserved name.
pub fn is_reserved_column(name: &str) -> bool {
    is_canonical_column(name)
        || contains_ignore_case(&SOURCE_COLUMNS, name)
        || contains_ignore_case(&PLOT_COLUMNS, name)
}

/// Ordered, unique column names of a drawing list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<String>,
}

impl Default for Schema {
    fn default() -> Self {
        SchemaAccumulator::new().finalize()
    }
}

impl Schema {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Columns after the canonical prefix
    pub fn extra_columns(&self) -> &[String] {
        &self.columns[CANONICAL_COLUMNS.len()..]
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.columns.iter()
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}

/// Collects extra columns across rows in first-seen order
#[derive(Debug, Clone, Default)]
pub struct SchemaAccumulator {
    extra: IndexSet<String>,
}

impl SchemaAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the extra columns a row introduces
    pub fn observe(&mut self, row: &DrawingListRow) {
        for key in row.extra.keys() {
            if !self.extra.contains(key) {
                self.extra.insert(key.clone());
            }
        }
    }

    /// Canonical columns followed by the observed extra columns
    pub fn finalize(self) -> Schema {
        let columns = CANONICAL_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.extra)
            .collect();
        Schema { columns }
    }
}
