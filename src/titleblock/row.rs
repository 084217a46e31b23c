//! Drawing list rows
//!
//! A [`DrawingListRow`] holds the canonical fields read from one title block
//! (sheet number, title, latest revision) and every remaining attribute as
//! an extra column.

use std::path::Path;

use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::debug;

use super::attributes::{Attribute, BlockInstance};
use super::revision::RevisionRecord;
use super::rules::TitleBlockRules;
use super::schema::{
    is_reserved_column, Schema, INDIVIDUAL_PDF, PLOT_ERROR, PLOT_STATUS, PLOT_SUCCESSFUL,
    REVISION_BY, REVISION_DATE, REVISION_DESCRIPTION, REVISION_NUMBER, SHEET_NAME, SHEET_NUMBER,
};

/// Key used for an extra attribute with neither tag nor prompt
const FALLBACK_KEY: &str = "ATTR";

/// Result of plotting the layout a row was read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotResult {
    pub succeeded: bool,
    /// Driver error, empty on success
    pub error: String,
    /// Plotted PDF, empty unless the plot succeeded
    pub pdf: String,
}

impl PlotResult {
    pub fn plotted(pdf: &Path) -> Self {
        Self {
            succeeded: true,
            error: String::new(),
            pdf: pdf.display().to_string(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            error: error.into(),
            pdf: String::new(),
        }
    }

    /// `Yes` or `No`
    pub fn successful(&self) -> &'static str {
        if self.succeeded {
            "Yes"
        } else {
            "No"
        }
    }

    pub fn status(&self) -> &'static str {
        if self.succeeded {
            "Plotted"
        } else {
            "Plot Failed"
        }
    }
}

/// One sheet of the drawing list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DrawingListRow {
    /// Source drawing file name
    pub drawing: String,
    /// Layout the sheet was read from
    pub layout: String,
    pub sheet_number: String,
    pub title: String,
    pub revision: RevisionRecord,
    /// Non-canonical attributes keyed by tag, in block order
    pub extra: IndexMap<String, String>,
    /// Set once the layout has been plotted
    pub plot: Option<PlotResult>,
}

impl DrawingListRow {
    /// Builder: set the provenance of the row
    pub fn with_source(mut self, drawing: impl Into<String>, layout: impl Into<String>) -> Self {
        self.drawing = drawing.into();
        self.layout = layout.into();
        self
    }

    /// Value of a column, empty when the row has none
    pub fn cell(&self, column: &str) -> &str {
        match column {
            SHEET_NUMBER => &self.sheet_number,
            SHEET_NAME => &self.title,
            REVISION_NUMBER => &self.revision.number,
            REVISION_DATE => &self.revision.date,
            REVISION_DESCRIPTION => &self.revision.description,
            REVISION_BY => &self.revision.author,
            PLOT_SUCCESSFUL => self.plot.as_ref().map(PlotResult::successful).unwrap_or_default(),
            PLOT_STATUS => self.plot.as_ref().map(PlotResult::status).unwrap_or_default(),
            PLOT_ERROR => self.plot.as_ref().map(|p| p.error.as_str()).unwrap_or_default(),
            INDIVIDUAL_PDF => self.plot.as_ref().map(|p| p.pdf.as_str()).unwrap_or_default(),
            other => self.extra.get(other).map(String::as_str).unwrap_or_default(),
        }
    }

    /// The row as a complete record over `schema`
    pub fn record(&self, schema: &Schema) -> IndexMap<String, String> {
        schema
            .iter()
            .map(|column| (column.clone(), self.cell(column).to_string()))
            .collect()
    }
}

/// Builds rows from selected title blocks
pub struct RowBuilder<'r> {
    rules: &'r TitleBlockRules,
}

impl<'r> RowBuilder<'r> {
    pub fn new(rules: &'r TitleBlockRules) -> Self {
        Self { rules }
    }

    /// Build the row for a title block and its latest revision.
    /// Provenance is left empty.
    pub fn build(&self, block: &BlockInstance, revision: RevisionRecord) -> DrawingListRow {
        DrawingListRow {
            sheet_number: self.sheet_number(block),
            title: self.title(block),
            revision,
            extra: self.extra_columns(block),
            ..Default::default()
        }
    }

    fn sheet_number(&self, block: &BlockInstance) -> String {
        let mut top: Option<&str> = None;
        let mut bottom: Option<&str> = None;

        for attribute in block.attributes().filter(|a| !a.value.is_empty()) {
            if self.rules.sheet_top.matches(attribute) {
                if top.is_none() {
                    top = Some(attribute.value.as_str());
                }
            } else if self.rules.sheet_bottom.matches(attribute) && bottom.is_none() {
                bottom = Some(attribute.value.as_str());
            }
        }

        match (top, bottom) {
            (Some(top), Some(bottom)) => format!("{top}{}{bottom}", self.rules.sheet_separator),
            (Some(part), None) | (None, Some(part)) => part.to_string(),
            (None, None) => String::new(),
        }
    }

    fn title(&self, block: &BlockInstance) -> String {
        let mut lines: Vec<Option<&str>> = vec![None; self.rules.title_lines.len()];

        for attribute in block.attributes().filter(|a| !a.value.is_empty()) {
            let line = self
                .rules
                .title_lines
                .iter()
                .zip(lines.iter_mut())
                .find(|(matcher, slot)| slot.is_none() && matcher.matches(attribute));
            if let Some((_, slot)) = line {
                *slot = Some(attribute.value.as_str());
            }
        }

        if let Some(first) = lines.first_mut() {
            if first.is_none() {
                *first = block
                    .attributes()
                    .find(|a| !a.value.is_empty() && self.rules.title_alias.matches(a))
                    .map(|a| a.value.as_str());
            }
        }

        lines
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(&self.rules.title_joiner)
    }

    fn extra_key(attribute: &Attribute) -> &str {
        [attribute.tag.trim(), attribute.prompt.trim()]
            .into_iter()
            .find(|k| !k.is_empty())
            .unwrap_or(FALLBACK_KEY)
    }

    fn extra_columns(&self, block: &BlockInstance) -> IndexMap<String, String> {
        let mut extra = IndexMap::new();
        for attribute in block.attributes() {
            if self.rules.is_canonical(attribute) || self.rules.is_revision(attribute) {
                continue;
            }
            let key = Self::extra_key(attribute);
            if is_reserved_column(key) {
                debug!(tag = %attribute.tag, "attribute shadows a reserved column, dropped");
                continue;
            }
            if let Entry::Vacant(slot) = extra.entry(key.to_string()) {
                slot.insert(attribute.value.clone());
            }
        }
        extra
    }
}
