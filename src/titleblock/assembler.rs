//! Drawing list assembly
//!
//! [`DrawingListAssembler`] drives title block resolution over every paper
//! layout of every drawing. Resolving a drawing ([`DrawingListAssembler::resolve_drawing`])
//! only reads shared rules, so drawings can be resolved on worker threads.
//! Outcomes are then absorbed one at a time, in a fixed order, which keeps
//! the column order of the final list deterministic.

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use super::attributes::{AttributeReader, BlockInstance, LayoutInfo};
use super::matcher::{BlockMatcher, MatchMethod};
use super::revision::latest_revision;
use super::row::{DrawingListRow, PlotResult, RowBuilder};
use super::rules::TitleBlockRules;
use super::schema::{Schema, SchemaAccumulator};
use crate::notification::{Notification, NotificationCollection, NotificationType};

/// Result of resolving one layout
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutOutcome {
    Row(DrawingListRow),
    Skipped(Notification),
}

/// Result of resolving every layout of one drawing
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingOutcome {
    /// Drawing file name
    pub drawing: String,
    /// Paper layouts of the drawing, in document order
    pub layouts: Vec<LayoutInfo>,
    /// One outcome per layout, or a single skip for the whole drawing
    pub outcomes: Vec<LayoutOutcome>,
}

impl DrawingOutcome {
    /// Outcome for a drawing that could not be read at all
    pub fn failed(drawing: impl Into<String>, message: impl Into<String>) -> Self {
        let drawing: String = drawing.into();
        let notification =
            Notification::new(NotificationType::ReaderFailure, &drawing, None, message);
        Self {
            drawing,
            layouts: Vec::new(),
            outcomes: vec![LayoutOutcome::Skipped(notification)],
        }
    }

    /// Number of layouts that produced a row
    pub fn row_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, LayoutOutcome::Row(_)))
            .count()
    }

    /// Whether the attribute reader could not open the drawing at all
    pub fn is_unreadable(&self) -> bool {
        self.layouts.is_empty()
            && matches!(
                self.outcomes.as_slice(),
                [LayoutOutcome::Skipped(n)]
                    if n.notification_type == NotificationType::ReaderFailure && n.layout.is_none()
            )
    }

    /// Attach a plot result to the row read from `layout`. Layouts without
    /// a row have nothing to attach to and are ignored.
    pub fn record_plot(&mut self, layout: &str, result: PlotResult) {
        let row = self.outcomes.iter_mut().find_map(|o| match o {
            LayoutOutcome::Row(row) if row.layout == layout => Some(row),
            _ => None,
        });
        if let Some(row) = row {
            row.plot = Some(result);
        }
    }
}

/// The assembled drawing list
#[derive(Debug, Clone, Default)]
pub struct DrawingList {
    pub headers: Schema,
    pub rows: Vec<DrawingListRow>,
    pub notifications: NotificationCollection,
}

impl DrawingList {
    /// Every row as a record holding every header, in header order
    pub fn records(&self) -> Vec<IndexMap<String, String>> {
        self.rows.iter().map(|row| row.record(&self.headers)).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Resolve a layout's title block into a row, `None` when no block qualifies
pub fn resolve_layout(blocks: &[BlockInstance], rules: &TitleBlockRules) -> Option<DrawingListRow> {
    let selected = BlockMatcher::new(rules).select(blocks)?;
    match selected.method {
        MatchMethod::BlockName => debug!(block = %selected.block.name, "title block matched by name"),
        MatchMethod::PatternScore(score) => {
            debug!(block = %selected.block.name, score, "title block matched by attribute patterns")
        }
    }
    let revision = latest_revision(selected.block, &rules.revision);
    Some(RowBuilder::new(rules).build(selected.block, revision))
}

/// Accumulates drawing outcomes into a [`DrawingList`]
pub struct DrawingListAssembler<'r> {
    rules: &'r TitleBlockRules,
    rows: Vec<DrawingListRow>,
    schema: SchemaAccumulator,
    notifications: NotificationCollection,
}

impl<'r> DrawingListAssembler<'r> {
    pub fn new(rules: &'r TitleBlockRules) -> Self {
        Self {
            rules,
            rows: Vec::new(),
            schema: SchemaAccumulator::new(),
            notifications: NotificationCollection::new(),
        }
    }

    /// Resolve every paper layout of a drawing. Reads nothing but the shared
    /// rules and the given reader.
    pub fn resolve_drawing<R: AttributeReader + ?Sized>(
        rules: &TitleBlockRules,
        drawing: &str,
        reader: &R,
    ) -> DrawingOutcome {
        let layouts = reader.layouts();
        if layouts.is_empty() {
            let notification = Notification::new(
                NotificationType::NoPaperLayouts,
                drawing,
                None,
                "drawing has no paper space layouts",
            );
            return DrawingOutcome {
                drawing: drawing.to_string(),
                layouts,
                outcomes: vec![LayoutOutcome::Skipped(notification)],
            };
        }

        let outcomes = layouts
            .iter()
            .map(|layout| {
                let blocks = match reader.read_layout_blocks(layout) {
                    Ok(blocks) => blocks,
                    Err(e) => {
                        return LayoutOutcome::Skipped(Notification::new(
                            NotificationType::ReaderFailure,
                            drawing,
                            Some(layout.name.as_str()),
                            e.to_string(),
                        ))
                    }
                };
                match resolve_layout(&blocks, rules) {
                    Some(row) => LayoutOutcome::Row(row.with_source(drawing, layout.name.clone())),
                    None => LayoutOutcome::Skipped(Notification::new(
                        NotificationType::NoTitleBlock,
                        drawing,
                        Some(layout.name.as_str()),
                        format!("no title block among {} block reference(s)", blocks.len()),
                    )),
                }
            })
            .collect();

        DrawingOutcome {
            drawing: drawing.to_string(),
            layouts,
            outcomes,
        }
    }

    /// Resolve a drawing and absorb the outcome
    pub fn process_drawing<R: AttributeReader + ?Sized>(&mut self, drawing: &str, reader: &R) {
        let outcome = Self::resolve_drawing(self.rules, drawing, reader);
        self.absorb(outcome);
    }

    /// Append a drawing's rows and skips to the list
    pub fn absorb(&mut self, outcome: DrawingOutcome) {
        let rows = outcome.row_count();
        for layout_outcome in outcome.outcomes {
            match layout_outcome {
                LayoutOutcome::Row(row) => {
                    self.schema.observe(&row);
                    self.rows.push(row);
                }
                LayoutOutcome::Skipped(notification) => {
                    warn!(
                        drawing = %notification.drawing,
                        layout = notification.layout.as_deref().unwrap_or("-"),
                        "sheet skipped: {}",
                        notification.message
                    );
                    self.notifications.push(notification);
                }
            }
        }
        info!(drawing = %outcome.drawing, rows, "drawing resolved");
    }

    /// Finish the run: fix the column order and hand over rows and notes
    pub fn finish(self) -> DrawingList {
        DrawingList {
            headers: self.schema.finalize(),
            rows: self.rows,
            notifications: self.notifications,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::{Result, SheetListError};

    /// In-memory reader: layout name → blocks, `None` simulating a read failure
    struct FakeReader {
        layouts: Vec<(String, Option<Vec<BlockInstance>>)>,
    }

    impl FakeReader {
        fn new() -> Self {
            Self {
                layouts: Vec::new(),
            }
        }

        fn layout(mut self, name: &str, blocks: Vec<BlockInstance>) -> Self {
            self.layouts.push((name.to_string(), Some(blocks)));
            self
        }

        fn broken_layout(mut self, name: &str) -> Self {
            self.layouts.push((name.to_string(), None));
            self
        }
    }

    impl AttributeReader for FakeReader {
        fn layouts(&self) -> Vec<LayoutInfo> {
            self.layouts
                .iter()
                .enumerate()
                .map(|(index, (name, _))| LayoutInfo {
                    name: name.clone(),
                    index,
                })
                .collect()
        }

        fn read_layout_blocks(&self, layout: &LayoutInfo) -> Result<Vec<BlockInstance>> {
            self.layouts[layout.index]
                .1
                .clone()
                .ok_or_else(|| SheetListError::Parse("truncated entity".into()))
        }
    }

    fn rules() -> TitleBlockRules {
        let mut config = Config::default();
        config.matching.block_names.clear();
        TitleBlockRules::from_config(&config).unwrap()
    }

    fn title_block(sheet: &str, extra: &[(&str, &str)]) -> BlockInstance {
        extra.iter().fold(
            BlockInstance::new("TB")
                .with_attribute("442C", "", sheet)
                .with_attribute("TITLE_1", "", "PLAN"),
            |b, (tag, value)| b.with_attribute(*tag, "", *value),
        )
    }

    #[test]
    fn test_layouts_resolved_in_order_with_provenance() {
        let rules = rules();
        let reader = FakeReader::new()
            .layout("S1", vec![title_block("101", &[])])
            .layout("S2", vec![BlockInstance::new("NOTE"), title_block("102", &[])]);

        let mut assembler = DrawingListAssembler::new(&rules);
        assembler.process_drawing("E.dxf", &reader);
        let list = assembler.finish();

        assert_eq!(list.len(), 2);
        assert_eq!(list.rows[0].sheet_number, "101");
        assert_eq!(list.rows[1].layout, "S2");
        assert_eq!(list.rows[1].drawing, "E.dxf");
        assert!(list.notifications.is_empty());
    }

    #[test]
    fn test_layout_without_blocks_is_skipped() {
        let rules = rules();
        let reader = FakeReader::new()
            .layout("S1", vec![title_block("101", &[])])
            .layout("EMPTY", vec![]);

        let mut assembler = DrawingListAssembler::new(&rules);
        assembler.process_drawing("E.dxf", &reader);
        let list = assembler.finish();

        assert_eq!(list.len(), 1);
        assert_eq!(list.notifications.len(), 1);
        let note = list.notifications.iter().next().unwrap();
        assert_eq!(note.notification_type, NotificationType::NoTitleBlock);
        assert_eq!(note.layout.as_deref(), Some("EMPTY"));
    }

    #[test]
    fn test_read_failure_skips_only_that_layout() {
        let rules = rules();
        let reader = FakeReader::new()
            .broken_layout("BAD")
            .layout("S1", vec![title_block("101", &[])]);
        let outcome = DrawingListAssembler::resolve_drawing(&rules, "E.dxf", &reader);
        assert_eq!(outcome.row_count(), 1);
        assert!(matches!(
            &outcome.outcomes[0],
            LayoutOutcome::Skipped(n) if n.notification_type == NotificationType::ReaderFailure
        ));
    }

    #[test]
    fn test_drawing_without_layouts() {
        let rules = rules();
        let outcome = DrawingListAssembler::resolve_drawing(&rules, "M.dxf", &FakeReader::new());
        assert_eq!(outcome.outcomes.len(), 1);
        assert!(matches!(
            &outcome.outcomes[0],
            LayoutOutcome::Skipped(n) if n.notification_type == NotificationType::NoPaperLayouts
        ));
    }

    #[test]
    fn test_plot_result_attaches_to_matching_row() {
        let rules = rules();
        let reader = FakeReader::new()
            .layout("S1", vec![title_block("101", &[])])
            .layout("COVER", vec![]);
        let mut outcome = DrawingListAssembler::resolve_drawing(&rules, "E.dxf", &reader);
        outcome.record_plot("COVER", PlotResult::failed("ignored"));
        outcome.record_plot("S1", PlotResult::failed("timed out"));

        let mut assembler = DrawingListAssembler::new(&rules);
        assembler.absorb(outcome);
        let list = assembler.finish();
        assert_eq!(list.rows[0].plot, Some(PlotResult::failed("timed out")));
    }

    #[test]
    fn test_failed_drawing_outcome() {
        let rules = rules();
        let failed = DrawingOutcome::failed("X.dxf", "no DXF sections found");
        assert!(failed.is_unreadable());
        let empty = DrawingListAssembler::resolve_drawing(&rules, "M.dxf", &FakeReader::new());
        assert!(!empty.is_unreadable());

        let mut assembler = DrawingListAssembler::new(&rules);
        assembler.absorb(failed);
        let list = assembler.finish();
        assert!(list.is_empty());
        assert_eq!(list.notifications.skipped_sheets().count(), 1);
    }

    #[test]
    fn test_headers_follow_absorb_order_and_records_are_complete() {
        let rules = rules();
        let first = FakeReader::new().layout("S1", vec![title_block("101", &[("MATERIAL", "STEEL")])]);
        let second = FakeReader::new().layout("S1", vec![title_block("102", &[("SCALE", "1:50")])]);

        let mut assembler = DrawingListAssembler::new(&rules);
        assembler.absorb(DrawingListAssembler::resolve_drawing(&rules, "A.dxf", &first));
        assembler.absorb(DrawingListAssembler::resolve_drawing(&rules, "B.dxf", &second));
        let list = assembler.finish();

        let extra: Vec<&str> = list.headers.extra_columns().iter().map(String::as_str).collect();
        assert_eq!(extra, vec!["MATERIAL", "SCALE"]);

        let records = list.records();
        assert!(records.iter().all(|r| r.len() == list.headers.len()));
        assert_eq!(records[0]["SCALE"], "");
        assert_eq!(records[1]["MATERIAL"], "");
        assert_eq!(records[1]["SCALE"], "1:50");
    }
}
