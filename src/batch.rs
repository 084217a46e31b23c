//! Batch pipeline
//!
//! A run discovers drawings, optionally stages copies, resolves every
//! drawing's title blocks (in parallel), plots each paper layout (serially),
//! merges the PDFs and writes the drawing list CSV. Drawings the reader
//! cannot open are still plotted as a whole.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::drawing::Drawing;
use crate::error::{Result, SheetListError};
use crate::io::csv_writer::CsvWriter;
use crate::io::dxf::{DxfReader, DxfReaderConfiguration};
use crate::io::files::{
    copy_drawing_files, ensure_dir, exclude_dirs, list_drawing_files, sanitize_filename,
};
use crate::notification::{NotificationCollection, NotificationType};
use crate::pdf::merge_pdfs;
use crate::plot::{pdf_path, sort_for_merge, Plotter, ALL_LAYOUTS};
use crate::titleblock::{
    DrawingList, DrawingListAssembler, DrawingOutcome, PlotResult, TitleBlockRules,
};

/// Summary of a finished batch run
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub project_name: String,
    /// Drawings processed, after staging
    pub drawings: Vec<PathBuf>,
    pub list: DrawingList,
    /// Individual PDFs, in plot order
    pub pdfs: Vec<PathBuf>,
    pub combined_pdf: Option<PathBuf>,
    pub csv_path: PathBuf,
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn is_dwg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("dwg"))
        .unwrap_or(false)
}

/// Project name for output files: the configured name, else the input
/// folder name
pub fn project_name(config: &Config, input_dir: &Path) -> String {
    config
        .output
        .project_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .or_else(|| {
            input_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "Project".to_string())
}

/// Read a drawing for title block resolution. Damaged sections are skipped
/// and logged rather than failing the whole drawing.
pub fn read_drawing(path: &Path) -> Result<Drawing> {
    if is_dwg(path) {
        return Err(SheetListError::UnsupportedFormat(
            "DWG attributes cannot be read, save the drawing as DXF".to_string(),
        ));
    }
    let drawing = DxfReader::from_file(path)?
        .with_configuration(DxfReaderConfiguration { failsafe: true })
        .read()?;
    for warning in &drawing.warnings {
        warn!(path = %path.display(), "{}", warning);
    }
    Ok(drawing)
}

/// Resolve every drawing on the rayon pool. Outcomes keep the order of
/// `paths`; unreadable drawings yield a failed outcome.
pub fn resolve_drawings(paths: &[PathBuf], rules: &TitleBlockRules) -> Vec<DrawingOutcome> {
    paths
        .par_iter()
        .map(|path| {
            let name = display_name(path);
            match read_drawing(path) {
                Ok(drawing) => DrawingListAssembler::resolve_drawing(rules, &name, &drawing),
                Err(e) => DrawingOutcome::failed(name, e.to_string()),
            }
        })
        .collect()
}

/// Absorb outcomes in order into a drawing list
pub fn assemble(outcomes: Vec<DrawingOutcome>, rules: &TitleBlockRules) -> DrawingList {
    let mut assembler = DrawingListAssembler::new(rules);
    for outcome in outcomes {
        assembler.absorb(outcome);
    }
    assembler.finish()
}

/// Read and resolve `paths` into a drawing list, without plotting
pub fn scan(paths: &[PathBuf], rules: &TitleBlockRules) -> DrawingList {
    assemble(resolve_drawings(paths, rules), rules)
}

/// Layouts to plot for one drawing: its paper layouts, or the whole
/// drawing when the reader could not open it
fn plot_jobs(outcome: &DrawingOutcome) -> Vec<String> {
    if outcome.is_unreadable() {
        vec![ALL_LAYOUTS.to_string()]
    } else {
        outcome.layouts.iter().map(|l| l.name.clone()).collect()
    }
}

/// Plot every drawing in order and record each result on the drawing's
/// outcome. Failures become notifications.
fn plot_drawings(
    plotter: &mut dyn Plotter,
    drawings: &[PathBuf],
    outcomes: &mut [DrawingOutcome],
    pdf_dir: &Path,
    notifications: &mut NotificationCollection,
) -> Vec<PathBuf> {
    let mut pdfs = Vec::new();
    let total = drawings.len();
    for (index, (drawing, outcome)) in drawings.iter().zip(outcomes.iter_mut()).enumerate() {
        let layouts = plot_jobs(outcome);
        info!(
            drawing = %display_name(drawing),
            index = index + 1,
            total,
            layouts = layouts.len(),
            "plotting"
        );
        for layout in &layouts {
            let output = pdf_path(pdf_dir, drawing, layout);
            let result = match plotter.plot(drawing, layout, &output) {
                Ok(()) => {
                    debug!(pdf = %output.display(), "layout plotted");
                    let result = PlotResult::plotted(&output);
                    pdfs.push(output);
                    result
                }
                Err(e) => {
                    warn!(layout = %layout, error = %e, "plot failed");
                    notifications.notify(
                        NotificationType::PlotFailed,
                        display_name(drawing),
                        Some(layout.as_str()),
                        e.to_string(),
                    );
                    PlotResult::failed(e.to_string())
                }
            };
            outcome.record_plot(layout, result);
        }
    }
    pdfs
}

/// Run the whole batch over `input_dir`, writing results to `output_dir`.
/// Without a plotter only the drawing list is produced.
pub fn run_batch(
    config: &Config,
    input_dir: &Path,
    output_dir: &Path,
    plotter: Option<&mut dyn Plotter>,
) -> Result<BatchReport> {
    let rules = TitleBlockRules::from_config(config)?;
    let project = project_name(config, input_dir);
    ensure_dir(output_dir)?;

    let found = list_drawing_files(input_dir, config.output.recursive, &config.output.extensions)?;
    let found = exclude_dirs(
        found,
        &[
            output_dir.join(&config.output.drawing_dir),
            output_dir.join(&config.output.pdf_dir),
        ],
    );
    info!(input = %input_dir.display(), count = found.len(), "drawings found");

    let drawings = if config.output.stage_drawings && !found.is_empty() {
        let staged = copy_drawing_files(&found, &output_dir.join(&config.output.drawing_dir))?;
        info!(count = staged.len(), "drawings staged");
        staged
    } else {
        found
    };

    let mut outcomes = resolve_drawings(&drawings, &rules);

    let plotted = plotter.is_some();
    let mut plot_notifications = NotificationCollection::new();
    let mut pdfs = Vec::new();
    if let Some(plotter) = plotter {
        let pdf_dir = output_dir.join(&config.output.pdf_dir);
        ensure_dir(&pdf_dir)?;
        pdfs = plot_drawings(plotter, &drawings, &mut outcomes, &pdf_dir, &mut plot_notifications);
    }

    let mut list = assemble(outcomes, &rules);
    list.notifications.extend(plot_notifications);

    let mut combined_pdf = None;
    if config.plot.merge && !pdfs.is_empty() {
        let mut ordered = pdfs.clone();
        sort_for_merge(&mut ordered);
        let path = output_dir.join(format!("{}_Combined.pdf", sanitize_filename(&project)));
        match merge_pdfs(&ordered, &path) {
            Ok(report) => {
                for (skipped, reason) in report.skipped {
                    list.notifications.notify(
                        NotificationType::Warning,
                        display_name(&skipped),
                        None,
                        format!("left out of the combined PDF: {reason}"),
                    );
                }
                combined_pdf = report.output;
            }
            Err(e) => {
                warn!(error = %e, "PDF merge failed");
                list.notifications.notify(
                    NotificationType::Warning,
                    display_name(&path),
                    None,
                    format!("PDF merge failed: {e}"),
                );
            }
        }
    }

    let csv_path = output_dir.join(format!("{}_Drawing List.csv", sanitize_filename(&project)));
    CsvWriter::new()
        .with_source_columns(config.output.include_source_columns)
        .with_plot_columns(plotted)
        .write_file(&list, &csv_path)?;

    Ok(BatchReport {
        project_name: project,
        drawings,
        list,
        pdfs,
        combined_pdf,
        csv_path,
    })
}
