//! Layout plotting
//!
//! Plotting goes through the [`Plotter`] trait: render one layout of one
//! drawing to a PDF file. [`CommandPlotter`] drives an external plot
//! program; tests and dry runs plug in their own implementations.

mod command;

pub use command::CommandPlotter;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::io::files::sanitize_filename;

/// Layout name handed to the plotter for a drawing the attribute reader could
/// not open (a DWG, for instance). The driver plots every paper layout of
/// the drawing into one PDF.
pub const ALL_LAYOUTS: &str = "*";

/// Renders drawing layouts to PDF
pub trait Plotter {
    /// Plot `layout` of `drawing` to `output`. Succeeds only once the PDF
    /// exists.
    fn plot(&mut self, drawing: &Path, layout: &str, output: &Path) -> Result<()>;
}

impl<P: Plotter + ?Sized> Plotter for &mut P {
    fn plot(&mut self, drawing: &Path, layout: &str, output: &Path) -> Result<()> {
        (**self).plot(drawing, layout, output)
    }
}

/// PDF file name for a layout: `<drawing stem>__<layout>.pdf`, with
/// characters illegal in file names replaced. [`ALL_LAYOUTS`] plots to
/// `<drawing stem>.pdf`.
pub fn pdf_file_name(drawing: &Path, layout: &str) -> String {
    let stem = drawing
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if layout == ALL_LAYOUTS {
        return format!("{stem}.pdf");
    }
    format!("{}__{}.pdf", stem, sanitize_filename(layout))
}

/// Full PDF path for a layout inside `dir`
pub fn pdf_path(dir: &Path, drawing: &Path, layout: &str) -> PathBuf {
    dir.join(pdf_file_name(drawing, layout))
}

/// Merge order of plotted PDFs: by drawing stem, then by PDF stem, both
/// case-insensitive
pub fn sort_for_merge(pdfs: &mut [PathBuf]) {
    let key = |p: &PathBuf| {
        let stem = p
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let drawing = stem.split("__").next().unwrap_or_default().to_string();
        (drawing, stem)
    };
    pdfs.sort_by_cached_key(key);
}
