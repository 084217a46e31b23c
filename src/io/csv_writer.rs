//! Drawing list CSV output

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::WriterBuilder;
use tracing::info;

use crate::error::{Result, SheetListError};
use crate::titleblock::schema::{PLOT_COLUMNS, SOURCE_COLUMNS};
use crate::titleblock::{DrawingList, CANONICAL_COLUMNS};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes a [`DrawingList`] as comma separated values
#[derive(Debug, Clone)]
pub struct CsvWriter {
    include_source_columns: bool,
    include_plot_columns: bool,
    write_bom: bool,
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self {
            include_source_columns: true,
            include_plot_columns: false,
            write_bom: true,
        }
    }
}

impl CsvWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend the `DWG File` and `Layout` columns
    pub fn with_source_columns(mut self, include: bool) -> Self {
        self.include_source_columns = include;
        self
    }

    /// Add `Plot Successful`, `Status`, `Error` and `Individual PDF` after
    /// the canonical columns
    pub fn with_plot_columns(mut self, include: bool) -> Self {
        self.include_plot_columns = include;
        self
    }

    /// Start the output with a UTF-8 byte order mark so spreadsheet
    /// applications detect the encoding
    pub fn with_bom(mut self, bom: bool) -> Self {
        self.write_bom = bom;
        self
    }

    /// Header line fields, in output order: source columns, canonical
    /// columns, plot columns, extra columns
    pub fn headers<'a>(&self, list: &'a DrawingList) -> Vec<&'a str> {
        let source: &[&'a str] = if self.include_source_columns {
            &SOURCE_COLUMNS
        } else {
            &[]
        };
        let plot: &[&'a str] = if self.include_plot_columns {
            &PLOT_COLUMNS
        } else {
            &[]
        };
        let (canonical, extra) = list.headers.columns().split_at(CANONICAL_COLUMNS.len());
        source
            .iter()
            .copied()
            .chain(canonical.iter().map(String::as_str))
            .chain(plot.iter().copied())
            .chain(extra.iter().map(String::as_str))
            .collect()
    }

    /// Write the list to any writer
    pub fn write_to<W: Write>(&self, list: &DrawingList, mut writer: W) -> Result<()> {
        if self.write_bom {
            writer.write_all(UTF8_BOM)?;
        }

        let headers = self.headers(list);
        let mut csv = WriterBuilder::new().from_writer(writer);
        csv.write_record(&headers)?;

        let skip = if self.include_source_columns {
            SOURCE_COLUMNS.len()
        } else {
            0
        };
        for row in &list.rows {
            let mut record: Vec<&str> = Vec::with_capacity(headers.len());
            if self.include_source_columns {
                record.push(&row.drawing);
                record.push(&row.layout);
            }
            record.extend(headers[skip..].iter().map(|column| row.cell(column)));
            csv.write_record(&record)?;
        }

        csv.flush()?;
        Ok(())
    }

    /// Write the list to a file, creating parent directories
    pub fn write_file(&self, list: &DrawingList, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SheetListError::io(parent, e))?;
        }
        let file = File::create(path).map_err(|e| SheetListError::io(path, e))?;
        self.write_to(list, BufWriter::new(file))?;
        info!(path = %path.display(), rows = list.rows.len(), "drawing list written");
        Ok(())
    }
}
