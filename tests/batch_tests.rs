//! Batch run tests: staging, the CSV drawing list, plotting through a
//! [`Plotter`] and the combined PDF.

mod common;

use common::builders::*;
use common::{pdf_page_count, scratch_dir, write_blank_pdf};
use sheetlist::batch::run_batch;
use sheetlist::plot::Plotter;
use sheetlist::{Config, NotificationType, Result, SheetListError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Plotter writing one blank page per layout, failing for listed layouts.
#[derive(Default)]
struct FakePlotter {
    fail_layouts: Vec<String>,
    calls: Vec<(PathBuf, String)>,
}

impl Plotter for FakePlotter {
    fn plot(&mut self, drawing: &Path, layout: &str, output: &Path) -> Result<()> {
        self.calls.push((drawing.to_path_buf(), layout.to_string()));
        if self.fail_layouts.iter().any(|l| l == layout) {
            return Err(SheetListError::Plot(format!("plotter rejected {layout}")));
        }
        write_blank_pdf(output, 1);
        Ok(())
    }
}

/// Input folder with two drawings: `E-200.dxf` (one sheet) and
/// `E-100.dxf` (two sheets plus a cover layout without title block).
fn project_input(name: &str) -> (PathBuf, PathBuf) {
    let root = scratch_dir("batch", name);
    let input = root.join("Malta GF");
    let output = root.join("out");
    std::fs::create_dir_all(&input).unwrap();

    let first = DxfBuilder::with_title_block()
        .layout("COVER", vec![])
        .layout("E-101", vec![simple_sheet("E", "101", "POWER PLAN", "A")])
        .layout("E-102", vec![simple_sheet("E", "102", "LIGHTING PLAN", "B")]);
    let second = DxfBuilder::with_title_block()
        .layout("E-201", vec![simple_sheet("E", "201", "RISER DIAGRAM", "C")]);
    std::fs::write(input.join("E-200.dxf"), second.build()).unwrap();
    std::fs::write(input.join("E-100.dxf"), first.build()).unwrap();
    std::fs::write(input.join("notes.txt"), "not a drawing").unwrap();
    (input, output)
}

/// Parse a drawing list CSV into column name → value maps
fn read_rows(path: &Path) -> Vec<HashMap<String, String>> {
    let bytes = std::fs::read(path).unwrap();
    let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes[..]);
    let mut reader = csv::Reader::from_reader(body);
    let headers = reader.headers().unwrap().clone();
    reader
        .records()
        .map(|record| {
            let record = record.unwrap();
            headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect()
        })
        .collect()
}

#[test]
fn list_only_run_writes_csv_and_stages_drawings() {
    let (input, output) = project_input("list_only");
    let report = run_batch(&Config::default(), &input, &output, None).unwrap();

    assert_eq!(report.project_name, "Malta GF");
    assert_eq!(report.drawings.len(), 2);
    assert!(report.drawings.iter().all(|d| d.starts_with(output.join("DWG"))));
    assert!(output.join("DWG").join("E-100.dxf").exists());
    assert!(report.pdfs.is_empty());
    assert!(report.combined_pdf.is_none());

    assert_eq!(report.csv_path, output.join("Malta GF_Drawing List.csv"));
    let bytes = std::fs::read(&report.csv_path).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "DWG File,Layout,Sheet Number,Sheet Name,Revision Number,Revision Date,Revision Description,Revision By"
    );
    // drawings sorted by name, layouts in tab order
    assert!(lines[1].starts_with("E-100.dxf,E-101,E-101,POWER PLAN,A,"));
    assert!(lines[2].starts_with("E-100.dxf,E-102,E-102,LIGHTING PLAN,B,"));
    assert!(lines[3].starts_with("E-200.dxf,E-201,E-201,RISER DIAGRAM,C,"));
    assert_eq!(lines.len(), 4);

    let skipped: Vec<_> = report.list.notifications.skipped_sheets().collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].layout.as_deref(), Some("COVER"));
}

#[test]
fn plotted_run_merges_every_layout() {
    let (input, output) = project_input("plotted");
    let mut plotter = FakePlotter::default();
    let report = run_batch(&Config::default(), &input, &output, Some(&mut plotter)).unwrap();

    // every paper layout is plotted, including the cover sheet
    assert_eq!(plotter.calls.len(), 4);
    assert_eq!(report.pdfs.len(), 4);
    let pdf_dir = output.join("Individual PDFs");
    assert!(pdf_dir.join("E-100__COVER.pdf").exists());
    assert!(pdf_dir.join("E-200__E-201.pdf").exists());

    let combined = report.combined_pdf.expect("combined PDF");
    assert_eq!(combined, output.join("Malta GF_Combined.pdf"));
    assert_eq!(pdf_page_count(&combined), 4);
}

#[test]
fn plot_failure_is_reported_and_run_continues() {
    let (input, output) = project_input("plot_failure");
    let mut plotter = FakePlotter {
        fail_layouts: vec!["E-102".to_string()],
        ..Default::default()
    };
    let report = run_batch(&Config::default(), &input, &output, Some(&mut plotter)).unwrap();

    assert_eq!(report.pdfs.len(), 3);
    let failures = report.list.notifications.of_type(NotificationType::PlotFailed);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].layout.as_deref(), Some("E-102"));
    // a failed plot does not remove the sheet from the drawing list
    assert_eq!(report.list.rows.len(), 3);
    assert_eq!(pdf_page_count(report.combined_pdf.as_ref().unwrap()), 3);
}

#[test]
fn configured_project_name_and_no_staging() {
    let (input, output) = project_input("configured");
    let mut config = Config::default();
    config.output.project_name = Some("P-100".to_string());
    config.output.stage_drawings = false;
    config.output.include_source_columns = false;
    config.plot.merge = false;

    let mut plotter = FakePlotter::default();
    let report = run_batch(&config, &input, &output, Some(&mut plotter)).unwrap();

    assert!(report.drawings.iter().all(|d| d.starts_with(&input)));
    assert!(!output.join("DWG").exists());
    assert!(report.combined_pdf.is_none());
    assert_eq!(report.csv_path, output.join("P-100_Drawing List.csv"));

    let text = std::fs::read_to_string(&report.csv_path).unwrap();
    let header = text.trim_start_matches('\u{feff}').lines().next().unwrap();
    assert!(header.starts_with("Sheet Number,"));
}

#[test]
fn empty_folder_writes_header_only_list() {
    let root = scratch_dir("batch", "empty");
    let input = root.join("in");
    std::fs::create_dir_all(&input).unwrap();

    let report = run_batch(&Config::default(), &input, &root.join("out"), None).unwrap();
    assert!(report.drawings.is_empty());
    assert!(report.list.is_empty());
    let text = std::fs::read_to_string(&report.csv_path).unwrap();
    assert_eq!(text.lines().count(), 1);
}

#[test]
fn missing_input_folder_fails() {
    let root = scratch_dir("batch", "missing");
    let result = run_batch(&Config::default(), &root.join("nope"), &root.join("out"), None);
    assert!(result.is_err());
}

#[test]
fn plot_results_are_written_per_row() {
    let (input, output) = project_input("plot_columns");
    let mut plotter = FakePlotter {
        fail_layouts: vec!["E-102".to_string()],
        ..Default::default()
    };
    let report = run_batch(&Config::default(), &input, &output, Some(&mut plotter)).unwrap();

    let text = std::fs::read_to_string(&report.csv_path).unwrap();
    let header = text.trim_start_matches('\u{feff}').lines().next().unwrap();
    assert!(header.ends_with("Revision By,Plot Successful,Status,Error,Individual PDF"));

    let rows = read_rows(&report.csv_path);
    assert_eq!(rows.len(), 3);
    let plotted = &rows[0];
    assert_eq!(plotted["Layout"], "E-101");
    assert_eq!(plotted["Plot Successful"], "Yes");
    assert_eq!(plotted["Status"], "Plotted");
    assert_eq!(plotted["Error"], "");
    assert!(Path::new(&plotted["Individual PDF"]).ends_with("E-100__E-101.pdf"));
    assert!(Path::new(&plotted["Individual PDF"]).exists());

    let failed = &rows[1];
    assert_eq!(failed["Layout"], "E-102");
    assert_eq!(failed["Plot Successful"], "No");
    assert_eq!(failed["Status"], "Plot Failed");
    assert!(failed["Error"].contains("plotter rejected E-102"));
    assert_eq!(failed["Individual PDF"], "");
}

#[test]
fn unreadable_dwg_is_still_plotted_whole() {
    let (input, output) = project_input("dwg_input");
    std::fs::write(input.join("E-300.dwg"), b"AC1032\x00binary").unwrap();

    let mut plotter = FakePlotter::default();
    let report = run_batch(&Config::default(), &input, &output, Some(&mut plotter)).unwrap();

    let dwg = output.join("DWG").join("E-300.dwg");
    assert!(plotter.calls.contains(&(dwg, "*".to_string())));
    assert_eq!(plotter.calls.len(), 5);
    assert!(output.join("Individual PDFs").join("E-300.pdf").exists());

    // the sheets of the DWG are reported as unread, not listed
    let failures = report.list.notifications.of_type(NotificationType::ReaderFailure);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].drawing, "E-300.dwg");
    assert_eq!(report.list.rows.len(), 3);
    assert_eq!(pdf_page_count(report.combined_pdf.as_ref().unwrap()), 5);
}

#[test]
fn rerun_into_input_folder_is_stable() {
    let (input, _) = project_input("rerun");
    let mut config = Config::default();
    config.output.recursive = true;

    let first = run_batch(&config, &input, &input, None).unwrap();
    let second = run_batch(&config, &input, &input, None).unwrap();

    assert_eq!(first.drawings, second.drawings);
    assert_eq!(second.drawings.len(), 2);
    assert!(!input.join("DWG").join("E-100 (1).dxf").exists());
    assert_eq!(read_rows(&first.csv_path).len(), 3);
    assert_eq!(std::fs::read(&first.csv_path).unwrap(), std::fs::read(&second.csv_path).unwrap());
}
