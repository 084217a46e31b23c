//! Shared test utilities for sheetlist integration tests.
//!
//! Holds output path helpers, read helpers and the default rule set, so the
//! test crates only need `mod common;`.

#![allow(dead_code)]

pub mod builders;

use sheetlist::batch::read_drawing;
use sheetlist::{Config, Drawing, TitleBlockRules};
use std::path::{Path, PathBuf};

// ===========================================================================
// Output paths
// ===========================================================================

/// Path inside `<manifest>/test_output`, creating the directory.
pub fn test_output_path(filename: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_output");
    let _ = std::fs::create_dir_all(&dir);
    dir.join(filename)
}

/// Fresh, empty directory under `test_output/<group>/<name>`.
pub fn scratch_dir(group: &str, name: &str) -> PathBuf {
    let dir = test_output_path(group).join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

// ===========================================================================
// Read helpers
// ===========================================================================

/// Write DXF text to `path` and read it back.
pub fn write_and_read(path: &Path, dxf: &str) -> Drawing {
    std::fs::write(path, dxf).expect("write DXF");
    read_drawing(path).unwrap_or_else(|e| panic!("read {}: {}", path.display(), e))
}

/// Rules built from the default configuration.
pub fn default_rules() -> TitleBlockRules {
    TitleBlockRules::from_config(&Config::default()).expect("default rules")
}

/// Rules with the name allow-list cleared, so selection is by pattern only.
pub fn pattern_only_rules() -> TitleBlockRules {
    let mut config = Config::default();
    config.matching.block_names.clear();
    TitleBlockRules::from_config(&config).expect("pattern rules")
}

// ===========================================================================
// PDF helpers
// ===========================================================================

/// Write a PDF with `page_count` empty letter pages.
pub fn write_blank_pdf(path: &Path, page_count: usize) {
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::new();
    for _ in 0..page_count {
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("save PDF");
}

/// Page count of a PDF on disk.
pub fn pdf_page_count(path: &Path) -> usize {
    lopdf::Document::load(path).expect("load PDF").get_pages().len()
}
