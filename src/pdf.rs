//! Combined PDF output
//!
//! Concatenates the pages of several PDF files, in the given order, into a
//! single document. Inputs that cannot be loaded are reported and left out.

use std::path::{Path, PathBuf};

use lopdf::{Document, Object, ObjectId};
use tracing::{info, warn};

use crate::error::{Result, SheetListError};

/// Outcome of a merge
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// Written file, `None` when there was nothing to merge
    pub output: Option<PathBuf>,
    /// Inputs whose pages made it into the output
    pub merged: Vec<PathBuf>,
    /// Inputs that could not be loaded, with the reason
    pub skipped: Vec<(PathBuf, String)>,
    /// Total page count of the output
    pub pages: usize,
}

fn type_name(object: &Object) -> &[u8] {
    object
        .as_dict()
        .and_then(|d| d.get(b"Type"))
        .and_then(Object::as_name)
        .unwrap_or(b"")
}

/// Merge `inputs` into `output`, pages in input order. An empty input list,
/// or a list where every input fails to load, writes nothing.
pub fn merge_pdfs(inputs: &[PathBuf], output: &Path) -> Result<MergeReport> {
    let mut report = MergeReport::default();
    let mut max_id = 1;
    let mut pages: Vec<(ObjectId, Object)> = Vec::new();
    let mut objects: Vec<(ObjectId, Object)> = Vec::new();

    for path in inputs {
        let mut doc = match Document::load(path) {
            Ok(doc) => doc,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "PDF skipped");
                report.skipped.push((path.clone(), e.to_string()));
                continue;
            }
        };
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for (_, page_id) in doc.get_pages() {
            if let Ok(page) = doc.get_object(page_id) {
                pages.push((page_id, page.clone()));
            }
        }
        objects.extend(doc.objects);
        report.merged.push(path.clone());
    }

    if pages.is_empty() {
        if !inputs.is_empty() {
            warn!("no readable PDF pages, combined PDF not written");
        }
        return Ok(report);
    }

    let mut document = Document::with_version("1.5");
    let mut catalog: Option<(ObjectId, Object)> = None;
    let mut page_tree: Option<(ObjectId, Object)> = None;

    for (id, object) in objects {
        let kind = type_name(&object).to_vec();
        match kind.as_slice() {
            b"Catalog" => {
                // the first catalog's id is kept for the merged catalog
                let id = catalog.as_ref().map(|(first, _)| *first).unwrap_or(id);
                catalog = Some((id, object));
            }
            b"Pages" => {
                if let Ok(dictionary) = object.as_dict() {
                    let mut dictionary = dictionary.clone();
                    if let Some((_, ref previous)) = page_tree {
                        if let Ok(previous) = previous.as_dict() {
                            dictionary.extend(previous);
                        }
                    }
                    let id = page_tree.as_ref().map(|(first, _)| *first).unwrap_or(id);
                    page_tree = Some((id, Object::Dictionary(dictionary)));
                }
            }
            b"Page" | b"Outlines" | b"Outline" => {}
            _ => {
                document.objects.insert(id, object);
            }
        }
    }

    let (catalog_id, catalog) =
        catalog.ok_or_else(|| SheetListError::Pdf("no document catalog in inputs".into()))?;
    let (pages_id, page_tree) =
        page_tree.ok_or_else(|| SheetListError::Pdf("no page tree in inputs".into()))?;

    for (id, page) in &pages {
        if let Ok(dictionary) = page.as_dict() {
            let mut dictionary = dictionary.clone();
            dictionary.set("Parent", Object::Reference(pages_id));
            document.objects.insert(*id, Object::Dictionary(dictionary));
        }
    }

    let mut tree = page_tree
        .as_dict()
        .map_err(|e| SheetListError::Pdf(e.to_string()))?
        .clone();
    tree.set("Count", Object::Integer(pages.len() as i64));
    tree.set(
        "Kids",
        Object::Array(pages.iter().map(|(id, _)| Object::Reference(*id)).collect()),
    );
    document.objects.insert(pages_id, Object::Dictionary(tree));

    let mut root = catalog
        .as_dict()
        .map_err(|e| SheetListError::Pdf(e.to_string()))?
        .clone();
    root.set("Pages", Object::Reference(pages_id));
    root.remove(b"Outlines");
    document.objects.insert(catalog_id, Object::Dictionary(root));

    document.trailer.set("Root", Object::Reference(catalog_id));
    document.max_id = document.objects.len() as u32;
    document.renumber_objects();
    document.compress();

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SheetListError::io(parent, e))?;
    }
    document
        .save(output)
        .map_err(|e| SheetListError::Pdf(format!("cannot write {}: {}", output.display(), e)))?;

    info!(path = %output.display(), pages = pages.len(), "combined PDF written");
    report.pages = pages.len();
    report.output = Some(output.to_path_buf());
    Ok(report)
}
