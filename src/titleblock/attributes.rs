//! Attribute access for paper space layouts
//!
//! [`AttributeReader`] is the seam between a drawing source and title block
//! resolution. A reader lists a drawing's paper layouts and, for a layout,
//! every block reference on it as a [`BlockInstance`] with its attributes.

use indexmap::map::Entry;
use indexmap::IndexMap;

use super::rules::normalize_key;
use crate::drawing::Drawing;
use crate::error::{Result, SheetListError};

/// One attribute of a block reference
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attribute {
    /// Attribute tag as written in the drawing
    pub tag: String,
    /// Prompt from the block's attribute definition, empty when unknown
    pub prompt: String,
    /// Trimmed attribute value
    pub value: String,
}

impl Attribute {
    pub fn new(tag: impl Into<String>, prompt: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            prompt: prompt.into(),
            value: value.into(),
        }
    }
}

/// A block reference placed on a layout
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockInstance {
    /// Referenced block name
    pub name: String,
    /// Block is an external reference
    pub is_xref: bool,
    /// Attributes keyed by normalized tag, in drawing order
    attributes: IndexMap<String, Attribute>,
}

impl BlockInstance {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: mark the block as an xref
    pub fn xref(mut self) -> Self {
        self.is_xref = true;
        self
    }

    /// Builder: add an attribute
    pub fn with_attribute(
        mut self,
        tag: impl Into<String>,
        prompt: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.insert(Attribute::new(tag, prompt, value));
        self
    }

    /// Add an attribute. An attribute whose tag normalizes to an already
    /// present key is ignored: the first occurrence wins.
    pub fn insert(&mut self, attribute: Attribute) {
        let mut key = normalize_key(&attribute.tag);
        if key.is_empty() {
            key = format!("#{}", self.attributes.len());
        }
        if let Entry::Vacant(slot) = self.attributes.entry(key) {
            slot.insert(attribute);
        }
    }

    /// Look up an attribute by tag, compared in normalized form
    pub fn get(&self, tag: &str) -> Option<&Attribute> {
        self.attributes.get(&normalize_key(tag))
    }

    /// Value of the attribute with this tag, if present
    pub fn value(&self, tag: &str) -> Option<&str> {
        self.get(tag).map(|a| a.value.as_str())
    }

    /// Attributes in drawing order
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }
}

/// A paper space layout of a drawing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutInfo {
    pub name: String,
    /// Position among the drawing's paper layouts
    pub index: usize,
}

/// Source of layouts and block attributes for one drawing
pub trait AttributeReader {
    /// Paper space layouts in document order. Model space is never listed.
    fn layouts(&self) -> Vec<LayoutInfo>;

    /// Every block reference on the layout, in drawing order
    fn read_layout_blocks(&self, layout: &LayoutInfo) -> Result<Vec<BlockInstance>>;
}

impl AttributeReader for Drawing {
    fn layouts(&self) -> Vec<LayoutInfo> {
        self.paper_layouts()
            .into_iter()
            .enumerate()
            .map(|(index, layout)| LayoutInfo {
                name: layout.name.clone(),
                index,
            })
            .collect()
    }

    fn read_layout_blocks(&self, layout: &LayoutInfo) -> Result<Vec<BlockInstance>> {
        let layouts = self.paper_layouts();
        let source = layouts
            .get(layout.index)
            .filter(|l| l.name == layout.name)
            .or_else(|| layouts.iter().find(|l| l.name == layout.name))
            .ok_or_else(|| SheetListError::Custom(format!("unknown layout '{}'", layout.name)))?;

        let blocks = self
            .layout_inserts(source)
            .into_iter()
            .map(|insert| {
                let definition = self.block(&insert.block_name);
                let mut block = BlockInstance::new(insert.block_name.clone());
                block.is_xref = definition.map(|d| d.is_xref()).unwrap_or(false);
                for attrib in &insert.attributes {
                    let prompt = definition
                        .and_then(|d| d.prompt_for(&attrib.tag))
                        .unwrap_or_default();
                    block.insert(Attribute::new(
                        attrib.tag.trim(),
                        prompt.trim(),
                        attrib.value.trim(),
                    ));
                }
                block
            })
            .collect();
        Ok(blocks)
    }
}
