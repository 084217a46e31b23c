//! In-memory drawing model
//!
//! Holds the parts of a DXF drawing that title block resolution needs:
//! block definitions (with their attribute definitions), block references
//! with their attribute values, block records and layouts. Geometry is not
//! retained.

use bitflags::bitflags;
use indexmap::IndexMap;

use crate::types::Handle;

/// Block record name of the active paper space layout.
pub const PAPER_SPACE: &str = "*Paper_Space";

/// Block record name of model space.
pub const MODEL_SPACE: &str = "*Model_Space";

bitflags! {
    /// BLOCK flags (DXF group code 70)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BlockFlags: i16 {
        const ANONYMOUS = 1;
        const HAS_ATTRIBUTES = 2;
        const XREF = 4;
        const XREF_OVERLAY = 8;
        const EXTERNALLY_DEPENDENT = 16;
        const RESOLVED = 32;
        const REFERENCED = 64;
    }
}

impl BlockFlags {
    /// Block is an external reference (attached or overlaid)
    pub fn is_xref(&self) -> bool {
        self.intersects(BlockFlags::XREF | BlockFlags::XREF_OVERLAY)
    }
}

/// An attribute definition (ATTDEF) inside a block definition
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeDefinition {
    pub tag: String,
    /// Prompt shown when the block is inserted
    pub prompt: String,
    pub default_value: String,
}

/// An attribute value (ATTRIB) attached to a block reference
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeEntity {
    pub tag: String,
    pub value: String,
}

impl AttributeEntity {
    pub fn new(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            value: value.into(),
        }
    }
}

/// A block reference (INSERT) with its attributes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Insert {
    pub handle: Handle,
    /// Owning block record
    pub owner: Handle,
    /// Referenced block definition name
    pub block_name: String,
    /// Entity lives in paper space (group code 67)
    pub paper_space: bool,
    /// Attribute values, in file order
    pub attributes: Vec<AttributeEntity>,
}

impl Insert {
    pub fn new(block_name: impl Into<String>) -> Self {
        Self {
            block_name: block_name.into(),
            ..Default::default()
        }
    }

    /// Builder: add an attribute value
    pub fn with_attribute(mut self, tag: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(AttributeEntity::new(tag, value));
        self
    }
}

/// A block definition (BLOCK ... ENDBLK)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockDefinition {
    pub name: String,
    /// Owning block record
    pub owner: Handle,
    pub flags: BlockFlags,
    /// Xref path (group code 1)
    pub xref_path: String,
    /// Attribute definitions, in file order
    pub attribute_definitions: Vec<AttributeDefinition>,
    /// Block references placed inside this block
    pub inserts: Vec<Insert>,
}

impl BlockDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Prompt of the attribute definition with this tag (case-insensitive)
    pub fn prompt_for(&self, tag: &str) -> Option<&str> {
        self.attribute_definitions
            .iter()
            .find(|d| d.tag.eq_ignore_ascii_case(tag))
            .map(|d| d.prompt.as_str())
    }

    pub fn is_xref(&self) -> bool {
        self.flags.is_xref() || !self.xref_path.is_empty()
    }
}

/// A BLOCK_RECORD table entry
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockRecord {
    pub handle: Handle,
    pub name: String,
    /// Layout this block record backs (group code 340)
    pub layout: Handle,
}

/// A LAYOUT object
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    pub handle: Handle,
    pub name: String,
    /// Tab order; model space is 0
    pub tab_order: i16,
    /// Block record holding this layout's entities
    pub block_record: Handle,
}

impl Layout {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_model(&self) -> bool {
        self.name.eq_ignore_ascii_case("model")
    }
}

/// Drawing contents relevant to sheet listing
#[derive(Debug, Clone, Default)]
pub struct Drawing {
    /// `$ACADVER` header value
    pub version: String,
    /// `$DWGCODEPAGE` header value
    pub code_page: Option<String>,
    pub block_records: Vec<BlockRecord>,
    /// Block definitions keyed by upper-cased name
    pub blocks: IndexMap<String, BlockDefinition>,
    /// Block references from the ENTITIES section
    pub entities: Vec<Insert>,
    /// Layouts in file order
    pub layouts: Vec<Layout>,
    /// Sections skipped by a failsafe read
    pub warnings: Vec<String>,
}

impl Drawing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a block definition, replacing any previous one with the same name
    pub fn add_block(&mut self, block: BlockDefinition) {
        self.blocks.insert(block.name.to_uppercase(), block);
    }

    /// Look up a block definition by name (case-insensitive)
    pub fn block(&self, name: &str) -> Option<&BlockDefinition> {
        self.blocks.get(&name.to_uppercase())
    }

    pub fn block_record(&self, handle: Handle) -> Option<&BlockRecord> {
        if handle.is_null() {
            return None;
        }
        self.block_records.iter().find(|r| r.handle == handle)
    }

    /// Paper space layouts in tab order.
    ///
    /// Drawings without LAYOUT objects (R12 and earlier) expose a single
    /// `Layout1` when the ENTITIES section holds paper space references.
    pub fn paper_layouts(&self) -> Vec<&Layout> {
        let mut layouts: Vec<&Layout> = self.layouts.iter().filter(|l| !l.is_model()).collect();
        // stable: equal tab orders keep file order
        layouts.sort_by_key(|l| l.tab_order);
        layouts
    }

    /// Block record backing a layout, resolved through the layout's own
    /// pointer or the block record's back pointer.
    fn layout_record(&self, layout: &Layout) -> Option<&BlockRecord> {
        self.block_record(layout.block_record).or_else(|| {
            if layout.handle.is_null() {
                return None;
            }
            self.block_records.iter().find(|r| r.layout == layout.handle)
        })
    }

    /// Block references placed directly on a layout, in file order.
    pub fn layout_inserts(&self, layout: &Layout) -> Vec<&Insert> {
        let record = match self.layout_record(layout) {
            Some(record) => record,
            None => return self.entities.iter().filter(|i| i.paper_space).collect(),
        };

        if record.name.eq_ignore_ascii_case(PAPER_SPACE) {
            return self
                .entities
                .iter()
                .filter(|i| i.owner == record.handle || (i.owner.is_null() && i.paper_space))
                .collect();
        }

        // Inactive paper space layouts live in *Paper_SpaceN blocks
        let mut inserts: Vec<&Insert> = self
            .entities
            .iter()
            .filter(|i| i.owner == record.handle)
            .collect();
        if let Some(block) = self.block(&record.name) {
            inserts.extend(block.inserts.iter());
        }
        inserts
    }

    /// Fill in a default layout for drawings that carry none.
    pub(crate) fn ensure_layouts(&mut self) {
        if self.layouts.iter().any(|l| !l.is_model()) {
            return;
        }
        if self.entities.iter().any(|i| i.paper_space) {
            let mut layout = Layout::new("Layout1");
            layout.tab_order = 1;
            self.layouts.push(layout);
        }
    }
}
