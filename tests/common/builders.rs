//! DXF text builders for test drawings.
//!
//! [`DxfBuilder`] writes the minimal structure title block resolution reads:
//! a HEADER, the BLOCK_RECORD table, block definitions with ATTDEFs,
//! INSERT/ATTRIB/SEQEND sequences and LAYOUT objects. The first layout is
//! the active `*Paper_Space` layout (its references live in ENTITIES), the
//! others are backed by `*Paper_SpaceN` blocks.

use std::fmt::Write;

/// Default title block name accepted by the stock configuration.
pub const TITLE_BLOCK: &str = "GF MALTA TITLE BLOCK 30X42-TB-ATT";

/// Attribute definitions of the stock title block, as `(tag, prompt)`.
pub const TITLE_BLOCK_ATTDEFS: &[(&str, &str)] = &[
    ("FC-E", "Top Number"),
    ("442C", "Bottom Number"),
    ("TITLE_1", "TITLE_1"),
    ("TITLE_2", "TITLE_2"),
    ("TITLE_3", "TITLE_3"),
    ("R0NO", "Rev 0 number"),
    ("R0DATE", "Rev 0 date"),
    ("R0DESC", "Rev 0 description"),
    ("R0BY", "Rev 0 by"),
    ("R1NO", "Rev 1 number"),
    ("R1DATE", "Rev 1 date"),
    ("R1DESC", "Rev 1 description"),
    ("R1BY", "Rev 1 by"),
    ("SCALE", "Drawing scale"),
];

/// A block reference with attribute values, as `(tag, value)`.
#[derive(Debug, Clone)]
pub struct PlacedBlock {
    pub name: String,
    pub attributes: Vec<(String, String)>,
}

/// Reference to `name` carrying `attributes`.
pub fn placed(name: &str, attributes: &[(&str, &str)]) -> PlacedBlock {
    PlacedBlock {
        name: name.to_string(),
        attributes: attributes
            .iter()
            .map(|(t, v)| (t.to_string(), v.to_string()))
            .collect(),
    }
}

/// Reference to the stock title block.
pub fn title_block(attributes: &[(&str, &str)]) -> PlacedBlock {
    placed(TITLE_BLOCK, attributes)
}

/// Stock title block for sheet `top-bottom` with a one line title and a
/// single revision in slot 0.
pub fn simple_sheet(top: &str, bottom: &str, title: &str, revision: &str) -> PlacedBlock {
    title_block(&[
        ("FC-E", top),
        ("442C", bottom),
        ("TITLE_1", title),
        ("R0NO", revision),
        ("R0DATE", "2024-01-15"),
        ("R0DESC", "ISSUED FOR CONSTRUCTION"),
        ("R0BY", "JD"),
    ])
}

#[derive(Debug, Clone)]
struct BlockDef {
    name: String,
    flags: i16,
    xref_path: String,
    attdefs: Vec<(String, String)>,
}

/// Builder for DXF text drawings.
#[derive(Debug, Clone)]
pub struct DxfBuilder {
    version: String,
    code_page: String,
    legacy: bool,
    blocks: Vec<BlockDef>,
    layouts: Vec<(String, Vec<PlacedBlock>)>,
    model: Vec<PlacedBlock>,
}

impl Default for DxfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DxfBuilder {
    /// AutoCAD 2000 drawing with no blocks and no layouts.
    pub fn new() -> Self {
        Self {
            version: "AC1015".to_string(),
            code_page: "ANSI_1252".to_string(),
            legacy: false,
            blocks: Vec::new(),
            layouts: Vec::new(),
            model: Vec::new(),
        }
    }

    /// Drawing with the stock title block defined.
    pub fn with_title_block() -> Self {
        Self::new().block(TITLE_BLOCK, TITLE_BLOCK_ATTDEFS)
    }

    /// R12 style drawing: no handles, no tables and no LAYOUT objects. Only
    /// the first layout's references are written, flagged as paper space.
    pub fn legacy(mut self) -> Self {
        self.legacy = true;
        self.version = "AC1009".to_string();
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn code_page(mut self, code_page: &str) -> Self {
        self.code_page = code_page.to_string();
        self
    }

    /// Define a block with `(tag, prompt)` attribute definitions.
    pub fn block(mut self, name: &str, attdefs: &[(&str, &str)]) -> Self {
        self.blocks.push(BlockDef {
            name: name.to_string(),
            flags: if attdefs.is_empty() { 0 } else { 2 },
            xref_path: String::new(),
            attdefs: attdefs
                .iter()
                .map(|(t, p)| (t.to_string(), p.to_string()))
                .collect(),
        });
        self
    }

    /// Define an external reference block.
    pub fn xref_block(mut self, name: &str, path: &str) -> Self {
        self.blocks.push(BlockDef {
            name: name.to_string(),
            flags: 4,
            xref_path: path.to_string(),
            attdefs: Vec::new(),
        });
        self
    }

    /// Add a paper space layout holding `blocks`, in tab order.
    pub fn layout(mut self, name: &str, blocks: Vec<PlacedBlock>) -> Self {
        self.layouts.push((name.to_string(), blocks));
        self
    }

    /// Place a block reference in model space.
    pub fn model_block(mut self, block: PlacedBlock) -> Self {
        self.model.push(block);
        self
    }

    /// Render the drawing as DXF text.
    pub fn build(&self) -> String {
        let mut e = Emitter {
            out: String::new(),
            next: 0x30,
            legacy: self.legacy,
        };

        let model_record = e.alloc();
        let model_layout = e.alloc();
        let paper: Vec<(String, u32, u32)> = self
            .layouts
            .iter()
            .enumerate()
            .map(|(i, _)| {
                let name = if i == 0 {
                    "*Paper_Space".to_string()
                } else {
                    format!("*Paper_Space{}", i - 1)
                };
                (name, e.alloc(), e.alloc())
            })
            .collect();
        let block_records: Vec<u32> = self.blocks.iter().map(|_| e.alloc()).collect();

        e.header(&self.version, &self.code_page);

        if !self.legacy {
            e.section("TABLES");
            e.pair(0, "TABLE");
            e.pair(2, "BLOCK_RECORD");
            e.pair(70, 1 + paper.len() + self.blocks.len());
            e.block_record(model_record, "*Model_Space", Some(model_layout));
            for (name, record, layout) in &paper {
                e.block_record(*record, name, Some(*layout));
            }
            for (block, record) in self.blocks.iter().zip(&block_records) {
                e.block_record(*record, &block.name, None);
            }
            e.pair(0, "ENDTAB");
            e.pair(0, "ENDSEC");
        }

        e.section("BLOCKS");
        if !self.legacy {
            e.begin_block(model_record, "*Model_Space", 0, "");
            e.end_block(model_record);
            for (i, (name, record, _)) in paper.iter().enumerate() {
                e.begin_block(*record, name, 0, "");
                if i > 0 {
                    for block in &self.layouts[i].1 {
                        e.insert(Some(*record), true, block);
                    }
                }
                e.end_block(*record);
            }
        }
        for (block, record) in self.blocks.iter().zip(&block_records) {
            e.begin_block(*record, &block.name, block.flags, &block.xref_path);
            for (tag, prompt) in &block.attdefs {
                e.attdef(*record, tag, prompt);
            }
            e.end_block(*record);
        }
        e.pair(0, "ENDSEC");

        e.section("ENTITIES");
        if let Some((_, blocks)) = self.layouts.first() {
            let owner = paper.first().map(|(_, record, _)| *record);
            for block in blocks {
                e.insert(owner, true, block);
            }
        }
        for block in &self.model {
            e.insert(Some(model_record), false, block);
        }
        e.pair(0, "ENDSEC");

        if !self.legacy {
            e.section("OBJECTS");
            e.layout(model_layout, "Model", 0, model_record);
            for (tab, ((_, record, layout), (name, _))) in paper.iter().zip(&self.layouts).enumerate()
            {
                e.layout(*layout, name, tab + 1, *record);
            }
            e.pair(0, "ENDSEC");
        }

        e.pair(0, "EOF");
        e.out
    }
}

struct Emitter {
    out: String,
    next: u32,
    legacy: bool,
}

impl Emitter {
    fn alloc(&mut self) -> u32 {
        let handle = self.next;
        self.next += 1;
        handle
    }

    fn pair(&mut self, code: i32, value: impl std::fmt::Display) {
        let _ = writeln!(self.out, "{:>3}", code);
        let _ = writeln!(self.out, "{}", value);
    }

    fn handle(&mut self, code: i32, handle: u32) {
        if !self.legacy {
            self.pair(code, format!("{:X}", handle));
        }
    }

    fn subclass(&mut self, name: &str) {
        if !self.legacy {
            self.pair(100, name);
        }
    }

    fn section(&mut self, name: &str) {
        self.pair(0, "SECTION");
        self.pair(2, name);
    }

    fn header(&mut self, version: &str, code_page: &str) {
        self.section("HEADER");
        self.pair(9, "$ACADVER");
        self.pair(1, version);
        self.pair(9, "$DWGCODEPAGE");
        self.pair(3, code_page);
        self.pair(0, "ENDSEC");
    }

    fn block_record(&mut self, handle: u32, name: &str, layout: Option<u32>) {
        self.pair(0, "BLOCK_RECORD");
        self.handle(5, handle);
        self.pair(330, "1");
        self.pair(100, "AcDbSymbolTableRecord");
        self.pair(100, "AcDbBlockTableRecord");
        self.pair(2, name);
        if let Some(layout) = layout {
            self.handle(340, layout);
        }
    }

    fn begin_block(&mut self, record: u32, name: &str, flags: i16, xref_path: &str) {
        let handle = self.alloc();
        self.pair(0, "BLOCK");
        self.handle(5, handle);
        self.handle(330, record);
        self.subclass("AcDbEntity");
        self.pair(8, "0");
        self.subclass("AcDbBlockBegin");
        self.pair(2, name);
        self.pair(70, flags);
        self.pair(10, "0.0");
        self.pair(20, "0.0");
        self.pair(30, "0.0");
        self.pair(3, name);
        if !xref_path.is_empty() {
            self.pair(1, xref_path);
        }
    }

    fn end_block(&mut self, record: u32) {
        let handle = self.alloc();
        self.pair(0, "ENDBLK");
        self.handle(5, handle);
        self.handle(330, record);
        self.subclass("AcDbEntity");
        self.pair(8, "0");
        self.subclass("AcDbBlockEnd");
    }

    fn attdef(&mut self, record: u32, tag: &str, prompt: &str) {
        let handle = self.alloc();
        self.pair(0, "ATTDEF");
        self.handle(5, handle);
        self.handle(330, record);
        self.subclass("AcDbEntity");
        self.pair(8, "0");
        self.subclass("AcDbText");
        self.pair(10, "0.0");
        self.pair(20, "0.0");
        self.pair(30, "0.0");
        self.pair(40, "2.5");
        self.pair(1, "");
        self.subclass("AcDbAttributeDefinition");
        self.pair(3, prompt);
        self.pair(2, tag);
        self.pair(70, 0);
    }

    fn insert(&mut self, owner: Option<u32>, paper_space: bool, block: &PlacedBlock) {
        let handle = self.alloc();
        self.pair(0, "INSERT");
        self.handle(5, handle);
        if let Some(owner) = owner {
            self.handle(330, owner);
        }
        self.subclass("AcDbEntity");
        if paper_space {
            self.pair(67, 1);
        }
        self.pair(8, "0");
        self.subclass("AcDbBlockReference");
        if !block.attributes.is_empty() {
            self.pair(66, 1);
        }
        self.pair(2, &block.name);
        self.pair(10, "0.0");
        self.pair(20, "0.0");
        self.pair(30, "0.0");
        if block.attributes.is_empty() {
            return;
        }

        for (tag, value) in &block.attributes {
            let attrib = self.alloc();
            self.pair(0, "ATTRIB");
            self.handle(5, attrib);
            self.handle(330, handle);
            self.subclass("AcDbEntity");
            if paper_space {
                self.pair(67, 1);
            }
            self.pair(8, "0");
            self.subclass("AcDbText");
            self.pair(10, "0.0");
            self.pair(20, "0.0");
            self.pair(30, "0.0");
            self.pair(40, "2.5");
            self.pair(1, value);
            self.subclass("AcDbAttribute");
            self.pair(2, tag);
            self.pair(70, 0);
        }
        let seqend = self.alloc();
        self.pair(0, "SEQEND");
        self.handle(5, seqend);
        self.handle(330, handle);
        self.subclass("AcDbEntity");
        self.pair(8, "0");
    }

    fn layout(&mut self, handle: u32, name: &str, tab: usize, record: u32) {
        self.pair(0, "LAYOUT");
        self.handle(5, handle);
        self.pair(102, "{ACAD_REACTORS");
        self.pair(330, "1A");
        self.pair(102, "}");
        self.pair(330, "1A");
        self.pair(100, "AcDbPlotSettings");
        self.pair(2, "none_device");
        self.pair(40, "0.0");
        self.pair(100, "AcDbLayout");
        self.pair(1, name);
        self.pair(70, 1);
        self.pair(71, tab);
        self.pair(10, "0.0");
        self.pair(20, "0.0");
        self.handle(330, record);
    }
}
