//! DXF section readers
//!
//! Only the records title block resolution needs are kept: header version
//! and code page, the BLOCK_RECORD table, block definitions with their
//! ATTDEFs, INSERT/ATTRIB sequences and LAYOUT objects. Everything else is
//! skipped pair by pair.

use super::stream_reader::{DxfCodePair, DxfStreamReader};
use crate::drawing::{
    AttributeDefinition, AttributeEntity, BlockDefinition, BlockFlags, BlockRecord, Drawing,
    Insert, Layout,
};
use crate::error::Result;

/// Reads the body of one section
pub struct SectionReader<'a> {
    reader: &'a mut Box<dyn DxfStreamReader>,
}

/// Tracks `102 {NAME ... 102 }` application groups, whose 330 pairs are
/// reactors rather than the owner.
#[derive(Default)]
struct GroupTracker {
    depth: usize,
}

impl GroupTracker {
    /// Returns `true` when the pair is a group delimiter or lies inside a group.
    fn consume(&mut self, pair: &DxfCodePair) -> bool {
        if pair.code == 102 {
            if pair.value.starts_with('{') {
                self.depth += 1;
            } else if pair.value.starts_with('}') {
                self.depth = self.depth.saturating_sub(1);
            }
            return true;
        }
        self.depth > 0
    }
}

impl<'a> SectionReader<'a> {
    pub fn new(reader: &'a mut Box<dyn DxfStreamReader>) -> Self {
        Self { reader }
    }

    /// Read the HEADER section for `$ACADVER` and `$DWGCODEPAGE`
    pub fn read_header(&mut self, drawing: &mut Drawing) -> Result<()> {
        while let Some(pair) = self.reader.read_pair()? {
            if pair.is_start("ENDSEC") {
                break;
            }
            if pair.code != 9 {
                continue;
            }
            match pair.value.as_str() {
                "$ACADVER" => {
                    if let Some(vp) = self.reader.read_pair()? {
                        if vp.code == 1 {
                            drawing.version = vp.value;
                        } else {
                            self.reader.push_back(vp);
                        }
                    }
                }
                "$DWGCODEPAGE" => {
                    if let Some(cp) = self.reader.read_pair()? {
                        if cp.code == 3 {
                            drawing.code_page = Some(cp.value);
                        } else {
                            self.reader.push_back(cp);
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Read the TABLES section, keeping only BLOCK_RECORD entries
    pub fn read_tables(&mut self, drawing: &mut Drawing) -> Result<()> {
        while let Some(pair) = self.reader.read_pair()? {
            if pair.is_start("ENDSEC") {
                break;
            }
            if !pair.is_start("TABLE") {
                continue;
            }
            let is_block_records = match self.reader.read_pair()? {
                Some(name) => name.code == 2 && name.value == "BLOCK_RECORD",
                None => break,
            };
            if is_block_records {
                self.read_block_record_table(drawing)?;
            } else {
                self.skip_to("ENDTAB")?;
            }
        }
        Ok(())
    }

    fn read_block_record_table(&mut self, drawing: &mut Drawing) -> Result<()> {
        while let Some(pair) = self.reader.read_pair()? {
            if pair.is_start("ENDTAB") {
                break;
            }
            if pair.is_start("BLOCK_RECORD") {
                drawing.block_records.push(self.read_block_record_entry()?);
            }
        }
        Ok(())
    }

    fn read_block_record_entry(&mut self) -> Result<BlockRecord> {
        let mut record = BlockRecord::default();
        while let Some(pair) = self.reader.read_pair()? {
            match pair.code {
                0 => {
                    self.reader.push_back(pair);
                    break;
                }
                5 => record.handle = pair.as_handle().unwrap_or_default(),
                2 => record.name = pair.value,
                340 => record.layout = pair.as_handle().unwrap_or_default(),
                _ => {}
            }
        }
        Ok(record)
    }

    /// Read the BLOCKS section
    pub fn read_blocks(&mut self, drawing: &mut Drawing) -> Result<()> {
        while let Some(pair) = self.reader.read_pair()? {
            if pair.is_start("ENDSEC") {
                break;
            }
            if pair.is_start("BLOCK") {
                let block = self.read_block()?;
                drawing.add_block(block);
            }
        }
        Ok(())
    }

    /// Read a single BLOCK...ENDBLK definition
    fn read_block(&mut self) -> Result<BlockDefinition> {
        let mut block = BlockDefinition::default();
        let mut groups = GroupTracker::default();

        while let Some(pair) = self.reader.read_pair()? {
            if pair.code == 0 {
                self.reader.push_back(pair);
                break;
            }
            if groups.consume(&pair) {
                continue;
            }
            match pair.code {
                2 => block.name = pair.value,
                3 if block.name.is_empty() => block.name = pair.value,
                1 => block.xref_path = pair.value,
                70 => {
                    if let Some(flags) = pair.as_i16() {
                        block.flags = BlockFlags::from_bits_truncate(flags);
                    }
                }
                330 => block.owner = pair.as_handle().unwrap_or_default(),
                _ => {}
            }
        }

        self.read_entity_list(
            "ENDBLK",
            &mut block.inserts,
            Some(&mut block.attribute_definitions),
        )?;
        Ok(block)
    }

    /// Read the ENTITIES section
    pub fn read_entities(&mut self, drawing: &mut Drawing) -> Result<()> {
        self.read_entity_list("ENDSEC", &mut drawing.entities, None)
    }

    /// Read entities up to `end_marker`, collecting INSERTs (with their
    /// ATTRIBs) and, when requested, ATTDEFs.
    fn read_entity_list(
        &mut self,
        end_marker: &str,
        inserts: &mut Vec<Insert>,
        mut attdefs: Option<&mut Vec<AttributeDefinition>>,
    ) -> Result<()> {
        let mut attributes_open = false;

        while let Some(pair) = self.reader.read_pair()? {
            if pair.code != 0 {
                continue;
            }
            if pair.value == end_marker {
                // ENDBLK carries its own handle/owner pairs
                self.skip_entity()?;
                break;
            }
            match pair.value.as_str() {
                "INSERT" => {
                    let (insert, attributes_follow) = self.read_insert()?;
                    inserts.push(insert);
                    attributes_open = attributes_follow;
                }
                "ATTRIB" => {
                    let attrib = self.read_attrib()?;
                    if attributes_open {
                        if let Some(insert) = inserts.last_mut() {
                            insert.attributes.push(attrib);
                        }
                    }
                }
                "SEQEND" => {
                    attributes_open = false;
                    self.skip_entity()?;
                }
                "ATTDEF" => {
                    let attdef = self.read_attdef()?;
                    if let Some(defs) = attdefs.as_deref_mut() {
                        defs.push(attdef);
                    }
                }
                "ENDSEC" => {
                    // malformed block without ENDBLK
                    self.reader.push_back(pair);
                    break;
                }
                _ => {
                    attributes_open = false;
                    self.skip_entity()?;
                }
            }
        }
        Ok(())
    }

    /// Read an INSERT entity. Returns the insert and whether ATTRIBs follow.
    fn read_insert(&mut self) -> Result<(Insert, bool)> {
        let mut insert = Insert::default();
        let mut attributes_follow = false;
        let mut groups = GroupTracker::default();

        while let Some(pair) = self.reader.read_pair()? {
            if pair.code == 0 {
                self.reader.push_back(pair);
                break;
            }
            if groups.consume(&pair) {
                continue;
            }
            match pair.code {
                5 => insert.handle = pair.as_handle().unwrap_or_default(),
                330 => insert.owner = pair.as_handle().unwrap_or_default(),
                67 => insert.paper_space = pair.as_bool().unwrap_or(false),
                2 => insert.block_name = pair.value,
                66 => attributes_follow = pair.as_bool().unwrap_or(false),
                _ => {}
            }
        }

        Ok((insert, attributes_follow))
    }

    /// Read an ATTRIB entity
    fn read_attrib(&mut self) -> Result<AttributeEntity> {
        let mut attrib = AttributeEntity::default();
        // after 101 the pairs belong to the embedded multiline text object
        let mut embedded = false;

        while let Some(pair) = self.reader.read_pair()? {
            if pair.code == 0 {
                self.reader.push_back(pair);
                break;
            }
            match pair.code {
                101 => embedded = true,
                1 if !embedded => attrib.value = pair.value,
                2 if !embedded => attrib.tag = pair.value,
                _ => {}
            }
        }

        Ok(attrib)
    }

    /// Read an ATTDEF entity
    fn read_attdef(&mut self) -> Result<AttributeDefinition> {
        let mut attdef = AttributeDefinition::default();
        let mut embedded = false;

        while let Some(pair) = self.reader.read_pair()? {
            if pair.code == 0 {
                self.reader.push_back(pair);
                break;
            }
            match pair.code {
                101 => embedded = true,
                1 if !embedded => attdef.default_value = pair.value,
                2 if !embedded => attdef.tag = pair.value,
                3 if !embedded => attdef.prompt = pair.value,
                _ => {}
            }
        }

        Ok(attdef)
    }

    /// Read the OBJECTS section, keeping only LAYOUT objects
    pub fn read_objects(&mut self, drawing: &mut Drawing) -> Result<()> {
        while let Some(pair) = self.reader.read_pair()? {
            if pair.is_start("ENDSEC") {
                break;
            }
            if pair.is_start("LAYOUT") {
                drawing.layouts.push(self.read_layout()?);
            }
        }
        Ok(())
    }

    /// Read a LAYOUT object.
    ///
    /// The plot settings subclass reuses group code 1 for the page setup
    /// name, so the layout name, tab order and block record are only taken
    /// from pairs after the `AcDbLayout` marker.
    fn read_layout(&mut self) -> Result<Layout> {
        let mut layout = Layout::default();
        let mut in_layout_subclass = false;
        let mut groups = GroupTracker::default();

        while let Some(pair) = self.reader.read_pair()? {
            if pair.code == 0 {
                self.reader.push_back(pair);
                break;
            }
            if groups.consume(&pair) {
                continue;
            }
            match pair.code {
                5 => layout.handle = pair.as_handle().unwrap_or_default(),
                100 => in_layout_subclass = pair.value == "AcDbLayout",
                1 if in_layout_subclass => layout.name = pair.value,
                71 if in_layout_subclass => layout.tab_order = pair.as_i16().unwrap_or(0),
                330 if in_layout_subclass => {
                    layout.block_record = pair.as_handle().unwrap_or_default()
                }
                _ => {}
            }
        }

        Ok(layout)
    }

    /// Skip the remaining pairs of the current entity or object
    fn skip_entity(&mut self) -> Result<()> {
        while let Some(pair) = self.reader.read_pair()? {
            if pair.code == 0 {
                self.reader.push_back(pair);
                break;
            }
        }
        Ok(())
    }

    /// Skip pairs up to and including `0 <marker>`
    fn skip_to(&mut self, marker: &str) -> Result<()> {
        while let Some(pair) = self.reader.read_pair()? {
            if pair.is_start(marker) {
                break;
            }
        }
        Ok(())
    }
}
