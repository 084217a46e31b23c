//! DXF file reader

mod section_reader;
mod stream_reader;
mod text_reader;

pub use stream_reader::{DxfCodePair, DxfStreamReader};
pub use text_reader::DxfTextReader;

use section_reader::SectionReader;

use super::code_page::{encoding_from_code_page, uses_code_page};
use crate::drawing::Drawing;
use crate::error::{Result, SheetListError};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Configuration for the DXF reader.
#[derive(Debug, Clone, Default)]
pub struct DxfReaderConfiguration {
    /// When `true`, parse errors within a section are recorded in
    /// [`Drawing::warnings`] and the section is skipped instead of aborting
    /// the read.
    ///
    /// Default: `false` (strict mode, errors propagate).
    pub failsafe: bool,
}

/// DXF file reader
pub struct DxfReader {
    reader: Box<dyn DxfStreamReader>,
    config: DxfReaderConfiguration,
}

impl DxfReader {
    /// Create a new DXF reader from any reader
    pub fn from_reader<R: Read + Seek + 'static>(reader: R) -> Result<Self> {
        let mut buf_reader = BufReader::new(reader);

        if Self::is_binary(&mut buf_reader)? {
            return Err(SheetListError::UnsupportedFormat("binary DXF".to_string()));
        }

        Ok(Self {
            reader: Box::new(DxfTextReader::new(buf_reader)),
            config: DxfReaderConfiguration::default(),
        })
    }

    /// Create a new DXF reader from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SheetListError::io(path, e))?;
        Self::from_reader(file)
    }

    /// Check if a stream contains binary DXF data
    fn is_binary<R: Read + Seek>(reader: &mut R) -> Result<bool> {
        const SENTINEL: &[u8] = b"AutoCAD Binary DXF";
        let mut buffer = vec![0u8; SENTINEL.len()];

        let mut filled = 0;
        while filled < buffer.len() {
            let n = reader.read(&mut buffer[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        reader.seek(SeekFrom::Start(0))?;
        Ok(filled == SENTINEL.len() && buffer == SENTINEL)
    }

    /// Set the reader configuration.
    pub fn with_configuration(mut self, config: DxfReaderConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Read the DXF stream into a [`Drawing`]
    pub fn read(mut self) -> Result<Drawing> {
        let mut drawing = Drawing::new();
        self.read_version(&mut drawing)?;

        let failsafe = self.config.failsafe;
        let mut saw_section = false;

        while let Some(pair) = self.reader.read_pair()? {
            if pair.is_start("EOF") {
                break;
            }
            if !pair.is_start("SECTION") {
                continue;
            }
            let section_pair = match self.reader.read_pair()? {
                Some(p) if p.code == 2 => p,
                Some(p) => {
                    self.reader.push_back(p);
                    continue;
                }
                None => break,
            };
            saw_section = true;

            let section_name = section_pair.value;
            let result = match section_name.as_str() {
                "HEADER" => SectionReader::new(&mut self.reader).read_header(&mut drawing),
                "TABLES" => SectionReader::new(&mut self.reader).read_tables(&mut drawing),
                "BLOCKS" => SectionReader::new(&mut self.reader).read_blocks(&mut drawing),
                "ENTITIES" => SectionReader::new(&mut self.reader).read_entities(&mut drawing),
                "OBJECTS" => SectionReader::new(&mut self.reader).read_objects(&mut drawing),
                _ => self.skip_section(),
            };

            if let Err(e) = result {
                if !failsafe {
                    return Err(e);
                }
                drawing
                    .warnings
                    .push(format!("Error reading {} section: {}", section_name, e));
                // the stream may be unusable after a parse error
                if self.skip_section().is_err() {
                    break;
                }
            }
        }

        if !saw_section {
            return Err(SheetListError::InvalidFormat(
                "no DXF sections found".to_string(),
            ));
        }

        drawing.ensure_layouts();
        Ok(drawing)
    }

    /// Pre-scan the HEADER section for `$ACADVER` and `$DWGCODEPAGE`, set the
    /// decoding for pre-2007 drawings, then rewind for the full read.
    fn read_version(&mut self, drawing: &mut Drawing) -> Result<()> {
        let mut prescan = Drawing::new();

        while let Some(pair) = self.reader.read_pair()? {
            if !pair.is_start("SECTION") {
                continue;
            }
            match self.reader.read_pair()? {
                Some(p) if p.code == 2 && p.value == "HEADER" => {
                    SectionReader::new(&mut self.reader).read_header(&mut prescan)?;
                    break;
                }
                Some(_) => break,
                None => break,
            }
        }

        if uses_code_page(&prescan.version) {
            if let Some(enc) = prescan.code_page.as_deref().and_then(encoding_from_code_page) {
                self.reader.set_encoding(enc);
            }
        }

        drawing.version = prescan.version;
        drawing.code_page = prescan.code_page;
        self.reader.reset()
    }

    /// Skip the current section
    fn skip_section(&mut self) -> Result<()> {
        while let Some(pair) = self.reader.read_pair()? {
            if pair.is_start("ENDSEC") {
                break;
            }
        }
        Ok(())
    }
}
