//! DXF ASCII text reader

use super::stream_reader::{DxfCodePair, DxfStreamReader};
use crate::error::{Result, SheetListError};
use encoding_rs::Encoding;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};

/// DXF ASCII text file reader
pub struct DxfTextReader<R: Read + Seek> {
    reader: BufReader<R>,
    line_number: usize,
    pushed_back: Option<DxfCodePair>,
    /// Non-UTF8 fallback encoding.  `None` means Latin-1 (byte-to-char).
    encoding: Option<&'static Encoding>,
}

impl<R: Read + Seek> DxfTextReader<R> {
    pub fn new(reader: BufReader<R>) -> Self {
        Self {
            reader,
            line_number: 0,
            pushed_back: None,
            encoding: None,
        }
    }

    /// Read one line, trimmed. Non-UTF-8 bytes are decoded with the
    /// configured encoding, or as Latin-1 if none is set.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut bytes = Vec::new();
        if self.reader.read_until(b'\n', &mut bytes)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        let line = match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => {
                let bytes = e.into_bytes();
                match self.encoding {
                    Some(enc) => enc.decode(&bytes).0.into_owned(),
                    None => bytes.iter().map(|&b| b as char).collect(),
                }
            }
        };

        Ok(Some(line.trim().to_string()))
    }

    fn read_pair_internal(&mut self) -> Result<Option<DxfCodePair>> {
        let code_line = match self.read_line()? {
            Some(line) => line,
            None => return Ok(None),
        };
        // blank trailing lines after EOF
        if code_line.is_empty() {
            return self.read_pair_internal();
        }

        let code = code_line.parse::<i32>().map_err(|_| {
            SheetListError::Parse(format!(
                "Invalid DXF code at line {}: '{}'",
                self.line_number, code_line
            ))
        })?;

        let value_line = self.read_line()?.ok_or_else(|| {
            SheetListError::Parse(format!(
                "Unexpected EOF after code {} at line {}",
                code, self.line_number
            ))
        })?;

        Ok(Some(DxfCodePair::new(code, process_caret_escapes(&value_line))))
    }
}

/// Expand DXF caret escapes (`^J` newline, `^I` tab, `^ ` literal caret).
fn process_caret_escapes(value: &str) -> String {
    if !value.contains('^') {
        return value.to_string();
    }
    value
        .replace("^J", "\n")
        .replace("^M", "\r")
        .replace("^I", "\t")
        .replace("^ ", "^")
}

impl<R: Read + Seek> DxfStreamReader for DxfTextReader<R> {
    fn read_pair(&mut self) -> Result<Option<DxfCodePair>> {
        if let Some(pair) = self.pushed_back.take() {
            return Ok(Some(pair));
        }
        self.read_pair_internal()
    }

    fn push_back(&mut self, pair: DxfCodePair) {
        self.pushed_back = Some(pair);
    }

    fn reset(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        self.line_number = 0;
        self.pushed_back = None;
        Ok(())
    }

    fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.encoding = Some(encoding);
    }
}
