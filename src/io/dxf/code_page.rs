//! `$DWGCODEPAGE` to encoding mapping.
//!
//! Drawings saved before AutoCAD 2007 (AC1021) store attribute text in the
//! drawing's ANSI code page. Title blocks routinely carry non-ASCII text
//! (accented names, degree signs), so the reader decodes non-UTF-8 lines
//! with the encoding named here.

use encoding_rs::Encoding;

/// First version that always writes UTF-8.
pub const UTF8_VERSION: &str = "AC1021";

/// Get the encoding for a DXF code page string (case-insensitive).
///
/// Returns `None` when no transcoding is needed. Unknown code pages decode
/// as Windows-1252, the most common DXF fallback.
pub fn encoding_from_code_page(code_page: &str) -> Option<&'static Encoding> {
    let code_page = code_page.trim().to_ascii_lowercase();
    let encoding = match code_page.as_str() {
        "ascii" | "utf-8" | "utf8" | "unicode" => return None,

        "gb2312" | "ansi_936" => encoding_rs::GBK,
        "big5" | "ansi_950" => encoding_rs::BIG5,
        "korean" | "ansi_949" | "johab" => encoding_rs::EUC_KR,
        "ansi_932" => encoding_rs::SHIFT_JIS,

        "ansi_874" => encoding_rs::WINDOWS_874,
        "ansi_1250" | "dos852" | "iso8859-2" => encoding_rs::WINDOWS_1250,
        "ansi_1251" => encoding_rs::WINDOWS_1251,
        "ansi_1253" | "dos869" => encoding_rs::WINDOWS_1253,
        "ansi_1254" | "dos857" | "iso8859-9" => encoding_rs::WINDOWS_1254,
        "ansi_1255" => encoding_rs::WINDOWS_1255,
        "ansi_1256" => encoding_rs::WINDOWS_1256,
        "ansi_1257" => encoding_rs::WINDOWS_1257,
        "ansi_1258" => encoding_rs::WINDOWS_1258,

        "dos437" | "dos855" | "dos866" => encoding_rs::IBM866,
        "koi8-r" => encoding_rs::KOI8_R,
        "koi8-u" => encoding_rs::KOI8_U,
        "iso8859-5" => encoding_rs::ISO_8859_5,
        "iso8859-7" => encoding_rs::ISO_8859_7,
        "iso8859-15" => encoding_rs::ISO_8859_15,

        _ => encoding_rs::WINDOWS_1252,
    };
    Some(encoding)
}

/// Whether a drawing of this `$ACADVER` needs code page decoding.
pub fn uses_code_page(version: &str) -> bool {
    // ACxxxx version strings order lexically
    !version.is_empty() && version < UTF8_VERSION
}
