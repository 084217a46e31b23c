//! Run configuration.
//!
//! A run is configured by a `sheetlist.toml` file. Every section and field
//! has a default, so an empty file (or no file at all) is a valid
//! configuration. CLI flags override file values, which override defaults.
//! The resulting [`Config`] is built once at start-up and never mutated.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SheetListError};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "sheetlist.toml";

// ---------------------------------------------------------------------------
// Config structs (matching sheetlist.toml schema)
// ---------------------------------------------------------------------------

/// Top-level configuration, deserialized from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Title block selection.
    #[serde(default)]
    pub matching: MatchingConfig,

    /// Sheet number composition.
    #[serde(default)]
    pub sheet_number: SheetNumberConfig,

    /// Sheet title composition.
    #[serde(default)]
    pub title: TitleConfig,

    /// Revision table naming template.
    #[serde(default)]
    pub revision: RevisionConfig,

    /// Plot driver.
    #[serde(default)]
    pub plot: PlotConfig,

    /// Input discovery and output layout.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[matching]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Accepted title block names. Empty means "match by pattern only".
    #[serde(default = "default_block_names")]
    pub block_names: Vec<String>,

    /// Wildcard patterns scored against attribute tags.
    #[serde(default = "default_tag_patterns")]
    pub tag_patterns: Vec<String>,

    /// Wildcard patterns scored against attribute prompts.
    #[serde(default = "default_prompt_patterns")]
    pub prompt_patterns: Vec<String>,

    /// Ignore block instances that reference external drawings.
    #[serde(default = "default_true")]
    pub skip_xrefs: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            block_names: default_block_names(),
            tag_patterns: default_tag_patterns(),
            prompt_patterns: default_prompt_patterns(),
            skip_xrefs: true,
        }
    }
}

fn default_block_names() -> Vec<String> {
    vec!["GF MALTA TITLE BLOCK 30X42-TB-ATT".into()]
}
fn default_tag_patterns() -> Vec<String> {
    strings(&[
        "FC-E",
        "TOP*NUM*",
        "TOP",
        "442C",
        "BOTTOM*NUM*",
        "BOTTOM",
        "TITLE_[1-5]",
        "R[0-9]NO",
        "R[0-9]DATE",
        "R[0-9]DESC",
        "R[0-9]BY",
    ])
}
fn default_prompt_patterns() -> Vec<String> {
    strings(&["Top Number", "Bottom Number", "TITLE_[1-5]", "ELECTRICAL"])
}

/// `[sheet_number]` section.
///
/// The sheet number is built from a "top" and a "bottom" part, joined with
/// `separator` when both are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetNumberConfig {
    #[serde(default = "default_top_tags")]
    pub top_tags: Vec<String>,
    #[serde(default = "default_top_prompts")]
    pub top_prompts: Vec<String>,
    #[serde(default = "default_bottom_tags")]
    pub bottom_tags: Vec<String>,
    #[serde(default = "default_bottom_prompts")]
    pub bottom_prompts: Vec<String>,
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Default for SheetNumberConfig {
    fn default() -> Self {
        Self {
            top_tags: default_top_tags(),
            top_prompts: default_top_prompts(),
            bottom_tags: default_bottom_tags(),
            bottom_prompts: default_bottom_prompts(),
            separator: default_separator(),
        }
    }
}

fn default_top_tags() -> Vec<String> {
    strings(&["FC-E", "TOPNUMBER", "TOP_NUM", "TOP"])
}
fn default_top_prompts() -> Vec<String> {
    strings(&["Top Number"])
}
fn default_bottom_tags() -> Vec<String> {
    strings(&["442C", "BOTTOMNUMBER", "BOTTOM_NUM", "BOTTOM"])
}
fn default_bottom_prompts() -> Vec<String> {
    strings(&["Bottom Number"])
}
fn default_separator() -> String {
    "-".into()
}

/// `[title]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleConfig {
    /// Title line tags, in output order.
    #[serde(default = "default_title_lines")]
    pub tags: Vec<String>,
    /// Title line prompts, positionally paired with `tags`.
    #[serde(default = "default_title_lines")]
    pub prompts: Vec<String>,
    /// Tags that fill the first title line when it is empty.
    #[serde(default = "default_title_alias")]
    pub alias_tags: Vec<String>,
    /// Prompts that fill the first title line when it is empty.
    #[serde(default = "default_title_alias")]
    pub alias_prompts: Vec<String>,
    #[serde(default = "default_joiner")]
    pub joiner: String,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            tags: default_title_lines(),
            prompts: default_title_lines(),
            alias_tags: default_title_alias(),
            alias_prompts: default_title_alias(),
            joiner: default_joiner(),
        }
    }
}

fn default_title_lines() -> Vec<String> {
    strings(&["TITLE_1", "TITLE_2", "TITLE_3", "TITLE_4", "TITLE_5"])
}
fn default_title_alias() -> Vec<String> {
    strings(&["ELECTRICAL"])
}
fn default_joiner() -> String {
    " ".into()
}

/// `[revision]` section: tag template `<prefix><index><suffix>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionConfig {
    #[serde(default = "default_revision_prefix")]
    pub prefix: String,
    #[serde(default = "default_number_suffix")]
    pub number_suffix: String,
    #[serde(default = "default_date_suffix")]
    pub date_suffix: String,
    #[serde(default = "default_description_suffix")]
    pub description_suffix: String,
    #[serde(default = "default_author_suffix")]
    pub author_suffix: String,
}

impl Default for RevisionConfig {
    fn default() -> Self {
        Self {
            prefix: default_revision_prefix(),
            number_suffix: default_number_suffix(),
            date_suffix: default_date_suffix(),
            description_suffix: default_description_suffix(),
            author_suffix: default_author_suffix(),
        }
    }
}

fn default_revision_prefix() -> String {
    "R".into()
}
fn default_number_suffix() -> String {
    "NO".into()
}
fn default_date_suffix() -> String {
    "DATE".into()
}
fn default_description_suffix() -> String {
    "DESC".into()
}
fn default_author_suffix() -> String {
    "BY".into()
}

/// `[plot]` section.
///
/// `command` is run once per layout with `args`, where `{drawing}`,
/// `{layout}` and `{output}` are substituted. No command means no plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotConfig {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default = "default_plot_args")]
    pub args: Vec<String>,
    /// Seconds to wait for the PDF to appear after the command returns.
    #[serde(default = "default_plot_timeout")]
    pub timeout_secs: u64,
    /// Extra attempts after a failed plot.
    #[serde(default)]
    pub retries: u32,
    /// Merge every plotted PDF into one combined file.
    #[serde(default = "default_true")]
    pub merge: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: default_plot_args(),
            timeout_secs: default_plot_timeout(),
            retries: 0,
            merge: true,
        }
    }
}

fn default_plot_args() -> Vec<String> {
    strings(&["{drawing}", "{layout}", "{output}"])
}
fn default_plot_timeout() -> u64 {
    30
}

/// `[output]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Project name used for output file names (defaults to the input folder name).
    #[serde(default)]
    pub project_name: Option<String>,
    /// Search subfolders for drawings.
    #[serde(default)]
    pub recursive: bool,
    /// Drawing file extensions to pick up (case-insensitive, without dot).
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Copy drawings into the output folder before processing.
    #[serde(default = "default_true")]
    pub stage_drawings: bool,
    /// Sub-folder of the output folder receiving staged drawings.
    #[serde(default = "default_drawing_dir")]
    pub drawing_dir: String,
    /// Sub-folder of the output folder receiving individual PDFs.
    #[serde(default = "default_pdf_dir")]
    pub pdf_dir: String,
    /// Prepend `DWG File` and `Layout` columns to the CSV.
    #[serde(default = "default_true")]
    pub include_source_columns: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            project_name: None,
            recursive: false,
            extensions: default_extensions(),
            stage_drawings: true,
            drawing_dir: default_drawing_dir(),
            pdf_dir: default_pdf_dir(),
            include_source_columns: true,
        }
    }
}

fn default_extensions() -> Vec<String> {
    strings(&["dxf", "dwg"])
}
fn default_drawing_dir() -> String {
    "DWG".into()
}
fn default_pdf_dir() -> String {
    "Individual PDFs".into()
}

fn default_true() -> bool {
    true
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Parse a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SheetListError::config(e.to_string()))
    }

    /// Load the configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SheetListError::io(path, e))?;
        Self::from_toml(&content).map_err(|e| {
            SheetListError::config(format!("failed to parse {}: {e}", path.display()))
        })
    }

    /// Load `path` if given, else `sheetlist.toml` in the working directory
    /// if it exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let local = Path::new(CONFIG_FILE_NAME);
        if local.exists() {
            return Self::load(local);
        }
        tracing::debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Serialize as pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| SheetListError::config(e.to_string()))
    }

    /// Write the configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| SheetListError::io(path, e))?;
        tracing::info!(path = %path.display(), "wrote config file");
        Ok(())
    }
}
