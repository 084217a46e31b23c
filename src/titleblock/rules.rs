//! Compiled title block rules
//!
//! [`TitleBlockRules`] is the run configuration turned into lookup-ready
//! form: normalized tag/prompt sets for the canonical fields, compiled
//! wildcard patterns for block scoring and the revision tag template. It is
//! built once and shared read-only by every resolution step.

use ahash::AHashSet;
use glob::{MatchOptions, Pattern};

use super::attributes::{Attribute, BlockInstance};
use super::revision::RevisionTemplate;
use crate::config::Config;
use crate::error::{Result, SheetListError};

/// Normalize an attribute tag or prompt for comparison: ASCII uppercase
/// with every non-alphanumeric character removed (`FC-E` → `FCE`).
pub fn normalize_key(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Normalize a block name for comparison: trimmed and uppercased.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

const PATTERN_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Tags and prompts identifying one canonical field
#[derive(Debug, Clone, Default)]
pub struct FieldMatcher {
    tags: AHashSet<String>,
    prompts: AHashSet<String>,
}

impl FieldMatcher {
    pub fn new<T, P>(tags: T, prompts: P) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let normalized = |items: Vec<String>| -> AHashSet<String> {
            items.into_iter().filter(|k| !k.is_empty()).collect()
        };
        Self {
            tags: normalized(tags.into_iter().map(|t| normalize_key(t.as_ref())).collect()),
            prompts: normalized(prompts.into_iter().map(|p| normalize_key(p.as_ref())).collect()),
        }
    }

    /// Whether the attribute's tag or prompt identifies this field
    pub fn matches(&self, attribute: &Attribute) -> bool {
        self.tags.contains(&normalize_key(&attribute.tag))
            || self.prompts.contains(&normalize_key(&attribute.prompt))
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.prompts.is_empty()
    }
}

/// Title block rules compiled from a [`Config`]
#[derive(Debug, Clone)]
pub struct TitleBlockRules {
    block_names: AHashSet<String>,
    tag_patterns: Vec<Pattern>,
    prompt_patterns: Vec<Pattern>,
    /// Ignore xref block instances
    pub skip_xrefs: bool,
    pub sheet_top: FieldMatcher,
    pub sheet_bottom: FieldMatcher,
    pub sheet_separator: String,
    /// One matcher per title line, in output order
    pub title_lines: Vec<FieldMatcher>,
    pub title_alias: FieldMatcher,
    pub title_joiner: String,
    pub revision: RevisionTemplate,
    revision_keys: AHashSet<String>,
}

fn compile_patterns(patterns: &[String], kind: &str) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .filter(|p| !p.trim().is_empty())
        .map(|p| {
            Pattern::new(p.trim()).map_err(|e| {
                SheetListError::config(format!("invalid {kind} pattern '{p}': {e}"))
            })
        })
        .collect()
}

impl TitleBlockRules {
    /// Compile the rules. Fails only on malformed wildcard patterns.
    pub fn from_config(config: &Config) -> Result<Self> {
        let matching = &config.matching;
        let title = &config.title;

        let line_count = title.tags.len().max(title.prompts.len());
        let title_lines = (0..line_count)
            .map(|i| FieldMatcher::new(title.tags.get(i), title.prompts.get(i)))
            .collect();

        let revision = RevisionTemplate::from_config(&config.revision);
        let revision_keys = revision.all_slot_keys();

        Ok(Self {
            block_names: matching
                .block_names
                .iter()
                .map(|n| normalize_name(n))
                .filter(|n| !n.is_empty())
                .collect(),
            tag_patterns: compile_patterns(&matching.tag_patterns, "tag")?,
            prompt_patterns: compile_patterns(&matching.prompt_patterns, "prompt")?,
            skip_xrefs: matching.skip_xrefs,
            sheet_top: FieldMatcher::new(
                &config.sheet_number.top_tags,
                &config.sheet_number.top_prompts,
            ),
            sheet_bottom: FieldMatcher::new(
                &config.sheet_number.bottom_tags,
                &config.sheet_number.bottom_prompts,
            ),
            sheet_separator: config.sheet_number.separator.clone(),
            title_lines,
            title_alias: FieldMatcher::new(&title.alias_tags, &title.alias_prompts),
            title_joiner: title.joiner.clone(),
            revision,
            revision_keys,
        })
    }

    /// Whether a block name allow-list is configured
    pub fn has_block_names(&self) -> bool {
        !self.block_names.is_empty()
    }

    /// Whether the block name is on the allow-list (case-insensitive)
    pub fn accepts_name(&self, name: &str) -> bool {
        self.block_names.contains(&normalize_name(name))
    }

    /// Number of attributes whose tag matches a tag pattern or whose prompt
    /// matches a prompt pattern. Each attribute counts at most once.
    pub fn pattern_score(&self, block: &BlockInstance) -> usize {
        block
            .attributes()
            .filter(|a| {
                self.tag_patterns.iter().any(|p| p.matches_with(&a.tag, PATTERN_OPTIONS))
                    || (!a.prompt.is_empty()
                        && self
                            .prompt_patterns
                            .iter()
                            .any(|p| p.matches_with(&a.prompt, PATTERN_OPTIONS)))
            })
            .count()
    }

    /// Whether the attribute feeds the sheet number or title
    pub fn is_canonical(&self, attribute: &Attribute) -> bool {
        self.sheet_top.matches(attribute)
            || self.sheet_bottom.matches(attribute)
            || self.title_alias.matches(attribute)
            || self.title_lines.iter().any(|line| line.matches(attribute))
    }

    /// Whether the attribute belongs to any revision slot (0-9, all fields)
    pub fn is_revision(&self, attribute: &Attribute) -> bool {
        self.revision_keys.contains(&normalize_key(&attribute.tag))
    }
}
