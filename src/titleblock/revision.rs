//! Revision slot selection
//!
//! Title blocks carry up to ten revision slots. Slot `n` is the group of
//! tags `<prefix><n><suffix>` for the number, date, description and author
//! fields (`R3NO`, `R3DATE`, `R3DESC`, `R3BY` with the default template).
//! The latest revision is the highest-numbered slot with a non-empty number.

use ahash::AHashSet;

use super::attributes::BlockInstance;
use super::rules::normalize_key;
use crate::config::RevisionConfig;

/// Highest revision slot index
pub const MAX_REVISION_SLOT: u8 = 9;

/// A field of a revision slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RevisionField {
    Number,
    Date,
    Description,
    Author,
}

impl RevisionField {
    pub const ALL: [RevisionField; 4] = [
        RevisionField::Number,
        RevisionField::Date,
        RevisionField::Description,
        RevisionField::Author,
    ];
}

/// Tag naming scheme for revision slots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionTemplate {
    pub prefix: String,
    pub number_suffix: String,
    pub date_suffix: String,
    pub description_suffix: String,
    pub author_suffix: String,
}

impl Default for RevisionTemplate {
    fn default() -> Self {
        Self::from_config(&RevisionConfig::default())
    }
}

impl RevisionTemplate {
    pub fn from_config(config: &RevisionConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            number_suffix: config.number_suffix.clone(),
            date_suffix: config.date_suffix.clone(),
            description_suffix: config.description_suffix.clone(),
            author_suffix: config.author_suffix.clone(),
        }
    }

    fn suffix(&self, field: RevisionField) -> &str {
        match field {
            RevisionField::Number => &self.number_suffix,
            RevisionField::Date => &self.date_suffix,
            RevisionField::Description => &self.description_suffix,
            RevisionField::Author => &self.author_suffix,
        }
    }

    /// Tag name of a slot field, e.g. `R3DATE`
    pub fn slot_tag_name(&self, index: u8, field: RevisionField) -> String {
        format!("{}{}{}", self.prefix, index, self.suffix(field))
    }

    /// Normalized tags of every field of every slot
    pub fn all_slot_keys(&self) -> AHashSet<String> {
        (0..=MAX_REVISION_SLOT)
            .flat_map(|index| {
                RevisionField::ALL
                    .into_iter()
                    .map(move |field| normalize_key(&self.slot_tag_name(index, field)))
            })
            .collect()
    }
}

/// The latest revision of a title block
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RevisionRecord {
    /// Selected slot, `None` when every slot is empty
    pub slot: Option<u8>,
    pub number: String,
    pub date: String,
    pub description: String,
    pub author: String,
}

impl RevisionRecord {
    pub fn field(&self, field: RevisionField) -> &str {
        match field {
            RevisionField::Number => &self.number,
            RevisionField::Date => &self.date,
            RevisionField::Description => &self.description,
            RevisionField::Author => &self.author,
        }
    }

    fn field_mut(&mut self, field: RevisionField) -> &mut String {
        match field {
            RevisionField::Number => &mut self.number,
            RevisionField::Date => &mut self.date,
            RevisionField::Description => &mut self.description,
            RevisionField::Author => &mut self.author,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

/// Select the latest revision of a title block.
///
/// Slots are scanned from 9 down to 0. The first slot whose number field is
/// present and non-empty is selected and its date, description and author
/// are read alongside it (empty when absent). Earlier slots are never
/// consulted once a slot is selected.
pub fn latest_revision(block: &BlockInstance, template: &RevisionTemplate) -> RevisionRecord {
    let value = |index: u8, field: RevisionField| -> String {
        block
            .value(&template.slot_tag_name(index, field))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    (0..=MAX_REVISION_SLOT)
        .rev()
        .find(|&index| !value(index, RevisionField::Number).is_empty())
        .map(|index| {
            let mut record = RevisionRecord {
                slot: Some(index),
                ..Default::default()
            };
            for field in RevisionField::ALL {
                *record.field_mut(field) = value(index, field);
            }
            record
        })
        .unwrap_or_default()
}
