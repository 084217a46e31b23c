//! Title block selection
//!
//! Among the block references on a layout, the title block is chosen by
//! name first and by attribute pattern score second:
//!
//! 1. xref blocks (when configured) and blocks without attributes never
//!    qualify.
//! 2. With a block name allow-list, only listed names qualify. A single
//!    qualifying block is selected outright.
//! 3. Otherwise the block with the most attributes matching the tag and
//!    prompt patterns wins. A score of zero never wins and ties go to the
//!    block placed first.

use super::attributes::BlockInstance;
use super::rules::TitleBlockRules;

/// How a title block was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    /// Only block on the layout with an allow-listed name
    BlockName,
    /// Highest attribute pattern score
    PatternScore(usize),
}

/// A selected title block
#[derive(Debug, Clone, Copy)]
pub struct TitleBlockMatch<'b> {
    pub block: &'b BlockInstance,
    pub method: MatchMethod,
}

/// Selects the title block among a layout's block references
pub struct BlockMatcher<'r> {
    rules: &'r TitleBlockRules,
}

impl<'r> BlockMatcher<'r> {
    pub fn new(rules: &'r TitleBlockRules) -> Self {
        Self { rules }
    }

    fn qualifies(&self, block: &BlockInstance) -> bool {
        if self.rules.skip_xrefs && block.is_xref {
            return false;
        }
        if !block.has_attributes() {
            return false;
        }
        !self.rules.has_block_names() || self.rules.accepts_name(&block.name)
    }

    /// Select the title block, or `None` when no block qualifies
    pub fn select<'b>(&self, blocks: &'b [BlockInstance]) -> Option<TitleBlockMatch<'b>> {
        let candidates: Vec<&BlockInstance> = blocks.iter().filter(|b| self.qualifies(b)).collect();

        if self.rules.has_block_names() && candidates.len() == 1 {
            return Some(TitleBlockMatch {
                block: candidates[0],
                method: MatchMethod::BlockName,
            });
        }

        let mut best: Option<(usize, &BlockInstance)> = None;
        for block in candidates {
            let score = self.rules.pattern_score(block);
            if score == 0 {
                continue;
            }
            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, block));
            }
        }

        best.map(|(score, block)| TitleBlockMatch {
            block,
            method: MatchMethod::PatternScore(score),
        })
    }
}
