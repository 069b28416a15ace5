//! Heading level assignment
//!
//! Levels come from an ordered list of rules. Each rule either names a
//! level or abstains, and the first rule with an opinion wins:
//!
//! 1. explicit section numbering ("3.2" -> H2)
//! 2. appendix letters and roman numerals -> H2
//! 3. rank of the candidate's font size among all candidates
//! 4. text shape, for sources without font metrics

use crate::artifacts::{is_uppercase_text, word_count};
use crate::config::OutlineConfig;
use crate::headings::{is_lettered_section, HeadingCandidate};
use crate::outline::HeadingLevel;
use std::collections::HashMap;

/// One step of the level cascade
pub trait LevelRule: Send + Sync {
    /// `None` means the rule has no opinion about this candidate
    fn level(&self, candidate: &HeadingCandidate) -> Option<HeadingLevel>;
}

/// Numbered sections take their depth from the number of segments
struct NumberingRule {
    max_depth: usize,
}

impl LevelRule for NumberingRule {
    fn level(&self, candidate: &HeadingCandidate) -> Option<HeadingLevel> {
        candidate
            .numbering_depth
            .map(|depth| HeadingLevel::from_depth(depth.min(self.max_depth)))
    }
}

struct LetteredSectionRule;

impl LevelRule for LetteredSectionRule {
    fn level(&self, candidate: &HeadingCandidate) -> Option<HeadingLevel> {
        is_lettered_section(candidate.text()).then_some(HeadingLevel::H2)
    }
}

/// Distinct candidate font sizes, largest first, map to H1, H2, ...
struct FontRankRule {
    size_levels: HashMap<i32, HeadingLevel>,
}

impl FontRankRule {
    fn new(candidates: &[HeadingCandidate], max_levels: usize) -> Self {
        let mut keys: Vec<i32> = candidates
            .iter()
            .filter_map(|c| c.line.font_size)
            .map(size_key)
            .collect();
        keys.sort_unstable_by(|a, b| b.cmp(a));
        keys.dedup();

        let size_levels = keys
            .into_iter()
            .enumerate()
            .map(|(rank, key)| (key, HeadingLevel::from_depth((rank + 1).min(max_levels))))
            .collect();
        Self { size_levels }
    }
}

impl LevelRule for FontRankRule {
    fn level(&self, candidate: &HeadingCandidate) -> Option<HeadingLevel> {
        let size = candidate.line.font_size?;
        self.size_levels.get(&size_key(size)).copied()
    }
}

/// Fallback when no font metrics exist: shape of the text decides
struct TextShapeRule;

impl LevelRule for TextShapeRule {
    fn level(&self, candidate: &HeadingCandidate) -> Option<HeadingLevel> {
        let text = candidate.text();
        let words = word_count(text);
        if is_uppercase_text(text) && words >= 2 {
            Some(HeadingLevel::H1)
        } else if words <= 4 {
            Some(HeadingLevel::H2)
        } else {
            Some(HeadingLevel::H3)
        }
    }
}

/// Round to 0.1pt so near-identical sizes share a level
fn size_key(size: f32) -> i32 {
    (size * 10.0).round() as i32
}

/// Maps surviving candidates to H1..H4
pub struct LevelAssigner {
    rules: Vec<Box<dyn LevelRule>>,
}

impl LevelAssigner {
    /// Font ranks are computed over `candidates`, which should be the
    /// candidates that survived filtering.
    pub fn new(config: &OutlineConfig, candidates: &[HeadingCandidate]) -> Self {
        Self {
            rules: vec![
                Box::new(NumberingRule {
                    max_depth: config.max_numbering_depth,
                }),
                Box::new(LetteredSectionRule),
                Box::new(FontRankRule::new(candidates, config.max_font_levels)),
                Box::new(TextShapeRule),
            ],
        }
    }

    pub fn assign(&self, candidate: &HeadingCandidate) -> HeadingLevel {
        self.rules
            .iter()
            .find_map(|rule| rule.level(candidate))
            .unwrap_or(HeadingLevel::H3)
    }

    pub fn assign_all(&self, candidates: &mut [HeadingCandidate]) {
        for candidate in candidates.iter_mut() {
            candidate.level = Some(self.assign(candidate));
        }
    }
}
