//! Document-wide candidate filters
//!
//! Both filters need the full candidate set: running headers are found by
//! counting pages per text, reflow fragments by comparing candidates that
//! share a page.

use crate::headings::HeadingCandidate;
use std::collections::{HashMap, HashSet};

/// Drop candidates whose text recurs on too many pages (running headers,
/// footers, repeated chapter titles).
///
/// A text is boilerplate when it appears on at least `min_pages` distinct
/// pages and on more than `max_fraction` of `page_count` pages.
pub fn filter_boilerplate(
    candidates: Vec<HeadingCandidate>,
    page_count: u32,
    max_fraction: f32,
    min_pages: usize,
) -> Vec<HeadingCandidate> {
    if page_count == 0 {
        return candidates;
    }

    let mut pages_by_text: HashMap<String, HashSet<u32>> = HashMap::new();
    for candidate in &candidates {
        pages_by_text
            .entry(candidate.key())
            .or_default()
            .insert(candidate.page());
    }

    let limit = max_fraction * page_count as f32;
    let blacklist: HashSet<String> = pages_by_text
        .into_iter()
        .filter(|(_, pages)| pages.len() >= min_pages && pages.len() as f32 > limit)
        .map(|(text, _)| text)
        .collect();

    if !blacklist.is_empty() {
        log::debug!("Boilerplate texts removed: {}", blacklist.len());
    }

    candidates
        .into_iter()
        .filter(|c| !blacklist.contains(&c.key()))
        .collect()
}

/// Drop candidates that are a truncated copy of a longer candidate on the
/// same page (text reflow splitting a heading across lines).
///
/// Candidate A is a fragment of B when A's text is a proper
/// case-insensitive substring of B's and `len(A) / len(B) < max_ratio`.
pub fn remove_fragments(candidates: Vec<HeadingCandidate>, max_ratio: f32) -> Vec<HeadingCandidate> {
    let keys: Vec<(String, usize)> = candidates
        .iter()
        .map(|c| {
            let key = c.key();
            let len = key.chars().count();
            (key, len)
        })
        .collect();

    // Only same-page pairs are compared
    let mut by_page: HashMap<u32, Vec<usize>> = HashMap::new();
    for (idx, candidate) in candidates.iter().enumerate() {
        by_page.entry(candidate.page()).or_default().push(idx);
    }

    let mut keep = vec![true; candidates.len()];
    for indices in by_page.values() {
        for &idx in indices {
            let (short, short_len) = &keys[idx];
            if *short_len == 0 {
                continue;
            }
            keep[idx] = !indices.iter().any(|&other| {
                let (long, long_len) = &keys[other];
                other != idx
                    && long_len > short_len
                    && long.contains(short.as_str())
                    && (*short_len as f32 / *long_len as f32) < max_ratio
            });
        }
    }

    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(c, keep)| keep.then_some(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::LineRecord;

    fn candidate(text: &str, page: u32) -> HeadingCandidate {
        HeadingCandidate::new(LineRecord::plain(text, page, 0.0))
    }

    fn texts(candidates: &[HeadingCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.text()).collect()
    }

    #[test]
    fn test_running_header_removed() {
        let mut candidates: Vec<HeadingCandidate> =
            (1..=8).map(|p| candidate("Annual Report", p)).collect();
        candidates.push(candidate("1. Revenue", 2));
        candidates.push(candidate("annual report ", 9));
        let kept = filter_boilerplate(candidates, 10, 0.25, 2);
        assert_eq!(texts(&kept), vec!["1. Revenue"]);
    }

    #[test]
    fn test_single_page_document_keeps_everything() {
        let candidates = vec![candidate("1. Scope", 1), candidate("2. Terms", 1)];
        let kept = filter_boilerplate(candidates, 1, 0.25, 2);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_repeats_below_fraction_survive() {
        let candidates = vec![
            candidate("Summary of Findings", 1),
            candidate("Summary of Findings", 7),
        ];
        let kept = filter_boilerplate(candidates, 20, 0.25, 2);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_same_page_repeats_count_once() {
        let candidates = vec![
            candidate("Key Terms", 1),
            candidate("Key Terms", 1),
            candidate("Key Terms", 1),
        ];
        let kept = filter_boilerplate(candidates, 4, 0.25, 2);
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn test_fragment_removed() {
        let candidates = vec![
            candidate("Requirements", 3),
            candidate("Functional Requirements for the Portal", 3),
        ];
        let kept = remove_fragments(candidates, 0.7);
        assert_eq!(texts(&kept), vec!["Functional Requirements for the Portal"]);
    }

    #[test]
    fn test_fragment_on_other_page_kept() {
        let candidates = vec![
            candidate("Requirements", 2),
            candidate("Functional Requirements for the Portal", 3),
        ];
        let kept = remove_fragments(candidates, 0.7);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_fragments_grouped_per_page_keep_order() {
        let candidates = vec![
            candidate("Data Model and Storage Layout", 1),
            candidate("Storage", 2),
            candidate("Storage", 1),
            candidate("Service Interfaces and Protocols", 2),
            candidate("Protocols", 2),
            candidate("Protocols", 3),
        ];
        let kept = remove_fragments(candidates, 0.7);
        assert_eq!(
            texts(&kept),
            vec![
                "Data Model and Storage Layout",
                "Storage",
                "Service Interfaces and Protocols",
                "Protocols",
            ]
        );
        assert_eq!(kept[1].page(), 2);
        assert_eq!(kept[3].page(), 3);
    }

    #[test]
    fn test_close_length_substring_kept() {
        // 17 / 19 is above the ratio, so this is not a fragment
        let candidates = vec![
            candidate("System Overview A", 1),
            candidate("System Overview A.1", 1),
        ];
        let kept = remove_fragments(candidates, 0.7);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_identical_texts_are_not_fragments() {
        let candidates = vec![candidate("Scope", 1), candidate("SCOPE", 1)];
        let kept = remove_fragments(candidates, 0.7);
        assert_eq!(kept.len(), 2);
    }
}
