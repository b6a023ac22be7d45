// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Running detectors over a range of text.

use alloc::string::ToString;
use alloc::vec::Vec;
use core::ops::Range;

use attributed_text::TextRange;

use crate::attribute::{names, strip_reserved};
use crate::{AttributeValue, DetectorMatch, Error, LinkTable, RichText, TextDetector};

/// What a [`scan`] did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Matches found inside the range, including skipped ones.
    pub matches: usize,
    /// Matches skipped because an earlier detector or scan already classified them.
    pub skipped: usize,
    /// Matches replaced by their rewrite.
    pub rewritten: usize,
    /// Rewrites that failed or produced nothing; their matches were tagged as they were.
    pub failed_rewrites: usize,
    /// Links added to the link table.
    pub links_created: usize,
    /// Detectors skipped because their pattern did not compile.
    pub inert_detectors: usize,
}

impl ScanReport {
    /// Number of matches that were classified by this scan.
    pub fn tagged(&self) -> usize {
        self.matches - self.skipped
    }
}

/// Run `detectors` in order over `range` of `text`, tagging, rewriting and linking matches.
///
/// Matches are taken from the whole current text and kept only if they lie completely inside
/// `range`; rewrites by one detector move the end of the range seen by the next. Spans already
/// classified by a detector are left alone, so scanning unchanged text twice is a no-op.
///
/// Returns an error only if `range` is not a valid range of `text`.
pub fn scan(
    text: &mut RichText,
    links: &mut LinkTable,
    detectors: &[TextDetector],
    range: Range<usize>,
) -> Result<ScanReport, Error> {
    let range = TextRange::checked(range, text.len())?;
    let start = range.start();
    let mut end = range.end();
    let mut report = ScanReport::default();

    for detector in detectors {
        if detector.is_inert() {
            report.inert_detectors += 1;
            continue;
        }
        let found = find_matches(detector, text, start..end);
        report.matches += found.len();
        for found in found.into_iter().rev() {
            let Some(tagged) = apply(detector, text, links, &found, &mut report)? else {
                continue;
            };
            end = end - found.range.len() + tagged.len();
        }
    }

    log::debug!(
        "scanned {}..{end}: {} matches, {} skipped, {} rewritten, {} links",
        range.start(),
        report.matches,
        report.skipped,
        report.rewritten,
        report.links_created,
    );
    Ok(report)
}

/// Non-empty, non-overlapping matches of `detector` lying entirely inside `bounds`, in order.
fn find_matches(detector: &TextDetector, text: &RichText, bounds: Range<usize>) -> Vec<DetectorMatch> {
    let Some(regex) = detector.regex() else {
        return Vec::new();
    };
    let haystack = text.as_str();
    let mut found = Vec::new();
    // Byte offsets grow monotonically, so chars are counted incrementally.
    let (mut byte, mut char_offset) = (0, 0);
    for captures in regex.captures_iter(haystack) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        if whole.is_empty() {
            continue;
        }
        char_offset += haystack[byte..whole.start()].chars().count();
        let match_start = char_offset;
        char_offset += whole.as_str().chars().count();
        byte = whole.end();
        let match_range = match_start..char_offset;
        if match_range.start < bounds.start {
            continue;
        }
        if match_range.end > bounds.end {
            break;
        }
        found.push(DetectorMatch {
            range: match_range,
            text: whole.as_str().to_string(),
            captures: captures
                .iter()
                .map(|group| group.map(|group| group.as_str().to_string()))
                .collect(),
        });
    }
    found
}

/// Classify one match, returning the range now covering it, or `None` if it was skipped.
fn apply(
    detector: &TextDetector,
    text: &mut RichText,
    links: &mut LinkTable,
    found: &DetectorMatch,
    report: &mut ScanReport,
) -> Result<Option<Range<usize>>, Error> {
    let range = found.range.clone();
    if text
        .attribute(&names::DETECTOR_RESULT, range.start, range.clone())
        .is_some()
    {
        log::trace!("skipping already classified match {:?} at {range:?}", found.text);
        report.skipped += 1;
        return Ok(None);
    }

    if let Some(attributes) = detector.attributes() {
        text.add_attributes(attributes, range.clone())?;
    }

    let mut tagged = range.clone();
    if let Some(rewrite) = detector.rewrite() {
        let matched = text.substring(range.clone())?;
        match rewrite(found, &matched, text) {
            Ok(Some(mut replacement)) if !replacement.is_empty() => {
                strip_reserved(&mut replacement);
                text.replace_attributed(range.clone(), &replacement)?;
                tagged = range.start..range.start + replacement.len();
                report.rewritten += 1;
            }
            Ok(Some(_)) => {
                log::warn!(
                    "rewrite of {:?} at {range:?} produced no text; keeping the match",
                    found.text
                );
                report.failed_rewrites += 1;
            }
            Ok(None) => {}
            Err(err) => {
                log::warn!("{err} for {:?} at {range:?}; keeping the match", found.text);
                report.failed_rewrites += 1;
            }
        }
    }

    if detector.is_touchable() {
        let id = links.insert(detector.make_link(&found.text));
        text.add_attribute(names::LINK, AttributeValue::Link(id), tagged.clone())?;
        report.links_created += 1;
    }
    text.add_attribute(
        names::DETECTOR_RESULT,
        AttributeValue::DetectorResult(detector.id()),
        tagged.clone(),
    )?;
    Ok(Some(tagged))
}

#[cfg(test)]
mod tests {
    use super::scan;
    use crate::attribute::names;
    use crate::{AttributeValue, Attributes, LinkTable, RewriteError, RichText, TextDetector};

    fn digits() -> TextDetector {
        TextDetector::builder(r"\d+")
            .attributes(Attributes::new().with(names::UNDERLINE, AttributeValue::Underline(true)))
            .touchable(true)
            .build()
    }

    #[test]
    fn second_scan_is_a_no_op() {
        let mut text = RichText::new("a 12 b 345");
        let mut links = LinkTable::new();
        let detectors = [digits()];

        let first = scan(&mut text, &mut links, &detectors, 0..10).unwrap();
        assert_eq!(first.matches, 2);
        assert_eq!(first.links_created, 2);
        let after_first = text.clone();

        let second = scan(&mut text, &mut links, &detectors, 0..10).unwrap();
        assert_eq!(second.matches, 2);
        assert_eq!(second.skipped, 2);
        assert_eq!(second.tagged(), 0);
        assert_eq!(text, after_first);
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn rewritten_text_is_not_rewritten_again() {
        let mut text = RichText::new("a 12 b");
        let mut links = LinkTable::new();
        // The replacement still matches the pattern.
        let doubling = TextDetector::builder(r"\d+")
            .replacement_text(|found| found.text.repeat(2))
            .touchable(true)
            .build();
        let detectors = [doubling];

        let first = scan(&mut text, &mut links, &detectors, 0..6).unwrap();
        assert_eq!(first.rewritten, 1);
        assert_eq!(text.as_str(), "a 1212 b");
        let after_first = text.clone();

        let len = text.len();
        let second = scan(&mut text, &mut links, &detectors, 0..len).unwrap();
        assert_eq!(second.skipped, 1);
        assert_eq!(second.rewritten, 0);
        assert_eq!(second.links_created, 0);
        assert_eq!(text, after_first);
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn shortening_rewrites_keep_later_matches_aligned() {
        // 30 characters, with matches at 5 and 20.
        let mut text = RichText::new("Hello[abcdef]_world_[xyz]_tail");
        assert_eq!(text.len(), 30);
        let mut links = LinkTable::new();
        let detector = TextDetector::builder(r"\[(\w)\w*\]")
            .replacement_text(|found| found.captures[1].clone().unwrap_or_default())
            .touchable(true)
            .build();

        let report = scan(&mut text, &mut links, &[detector], 0..30).unwrap();
        assert_eq!(report.rewritten, 2);
        assert_eq!(text.as_str(), "Helloa_world_x_tail");

        let (first, first_range) = text.attribute(&names::LINK, 5, 0..19).unwrap();
        let (second, second_range) = text.attribute(&names::LINK, 13, 0..19).unwrap();
        assert_eq!(first_range, 5..6);
        assert_eq!(second_range, 13..14);
        assert_ne!(first, second);
        assert_eq!(text.text_in(second_range).unwrap(), "x");
    }

    #[test]
    fn earlier_detectors_win_and_later_ones_see_shifted_text() {
        let mut text = RichText::new("id 42 and 7");
        let mut links = LinkTable::new();
        let expand = TextDetector::builder(r"\b7\b")
            .replacement_text(|_| "seven".into())
            .build();
        let numbers = digits();

        let report = scan(&mut text, &mut links, &[expand.clone(), numbers], 0..11).unwrap();
        assert_eq!(text.as_str(), "id 42 and seven");
        // The digits detector only found "42"; "7" had already been rewritten.
        assert_eq!(report.matches, 2);
        assert_eq!(report.links_created, 1);
        let (value, range) = text.attribute(&names::DETECTOR_RESULT, 10, 0..15).unwrap();
        assert_eq!(value, &AttributeValue::DetectorResult(expand.id()));
        assert_eq!(range, 10..15);
    }

    #[test]
    fn matches_crossing_the_range_are_ignored() {
        let mut text = RichText::new("1234 5678");
        let mut links = LinkTable::new();
        let report = scan(&mut text, &mut links, &[digits()], 2..9).unwrap();
        assert_eq!(report.matches, 1);
        assert!(text.attribute(&names::LINK, 0, 0..9).is_none());
        assert!(text.attribute(&names::LINK, 5, 0..9).is_some());
    }

    #[test]
    fn failed_rewrites_tag_the_original_span() {
        let mut text = RichText::new("x 99 y");
        let mut links = LinkTable::new();
        let failing = TextDetector::builder(r"\d+")
            .rewrite(|_, _, _| Err(RewriteError::new("no")))
            .touchable(true)
            .build();
        let emptying = TextDetector::builder(r"[xy]")
            .rewrite(|_, _, _| Ok(Some(RichText::new(""))))
            .build();

        let report = scan(&mut text, &mut links, &[failing, emptying], 0..6).unwrap();
        assert_eq!(text.as_str(), "x 99 y");
        assert_eq!(report.failed_rewrites, 3);
        assert_eq!(report.rewritten, 0);
        let (_, range) = text.attribute(&names::LINK, 2, 0..6).unwrap();
        assert_eq!(range, 2..4);
        assert!(text.attribute(&names::DETECTOR_RESULT, 5, 0..6).is_some());
    }

    #[test]
    fn inert_detectors_are_skipped() {
        let mut text = RichText::new("abc 12");
        let mut links = LinkTable::new();
        let broken = TextDetector::builder("(unclosed").build();
        let report = scan(&mut text, &mut links, &[broken, digits()], 0..6).unwrap();
        assert_eq!(report.inert_detectors, 1);
        assert_eq!(report.links_created, 1);
    }

    #[test]
    fn rewrites_cannot_smuggle_reserved_attributes() {
        let mut text = RichText::new("go");
        let mut links = LinkTable::new();
        let detector = TextDetector::builder("go")
            .rewrite(|_, _, _| {
                let mut replacement = RichText::new("went");
                replacement
                    .add_attribute(names::UNDERLINE, AttributeValue::Underline(true), 0..4)
                    .unwrap();
                replacement
                    .add_attribute(names::LINK, AttributeValue::Link(crate::LinkId(99)), 0..4)
                    .unwrap();
                Ok(Some(replacement))
            })
            .build();
        scan(&mut text, &mut links, &[detector], 0..2).unwrap();
        assert_eq!(text.as_str(), "went");
        assert!(text.attribute(&names::LINK, 0, 0..4).is_none());
        assert!(text.attribute(&names::UNDERLINE, 0, 0..4).is_some());
    }

    #[test]
    fn invalid_ranges_are_errors() {
        let mut text = RichText::new("abc");
        let mut links = LinkTable::new();
        assert!(scan(&mut text, &mut links, &[digits()], 1..9).is_err());
    }
}
