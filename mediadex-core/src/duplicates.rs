//! Side-by-side comparison of two likely duplicates.

use mediadex_model::ServiceKey;

use crate::record::MediaRecord;
use crate::siblings::SiblingResolver;

const AGE_WINDOW_SECONDS: i64 = 86_400 * 30;

/// Statements about `shown` relative to the other file, and a score where
/// positive favours keeping `shown`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DuplicateComparison {
    pub statements: Vec<String>,
    pub score: f64,
}

impl DuplicateComparison {
    fn note(&mut self, statement: impl Into<String>, score: f64) {
        self.statements.push(statement.into());
        self.score += score;
    }
}

pub fn compare_duplicates(
    shown: &MediaRecord,
    other: &MediaRecord,
    siblings: &dyn SiblingResolver,
) -> DuplicateComparison {
    let mut comparison = DuplicateComparison::default();

    let shown_size = shown.file().size().unwrap_or(0);
    let other_size = other.file().size().unwrap_or(0);
    if other_size > 0 {
        let ratio = shown_size as f64 / other_size as f64;
        if ratio > 2.0 {
            comparison.note("This has a much larger filesize.", 2.0);
        } else if ratio > 1.05 {
            comparison.note("This has a larger filesize.", 0.5);
        } else if ratio < 0.5 {
            comparison.note("This has a much smaller filesize.", -2.0);
        } else if ratio < 0.95 {
            comparison.note("This has a smaller filesize.", -0.5);
        }
    }

    if let (Some(shown_res), Some(other_res)) = (shown.file().resolution(), other.file().resolution())
        && let (Some(shown_px), Some(other_px)) = (shown.file().num_pixels(), other.file().num_pixels())
        && shown_px > 0
        && other_px > 0
    {
        let ratio = shown_px as f64 / other_px as f64;
        if shown_px == other_px {
            if shown_res != other_res {
                comparison.note(
                    "The files have the same number of pixels but different resolution.",
                    0.0,
                );
            }
        } else if ratio > 2.0 {
            comparison.note("This has much higher resolution.", 2.0);
        } else if ratio > 1.0 {
            comparison.note("This has higher resolution.", 1.0);
        } else if ratio < 0.5 {
            comparison.note("This has much lower resolution.", -2.0);
        } else {
            comparison.note("This has lower resolution.", -1.0);
        }
    }

    if shown.mime() != other.mime() {
        comparison.note(
            format!("This is {}, the other is {}.", shown.mime(), other.mime()),
            0.0,
        );
    }

    let shown_tags = shown.tags().current(siblings).len();
    let other_tags = other.tags().current(siblings).len();
    match (shown_tags, other_tags) {
        (0, 0) => {}
        (_, 0) => comparison.note("This has tags, the other does not.", 0.0),
        (0, _) => comparison.note("This has no tags, the other does.", 0.0),
        (s, o) if s > o => comparison.note("This has more tags.", 1.0),
        (s, o) if s < o => comparison.note("This has fewer tags.", -1.0),
        _ => {}
    }

    let key = ServiceKey::COMBINED_LOCAL_FILE;
    if let (Some(shown_ts), Some(other_ts)) =
        (shown.locations().timestamp(&key), other.locations().timestamp(&key))
    {
        if shown_ts < other_ts - AGE_WINDOW_SECONDS {
            comparison.note("This is older.", 0.5);
        } else if other_ts < shown_ts - AGE_WINDOW_SECONDS {
            comparison.note("This is newer.", -0.5);
        }
    }

    comparison
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locations::LocationState;
    use crate::siblings::NoSiblings;
    use crate::tags::{StatusesToTags, TagState};
    use mediadex_model::{FileHash, FileMetadata, Mime};
    use std::collections::HashMap;

    fn record(seed: &str, mime: Mime, size: u64, res: (u32, u32), tags: &[&str], ts: i64) -> MediaRecord {
        let mut statuses = StatusesToTags::default();
        statuses.current.extend(tags.iter().map(|t| t.to_string()));
        MediaRecord::from_file(
            FileMetadata::new(FileHash::of_content(seed.as_bytes()), mime)
                .with_size(size)
                .with_resolution(res.0, res.1),
        )
        .with_tags(TagState::new(HashMap::from([(ServiceKey::LOCAL_TAG, statuses)])))
        .with_locations(LocationState::default().with_timestamp(ServiceKey::COMBINED_LOCAL_FILE, ts))
    }

    #[test]
    fn better_file_scores_positive() {
        let shown = record("a", Mime::ImagePng, 3_000, (2000, 2000), &["a", "b"], 0);
        let other = record("b", Mime::ImageJpeg, 1_000, (1000, 1000), &["a"], 40 * 86_400);
        let comparison = compare_duplicates(&shown, &other, &NoSiblings);
        assert_eq!(
            comparison.statements,
            vec![
                "This has a much larger filesize.",
                "This has much higher resolution.",
                "This is png, the other is jpeg.",
                "This has more tags.",
                "This is older.",
            ]
        );
        assert_eq!(comparison.score, 2.0 + 2.0 + 1.0 + 0.5);
    }

    #[test]
    fn fewer_tags_counts_against() {
        let shown = record("a", Mime::ImagePng, 1_000, (10, 10), &["a"], 0);
        let other = record("b", Mime::ImagePng, 1_000, (10, 10), &["a", "b"], 0);
        let comparison = compare_duplicates(&shown, &other, &NoSiblings);
        assert_eq!(comparison.statements, vec!["This has fewer tags."]);
        assert_eq!(comparison.score, -1.0);
    }

    #[test]
    fn zero_sizes_and_same_pixel_counts() {
        let shown = record("a", Mime::ImagePng, 0, (20, 5), &[], 0);
        let other = record("b", Mime::ImagePng, 0, (10, 10), &["x"], 0);
        let comparison = compare_duplicates(&shown, &other, &NoSiblings);
        assert_eq!(
            comparison.statements,
            vec![
                "The files have the same number of pixels but different resolution.",
                "This has no tags, the other does.",
            ]
        );
        assert_eq!(comparison.score, 0.0);
    }
}
