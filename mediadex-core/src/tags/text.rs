//! Tag string helpers: namespace splitting and numeric-aware ordering.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

static DIGIT_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit run regex should compile"));

/// Split `namespace:subtag` on the first colon. Unnamespaced tags get an
/// empty namespace.
pub fn split_tag(tag: &str) -> (&str, &str) {
    match tag.split_once(':') {
        Some((namespace, subtag)) => (namespace, subtag),
        None => ("", tag),
    }
}

pub fn combine_tag(namespace: &str, subtag: &str) -> String {
    if namespace.is_empty() {
        subtag.to_string()
    } else {
        format!("{namespace}:{subtag}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    /// Digits with leading zeros stripped.
    Number(String),
    Text(String),
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Segment::Number(a), Segment::Number(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (Segment::Number(_), Segment::Text(_)) => Ordering::Less,
            (Segment::Text(_), Segment::Number(_)) => Ordering::Greater,
            (Segment::Text(a), Segment::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A subtag converted so that embedded integers compare by value:
/// `page 2` sorts before `page 10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SortableTag {
    segments: Vec<Segment>,
    raw: String,
}

impl SortableTag {
    pub fn new(subtag: &str) -> Self {
        let mut segments = Vec::new();
        let mut last = 0;
        for run in DIGIT_RUNS.find_iter(subtag) {
            if run.start() > last {
                segments.push(Segment::Text(subtag[last..run.start()].to_string()));
            }
            let trimmed = run.as_str().trim_start_matches('0');
            segments.push(Segment::Number(trimmed.to_string()));
            last = run.end();
        }
        if last < subtag.len() {
            segments.push(Segment::Text(subtag[last..].to_string()));
        }

        Self {
            segments,
            raw: subtag.to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Sort subtags such as volume or page numbers in numeric order.
pub fn sort_numeric_tags<'a>(
    tags: impl IntoIterator<Item = &'a String>,
) -> Vec<&'a String> {
    let mut sorted: Vec<&String> = tags.into_iter().collect();
    sorted.sort_by_cached_key(|tag| SortableTag::new(tag));
    sorted
}
