//! Human-readable summaries of media for status bars and tooltips.

use chrono::{DateTime, TimeDelta, Utc};
use mediadex_model::{ServiceKey, ServiceType};

use crate::context::IndexContext;
use crate::media::MediaNode;
use crate::record::MediaRecord;
use crate::siblings::SiblingResolver;
use crate::tags::{TagState, sort_numeric_tags};

pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    let b = bytes as f64;
    if b >= GB {
        format!("{:.2}GB", b / GB)
    } else if b >= MB {
        format!("{:.1}MB", b / MB)
    } else if b >= KB {
        format!("{:.0}KB", b / KB)
    } else {
        format!("{bytes}B")
    }
}

/// Integer with thousands separators.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_duration_ms(duration_ms: u64) -> String {
    let seconds = duration_ms / 1000;
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}h{minutes}m{secs}s")
    } else if minutes > 0 {
        format!("{minutes}m{secs}s")
    } else if seconds > 0 {
        format!("{secs}s")
    } else {
        format!("{duration_ms}ms")
    }
}

/// Time since `timestamp` (unix seconds) in the two largest units.
pub fn format_ago(timestamp: i64, now: DateTime<Utc>) -> String {
    let elapsed = TimeDelta::seconds((now.timestamp() - timestamp).max(0));

    let days = elapsed.num_days();
    let parts = [
        (days / 365, "year"),
        ((days % 365) / 30, "month"),
        ((days % 365) % 30, "day"),
        (elapsed.num_hours() % 24, "hour"),
        (elapsed.num_minutes() % 60, "minute"),
        (elapsed.num_seconds() % 60, "second"),
    ];

    let shown: Vec<String> = parts
        .iter()
        .skip_while(|(amount, _)| *amount == 0)
        .take(2)
        .filter(|(amount, _)| *amount > 0)
        .map(|(amount, unit)| {
            let plural = if *amount == 1 { "" } else { "s" };
            format!("{amount} {unit}{plural}")
        })
        .collect();

    if shown.is_empty() {
        "0 seconds".to_string()
    } else {
        shown.join(" ")
    }
}

/// Display title built from creator, series, title, volume, chapter and
/// page tags, joined with " - ".
pub fn title_string(tags: &TagState, siblings: &dyn SiblingResolver) -> String {
    let namespaces = tags.combined_namespaces(
        &["creator", "series", "title", "volume", "chapter", "page"],
        siblings,
    );
    let mut parts: Vec<String> = Vec::new();

    for namespace in ["creator", "series", "title"] {
        if let Some(subtags) = namespaces.get(namespace)
            && !subtags.is_empty()
        {
            let joined: Vec<&str> = subtags.iter().map(String::as_str).collect();
            parts.push(joined.join(", "));
        }
    }

    for (namespace, plural) in [("volume", "volumes"), ("chapter", "chapters"), ("page", "pages")] {
        let Some(subtags) = namespaces.get(namespace) else {
            continue;
        };
        let sorted = sort_numeric_tags(subtags);
        match sorted.as_slice() {
            [] => {}
            [only] => parts.push(format!("{namespace} {only}")),
            [first, .., last] => parts.push(format!("{plural} {first}-{last}")),
        }
    }

    parts.join(" - ")
}

/// Lines describing a node: file facts first, then when it arrived where.
pub fn pretty_info_lines(node: &MediaNode, ctx: &IndexContext, now: DateTime<Utc>) -> Vec<String> {
    match node {
        MediaNode::Collection(collection) => vec![format!(
            "{} {} ({} files)",
            format_bytes(collection.size()),
            node.mime(),
            format_count(collection.members().num_files() as u64)
        )],
        MediaNode::Singleton(singleton) => {
            singleton.with_record(|record| record_info_lines(record, ctx, now))
        }
    }
}

fn record_info_lines(record: &MediaRecord, ctx: &IndexContext, now: DateTime<Utc>) -> Vec<String> {
    let file = record.file();
    let mut info = format!("{} {}", format_bytes(file.size().unwrap_or(0)), file.mime());
    if let Some((width, height)) = file.resolution() {
        info.push_str(&format!(
            " ({}x{})",
            format_count(u64::from(width)),
            format_count(u64::from(height))
        ));
    }
    if let Some(duration) = file.duration_ms() {
        info.push_str(&format!(", {}", format_duration_ms(duration)));
    }
    if let Some(frames) = file.num_frames() {
        info.push_str(&format!(" ({} frames)", format_count(frames)));
    }
    if let Some(words) = file.num_words() {
        info.push_str(&format!(" ({} words)", format_count(words)));
    }

    let mut lines = vec![info];
    let locations = record.locations();

    for (service_key, verb) in [
        (ServiceKey::COMBINED_LOCAL_FILE, "imported"),
        (ServiceKey::TRASH, "trashed"),
    ] {
        if locations.is_current(&service_key)
            && let Some(timestamp) = locations.timestamp(&service_key)
        {
            lines.push(format!("{verb} {} ago", format_ago(timestamp, now)));
        }
    }

    let mut remote: Vec<(String, String)> = locations
        .current_remote()
        .into_iter()
        .filter_map(|service_key| {
            let info = ctx.services().require_service(&service_key).ok()?;
            let timestamp = locations.timestamp(&service_key)?;
            let verb = if info.service_type == ServiceType::Ipfs {
                "pinned"
            } else {
                "uploaded"
            };
            Some((
                info.name.clone(),
                format!("{verb} to {} {} ago", info.name, format_ago(timestamp, now)),
            ))
        })
        .collect();
    remote.sort();
    lines.extend(remote.into_iter().map(|(_, line)| line));

    lines
}
