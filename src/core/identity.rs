//! Canonical titles and human-readable file stems for recordings.

use std::fmt::Display;
use std::path::Path;

use chrono::TimeZone;

use crate::domain::CatalogRecord;

use super::nfo::NFO_EXTENSION;

/// Separator between title parts
const TITLE_SEPARATOR: &str = " - ";

/// Characters no target filesystem accepts in a file name
const INVALID_FILENAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Device names Windows reserves regardless of extension
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Longest file name most filesystems accept, in bytes
const MAX_FILENAME_BYTES: usize = 255;

/// `S##E##` tag, only when both numbers are nonzero
pub fn season_episode_tag(season: u32, episode: u32) -> Option<String> {
    if season == 0 || episode == 0 {
        return None;
    }
    Some(format!("S{:02}E{:02}", season, episode))
}

/// Title, season/episode tag and subtitle joined with " - "
pub fn build_title(record: &CatalogRecord) -> String {
    let tag = season_episode_tag(record.season, record.episode);

    [
        Some(record.title.as_str()),
        tag.as_deref(),
        record.subtitle.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::trim)
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join(TITLE_SEPARATOR)
}

/// Human-readable stem: title plus bracketed start time, channel and
/// damage marker, sanitized for use as a file name.
///
/// The start time is rendered as `YYYYMMDDTHHMM` in `tz`. The stem is
/// short enough that both the `.nfo` name and the link name (stem plus the
/// recording's extension) fit in one file name.
pub fn build_stem<Tz>(record: &CatalogRecord, title: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut parts = vec![title.to_string()];
    parts.push(format!(
        "[{}]",
        record.start_time.with_timezone(tz).format("%Y%m%dT%H%M")
    ));
    if let Some(channel) = record.channel_name.as_deref().filter(|c| !c.is_empty()) {
        parts.push(format!("[{}]", channel));
    }
    if record.is_damaged() {
        parts.push("[DAMAGED]".to_string());
    }

    sanitize_with_limit(&parts.join(" "), stem_budget(&record.file_name))
}

/// Bytes left for a stem once the longest suffix it will carry is added
fn stem_budget(file_name: &str) -> usize {
    let media_suffix = Path::new(file_name)
        .extension()
        .map(|ext| ext.len() + 1)
        .unwrap_or(0);
    let suffix = media_suffix.max(NFO_EXTENSION.len() + 1);
    MAX_FILENAME_BYTES.saturating_sub(suffix).max(1)
}

/// Make a string safe to use as a file name on common filesystems.
///
/// Deterministic: the same input always maps to the same output.
pub fn sanitize_file_name(name: &str) -> String {
    sanitize_with_limit(name, MAX_FILENAME_BYTES)
}

fn sanitize_with_limit(name: &str, max_bytes: usize) -> String {
    let mut cleaned: String = name
        .chars()
        .filter(|c| !INVALID_FILENAME_CHARS.contains(c) && !c.is_control())
        .collect();

    truncate_to_bytes(&mut cleaned, max_bytes);
    trim_trailing(&mut cleaned);

    let base = cleaned.split('.').next().unwrap_or_default();
    if RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(base)) {
        truncate_to_bytes(&mut cleaned, max_bytes.saturating_sub(1));
        cleaned.push('_');
    }

    cleaned
}

fn trim_trailing(s: &mut String) {
    let trimmed_len = s.trim_end_matches(|c: char| c == ' ' || c == '.').len();
    s.truncate(trimmed_len);
}

fn truncate_to_bytes(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}
