//! Wire format of the MythTV services API (JSON flavour) and field
//! extraction into typed domain values.
//!
//! The API is loose about scalar types: numbers sometimes arrive as
//! strings and vice versa, so every scalar goes through `Scalar`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::domain::{CastMember, CatalogRecord, StorageMap, VideoProps};

/// A JSON scalar of any type
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    /// Text form, trimmed, lines joined with single spaces; `None` if empty
    pub fn text(&self) -> Option<String> {
        let raw = match self {
            Scalar::Str(s) => s.clone(),
            Scalar::Int(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        };
        normalize_text(&raw)
    }

    /// Unsigned integer value; anything unparsable is `None`
    pub fn number(&self) -> Option<u32> {
        match self {
            Scalar::Int(i) => u32::try_from(*i).ok(),
            Scalar::Float(f) if *f >= 0.0 => Some(*f as u32),
            Scalar::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

fn text(field: &Option<Scalar>) -> Option<String> {
    field.as_ref().and_then(Scalar::text)
}

fn number(field: &Option<Scalar>) -> u32 {
    field.as_ref().and_then(Scalar::number).unwrap_or(0)
}

/// Trim and collapse line breaks into single spaces
pub fn normalize_text(raw: &str) -> Option<String> {
    let joined = raw.trim().lines().collect::<Vec<_>>().join(" ");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// ISO-8601 timestamp; a missing offset is read as UTC
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Plain date, or the date part of a full timestamp
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(raw).map(|dt| dt.date_naive()))
}

fn datetime(field: &Option<Scalar>) -> Option<DateTime<Utc>> {
    text(field).as_deref().and_then(parse_datetime)
}

// ============================================================================
// Storage groups
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StorageGroupDirResponse {
    pub storage_group_dir_list: StorageGroupDirList,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StorageGroupDirList {
    #[serde(default)]
    pub storage_group_dirs: Vec<StorageGroupDir>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StorageGroupDir {
    #[serde(default)]
    pub group_name: Option<Scalar>,
    #[serde(default)]
    pub dir_name: Option<Scalar>,
}

impl StorageGroupDirResponse {
    /// Build the storage map; entries without group or directory are dropped
    pub fn into_storage_map(self) -> StorageMap {
        StorageMap::from_pairs(
            self.storage_group_dir_list
                .storage_group_dirs
                .iter()
                .filter_map(|entry| Some((text(&entry.group_name)?, text(&entry.dir_name)?))),
        )
    }
}

// ============================================================================
// Recordings
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProgramListResponse {
    pub program_list: ProgramList,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProgramList {
    #[serde(default)]
    pub programs: Vec<Program>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Program {
    #[serde(default)]
    pub title: Option<Scalar>,
    #[serde(default)]
    pub sub_title: Option<Scalar>,
    #[serde(default)]
    pub description: Option<Scalar>,
    #[serde(default)]
    pub season: Option<Scalar>,
    #[serde(default)]
    pub episode: Option<Scalar>,
    #[serde(default)]
    pub start_time: Option<Scalar>,
    #[serde(default)]
    pub end_time: Option<Scalar>,
    #[serde(default)]
    pub airdate: Option<Scalar>,
    #[serde(default)]
    pub video_prop_names: Option<Scalar>,
    #[serde(default)]
    pub channel: Option<Channel>,
    #[serde(default)]
    pub recording: Option<Recording>,
    #[serde(default)]
    pub cast: Option<Cast>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Channel {
    #[serde(default)]
    pub channel_name: Option<Scalar>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Recording {
    #[serde(default)]
    pub status_name: Option<Scalar>,
    #[serde(default)]
    pub rec_group: Option<Scalar>,
    #[serde(default)]
    pub storage_group: Option<Scalar>,
    #[serde(default)]
    pub file_name: Option<Scalar>,
    #[serde(default)]
    pub end_ts: Option<Scalar>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Cast {
    #[serde(default)]
    pub cast_members: Vec<CastMemberWire>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CastMemberWire {
    #[serde(default)]
    pub name: Option<Scalar>,
    #[serde(default)]
    pub character_name: Option<Scalar>,
}

/// Why a program could not become a `CatalogRecord`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    StartTime,
    EndTime,
    FileName,
}

impl std::fmt::Display for MissingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingField::StartTime => write!(f, "StartTime"),
            MissingField::EndTime => write!(f, "EndTime"),
            MissingField::FileName => write!(f, "Recording/FileName"),
        }
    }
}

impl Program {
    /// Recording status name, if any
    pub fn status(&self) -> Option<String> {
        self.recording.as_ref().and_then(|r| text(&r.status_name))
    }

    /// Extract the typed record
    pub fn to_record(&self) -> Result<CatalogRecord, MissingField> {
        let recording = self.recording.as_ref();
        let start_time = datetime(&self.start_time).ok_or(MissingField::StartTime)?;
        let end_time = datetime(&self.end_time).ok_or(MissingField::EndTime)?;
        let file_name = recording
            .and_then(|r| text(&r.file_name))
            .ok_or(MissingField::FileName)?;

        Ok(CatalogRecord {
            title: text(&self.title).unwrap_or_default(),
            subtitle: text(&self.sub_title),
            season: number(&self.season),
            episode: number(&self.episode),
            description: text(&self.description),
            channel_name: self.channel.as_ref().and_then(|c| text(&c.channel_name)),
            start_time,
            end_time,
            recording_end: recording.and_then(|r| datetime(&r.end_ts)),
            premiere_date: text(&self.airdate).as_deref().and_then(parse_date),
            storage_group: recording
                .and_then(|r| text(&r.storage_group))
                .unwrap_or_default(),
            file_name,
            recording_group: recording
                .and_then(|r| text(&r.rec_group))
                .unwrap_or_default(),
            status: self.status().unwrap_or_default(),
            video_props: text(&self.video_prop_names)
                .map(|raw| VideoProps::parse(&raw))
                .unwrap_or_default(),
            cast: self
                .cast
                .iter()
                .flat_map(|c| c.cast_members.iter())
                .map(|member| CastMember {
                    name: text(&member.name).unwrap_or_default(),
                    role: text(&member.character_name).unwrap_or_default(),
                })
                .collect(),
        })
    }
}
