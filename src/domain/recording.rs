//! Catalog records describing finished recordings.
//!
//! A `CatalogRecord` is populated once at the adapter boundary and is
//! read-only afterwards. The engine never sees the upstream document.

use chrono::{DateTime, NaiveDate, Utc};

/// Recording status the catalog uses for finished recordings
pub const STATUS_RECORDED: &str = "Recorded";

/// One finished recording as reported by the recorder
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRecord {
    /// Program title
    pub title: String,

    /// Episode subtitle
    pub subtitle: Option<String>,

    /// Season number (0 when unknown)
    pub season: u32,

    /// Episode number (0 when unknown)
    pub episode: u32,

    /// Plot description
    pub description: Option<String>,

    /// Name of the channel the program was recorded from
    pub channel_name: Option<String>,

    /// Scheduled start
    pub start_time: DateTime<Utc>,

    /// Scheduled end
    pub end_time: DateTime<Utc>,

    /// Actual end of the recording, when the recorder reports it
    pub recording_end: Option<DateTime<Utc>>,

    /// Original air date
    pub premiere_date: Option<NaiveDate>,

    /// Storage group holding the file
    pub storage_group: String,

    /// File name within the storage group's directories
    pub file_name: String,

    /// Recording group (e.g. "Default", "LiveTV")
    pub recording_group: String,

    /// Recording status name
    pub status: String,

    /// Video quality flags
    pub video_props: VideoProps,

    /// Cast members
    pub cast: Vec<CastMember>,
}

impl CatalogRecord {
    /// Create a record with the fields every recording carries
    pub fn new(
        title: impl Into<String>,
        storage_group: impl Into<String>,
        file_name: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            season: 0,
            episode: 0,
            description: None,
            channel_name: None,
            start_time,
            end_time,
            recording_end: None,
            premiere_date: None,
            storage_group: storage_group.into(),
            file_name: file_name.into(),
            recording_group: "Default".to_string(),
            status: STATUS_RECORDED.to_string(),
            video_props: VideoProps::default(),
            cast: Vec::new(),
        }
    }

    /// Set the subtitle
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Set season and episode
    pub fn with_episode(mut self, season: u32, episode: u32) -> Self {
        self.season = season;
        self.episode = episode;
        self
    }

    /// Set the channel name
    pub fn with_channel(mut self, channel_name: impl Into<String>) -> Self {
        self.channel_name = Some(channel_name.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the recording group
    pub fn with_recording_group(mut self, group: impl Into<String>) -> Self {
        self.recording_group = group.into();
        self
    }

    /// Add a cast member
    pub fn with_cast_member(mut self, name: impl Into<String>, role: impl Into<String>) -> Self {
        self.cast.push(CastMember {
            name: name.into(),
            role: role.into(),
        });
        self
    }

    /// Runtime in whole minutes, truncated
    pub fn runtime_minutes(&self) -> i64 {
        ((self.end_time - self.start_time).num_seconds() / 60).max(0)
    }

    /// Time stamped onto every artifact derived from this recording
    pub fn artifact_time(&self) -> DateTime<Utc> {
        self.recording_end.unwrap_or(self.end_time)
    }

    /// Whether the recorder flagged the file as damaged
    pub fn is_damaged(&self) -> bool {
        self.video_props.is_damaged()
    }

    /// Whether this record is a finished recording
    pub fn is_recorded(&self) -> bool {
        self.status == STATUS_RECORDED
    }
}

/// A (name, role) pair from the cast list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastMember {
    pub name: String,
    pub role: String,
}

/// Video property flags as reported by the recorder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoProps(Vec<String>);

impl VideoProps {
    /// Parse a `|`, `,` or whitespace separated flag list
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(|c: char| c == '|' || c == ',' || c.is_whitespace())
                .map(str::trim)
                .filter(|flag| !flag.is_empty())
                .map(str::to_uppercase)
                .collect(),
        )
    }

    /// Check for a flag (case-insensitive)
    pub fn contains(&self, flag: &str) -> bool {
        self.0.iter().any(|f| f.eq_ignore_ascii_case(flag))
    }

    pub fn is_damaged(&self) -> bool {
        self.contains("DAMAGED")
    }

    pub fn flags(&self) -> &[String] {
        &self.0
    }
}
