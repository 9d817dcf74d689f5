//! Data model types for the game catalog.
//!
//! These types represent the persistent catalog schema (games and API keys),
//! the untrusted input shape accepted by importers, and the ephemeral
//! results reported back from an import.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// Input keys that are owned by the catalog and never accepted through the open `extra` map.
pub const RESERVED_KEYS: &[&str] = &["slug", "addedBy", "createdAt", "updatedAt"];

// ── Release Date ────────────────────────────────────────────────────────────

/// A release date, or the `"TBA"` sentinel for unannounced dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseDate {
    Date(NaiveDate),
    #[default]
    Tba,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid release date '{0}' (expected YYYY-MM-DD or TBA)")]
pub struct InvalidReleaseDate(pub String);

impl ReleaseDate {
    pub const TBA: &'static str = "TBA";

    /// Parse `YYYY-MM-DD` or `TBA` (case-insensitive). Blank input is treated as `TBA`.
    pub fn parse(s: &str) -> Result<Self, InvalidReleaseDate> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(Self::TBA) {
            return Ok(Self::Tba);
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(Self::Date)
            .map_err(|_| InvalidReleaseDate(trimmed.to_string()))
    }
}

impl fmt::Display for ReleaseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Tba => f.write_str(Self::TBA),
        }
    }
}

impl Serialize for ReleaseDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReleaseDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ── Provenance ──────────────────────────────────────────────────────────────

/// How (or by whom) a catalog record was first created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    /// Submitted manually by a signed-in user.
    User(String),
    /// Pasted as a JSON array through the batch endpoint.
    BatchUpload,
    /// Uploaded as a JSON file.
    JsonUpload,
    /// Imported from an external metadata provider, e.g. "RAWG API (Top Rated)".
    ExternalImport(String),
}

impl Provenance {
    pub const BATCH_UPLOAD: &'static str = "Batch Upload";
    pub const JSON_UPLOAD: &'static str = "JSON Upload";

    /// The display string stored in `addedBy`.
    pub fn label(&self) -> &str {
        match self {
            Self::User(id) => id,
            Self::BatchUpload => Self::BATCH_UPLOAD,
            Self::JsonUpload => Self::JSON_UPLOAD,
            Self::ExternalImport(source) => source,
        }
    }

    /// Stable discriminant used by relational storage.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::BatchUpload => "batch_upload",
            Self::JsonUpload => "json_upload",
            Self::ExternalImport(_) => "external_import",
        }
    }

    /// Rebuild from the `(kind, label)` pair written by [`kind`](Self::kind) and [`label`](Self::label).
    pub fn from_parts(kind: &str, label: &str) -> Self {
        match kind {
            "batch_upload" => Self::BatchUpload,
            "json_upload" => Self::JsonUpload,
            "external_import" => Self::ExternalImport(label.to_string()),
            _ => Self::User(label.to_string()),
        }
    }

    /// Best-effort parse of a bare display string.
    pub fn from_label(label: &str) -> Self {
        match label {
            Self::BATCH_UPLOAD => Self::BatchUpload,
            Self::JSON_UPLOAD => Self::JsonUpload,
            l if l.contains(" API") => Self::ExternalImport(l.to_string()),
            l => Self::User(l.to_string()),
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Provenance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Provenance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_label(&s))
    }
}

// ── Game ────────────────────────────────────────────────────────────────────

/// An image or video attached to a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaLink {
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// One persisted catalog entry, keyed by its unique `slug`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub release_date: ReleaseDate,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub developer: String,
    #[serde(default)]
    pub platforms: BTreeSet<String>,
    #[serde(default)]
    pub genres: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub franchises: Vec<String>,
    #[serde(default)]
    pub hashtags: BTreeSet<String>,
    #[serde(default)]
    pub images: Vec<MediaLink>,
    #[serde(default)]
    pub videos: Vec<MediaLink>,
    /// Store name to URL; only stores relevant to the record's platforms are present.
    #[serde(default)]
    pub store_links: BTreeMap<String, String>,
    #[serde(default, rename = "isNSFW")]
    pub is_nsfw: bool,
    pub added_by: Provenance,
    /// Identifier assigned by the external metadata provider, if imported from one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Unrecognized input fields, passed through to storage untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GameRecord {
    /// A record with only its identity filled in.
    pub fn new(slug: impl Into<String>, name: impl Into<String>, added_by: Provenance) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            release_date: ReleaseDate::Tba,
            description: String::new(),
            publisher: String::new(),
            developer: String::new(),
            platforms: BTreeSet::new(),
            genres: BTreeSet::new(),
            cover_image_url: None,
            aliases: Vec::new(),
            franchises: Vec::new(),
            hashtags: BTreeSet::new(),
            images: Vec::new(),
            videos: Vec::new(),
            store_links: BTreeMap::new(),
            is_nsfw: false,
            added_by,
            external_id: None,
            created_at: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    /// A record is complete once it names at least one platform and one genre.
    pub fn is_complete(&self) -> bool {
        !self.platforms.is_empty() && !self.genres.is_empty()
    }
}

/// Untrusted input for one game, as pasted, uploaded, or mapped from a provider.
///
/// Every field is optional; absent fields leave existing values alone on update.
/// A caller-supplied `slug` is accepted but never used as identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub franchises: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<MediaLink>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<MediaLink>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_links: Option<BTreeMap<String, String>>,
    #[serde(rename = "isNSFW", skip_serializing_if = "Option::is_none")]
    pub is_nsfw: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawRecord {
    /// The trimmed name, or `None` when absent or blank.
    pub fn trimmed_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }

    /// A short label identifying this record in error reports.
    pub fn identifier(&self, index: usize) -> String {
        match (self.trimmed_name(), self.external_id) {
            (Some(name), _) => name.to_string(),
            (None, Some(id)) => format!("external id {id}"),
            (None, None) => format!("#{index}"),
        }
    }
}

// ── API Key ─────────────────────────────────────────────────────────────────

/// An issued credential for the metered read API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    pub key: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_unlimited: bool,
    /// Only meaningful when `is_unlimited` is false.
    #[serde(default)]
    pub monthly_limit: i64,
    #[serde(default)]
    pub current_month_usage: i64,
    #[serde(default)]
    pub last_used_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl ApiKey {
    /// Whether a limited key has used up its monthly allowance.
    pub fn quota_exhausted(&self) -> bool {
        !self.is_unlimited && self.current_month_usage >= self.monthly_limit
    }
}

// ── Import Results ──────────────────────────────────────────────────────────

/// A per-item failure recorded during an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemError {
    pub identifier: String,
    pub message: String,
}

/// Whether a successful write created or updated a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteOutcome {
    Added,
    Updated,
}

/// One successfully written record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenGame {
    pub slug: String,
    pub name: String,
    pub outcome: WriteOutcome,
}

/// Aggregate outcome of one import call. Not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatchResult {
    pub added_count: u64,
    pub updated_count: u64,
    pub error_count: u64,
    pub errors: Vec<ItemError>,
    pub written: Vec<WrittenGame>,
}

impl ImportBatchResult {
    /// Number of items accounted for (written or failed).
    pub fn total(&self) -> u64 {
        self.added_count + self.updated_count + self.error_count
    }

    pub fn record_error(&mut self, identifier: impl Into<String>, message: impl Into<String>) {
        self.error_count += 1;
        self.errors.push(ItemError {
            identifier: identifier.into(),
            message: message.into(),
        });
    }

    pub fn record_write(&mut self, record: &GameRecord, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Added => self.added_count += 1,
            WriteOutcome::Updated => self.updated_count += 1,
        }
        self.written.push(WrittenGame {
            slug: record.slug.clone(),
            name: record.name.clone(),
            outcome,
        });
    }

    /// One-line human summary, e.g. "Added 3 games, updated 1, 2 errors".
    pub fn summary(&self) -> String {
        format!(
            "Added {} games, updated {}, {} errors",
            self.added_count, self.updated_count, self.error_count
        )
    }
}

/// Log entry for a completed import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLog {
    pub id: i64,
    pub source: String,
    pub imported_at: String,
    pub records_added: i64,
    pub records_updated: i64,
    pub records_failed: i64,
}
