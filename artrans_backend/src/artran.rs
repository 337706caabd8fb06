//! Artrans export records.
//!
//! Artrans is a flat JSON array where every field is a string, including
//! booleans (`"true"`/`"false"`) and counters. Records are decoded once into
//! [`Artran`] with typed flags so the rest of the pipeline never compares text.

use crate::importer::ImportError;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Wire shape of a single record. Missing fields decode as empty strings and
/// scalar values of other JSON types are stringified.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RawArtran {
    #[serde(deserialize_with = "lenient_string")]
    id: String,
    #[serde(deserialize_with = "lenient_string")]
    rid: String,
    #[serde(deserialize_with = "lenient_string")]
    content: String,
    #[serde(deserialize_with = "lenient_string")]
    ua: String,
    #[serde(deserialize_with = "lenient_string")]
    ip: String,
    #[serde(deserialize_with = "lenient_string")]
    is_collapsed: String,
    #[serde(deserialize_with = "lenient_string")]
    is_pending: String,
    #[serde(deserialize_with = "lenient_string")]
    is_pinned: String,
    #[serde(deserialize_with = "lenient_string")]
    vote_up: String,
    #[serde(deserialize_with = "lenient_string")]
    vote_down: String,
    #[serde(deserialize_with = "lenient_string")]
    created_at: String,
    #[serde(deserialize_with = "lenient_string")]
    updated_at: String,
    #[serde(deserialize_with = "lenient_string")]
    nick: String,
    #[serde(deserialize_with = "lenient_string")]
    email: String,
    #[serde(deserialize_with = "lenient_string")]
    link: String,
    #[serde(deserialize_with = "lenient_string")]
    password: String,
    #[serde(deserialize_with = "lenient_string")]
    badge_name: String,
    #[serde(deserialize_with = "lenient_string")]
    badge_color: String,
    #[serde(deserialize_with = "lenient_string")]
    page_key: String,
    #[serde(deserialize_with = "lenient_string")]
    page_title: String,
    #[serde(deserialize_with = "lenient_string")]
    page_admin_only: String,
    #[serde(deserialize_with = "lenient_string")]
    site_name: String,
    #[serde(deserialize_with = "lenient_string")]
    site_urls: String,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text,
        serde_json::Value::Bool(flag) => flag.to_string(),
        serde_json::Value::Number(number) => number.to_string(),
        other => other.to_string(),
    })
}

/// A decoded source comment. Immutable once produced by [`decode_records`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Artran {
    pub id: String,
    /// External id of the parent record, empty for top-level comments.
    pub rid: String,
    pub content: String,
    pub ua: String,
    pub ip: String,
    pub is_collapsed: bool,
    pub is_pending: bool,
    pub is_pinned: bool,
    pub vote_up: u32,
    pub vote_down: u32,
    pub created_at: String,
    pub updated_at: String,
    pub nick: String,
    pub email: String,
    pub link: String,
    pub password: String,
    pub badge_name: String,
    pub badge_color: String,
    pub page_key: String,
    pub page_title: String,
    pub page_admin_only: bool,
    pub site_name: String,
    pub site_urls: String,
}

fn flag(raw: &str) -> bool {
    raw.trim() == "true"
}

fn counter(raw: &str) -> u32 {
    raw.trim().parse().unwrap_or(0)
}

impl From<RawArtran> for Artran {
    fn from(raw: RawArtran) -> Self {
        Self {
            is_collapsed: flag(&raw.is_collapsed),
            is_pending: flag(&raw.is_pending),
            is_pinned: flag(&raw.is_pinned),
            vote_up: counter(&raw.vote_up),
            vote_down: counter(&raw.vote_down),
            page_admin_only: flag(&raw.page_admin_only),
            id: raw.id,
            rid: raw.rid,
            content: raw.content,
            ua: raw.ua,
            ip: raw.ip,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            nick: raw.nick,
            email: raw.email,
            link: raw.link,
            password: raw.password,
            badge_name: raw.badge_name,
            badge_color: raw.badge_color,
            page_key: raw.page_key,
            page_title: raw.page_title,
            site_name: raw.site_name,
            site_urls: raw.site_urls,
        }
    }
}

pub fn decode_records(bytes: &[u8]) -> Result<Vec<Artran>, ImportError> {
    let raw: Vec<RawArtran> = serde_json::from_slice(bytes)?;
    Ok(raw.into_iter().map(Artran::from).collect())
}

pub fn read_records(path: &Path) -> Result<Vec<Artran>, ImportError> {
    let bytes = std::fs::read(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let records = decode_records(&bytes)?;
    tracing::debug!(path = %path.display(), records = records.len(), "decoded artrans file");
    Ok(records)
}
