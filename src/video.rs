use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::{RawRecord, VideoFactory};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoKind {
    Movie,
    Serial,
    Other(String),
}

impl VideoKind {
    fn parse(s: &str) -> Self {
        match s {
            k if k.ends_with("-serial") || k == "serial" => VideoKind::Serial,
            k if k.ends_with("-movie") || k == "movie" => VideoKind::Movie,
            other => VideoKind::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub kind: Option<String>,
}

/// A search hit as returned by Kodik.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KodikVideo {
    pub id: String,
    pub kind: VideoKind,
    pub raw_kind: Option<String>,
    pub link: Option<String>,
    pub title: String,
    pub title_orig: Option<String>,
    pub other_title: Option<String>,
    pub year: Option<u32>,
    pub kinopoisk_id: Option<String>,
    pub imdb_id: Option<String>,
    pub worldart_link: Option<String>,
    pub shikimori_id: Option<String>,
    pub quality: Option<String>,
    pub camrip: bool,
    pub lgbt: bool,
    pub translation: Option<Translation>,
    pub last_season: Option<u32>,
    pub last_episode: Option<u32>,
    pub episodes_count: Option<u32>,
    pub screenshots: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl KodikVideo {
    pub fn from_record(record: &RawRecord) -> Self {
        let raw_kind = text(record.get("type"));
        Self {
            id: record.id(),
            kind: raw_kind.as_deref().map(VideoKind::parse).unwrap_or(VideoKind::Other(String::new())),
            raw_kind,
            link: text(record.get("link")),
            title: text(record.get("title")).unwrap_or_default(),
            title_orig: text(record.get("title_orig")),
            other_title: text(record.get("other_title")),
            year: number(record.get("year")),
            kinopoisk_id: text(record.get("kinopoisk_id")),
            imdb_id: text(record.get("imdb_id")),
            worldart_link: text(record.get("worldart_link")),
            shikimori_id: text(record.get("shikimori_id")),
            quality: text(record.get("quality")),
            camrip: record.get("camrip").and_then(Value::as_bool).unwrap_or(false),
            lgbt: record.get("lgbt").and_then(Value::as_bool).unwrap_or(false),
            translation: record.get("translation").and_then(Value::as_object).map(|t| Translation {
                id: t.get("id").and_then(Value::as_u64),
                title: text(t.get("title")),
                kind: text(t.get("type")),
            }),
            last_season: number(record.get("last_season")),
            last_episode: number(record.get("last_episode")),
            episodes_count: number(record.get("episodes_count")),
            screenshots: record
                .get("screenshots")
                .and_then(Value::as_array)
                .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                .unwrap_or_default(),
            created_at: text(record.get("created_at")),
            updated_at: text(record.get("updated_at")),
        }
    }
}

/// Builds [`KodikVideo`]s; the default factory for the CLI and embedders.
#[derive(Debug, Clone, Copy, Default)]
pub struct KodikVideoFactory;

impl VideoFactory for KodikVideoFactory {
    type Video = KodikVideo;
    fn create(&self, record: RawRecord) -> KodikVideo { KodikVideo::from_record(&record) }
}

// Ids arrive as strings or numbers depending on the field
fn text(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(v: Option<&Value>) -> Option<u32> {
    match v? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
