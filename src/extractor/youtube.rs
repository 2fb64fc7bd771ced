//! Video transcripts fetched from the caption tracks YouTube embeds in its
//! watch page.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{AppError, Result};
use super::page::normalize_whitespace;

/// Transcript languages in order of preference.
pub const PREFERRED_LANGUAGES: &[&str] = &["ru", "en"];

static VIDEO_ID: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[0-9A-Za-z_-]{11}$").ok());

static TEXT_SELECTOR: Lazy<Option<Selector>> = Lazy::new(|| Selector::parse("text").ok());

const ID_PATH_PREFIXES: &[&str] = &["embed", "shorts", "live", "v"];

const CAPTION_TRACKS_MARKER: &str = "\"captionTracks\":";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub base_url: String,
    pub language_code: String,
    #[serde(default)]
    pub kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    fn matches_language(&self, lang: &str) -> bool {
        self.language_code == lang
            || self
                .language_code
                .strip_prefix(lang)
                .is_some_and(|rest| rest.starts_with('-'))
    }
}

pub fn is_video_host(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.to_ascii_lowercase();
    host == "youtu.be"
        || ["youtube.com", "youtube-nocookie.com"]
            .iter()
            .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
}

fn looks_like_id(candidate: &str) -> bool {
    VIDEO_ID
        .as_ref()
        .is_some_and(|re| re.is_match(candidate))
}

/// Recovers the 11-character video ID from `?v=`, `youtu.be/ID`, or the
/// segment after `/embed/`, `/shorts/`, `/live/` or `/v/`.
pub fn video_id(url: &Url) -> Option<String> {
    if let Some((_, v)) = url.query_pairs().find(|(key, _)| key == "v") {
        if looks_like_id(&v) {
            return Some(v.into_owned());
        }
    }

    let segments: Vec<&str> = url.path_segments()?.collect();
    let candidate = if url.host_str().is_some_and(|h| h.eq_ignore_ascii_case("youtu.be")) {
        segments.first().copied()
    } else {
        segments
            .windows(2)
            .find(|pair| ID_PATH_PREFIXES.contains(&pair[0]))
            .map(|pair| pair[1])
    };

    candidate
        .filter(|segment| looks_like_id(segment))
        .map(str::to_string)
}

pub async fn fetch_transcript(client: &Client, video_id: &str) -> Result<String> {
    let watch_url = format!("https://www.youtube.com/watch?v={video_id}&hl=en");
    let page = client.get(&watch_url).send().await?;
    if !page.status().is_success() {
        return Err(AppError::FetchError(format!(
            "video page for {} returned status {}",
            video_id,
            page.status()
        )));
    }
    let page = page.text().await?;

    let tracks = caption_tracks(&page)
        .ok_or_else(|| AppError::FetchError(format!("No transcript available for {video_id}")))?;
    let track = pick_track(&tracks, PREFERRED_LANGUAGES).ok_or_else(|| {
        AppError::FetchError(format!(
            "No transcript for {} in {}",
            video_id,
            PREFERRED_LANGUAGES.join(", ")
        ))
    })?;
    debug!(video_id, language = %track.language_code, generated = track.is_generated(), "fetching transcript");

    let xml = client.get(&track.base_url).send().await?;
    if !xml.status().is_success() {
        return Err(AppError::FetchError(format!(
            "transcript for {} returned status {}",
            video_id,
            xml.status()
        )));
    }
    let xml = xml.text().await?;

    Ok(join_segments(&xml))
}

/// Reads the `captionTracks` array embedded in a watch page's player response.
pub fn caption_tracks(page: &str) -> Option<Vec<CaptionTrack>> {
    let start = page.find(CAPTION_TRACKS_MARKER)? + CAPTION_TRACKS_MARKER.len();
    // The stream deserializer stops after the first complete value
    serde_json::Deserializer::from_str(&page[start..])
        .into_iter::<Vec<CaptionTrack>>()
        .next()?
        .ok()
}

/// Chooses a track by language preference, manual captions before generated ones.
pub fn pick_track<'a>(tracks: &'a [CaptionTrack], languages: &[&str]) -> Option<&'a CaptionTrack> {
    languages.iter().find_map(|lang| {
        let mut candidates = tracks.iter().filter(|t| t.matches_language(lang));
        let manual = candidates.clone().find(|t| !t.is_generated());
        manual.or_else(|| candidates.next())
    })
}

/// Joins timed-text segments with single spaces, in document order.
pub fn join_segments(xml: &str) -> String {
    let Some(selector) = TEXT_SELECTOR.as_ref() else {
        return String::new();
    };
    let fragment = Html::parse_fragment(xml);
    fragment
        .select(selector)
        .map(|segment| normalize_whitespace(&decode_leftover_entities(&segment.text().collect::<String>())))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// Caption text is often entity-encoded twice; the parser undoes only one layer
fn decode_leftover_entities(text: &str) -> String {
    text.replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
