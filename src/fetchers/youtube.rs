use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE};
use reqwest::{Client, Response, StatusCode};
use scraper::Html;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use super::{FetchError, RawCaption, TranscriptFetcher};
use crate::config::FetcherConfig;
use crate::Result;

const CONSENT_ACTION: &str = "action=\"https://consent.youtube.com/s\"";
const RECAPTCHA_MARKER: &str = "class=\"g-recaptcha\"";
const INNERTUBE_CLIENT_NAME: &str = "ANDROID";
const INNERTUBE_CLIENT_VERSION: &str = "20.10.38";

static API_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("valid api key regex")
});
static CONSENT_VALUE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"name="v" value="(.*?)""#).expect("valid consent regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Innertube player response, reduced to the fields we read
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    #[serde(default)]
    playability_status: Option<PlayabilityStatus>,
    #[serde(default)]
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Captions {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    tracklist: Option<CaptionTracklist>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTracklist {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

/// Transcript fetcher backed by YouTube's watch page, Innertube player API
/// and timed-text endpoint
pub struct YoutubeFetcher {
    client: Client,
    base_url: String,
    languages: Vec<String>,
}

impl YoutubeFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            languages: config.languages.clone(),
        })
    }

    /// Load the watch page, accepting the cookie consent interstitial if shown
    async fn fetch_watch_html(&self, video_id: &str) -> std::result::Result<String, FetchError> {
        let html = self.get_watch_page(video_id, None).await?;
        if !html.contains(CONSENT_ACTION) {
            return Ok(html);
        }

        tracing::debug!("Consent page shown for {}, retrying with consent cookie", video_id);

        let consent = CONSENT_VALUE_RE
            .captures(&html)
            .and_then(|caps| caps.get(1))
            .map(|m| format!("CONSENT=YES+{}", m.as_str()))
            .ok_or_else(|| {
                FetchError::unknown("Failed to automatically give consent to saving cookies")
            })?;

        let html = self.get_watch_page(video_id, Some(&consent)).await?;
        if html.contains(CONSENT_ACTION) {
            return Err(FetchError::unknown(
                "Failed to automatically give consent to saving cookies",
            ));
        }

        Ok(html)
    }

    async fn get_watch_page(
        &self,
        video_id: &str,
        cookie: Option<&str>,
    ) -> std::result::Result<String, FetchError> {
        let mut request = self
            .client
            .get(format!("{}/watch", self.base_url))
            .query(&[("v", video_id)])
            .header(ACCEPT_LANGUAGE, "en-US");

        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = check_status(request.send().await?)?;
        Ok(response.text().await?)
    }

    /// Ask the Innertube player endpoint for the caption tracklist
    async fn fetch_player(
        &self,
        video_id: &str,
        api_key: &str,
    ) -> std::result::Result<PlayerResponse, FetchError> {
        let body = json!({
            "context": {
                "client": {
                    "clientName": INNERTUBE_CLIENT_NAME,
                    "clientVersion": INNERTUBE_CLIENT_VERSION,
                }
            },
            "videoId": video_id,
        });

        let response = self
            .client
            .post(format!("{}/youtubei/v1/player", self.base_url))
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        check_status(response)?
            .json::<PlayerResponse>()
            .await
            .map_err(|e| FetchError::unknown(format!("Invalid player response: {}", e)))
    }

    /// Pick a track: manual before generated, per preferred language in order
    fn select_track<'a>(
        &self,
        video_id: &str,
        tracks: &'a [CaptionTrack],
    ) -> std::result::Result<&'a CaptionTrack, FetchError> {
        for language in &self.languages {
            let matching = |generated: bool| {
                tracks
                    .iter()
                    .find(|t| &t.language_code == language && t.is_generated() == generated)
            };

            if let Some(track) = matching(false).or_else(|| matching(true)) {
                return Ok(track);
            }
        }

        let available = tracks
            .iter()
            .map(|t| t.language_code.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        Err(FetchError::captions_disabled(format!(
            "No transcript found for video {} in languages [{}] (available: [{}])",
            video_id,
            self.languages.join(", "),
            available
        )))
    }

    async fn fetch_timed_text(
        &self,
        track: &CaptionTrack,
    ) -> std::result::Result<String, FetchError> {
        let url = track.base_url.replace("&fmt=srv3", "");
        let url = if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            url
        };

        let response = check_status(self.client.get(url).send().await?)?;
        let body = response.text().await?;

        if body.trim().is_empty() {
            return Err(FetchError::unknown("YouTube returned an empty caption track"));
        }

        Ok(body)
    }
}

#[async_trait]
impl TranscriptFetcher for YoutubeFetcher {
    async fn fetch(&self, video_id: &str) -> std::result::Result<Vec<RawCaption>, FetchError> {
        tracing::debug!("Fetching watch page for {}", video_id);
        let html = self.fetch_watch_html(video_id).await?;
        let api_key = extract_api_key(&html, video_id)?;

        let player = self.fetch_player(video_id, &api_key).await?;
        check_playability(&player, video_id)?;

        let tracks = player
            .captions
            .and_then(|captions| captions.tracklist)
            .map(|tracklist| tracklist.caption_tracks)
            .unwrap_or_default();

        if tracks.is_empty() {
            return Err(FetchError::captions_disabled(format!(
                "Subtitles are disabled for video {}",
                video_id
            )));
        }

        let track = self.select_track(video_id, &tracks)?;
        tracing::debug!(
            "Using {} caption track ({}) for {}",
            track.language_code,
            if track.is_generated() { "generated" } else { "manual" },
            video_id
        );

        let xml = self.fetch_timed_text(track).await?;
        parse_timed_text(&xml)
    }

    fn name(&self) -> &'static str {
        "youtube"
    }
}

fn check_status(response: Response) -> std::result::Result<Response, FetchError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(FetchError::rate_limited(
            "YouTube is blocking requests from this IP (HTTP 429)",
        ));
    }

    if !status.is_success() {
        return Err(FetchError::transport(format!(
            "YouTube request to {} failed: HTTP {}",
            response.url().path(),
            status
        )));
    }

    Ok(response)
}

fn extract_api_key(html: &str, video_id: &str) -> std::result::Result<String, FetchError> {
    if let Some(key) = API_KEY_RE.captures(html).and_then(|caps| caps.get(1)) {
        return Ok(key.as_str().to_string());
    }

    if html.contains(RECAPTCHA_MARKER) {
        return Err(FetchError::rate_limited(
            "YouTube is requesting a captcha; requests from this IP are blocked",
        ));
    }

    Err(FetchError::unknown(format!(
        "Could not extract the Innertube API key for video {}",
        video_id
    )))
}

fn check_playability(player: &PlayerResponse, video_id: &str) -> std::result::Result<(), FetchError> {
    let Some(playability) = &player.playability_status else {
        return Ok(());
    };

    let reason = playability.reason.as_deref().unwrap_or_default();

    match playability.status.as_str() {
        "OK" => Ok(()),
        "LOGIN_REQUIRED" if reason.contains("not a bot") => Err(FetchError::rate_limited(
            format!("YouTube asked to confirm this is not a bot while fetching {}", video_id),
        )),
        "LOGIN_REQUIRED" if reason.contains("inappropriate") => Err(FetchError::not_found(
            format!("The video {} is age restricted", video_id),
        )),
        "ERROR" if reason == "This video is unavailable" => Err(FetchError::not_found(format!(
            "The video {} is no longer available",
            video_id
        ))),
        status => {
            let detail = if reason.is_empty() { status } else { reason };
            Err(FetchError::not_found(format!(
                "The video {} is unplayable: {}",
                video_id, detail
            )))
        }
    }
}

/// Parse a timed-text XML document into caption entries
fn parse_timed_text(xml: &str) -> std::result::Result<Vec<RawCaption>, FetchError> {
    let document = roxmltree::Document::parse(xml)
        .map_err(|e| FetchError::unknown(format!("Invalid caption track: {}", e)))?;

    let mut captions = Vec::new();

    for element in document.descendants().filter(|n| n.has_tag_name("text")) {
        let content: String = element
            .descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect();

        if content.is_empty() {
            continue;
        }

        let start = element
            .attribute("start")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .ok_or_else(|| {
                FetchError::unknown("Caption track contains an entry without a valid start time")
            })?;
        let duration = element
            .attribute("dur")
            .and_then(|v| v.trim().parse::<f64>().ok())
            .unwrap_or(0.0);

        captions.push(RawCaption::new(start, duration, html_to_text(&content)));
    }

    Ok(captions)
}

/// Decode the HTML carried inside a caption entry and drop its markup
fn html_to_text(fragment: &str) -> String {
    let decoded: String = Html::parse_fragment(fragment)
        .root_element()
        .text()
        .collect();

    // Escaped tags only surface after decoding
    TAG_RE.replace_all(&decoded, "").into_owned()
}
