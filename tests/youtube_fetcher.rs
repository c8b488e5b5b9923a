mod common;

use transcript_service::config::FetcherConfig;
use transcript_service::fetchers::youtube::YoutubeFetcher;
use transcript_service::{normalize, ErrorKind, RawCaption, TranscriptFetcher, TranscriptResponse};

fn fetcher(base_url: &str, languages: &[&str]) -> YoutubeFetcher {
    let config = FetcherConfig {
        base_url: base_url.to_string(),
        languages: languages.iter().map(|l| l.to_string()).collect(),
        timeout_secs: 5,
        ..FetcherConfig::default()
    };
    YoutubeFetcher::new(&config).unwrap()
}

#[tokio::test]
async fn test_fetches_generated_english_track() {
    let base = common::spawn_stub().await;

    let captions = fetcher(&base, &["en"]).fetch("abc123").await.unwrap();

    assert_eq!(
        captions,
        vec![
            RawCaption::new(0.0, 2.5, "Hello"),
            RawCaption::new(2.5, 1.0, "world"),
        ]
    );
}

#[tokio::test]
async fn test_language_preference_order() {
    let base = common::spawn_stub().await;

    let captions = fetcher(&base, &["fr", "de", "en"]).fetch("abc123").await.unwrap();

    assert_eq!(captions.len(), 2);
    assert_eq!(captions[0].text, "Hallo & willkommen");
    assert_eq!(captions[0].start, 0.5);
    assert_eq!(captions[0].duration, 1.75);
}

#[tokio::test]
async fn test_consent_page_is_accepted() {
    let base = common::spawn_stub().await;

    let captions = fetcher(&base, &["en"]).fetch("consent").await.unwrap();

    assert_eq!(captions.len(), 2);
}

#[tokio::test]
async fn test_failure_classification() {
    let base = common::spawn_stub().await;
    let fetcher = fetcher(&base, &["en"]);

    let cases = [
        ("captcha", ErrorKind::RateLimited),
        ("limited", ErrorKind::RateLimited),
        ("nocaps", ErrorKind::CaptionsDisabled),
        ("gone", ErrorKind::NotFound),
        ("private", ErrorKind::NotFound),
    ];

    for (video_id, expected) in cases {
        let err = fetcher.fetch(video_id).await.unwrap_err();
        assert_eq!(err.kind(), expected, "{}: {}", video_id, err);
    }
}

#[tokio::test]
async fn test_missing_language_is_captions_disabled() {
    let base = common::spawn_stub().await;

    let err = fetcher(&base, &["ja"]).fetch("abc123").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CaptionsDisabled);
    assert!(err.message().contains("[ja]"));
}

#[tokio::test]
async fn test_connection_failure_is_transport_error() {
    let base = common::closed_base_url().await;

    let err = fetcher(&base, &["en"]).fetch("abc123").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransportError);
}

#[tokio::test]
async fn test_normalize_end_to_end() {
    let base = common::spawn_stub().await;
    let fetcher = fetcher(&base, &["en"]);

    let response = normalize("abc123", &fetcher).await;

    match response {
        TranscriptResponse::Success(result) => {
            assert_eq!(result.full_text, "Hello world");
            assert_eq!(result.word_count, 2);
            assert_eq!(result.segments.len(), 2);
        }
        TranscriptResponse::Failure(err) => panic!("unexpected failure: {:?}", err),
    }

    let json = serde_json::to_value(normalize("nocaps", &fetcher).await).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["videoId"], "nocaps");
    assert_eq!(json["errorType"], "TranscriptsDisabled");
}
