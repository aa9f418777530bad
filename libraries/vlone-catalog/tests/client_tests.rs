//! Tests for the catalog client.
//!
//! These tests use mock servers to verify client behavior without
//! requiring a real catalog connection.

use serde_json::json;
use std::time::Duration;
use vlone_catalog::{
    check_status, CatalogClientError, CatalogConfig, HealthMonitor, HttpCatalogClient,
};
use vlone_core::{CatalogClient, SearchQuery, TrackId, VloneError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpCatalogClient {
    HttpCatalogClient::new(CatalogConfig::new(server.uri())).unwrap()
}

fn song(id: u64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "credited_artists": "Juice WRLD",
        "era": "DRFL",
        "length": "2:30",
        "path": format!("Unreleased/{name}.mp3"),
    })
}

// =============================================================================
// Track Lookup Tests
// =============================================================================

mod fetch_track {
    use super::*;

    #[tokio::test]
    async fn test_fetch_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs/1042"))
            .respond_with(ResponseTemplate::new(200).set_body_json(song(1042, "Lucid")))
            .expect(1)
            .mount(&server)
            .await;

        let track = client_for(&server)
            .fetch_track(&TrackId::new("1042"))
            .await
            .unwrap();

        assert_eq!(track.id.as_str(), "1042");
        assert_eq!(track.title, "Lucid");
        assert_eq!(track.duration_secs, 150.0);
        assert!(track.media_url.starts_with(&server.uri()));
        assert!(track.media_url.contains("/files/download/?path="));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs/404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_track(&TrackId::new("404"))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs/1"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_track(&TrackId::new("1"))
            .await
            .unwrap_err();

        assert!(matches!(err, VloneError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_song(&TrackId::new("1"))
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogClientError::ParseError(_)));
    }
}

// =============================================================================
// Radio Tests
// =============================================================================

mod radio {
    use super::*;

    #[tokio::test]
    async fn test_random_track() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/radio/random/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(song(7, "Random")))
            .mount(&server)
            .await;

        let track = client_for(&server).fetch_random_track().await.unwrap();

        assert_eq!(track.id.as_str(), "7");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        // Nothing listens on the discard port
        let client = HttpCatalogClient::new(CatalogConfig {
            timeout: Duration::from_secs(2),
            ..CatalogConfig::new("http://127.0.0.1:9")
        })
        .unwrap();

        let err = client.fetch_random_track().await.unwrap_err();

        assert!(matches!(err, VloneError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/radio/random/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(song(7, "Slow"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = HttpCatalogClient::new(CatalogConfig {
            timeout: Duration::from_millis(100),
            ..CatalogConfig::new(server.uri())
        })
        .unwrap();

        let err = client.get_random_song().await.unwrap_err();
        assert!(matches!(err, CatalogClientError::ServerUnreachable(_)));
    }
}

// =============================================================================
// Search Tests
// =============================================================================

mod search {
    use super::*;

    #[tokio::test]
    async fn test_search_sends_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs/"))
            .and(query_param("search", "lucid dreams"))
            .and(query_param("era", "DRFL"))
            .and(query_param("searchall", "Nick Mira"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 41,
                "results": [song(1, "a"), {"name": "no id"}, song(2, "b")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = SearchQuery {
            search: Some("lucid dreams".into()),
            era: Some("DRFL".into()),
            producer: Some("Nick Mira".into()),
            page: Some(2),
            ..SearchQuery::default()
        };
        let page = client_for(&server).search_tracks(&query).await.unwrap();

        assert_eq!(page.total, 41);
        let ids: Vec<&str> = page.items.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/songs/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let page = client_for(&server)
            .search_tracks(&SearchQuery::default())
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
    }
}

// =============================================================================
// Browse Tests
// =============================================================================

mod browse {
    use super::*;

    #[tokio::test]
    async fn test_eras_and_categories() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/eras"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "DRFL", "year": "2018"},
                {"name": "WOD"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "Released", "count": 120, "slug": "released"}
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let eras = client.get_eras().await.unwrap();
        let categories = client.get_categories().await.unwrap();

        assert_eq!(eras.len(), 2);
        assert_eq!(eras[0].year.as_deref(), Some("2018"));
        assert_eq!(categories[0].slug, "released");
    }
}

// =============================================================================
// Health Tests
// =============================================================================

mod health {
    use super::*;

    #[tokio::test]
    async fn test_online_via_stats() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_songs": 2500,
                "total_duration": 500000.0,
                "categories_count": 6,
                "eras_count": 12
            })))
            .mount(&server)
            .await;

        let status = check_status(&client_for(&server)).await;

        assert!(status.is_online());
        assert_eq!(status.total_tracks, 2500);
        assert_eq!(status.stats.map(|s| s.eras_count), Some(12));
    }

    #[tokio::test]
    async fn test_fallback_to_song_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/songs/"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "count": 99,
                "results": []
            })))
            .mount(&server)
            .await;

        let status = check_status(&client_for(&server)).await;

        assert!(status.is_online());
        assert_eq!(status.total_tracks, 99);
        assert!(status.stats.is_none());
    }

    #[tokio::test]
    async fn test_offline_when_everything_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let status = check_status(&client_for(&server)).await;

        assert_eq!(status.online, Some(false));
        assert_eq!(status.latency_ms, 0);
    }

    #[tokio::test]
    async fn test_monitor_publishes_first_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total_songs": 3})))
            .mount(&server)
            .await;

        let monitor = HealthMonitor::spawn(client_for(&server));
        let mut rx = monitor.subscribe();

        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.online.is_some()))
            .await
            .expect("health check timed out")
            .unwrap();

        assert!(monitor.status().is_online());
        assert_eq!(monitor.status().total_tracks, 3);
    }
}
