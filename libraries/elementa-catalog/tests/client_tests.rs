//! Tests for the catalog client against a mock service.

use elementa_catalog::{CatalogClient, CatalogConfig, CatalogError, CatalogSource, ItemRegistry};
use elementa_core::{AssetId, AudioReference, ItemId};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const APP_KEY: &str = "test-app-key";

fn client_for(server: &MockServer) -> CatalogClient {
    CatalogClient::new(CatalogConfig::new(server.uri(), APP_KEY)).expect("valid client")
}

fn sample_body() -> serde_json::Value {
    json!({
        "success": true,
        "data": [
            {
                "name": "Hydrogen",
                "symbol": "H",
                "number": "1",
                "category": "diatomic nonmetal",
                "atomic_mass": "1.008",
                "electron_configuration": "1s1",
                "discovered_by": "Henry Cavendish",
                "phase": "Gas",
                "density": 0.08988,
                "summary": "Lightest element.",
                "xpos": 1,
                "ypos": 1,
                "audio_url": "local:introduction",
                "malayalam_name": "ഹൈഡ്രജൻ"
            },
            {
                "name": "Helium",
                "symbol": "He",
                "number": 2,
                "category": null,
                "atomic_mass": 4.0026,
                "electron_configuration": "1s2",
                "discovered_by": "Pierre Janssen",
                "phase": "Gas",
                "density": "0.1786",
                "summary": "Noble gas.",
                "xpos": "18",
                "ypos": "1",
                "audio_url": "https://cdn.example.org/helium.mp3"
            }
        ]
    })
}

// =============================================================================
// Client Creation Tests
// =============================================================================

mod client_creation {
    use super::*;

    #[test]
    fn test_valid_https_url() {
        let client = CatalogClient::new(CatalogConfig::new("https://example.org", APP_KEY));
        assert!(client.is_ok());
    }

    #[test]
    fn test_trailing_slash_stripped() {
        let client =
            CatalogClient::new(CatalogConfig::new("https://example.org///", APP_KEY)).unwrap();
        assert_eq!(client.base_url(), "https://example.org");
    }

    #[test]
    fn test_empty_url_rejected() {
        let result = CatalogClient::new(CatalogConfig::new("", APP_KEY));

        match result.unwrap_err() {
            CatalogError::InvalidUrl(msg) => assert!(msg.contains("empty")),
            other => panic!("Expected InvalidUrl error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_scheme_rejected() {
        let result = CatalogClient::new(CatalogConfig::new("example.org", APP_KEY));
        assert!(matches!(result, Err(CatalogError::InvalidUrl(_))));
    }
}

// =============================================================================
// Fetch Tests
// =============================================================================

mod fetch {
    use super::*;

    #[tokio::test]
    async fn test_fetch_sends_app_key_and_normalizes() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/elements"))
            .and(header("X-APP-KEY", APP_KEY))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .expect(1)
            .mount(&server)
            .await;

        let items = client_for(&server).fetch_items().await.unwrap();

        assert_eq!(items.len(), 2);

        let hydrogen = &items[0];
        assert_eq!(hydrogen.id, ItemId::new(1));
        assert_eq!(hydrogen.atomic_mass, 1.008);
        assert_eq!(
            hydrogen.audio,
            Some(AudioReference::Local(AssetId::Introduction))
        );
        assert_eq!(hydrogen.localized_name.as_deref(), Some("ഹൈഡ്രജൻ"));

        let helium = &items[1];
        assert_eq!(helium.id, ItemId::new(2));
        assert_eq!(helium.category, "unknown");
        assert_eq!(helium.density, 0.1786);
        assert_eq!(helium.position.x, 18);
        assert_eq!(helium.localized_name, None);
        assert!(matches!(helium.audio, Some(AudioReference::Remote(_))));
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/elements"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        match client_for(&server).fetch_items().await.unwrap_err() {
            CatalogError::Server { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "bad key");
            }
            other => panic!("Expected Server error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unsuccessful_envelope_rejected() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/elements"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": false, "data": [] })),
            )
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_items().await;
        assert!(matches!(result, Err(CatalogError::Rejected)));
    }

    #[tokio::test]
    async fn test_garbage_body_is_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/elements"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_items().await;
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[tokio::test]
    async fn test_missing_data_is_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/elements"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .mount(&server)
            .await;

        let items = client_for(&server).fetch_items().await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_slow_server_is_unreachable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/elements"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(sample_body())
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let config =
            CatalogConfig::new(server.uri(), APP_KEY).with_timeout(Duration::from_millis(200));
        let client = CatalogClient::new(config).unwrap();

        let result = client.fetch_items().await;
        assert!(matches!(result, Err(CatalogError::Unreachable(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_unreachable() {
        // Nothing listens on port 9 of localhost in the test environment
        let client = CatalogClient::new(CatalogConfig::new("http://127.0.0.1:9", APP_KEY)).unwrap();

        let result = client.fetch_items().await;
        assert!(matches!(result, Err(CatalogError::Unreachable(_))));
    }
}

// =============================================================================
// Registry Refresh Tests
// =============================================================================

mod registry_refresh {
    use super::*;

    #[tokio::test]
    async fn test_refresh_from_client() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/elements"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut registry = ItemRegistry::new();

        let count = registry.refresh(&client).await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(registry.get(ItemId::new(2)).unwrap().name, "Helium");
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_empty_registry() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/elements"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let source: &dyn CatalogSource = &client;

        let mut registry = ItemRegistry::new();
        assert!(registry.refresh(source).await.is_err());
        assert!(registry.is_empty());
        assert!(registry.is_loaded());
    }
}
