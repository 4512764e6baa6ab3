//! Integration tests for the resource client and store using wiremock
//!
//! These tests verify mode-specific paths, auth headers, failure handling and
//! the store's refresh semantics against mocked endpoints.

use missionboard::api::{ApiConfig, ApiError, ApiMode, AuthHeader, ResourceClient};
use missionboard::health::{ApiStatus, HealthMonitor};
use missionboard::config::Config;
use missionboard::model::{NodeStatus, Tone};
use missionboard::resource::ResourceKind;
use missionboard::store::DataStore;
use serde_json::{json, Value};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, mode: ApiMode) -> ResourceClient {
    ResourceClient::new(ApiConfig {
        base_url: server.uri(),
        mode,
        namespace: "ops".to_string(),
        auth: None,
    })
    .unwrap()
}

async fn mount_json(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn k8s_mission() -> Value {
    json!({
        "metadata": {"name": "op-nightfall", "creationTimestamp": "2026-03-01T06:00:00Z"},
        "spec": {
            "missionType": "strike",
            "priority": "critical",
            "stages": [{"name": "ingress", "flightTasks": [{}, {}]}]
        },
        "status": {"phase": "Running"}
    })
}

fn k8s_node(name: &str) -> Value {
    json!({
        "metadata": {"name": name, "labels": {"node-role.kubernetes.io/control-plane": ""}},
        "status": {
            "conditions": [{"type": "Ready", "status": "True"}],
            "allocatable": {"cpu": "1", "memory": "1Gi", "pods": "110"}
        }
    })
}

/// Test module for resource client integration tests
mod client_tests {
    use super::*;

    /// Test k8s mode uses the custom resource path for the namespace
    #[tokio::test]
    async fn test_k8s_mode_fetches_custom_resource_path() {
        let server = MockServer::start().await;
        mount_json(
            &server,
            "/apis/airforce.airforce.mil/v1alpha1/namespaces/ops/missions",
            json!({"items": [k8s_mission()]}),
        )
        .await;

        let client = client_for(&server, ApiMode::K8s);
        let payload = assert_ok!(client.fetch(ResourceKind::Missions).await);
        assert_eq!(payload["items"][0]["metadata"]["name"], "op-nightfall");
    }

    /// Test gateway mode uses the simplified path
    #[tokio::test]
    async fn test_gateway_mode_fetches_simplified_path() {
        let server = MockServer::start().await;
        mount_json(&server, "/api/metrics/nodes", json!([])).await;

        let client = client_for(&server, ApiMode::Gateway);
        let payload = assert_ok!(client.fetch(ResourceKind::NodeMetrics).await);
        assert_eq!(payload, json!([]));
    }

    /// Test the configured auth header is sent with every request
    #[tokio::test]
    async fn test_auth_header_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/weapons"))
            .and(header("X-Mission-Token", "Token s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = ResourceClient::new(ApiConfig {
            base_url: server.uri(),
            mode: ApiMode::Gateway,
            namespace: "default".into(),
            auth: AuthHeader::from_parts("X-Mission-Token", "Token", "s3cret"),
        })
        .unwrap();

        assert_ok!(client.fetch(ResourceKind::Weapons).await);
    }

    /// Test non-success status codes become typed errors
    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/events"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = client_for(&server, ApiMode::Gateway);
        let err = assert_err!(client.fetch(ResourceKind::Events).await);
        assert!(matches!(err, ApiError::Status { status: 403 }));
        assert_eq!(err.to_string(), "HTTP 403");
    }

    /// Test empty 204 bodies decode to null
    #[tokio::test]
    async fn test_no_content_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/pods"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server, ApiMode::Gateway);
        let payload = assert_ok!(client.fetch(ResourceKind::Pods).await);
        assert_eq!(payload, Value::Null);
    }

    /// Test malformed JSON is a decode error
    #[tokio::test]
    async fn test_malformed_json_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stages"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let client = client_for(&server, ApiMode::Gateway);
        let err = assert_err!(client.fetch(ResourceKind::Stages).await);
        assert!(matches!(err, ApiError::Decode(_)));
    }

    /// Test slow responses are abandoned after the data timeout
    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/missions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, ApiMode::Gateway)
            .with_timeouts(Duration::from_millis(50), Duration::from_millis(50));
        let err = assert_err!(client.fetch(ResourceKind::Missions).await);
        assert!(matches!(err, ApiError::Timeout { timeout_ms: 50 }));
    }

    /// Test the health probe reports reachability
    #[tokio::test]
    async fn test_ping_ok_and_down() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/healthz"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let result = client_for(&server, ApiMode::K8s).ping().await;
        assert!(result.ok);
        assert_eq!(result.status, Some(200));

        let down = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/healthz"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&down)
            .await;

        let result = client_for(&down, ApiMode::K8s).ping().await;
        assert!(!result.ok);
        assert!(!result.disabled);
        assert_eq!(result.status, Some(503));
    }

    /// Test the health monitor turns ping results into statuses
    #[tokio::test]
    async fn test_health_monitor_states() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/healthz"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut monitor = HealthMonitor::new(&Config::default());
        let status = monitor.check(&client_for(&server, ApiMode::Gateway)).await;
        assert_eq!(status, ApiStatus::Down);
        assert_eq!(monitor.message, "HTTP 500");

        let healthy = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/healthz"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&healthy)
            .await;

        let status = monitor.check(&client_for(&healthy, ApiMode::Gateway)).await;
        assert_eq!(status, ApiStatus::Ok);
        assert!(monitor.message.is_empty());
    }
}

/// Test module for store refresh cycles
mod store_tests {
    use super::*;

    /// Test a full k8s refresh normalizes every resource
    #[tokio::test]
    async fn test_refresh_all_k8s() {
        let server = MockServer::start().await;
        let crd = "/apis/airforce.airforce.mil/v1alpha1/namespaces/ops";
        mount_json(&server, &format!("{}/missions", crd), json!({"items": [k8s_mission()]})).await;
        mount_json(&server, &format!("{}/missionstages", crd), json!({"items": []})).await;
        mount_json(&server, &format!("{}/flighttasks", crd), json!({"items": []})).await;
        mount_json(&server, &format!("{}/weapons", crd), json!({"items": []})).await;
        mount_json(&server, "/api/v1/nodes", json!({"items": [k8s_node("cp-1")]})).await;
        mount_json(
            &server,
            "/apis/metrics.k8s.io/v1beta1/nodes",
            json!({"items": [{"metadata": {"name": "cp-1"}, "usage": {"cpu": "500m", "memory": "512Mi"}}]}),
        )
        .await;
        mount_json(
            &server,
            "/api/v1/pods",
            json!({"items": [{"spec": {"nodeName": "cp-1"}, "status": {"phase": "Running"}}]}),
        )
        .await;
        mount_json(
            &server,
            "/api/v1/namespaces/ops/events",
            json!({"items": [{"metadata": {"namespace": "ops"}, "type": "Warning", "reason": "BackOff", "message": "retrying"}]}),
        )
        .await;

        let store = DataStore::new(client_for(&server, ApiMode::K8s), Duration::from_secs(10));
        store.refresh_all().await;
        let snapshot = store.snapshot().await;

        assert_eq!(snapshot.missions.data.len(), 1);
        assert_eq!(snapshot.missions.data[0].name, "op-nightfall");
        assert_eq!(snapshot.missions.data[0].priority, "Critical");
        assert_eq!(snapshot.missions.data[0].tasks, 2);
        assert!(snapshot.missions.error.is_none());

        let node = &snapshot.nodes.data[0];
        assert_eq!(node.status, NodeStatus::Ready);
        assert_eq!(node.cpu, 50);
        assert_eq!(node.memory, 50);
        assert_eq!(node.pods, "1 / 110");
        assert!(snapshot.nodes.error.is_none());

        assert_eq!(snapshot.events.data[0].level, Tone::Warn);
        assert_eq!(snapshot.events.data[0].message, "BackOff: retrying");
        assert!(snapshot.last_updated.is_some());
    }

    /// Test a failed refresh keeps the previous data and records the error
    #[tokio::test]
    async fn test_failed_refresh_keeps_stale_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/weapons"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "aim-120", "status": "Ready"}
            ])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/weapons"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let store = DataStore::new(client_for(&server, ApiMode::Gateway), Duration::from_secs(10));

        store.refresh_all().await;
        let first = store.snapshot().await;
        assert_eq!(first.weapons.data.len(), 1);
        assert!(first.weapons.error.is_none());
        // unmounted gateway paths return 404
        assert_eq!(first.missions.error.as_deref(), Some("HTTP 404"));

        store.refresh_all().await;
        let second = store.snapshot().await;
        assert_eq!(second.weapons.data.len(), 1);
        assert_eq!(second.weapons.data[0].name, "aim-120");
        assert_eq!(second.weapons.error.as_deref(), Some("HTTP 502"));
        assert!(!second.weapons.loading);
    }

    /// Test auxiliary node failures degrade columns and combine into one warning
    #[tokio::test]
    async fn test_node_auxiliary_failures_are_advisory() {
        let server = MockServer::start().await;
        mount_json(&server, "/api/v1/nodes", json!({"items": [k8s_node("worker-1")]})).await;
        Mock::given(method("GET"))
            .and(path("/apis/metrics.k8s.io/v1beta1/nodes"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/pods"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let store = DataStore::new(client_for(&server, ApiMode::K8s), Duration::from_secs(10));
        store.refresh_all().await;
        let snapshot = store.snapshot().await;

        assert_eq!(snapshot.nodes.data.len(), 1);
        let node = &snapshot.nodes.data[0];
        assert_eq!(node.cpu, 0);
        assert_eq!(node.pods, "-- / 110");
        assert_eq!(
            snapshot.nodes.error.as_deref(),
            Some("node-metrics: HTTP 404; pods: HTTP 403")
        );
    }

    /// Test a failed primary node fetch skips the auxiliary fetches
    #[tokio::test]
    async fn test_node_primary_failure_skips_auxiliary() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/nodes"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/pods"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let store = DataStore::new(client_for(&server, ApiMode::Gateway), Duration::from_secs(10));
        store.refresh_all().await;

        let snapshot = store.snapshot().await;
        assert!(snapshot.nodes.data.is_empty());
        assert_eq!(snapshot.nodes.error.as_deref(), Some("HTTP 500"));
    }
}
