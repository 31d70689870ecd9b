//! Server Tests - End-to-end HTTP Surface
//!
//! Binds the metrics server on an ephemeral port and drives it with
//! reqwest: watch a monitor, post heartbeats, scrape, unwatch.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::broadcast;

use monitor_metrics_exporter::adapters::metrics::{MetricsServer, PrometheusGauges};
use monitor_metrics_exporter::adapters::persistence::JsonlTagStore;
use monitor_metrics_exporter::ports::{GaugeSink, TagStore};
use monitor_metrics_exporter::usecases::{MetricsContext, MonitorMetricsService};

struct Harness {
    base: String,
    service: MonitorMetricsService,
    client: reqwest::Client,
    shutdown_tx: broadcast::Sender<()>,
}

async fn start(name: &str) -> Harness {
    let data_dir = std::env::temp_dir().join(format!(
        "monitor-metrics-server-{name}-{}",
        std::process::id()
    ));
    tokio::fs::create_dir_all(&data_dir).await.unwrap();
    tokio::fs::write(
        data_dir.join("tags.jsonl"),
        "{\"id\": 1, \"name\": \"region\"}\n{\"id\": 2, \"name\": \"team\"}\n",
    )
    .await
    .unwrap();
    tokio::fs::write(
        data_dir.join("monitor_tags.jsonl"),
        concat!(
            "{\"monitor_id\": 1, \"tag_id\": 1, \"value\": \"eu-west-1\"}\n",
            "{\"monitor_id\": 1, \"tag_id\": 2, \"value\": \"payments\"}\n",
        ),
    )
    .await
    .unwrap();

    let gauges = Arc::new(PrometheusGauges::new(&["team".to_string()]).unwrap());
    let tags: Arc<dyn TagStore> = Arc::new(JsonlTagStore::new(&data_dir));
    let ctx = MetricsContext::new(
        Arc::clone(&tags),
        Arc::clone(&gauges) as Arc<dyn GaugeSink>,
        Duration::from_secs(2),
    );
    let service = MonitorMetricsService::new(ctx, 16);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let server = MetricsServer::new(service.clone(), gauges, tags, "unused");
    tokio::spawn(server.serve(listener, shutdown_rx));

    Harness {
        base,
        service,
        client: reqwest::Client::new(),
        shutdown_tx,
    }
}

async fn wait_active(service: &MonitorMetricsService, id: u64) {
    for _ in 0..100 {
        if service.is_active(id).await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("monitor {id} never became active");
}

#[tokio::test]
async fn test_watch_heartbeat_scrape_unwatch() {
    let h = start("lifecycle").await;

    let resp = h
        .client
        .post(format!("{}/monitors", h.base))
        .json(&serde_json::json!({
            "id": 1,
            "name": "payments-api",
            "type": "http",
            "url": "https://pay.example.com"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::ACCEPTED);
    wait_active(&h.service, 1).await;

    let resp = h
        .client
        .post(format!("{}/monitors/1/heartbeats", h.base))
        .json(&serde_json::json!({
            "heartbeat": {"status": 1, "ping": 87.5},
            "tls": {"valid": true, "certInfo": {"daysRemaining": 41}}
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::ACCEPTED);

    let body = h
        .client
        .get(format!("{}/metrics", h.base))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("monitor_name=\"payments-api\""));
    assert!(body.contains("region=\"eu-west-1\""));
    assert!(body.contains("team=\"payments\""));
    assert!(body
        .lines()
        .any(|l| l.starts_with("monitor_cert_days_remaining{") && l.ends_with(" 41")));
    assert!(body
        .lines()
        .any(|l| l.starts_with("monitor_response_time{") && l.ends_with(" 87.5")));

    let resp = h
        .client
        .delete(format!("{}/monitors/1", h.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NO_CONTENT);

    let body = h
        .client
        .get(format!("{}/metrics", h.base))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(!body.contains("payments-api"));

    let _ = h.shutdown_tx.send(());
}

#[tokio::test]
async fn test_unknown_monitor_routes_return_not_found() {
    let h = start("unknown").await;

    let resp = h
        .client
        .post(format!("{}/monitors/404/heartbeats", h.base))
        .json(&serde_json::json!({"heartbeat": {"status": 0}}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

    let resp = h
        .client
        .delete(format!("{}/monitors/404", h.base))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

    let _ = h.shutdown_tx.send(());
}

#[tokio::test]
async fn test_health_endpoints() {
    let h = start("health").await;

    let live = h.client.get(format!("{}/live", h.base)).send().await.unwrap();
    assert_eq!(live.status(), reqwest::StatusCode::OK);

    let ready = h.client.get(format!("{}/ready", h.base)).send().await.unwrap();
    assert_eq!(ready.status(), reqwest::StatusCode::OK);

    let _ = h.shutdown_tx.send(());
}
