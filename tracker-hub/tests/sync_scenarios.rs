//! End-to-end sync scenarios: a real hub on an ephemeral port, viewers
//! connected over HTTP + WebSocket.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use shared::{
    ChannelEvent, OrderSnapshot, RejectionCode, RejectionPayload, Stage, StatusIntent,
    UpdateStatusPayload, ViewRole,
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracker_client::{
    ChannelConnector, ChannelHandle, ClientConfig, ClientResult, ConnectorFill, HttpClient,
    Screen, SessionControls, SnapshotSource, ViewModel, ViewerSession, WsConnector,
};
use tracker_hub::{Config, Server, ServerState};

const WAIT: Duration = Duration::from_secs(5);

struct TestHub {
    addr: SocketAddr,
    state: ServerState,
}

impl TestHub {
    async fn start() -> Self {
        let config = Config::with_overrides("127.0.0.1", 0);
        let state = ServerState::initialize(&config);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = Server::with_state(config, state.clone());
        tokio::spawn(async move {
            server
                .serve(listener, std::future::pending::<()>())
                .await
                .unwrap();
        });

        Self { addr, state }
    }

    fn client_config(&self, order_id: &str) -> ClientConfig {
        ClientConfig::new(format!("http://{}", self.addr))
            .with_order_id(order_id)
            .with_storefront("Test Kitchen")
    }

    /// Wait until `n` viewers are subscribed to broadcasts
    async fn wait_for_viewers(&self, n: usize) {
        timeout(WAIT, async {
            while self.state.message_bus().connected_count() < n {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("viewers did not connect");
    }
}

impl Drop for TestHub {
    fn drop(&mut self) {
        self.state.message_bus().shutdown();
    }
}

struct Viewer {
    controls: SessionControls,
    views: watch::Receiver<ViewModel>,
    shutdown: CancellationToken,
}

impl Viewer {
    async fn mount(hub: &TestHub, order_id: &str, role: ViewRole) -> Self {
        let config = hub.client_config(order_id);
        let http = HttpClient::new(&config).unwrap();
        let connector = WsConnector::from_config(&config);
        let session = ViewerSession::mount(&config, role, &connector, &http)
            .await
            .unwrap();

        let controls = session.controls();
        let views = session.views();
        let shutdown = CancellationToken::new();
        tokio::spawn(session.run(shutdown.clone()));

        Self {
            controls,
            views,
            shutdown,
        }
    }

    fn current(&self) -> ViewModel {
        self.views.borrow().clone()
    }

    async fn wait_until(&mut self, predicate: impl FnMut(&ViewModel) -> bool) -> ViewModel {
        timeout(WAIT, self.views.wait_for(predicate))
            .await
            .expect("view did not converge")
            .expect("session ended")
            .clone()
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn current_index(view: &ViewModel) -> Option<usize> {
    view.screen.steps().iter().position(|s| s.is_current)
}

/// Next rejection on a raw channel; snapshot frames are skipped
async fn next_rejection(channel: &mut ChannelHandle) -> RejectionPayload {
    timeout(WAIT, async {
        loop {
            match channel.recv().await {
                Some(ChannelEvent::StatusRejected(rejection)) => return rejection,
                Some(_) => continue,
                None => panic!("channel closed"),
            }
        }
    })
    .await
    .expect("no rejection received")
}

/// Pull source that answers with the zero state whatever the hub holds
struct StaleSource;

#[async_trait]
impl SnapshotSource for StaleSource {
    async fn pull(&self, _order_id: &str) -> ClientResult<OrderSnapshot> {
        Ok(OrderSnapshot::zero_state())
    }
}

#[tokio::test]
async fn test_unknown_order_shows_place_order() {
    let hub = TestHub::start().await;
    let customer = Viewer::mount(&hub, "fresh", ViewRole::Customer).await;

    let view = customer.current();
    assert_eq!(
        view.screen,
        Screen::PlaceOrder {
            banner: "Test Kitchen".to_string(),
            action_label: "Place My Order Now",
        }
    );

    let http = HttpClient::new(&hub.client_config("fresh")).unwrap();
    let snapshot = http.fetch_snapshot("fresh").await.unwrap();
    assert!(snapshot.is_zero_state());
}

#[tokio::test]
async fn test_place_order_reaches_every_viewer() {
    let hub = TestHub::start().await;
    let mut customer = Viewer::mount(&hub, "123", ViewRole::Customer).await;
    let mut admin = Viewer::mount(&hub, "123", ViewRole::Admin).await;
    hub.wait_for_viewers(2).await;

    customer.controls.place_order().await.unwrap();

    let customer_view = customer
        .wait_until(|v| matches!(v.screen, Screen::Tracker { .. }))
        .await;
    assert_eq!(current_index(&customer_view), Some(0));
    assert!(customer_view.screen.steps()[0].has_time);

    let admin_view = admin.wait_until(|v| v.screen.steps()[0].has_time).await;
    assert_eq!(current_index(&admin_view), Some(0));
    assert_eq!(
        admin_view.screen.steps()[0].time_text,
        customer_view.screen.steps()[0].time_text
    );

    let snapshot = hub.state.store().snapshot("123");
    assert!(snapshot.is_ordered);
    assert_eq!(snapshot.status, "Order Placed");
    assert_eq!(snapshot.stage_times.len(), 1);
}

#[tokio::test]
async fn test_admin_advance_converges_customer() {
    let hub = TestHub::start().await;
    let mut customer = Viewer::mount(&hub, "123", ViewRole::Customer).await;
    let mut admin = Viewer::mount(&hub, "123", ViewRole::Admin).await;
    hub.wait_for_viewers(2).await;

    admin.controls.advance(Stage::Delivered).await.unwrap();

    for viewer in [&mut customer, &mut admin] {
        let view = viewer.wait_until(|v| current_index(v) == Some(3)).await;
        let steps = view.screen.steps();
        assert!(steps[3].has_time);
        assert!(steps.iter().all(|s| s.is_active));
        assert!(
            steps
                .iter()
                .filter_map(|s| s.connector)
                .all(|c| c == ConnectorFill::Full)
        );
    }
}

#[tokio::test]
async fn test_reset_reverts_every_viewer() {
    let hub = TestHub::start().await;
    let mut customer = Viewer::mount(&hub, "123", ViewRole::Customer).await;
    let mut admin = Viewer::mount(&hub, "123", ViewRole::Admin).await;
    hub.wait_for_viewers(2).await;

    admin.controls.advance(Stage::OutForDelivery).await.unwrap();
    customer.wait_until(|v| current_index(v) == Some(2)).await;

    admin.controls.reset().await.unwrap();

    let view = customer.wait_until(|v| v.screen.is_place_order()).await;
    assert!(view.screen.steps().is_empty());
    let view = admin
        .wait_until(|v| v.screen.steps().iter().all(|s| !s.has_time))
        .await;
    assert_eq!(current_index(&view), Some(0));

    assert!(hub.state.store().snapshot("123").is_zero_state());
}

#[tokio::test]
async fn test_late_viewer_pulls_current_state() {
    let hub = TestHub::start().await;
    let mut admin = Viewer::mount(&hub, "123", ViewRole::Admin).await;
    hub.wait_for_viewers(1).await;

    admin.controls.advance(Stage::Preparing).await.unwrap();
    admin.wait_until(|v| current_index(v) == Some(1)).await;

    let late = Viewer::mount(&hub, "123", ViewRole::Customer).await;
    assert_eq!(current_index(&late.current()), Some(1));
}

#[tokio::test]
async fn test_invalid_stage_is_rejected_to_sender_only() {
    let hub = TestHub::start().await;
    let mut customer = Viewer::mount(&hub, "123", ViewRole::Customer).await;
    customer.controls.place_order().await.unwrap();
    customer
        .wait_until(|v| matches!(v.screen, Screen::Tracker { .. }))
        .await;

    let config = hub.client_config("123");
    let mut raw = WsConnector::from_config(&config).connect().await.unwrap();
    raw.send(ChannelEvent::UpdateStatus(UpdateStatusPayload {
        order_id: "123".to_string(),
        new_status: "Burnt".to_string(),
    }))
    .await
    .unwrap();

    let rejection = next_rejection(&mut raw).await;
    assert_eq!(rejection.code, RejectionCode::InvalidStage);
    assert_eq!(rejection.new_status, "Burnt");

    let snapshot = hub.state.store().snapshot("123");
    assert_eq!(snapshot.status, "Order Placed");
    assert!(customer.views.has_changed().is_ok_and(|changed| !changed));
}

#[tokio::test]
async fn test_malformed_frame_is_rejected() {
    let hub = TestHub::start().await;
    let config = hub.client_config("123");
    let mut raw = WsConnector::from_config(&config).connect().await.unwrap();

    // Empty order id passes decoding but fails validation
    raw.send(ChannelEvent::UpdateStatus(UpdateStatusPayload {
        order_id: String::new(),
        new_status: "Preparing".to_string(),
    }))
    .await
    .unwrap();

    let rejection = next_rejection(&mut raw).await;
    assert_eq!(rejection.code, RejectionCode::MalformedIntent);
    assert!(hub.state.store().is_empty());
}

#[tokio::test]
async fn test_new_channel_receives_current_snapshots() {
    let hub = TestHub::start().await;
    // Applied with nobody connected, so no broadcast carries it
    hub.state.store().apply_at(
        "123",
        StatusIntent::Advance(Stage::OutForDelivery),
        "10:30 AM",
    );

    let config = hub.client_config("123");
    let mut raw = WsConnector::from_config(&config).connect().await.unwrap();

    let event = timeout(WAIT, raw.recv()).await.unwrap().unwrap();
    let ChannelEvent::ReceiveStatus(payload) = event else {
        panic!("expected receive_status");
    };
    assert_eq!(payload.order_id.as_deref(), Some("123"));
    assert!(payload.is_ordered);
    assert_eq!(payload.new_status, "Out for Delivery");
    assert_eq!(
        payload.stage_times.get("Out for Delivery").map(String::as_str),
        Some("10:30 AM")
    );
}

#[tokio::test]
async fn test_viewer_with_stale_pull_converges_without_new_intent() {
    let hub = TestHub::start().await;
    hub.state
        .store()
        .apply_at("123", StatusIntent::Advance(Stage::Preparing), "10:05 AM");

    // The pull misses the state, as if it raced ahead of the subscription
    let config = hub.client_config("123");
    let connector = WsConnector::from_config(&config);
    let session = ViewerSession::mount(&config, ViewRole::Customer, &connector, &StaleSource)
        .await
        .unwrap();
    assert!(session.view().screen.is_place_order());

    let mut views = session.views();
    let shutdown = CancellationToken::new();
    tokio::spawn(session.run(shutdown.clone()));

    let view = timeout(WAIT, views.wait_for(|v| current_index(v) == Some(1)))
        .await
        .expect("view did not converge")
        .expect("session ended")
        .clone();
    assert!(view.screen.steps()[1].has_time);
    shutdown.cancel();
}

#[tokio::test]
async fn test_orders_are_isolated() {
    let hub = TestHub::start().await;
    let mut first = Viewer::mount(&hub, "a", ViewRole::Admin).await;
    let other = Viewer::mount(&hub, "b", ViewRole::Customer).await;
    hub.wait_for_viewers(2).await;

    first.controls.advance(Stage::Delivered).await.unwrap();
    first.wait_until(|v| current_index(v) == Some(3)).await;

    // A broadcast for "a" has been delivered; give "b" a moment to apply it if it would
    sleep(Duration::from_millis(100)).await;
    assert!(other.current().screen.is_place_order());
}

#[tokio::test]
async fn test_health_reports_viewers_and_orders() {
    let hub = TestHub::start().await;
    let mut admin = Viewer::mount(&hub, "123", ViewRole::Admin).await;
    hub.wait_for_viewers(1).await;
    admin.controls.place_order().await.unwrap();
    admin.wait_until(|v| v.screen.steps()[0].has_time).await;

    let http = HttpClient::new(&hub.client_config("123")).unwrap();
    let health: serde_json::Value = http.get(&["health"]).await.unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["connectedViewers"], 1);
    assert_eq!(health["orders"], 1);
}
