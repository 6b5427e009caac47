mod support;

use chrono::{Duration as ChronoDuration, Utc};
use fleet_tracker::adapters::outbound::{init_noop_logger, InMemoryDataStore};
use fleet_tracker::application::TrackingView;
use fleet_tracker::common::DomainError;
use fleet_tracker::domains::agent_tracking::{DataStore, LocationRow};
use fleet_tracker::domains::geodesy::GeoPoint;
use fleet_tracker::domains::route_simulation::{PlaybackState, RouteSimulator};
use fleet_tracker::domains::{ConnectionStatus, RenderSink};
use fleet_tracker::Config;
use std::sync::Arc;
use std::time::Duration;
use support::{BridgeCapture, CaptureSink, StaticRouting};

const TABLE: &str = "rider_locations";

fn row(agent_id: &str, lat: f64, lng: f64) -> LocationRow {
    LocationRow {
        rider_id: Some(agent_id.to_string()),
        lat: Some(lat),
        lng: Some(lng),
        last_updated: Some(Utc::now()),
    }
}

async fn open_view(store: &Arc<InMemoryDataStore>, sink: &Arc<CaptureSink>) -> TrackingView {
    TrackingView::open(
        &Config::default(),
        store.clone() as Arc<dyn DataStore>,
        sink.clone() as Arc<dyn RenderSink>,
        init_noop_logger(),
    )
    .await
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_view_seeds_then_follows_live_feed() {
    let store = Arc::new(InMemoryDataStore::new());
    store
        .insert_rows(TABLE, vec![row("a", 12.0, 77.0), row("b", 13.0, 78.0)])
        .await;
    let sink = Arc::new(CaptureSink::default());

    let view = open_view(&store, &sink).await;
    assert_eq!(view.snapshot().await.len(), 2);
    assert_eq!(
        *sink.connection.lock().unwrap(),
        vec![ConnectionStatus::Connecting, ConnectionStatus::Connected]
    );
    assert_eq!(store.subscriber_count(TABLE).await, 1);

    store.publish(TABLE, row("a", 12.001, 77.0)).await.unwrap();
    store
        .publish(
            TABLE,
            LocationRow {
                rider_id: Some("c".into()),
                lat: None,
                lng: Some(1.0),
                last_updated: None,
            },
        )
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let states = view.snapshot().await;
    assert_eq!(states.len(), 2);
    assert_eq!(states["a"].path.len(), 2);
    assert_eq!(states["a"].current.position(), GeoPoint::new(12.001, 77.0));
    assert!(!sink.positions_of("b").is_empty());
    assert!(sink.paths.lock().unwrap().iter().any(|(id, path)| id == "a" && path.len() == 2));

    view.close().await.unwrap();
    assert_eq!(store.subscriber_count(TABLE).await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_view_reports_feed_loss() {
    let store = Arc::new(InMemoryDataStore::new());
    let sink = Arc::new(CaptureSink::default());
    let view = open_view(&store, &sink).await;

    store.close_feed(TABLE).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(sink.last_connection(), Some(ConnectionStatus::Disconnected));

    // Further rows never reach the view.
    store.publish(TABLE, row("late", 1.0, 1.0)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(view.snapshot().await.is_empty());

    view.close().await.unwrap();
    assert_eq!(store.subscriber_count(TABLE).await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_closed_view_renders_nothing_more() {
    let store = Arc::new(InMemoryDataStore::new());
    store.insert_rows(TABLE, vec![row("a", 0.0, 0.0)]).await;
    let sink = Arc::new(CaptureSink::default());
    let view = open_view(&store, &sink).await;

    store.publish(TABLE, row("a", 0.0, 0.01)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    view.close().await.unwrap();
    tokio::time::sleep(Duration::from_millis(1)).await;

    let positions = sink.positions.lock().unwrap().len();
    let presence = sink.presence.lock().unwrap().len();
    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(sink.positions.lock().unwrap().len(), positions);
    assert_eq!(sink.presence.lock().unwrap().len(), presence);
}

#[tokio::test(start_paused = true)]
async fn test_selection_filters_visible_agents() {
    let store = Arc::new(InMemoryDataStore::new());
    store
        .insert_rows(TABLE, vec![row("b", 13.0, 78.0), row("a", 12.0, 77.0)])
        .await;
    let sink = Arc::new(CaptureSink::default());
    let mut view = open_view(&store, &sink).await;

    let all: Vec<String> = view
        .visible_agents()
        .await
        .iter()
        .map(|s| s.agent_id().to_string())
        .collect();
    assert_eq!(all, vec!["a", "b"]);
    assert_eq!(view.focus_center().await, None);

    view.select_agent(Some("b".to_string()));
    assert_eq!(view.selected_agent(), Some("b"));
    assert_eq!(view.visible_agents().await.len(), 1);
    assert_eq!(view.focus_center().await, Some(GeoPoint::new(13.0, 78.0)));

    view.select_agent(Some("nobody".to_string()));
    assert!(view.visible_agents().await.is_empty());
    assert_eq!(view.focus_center().await, None);

    view.select_agent(None);
    assert_eq!(view.visible_agents().await.len(), 2);

    assert_eq!(view.agent("a").await.unwrap().current.position(), GeoPoint::new(12.0, 77.0));
    assert!(matches!(
        view.agent("nobody").await,
        Err(DomainError::AgentNotFound { .. })
    ));

    view.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_presence_of_seeded_agents() {
    let store = Arc::new(InMemoryDataStore::new());
    let mut stale = row("stale", 1.0, 1.0);
    stale.last_updated = Some(Utc::now() - ChronoDuration::minutes(20));
    store.insert_rows(TABLE, vec![stale, row("fresh", 2.0, 2.0)]).await;
    let sink = Arc::new(CaptureSink::default());
    let view = open_view(&store, &sink).await;

    let presence = view.presence(Utc::now()).await;
    assert_eq!(presence.get("fresh"), Some(&true));
    assert_eq!(presence.get("stale"), Some(&false));

    tokio::time::sleep(Duration::from_millis(10)).await;
    let rendered = sink.presence.lock().unwrap().last().cloned().unwrap();
    assert_eq!(rendered, presence);

    view.close().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_simulated_courier_arrives_on_the_map() {
    let store = Arc::new(InMemoryDataStore::new());
    let sink = Arc::new(CaptureSink::default());
    let bridge = Arc::new(BridgeCapture::new());
    let view = TrackingView::open(
        &Config::default(),
        store.clone() as Arc<dyn DataStore>,
        sink.clone() as Arc<dyn RenderSink>,
        bridge.clone(),
    )
    .await
    .unwrap();

    let config = Config::default();
    let simulator = RouteSimulator::new(
        Arc::new(StaticRouting::with(vec![
            GeoPoint::new(12.0, 77.0),
            GeoPoint::new(12.01, 77.01),
        ])),
        store.clone() as Arc<dyn DataStore>,
        config.simulation_settings(),
        bridge.clone(),
    );

    let report = simulator
        .run(GeoPoint::new(12.0, 77.0), GeoPoint::new(12.01, 77.01))
        .await
        .unwrap();
    assert_eq!(report.state, PlaybackState::Finished);

    tokio::time::sleep(Duration::from_millis(3100)).await;

    let agent = &config.simulation.agent_id;
    let states = view.snapshot().await;
    assert_eq!(states[agent].path.len(), 21);
    assert_eq!(states[agent].current.position(), GeoPoint::new(12.01, 77.01));
    assert_eq!(view.presence(Utc::now()).await.get(agent), Some(&true));

    let last = *sink.positions_of(agent).last().unwrap();
    assert_eq!(last.point(), GeoPoint::new(12.01, 77.01));
    assert!(last.bearing_degrees > 0.0 && last.bearing_degrees < 90.0);

    view.close().await.unwrap();
    assert_eq!(store.subscriber_count(TABLE).await, 0);
    assert!(bridge.contains("[tracking] Seeded 0 of 0 agents"));
}
