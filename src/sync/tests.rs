use super::*;
use crate::client::ApiConfig;
use crate::fleet::FilterSelection;
use crate::snapshot::SyncState;
use crate::view::testing::RecordingView;
use mockito::{Matcher, Server, ServerGuard};

const ALL_NEARBY: &str = r#"[
    {"id": "y1", "firstName": "Ali", "lastName": "Kaya", "plate": "34 Y 1",
     "taxiType": "yellow", "location": {"lat": 41.001, "lon": 29.001}},
    {"id": "b1", "firstName": "Banu", "lastName": "Ak", "plate": "34 B 1",
     "taxiType": "black", "location": {"lat": 41.002, "lon": 29.002}},
    {"id": "y2", "firstName": "Cem", "lastName": "Er", "plate": "34 Y 2",
     "taxiType": "yellow", "location": {"lat": 41.003, "lon": 29.003}}
]"#;

const YELLOW_NEARBY: &str = r#"[
    {"id": "y1", "firstName": "Ali", "lastName": "Kaya", "plate": "34 Y 1",
     "taxiType": "yellow", "location": {"lat": 41.001, "lon": 29.001}},
    {"id": "y2", "firstName": "Cem", "lastName": "Er", "plate": "34 Y 2",
     "taxiType": "yellow", "location": {"lat": 41.003, "lon": 29.003}}
]"#;

fn fleet_for(server: &ServerGuard) -> (FleetSync, Arc<RecordingView>) {
    let config = FleetConfig {
        api: ApiConfig {
            base_url: server.url(),
            ..ApiConfig::default()
        },
        ..FleetConfig::default()
    };
    let view = Arc::new(RecordingView::default());
    let fleet = FleetSync::from_config(config, view.clone()).unwrap();
    (fleet, view)
}

async fn mock_login(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/login")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"token": "session-token"}"#)
        .create_async()
        .await
}

#[tokio::test]
async fn test_login_filter_scenario() {
    let mut server = Server::new_async().await;
    let _login = mock_login(&mut server).await;
    let all = server
        .mock("GET", "/drivers/nearby")
        .match_query(Matcher::Regex(r"^lat=41(\.0)?&lon=29(\.0)?$".into()))
        .match_header("authorization", "Bearer session-token")
        .with_status(200)
        .with_body(ALL_NEARBY)
        .expect(1)
        .create_async()
        .await;
    let yellow = server
        .mock("GET", "/drivers/nearby")
        .match_query(Matcher::Regex(r"^lat=41(\.0)?&lon=29(\.0)?&taxiType=yellow$".into()))
        .match_header("authorization", "Bearer session-token")
        .with_status(200)
        .with_body(YELLOW_NEARBY)
        .expect(1)
        .create_async()
        .await;

    let (fleet, view) = fleet_for(&server);
    fleet.login("admin", "password123").await.unwrap();
    assert!(fleet.is_authenticated());
    assert_eq!(fleet.session().get().unwrap().expose(), "session-token");

    let map = fleet.open_map().await.unwrap();
    assert_eq!(map.state(), SyncState::Ready);
    assert_eq!(map.snapshot().len(), 3);

    assert_eq!(map.set_filter(FilterSelection::ClassA).await, SyncState::Ready);
    let snapshot = map.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert!(snapshot.get("b1").is_none());
    assert!(snapshot
        .entities()
        .iter()
        .all(|v| v.vehicle_class == crate::fleet::VehicleClass::ClassA));

    assert_eq!(view.snapshots.lock().unwrap().len(), 2);
    all.assert_async().await;
    yellow.assert_async().await;
}

#[tokio::test]
async fn test_expired_session_forces_reauth_without_looping() {
    let mut server = Server::new_async().await;
    let _login = mock_login(&mut server).await;
    let nearby = server
        .mock("GET", "/drivers/nearby")
        .match_query(Matcher::Any)
        .with_status(401)
        .expect(2)
        .create_async()
        .await;

    let (fleet, view) = fleet_for(&server);
    fleet.login("admin", "password123").await.unwrap();

    let map = fleet.open_map().await.unwrap();
    assert_eq!(fleet.session().get(), None);
    assert_eq!(fleet.session().status(), SessionStatus::Expired);
    assert_eq!(view.auth_required_count(), 1);

    // Without re-login the backend rejects again; classified, not looped
    assert_eq!(map.refresh().await, SyncState::Idle);
    assert_eq!(view.auth_required_count(), 1);
    nearby.assert_async().await;
}

#[tokio::test]
async fn test_rejected_login_leaves_store_empty() {
    let mut server = Server::new_async().await;
    let _login = server
        .mock("POST", "/login")
        .with_status(401)
        .create_async()
        .await;

    let (fleet, view) = fleet_for(&server);
    let err = fleet.login("admin", "nope").await.unwrap_err();

    assert!(err.is_auth());
    assert!(!fleet.is_authenticated());
    assert_eq!(fleet.session().status(), SessionStatus::Anonymous);
    assert_eq!(view.auth_required_count(), 0);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let mut server = Server::new_async().await;
    let _login = mock_login(&mut server).await;

    let (fleet, _view) = fleet_for(&server);
    fleet.login("admin", "password123").await.unwrap();

    assert!(fleet.logout());
    assert!(!fleet.is_authenticated());
    assert_eq!(fleet.session().status(), SessionStatus::SignedOut);
    assert!(!fleet.logout());
}

#[tokio::test]
async fn test_listing_auth_failure_goes_through_guard() {
    let mut server = Server::new_async().await;
    let _login = mock_login(&mut server).await;
    let _list = server
        .mock("GET", "/drivers")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "1".into()),
            Matcher::UrlEncoded("pageSize".into(), "100".into()),
        ]))
        .with_status(401)
        .create_async()
        .await;

    let (fleet, view) = fleet_for(&server);
    fleet.login("admin", "password123").await.unwrap();

    let err = fleet.list_default_page().await.unwrap_err();
    assert!(err.is_auth());
    assert_eq!(fleet.session().get(), None);
    assert_eq!(view.auth_required_count(), 1);
}

#[tokio::test]
async fn test_request_pickup() {
    let mut server = Server::new_async().await;
    let _login = mock_login(&mut server).await;
    let _nearby = server
        .mock("GET", "/drivers/nearby")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(ALL_NEARBY)
        .create_async()
        .await;

    let (fleet, _view) = fleet_for(&server);
    fleet.login("admin", "password123").await.unwrap();
    let map = fleet.open_map().await.unwrap();

    let notice = fleet.request_pickup(&map, "b1").unwrap();
    assert_eq!(notice.driver_first_name, "Banu");
    assert_eq!(notice.eta_minutes, PICKUP_ETA_MINUTES);
    assert_eq!(notice.to_string(), "Banu is on the way! Arriving in 3 minutes.");

    assert_eq!(
        fleet.request_pickup(&map, "missing").unwrap_err(),
        ValidationError::UnknownVehicle("missing".to_string())
    );
}

#[tokio::test]
async fn test_open_map_rejects_invalid_observer() {
    let server = Server::new_async().await;
    let mut config = FleetConfig::default();
    config.api.base_url = server.url();
    config.observer.lon = 200.0;

    let fleet = FleetSync::from_config(config, Arc::new(RecordingView::default())).unwrap();
    assert_eq!(
        fleet.open_map().await.err(),
        Some(ValidationError::LongitudeOutOfRange(200.0))
    );
}
