//! Wiremock integration tests for RestGateway.
//!
//! These tests verify correct HTTP interaction and error mapping using
//! mocked responses.

use courtside::{
    AvailabilityGateway, CourtsideError, DateKey, RestGateway, SessionEvent, SlotStatus,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn day(s: &str) -> DateKey {
    DateKey::parse(s).unwrap()
}

fn day_payload(date: &str) -> serde_json::Value {
    serde_json::json!({
        "date": date,
        "courts": [
            {
                "courtId": "court-1",
                "courtName": "Centre Court",
                "slots": [
                    { "start": "09:00:00", "status": "available" },
                    {
                        "start": "10:00:00",
                        "status": "reserved",
                        "booking": { "reservationId": "res-42", "memberId": "m-1" }
                    },
                    {
                        "start": "11:00:00",
                        "status": "temporarily-blocked",
                        "block": { "reason": "court maintenance" }
                    }
                ]
            }
        ],
        "generatedAt": "2026-08-07T06:00:00Z",
        "timeZone": "Europe/Berlin"
    })
}

#[tokio::test]
async fn fetch_availability_parses_a_snapshot() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/availability/2026-08-07"))
        .and(header("Authorization", "Bearer test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(day_payload("2026-08-07")))
        .mount(&mock_server)
        .await;

    let gateway = RestGateway::new(mock_server.uri(), "test_token");
    let snapshot = gateway
        .fetch_availability(day("2026-08-07"))
        .await
        .expect("fetch should succeed");

    assert_eq!(snapshot.date, day("2026-08-07"));
    assert_eq!(snapshot.courts.len(), 1);
    assert_eq!(snapshot.courts[0].slots.len(), 3);
    assert_eq!(snapshot.courts[0].slots[0].status, SlotStatus::Available);
    assert_eq!(snapshot.courts[0].slots[2].status, SlotStatus::TemporarilyBlocked);
    assert_eq!(
        snapshot.courts[0].slots[1]
            .booking
            .as_ref()
            .map(|b| b.reservation_id.as_str()),
        Some("res-42")
    );
    assert_eq!(snapshot.time_zone.as_deref(), Some("Europe/Berlin"));
}

#[tokio::test]
async fn fetch_range_decomposes_by_date() {
    let mock_server = MockServer::start().await;

    let body = serde_json::json!({
        "days": [day_payload("2026-08-07"), day_payload("2026-08-08")]
    });
    Mock::given(method("GET"))
        .and(path("/availability"))
        .and(query_param("start", "2026-08-07"))
        .and(query_param("days", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let gateway = RestGateway::new(mock_server.uri(), "test_token");
    let range = gateway
        .fetch_availability_range(day("2026-08-07"), 2)
        .await
        .expect("range fetch should succeed");

    assert_eq!(range.len(), 2);
    assert!(range.contains_key(&day("2026-08-07")));
    assert!(range.contains_key(&day("2026-08-08")));
    assert_eq!(range[&day("2026-08-08")].date, day("2026-08-08"));
}

#[tokio::test]
async fn unauthorized_maps_and_emits_a_session_event() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/availability/2026-08-07"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let gateway = RestGateway::new(mock_server.uri(), "stale_token");
    let mut events = gateway.session_events();

    let result = gateway.fetch_availability(day("2026-08-07")).await;

    assert!(matches!(result, Err(CourtsideError::Unauthorized)));
    assert!(matches!(events.try_recv(), Ok(SessionEvent::Invalidated)));
}

#[tokio::test]
async fn forbidden_carries_the_server_reason() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/reservations/res-42/cancel"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": "Cancellation is only possible up to 24 hours in advance."
        })))
        .mount(&mock_server)
        .await;

    let gateway = RestGateway::new(mock_server.uri(), "test_token");
    let result = gateway.cancel_reservation("res-42").await;

    match result {
        Err(CourtsideError::Forbidden { reason }) => {
            assert_eq!(reason, "Cancellation is only possible up to 24 hours in advance.");
        }
        other => panic!("expected Forbidden, got {other:?}"),
    }
}

#[tokio::test]
async fn rate_limited_parses_the_retry_after_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/availability/2026-08-07"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&mock_server)
        .await;

    let gateway = RestGateway::new(mock_server.uri(), "test_token");
    let result = gateway.fetch_availability(day("2026-08-07")).await;

    match result {
        Err(CourtsideError::RateLimited { retry_after }) => {
            assert_eq!(retry_after, Some(std::time::Duration::from_secs(7)));
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_keep_their_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/availability/2026-08-07"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let gateway = RestGateway::new(mock_server.uri(), "test_token");
    let result = gateway.fetch_availability(day("2026-08-07")).await;

    assert!(matches!(
        result,
        Err(CourtsideError::Server { status: 503 })
    ));
}

#[tokio::test]
async fn not_found_maps_cleanly() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/availability/2026-08-07"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let gateway = RestGateway::new(mock_server.uri(), "test_token");
    let result = gateway.fetch_availability(day("2026-08-07")).await;

    assert!(matches!(result, Err(CourtsideError::NotFound)));
}

#[tokio::test]
async fn malformed_payload_is_a_decoding_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/availability/2026-08-07"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"unexpected": true}"#))
        .mount(&mock_server)
        .await;

    let gateway = RestGateway::new(mock_server.uri(), "test_token");
    let result = gateway.fetch_availability(day("2026-08-07")).await;

    assert!(matches!(result, Err(CourtsideError::Decoding(_))));
}

#[tokio::test]
async fn booking_status_parses_when_signed_in() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/booking/status"))
        .and(header("Authorization", "Bearer test_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "activeReservations": 2,
            "maxReservations": 3,
            "shortNoticeReservations": 1,
            "canBook": true
        })))
        .mount(&mock_server)
        .await;

    let gateway = RestGateway::new(mock_server.uri(), "test_token");
    let status = gateway
        .fetch_booking_status()
        .await
        .expect("status fetch should succeed")
        .expect("status should be present");

    assert_eq!(status.active_reservations, 2);
    assert_eq!(status.remaining(), 1);
    assert!(status.can_book);
}

#[tokio::test]
async fn booking_status_without_a_session_is_none_not_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/booking/status"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let gateway = RestGateway::new(mock_server.uri(), "no_session");
    let mut events = gateway.session_events();

    let status = gateway
        .fetch_booking_status()
        .await
        .expect("missing session is not an error");

    assert_eq!(status, None);
    // no session-invalidated signal for an endpoint where absence is normal
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn cancel_succeeds_on_no_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/reservations/res-42/cancel"))
        .and(header("Authorization", "Bearer test_token"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let gateway = RestGateway::new(mock_server.uri(), "test_token");
    assert!(gateway.cancel_reservation("res-42").await.is_ok());
}
