//! Debounced date navigation.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use courtside::{
    AvailabilityGateway, AvailabilitySnapshot, BookingStatus, CourtDay, Courtside, DateKey, Result,
};

fn day(s: &str) -> DateKey {
    DateKey::parse(s).unwrap()
}

/// Gateway that answers every single-day fetch and records the order.
struct CountingGateway {
    day_calls: Mutex<Vec<DateKey>>,
}

impl CountingGateway {
    fn new() -> Self {
        Self {
            day_calls: Mutex::new(Vec::new()),
        }
    }

    fn day_calls(&self) -> Vec<DateKey> {
        self.day_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AvailabilityGateway for CountingGateway {
    async fn fetch_availability(&self, date: DateKey) -> Result<AvailabilitySnapshot> {
        self.day_calls.lock().unwrap().push(date);
        tokio::time::sleep(Duration::from_millis(1)).await;
        Ok(AvailabilitySnapshot {
            date,
            courts: vec![CourtDay {
                court_id: "court-1".into(),
                court_name: None,
                slots: vec![],
            }],
            generated_at: None,
            time_zone: None,
        })
    }

    async fn fetch_availability_range(
        &self,
        _start: DateKey,
        _days: u16,
    ) -> Result<BTreeMap<DateKey, AvailabilitySnapshot>> {
        Ok(BTreeMap::new())
    }

    async fn fetch_booking_status(&self) -> Result<Option<BookingStatus>> {
        Ok(None)
    }

    async fn cancel_reservation(&self, _reservation_id: &str) -> Result<()> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn rapid_navigation_collapses_into_one_load_for_the_last_date() {
    let gateway = Arc::new(CountingGateway::new());
    let controller = Courtside::builder()
        .gateway(gateway.clone())
        .build()
        .unwrap();

    // fast arrow-tapping: three selections inside the 200ms quiet window
    controller.select_date(day("2026-08-07"));
    tokio::time::sleep(Duration::from_millis(50)).await;
    controller.select_date(day("2026-08-08"));
    tokio::time::sleep(Duration::from_millis(50)).await;
    controller.select_date(day("2026-08-09"));

    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(gateway.day_calls(), vec![day("2026-08-09")]);
    let view = controller.view();
    assert_eq!(view.active_date, Some(day("2026-08-09")));
    assert_eq!(
        view.snapshot.as_ref().map(|s| s.date),
        Some(day("2026-08-09"))
    );
}

#[tokio::test(start_paused = true)]
async fn selections_separated_by_a_quiet_period_each_load() {
    let gateway = Arc::new(CountingGateway::new());
    let controller = Courtside::builder()
        .gateway(gateway.clone())
        .build()
        .unwrap();

    controller.select_date(day("2026-08-07"));
    tokio::time::sleep(Duration::from_millis(300)).await;
    controller.select_date(day("2026-08-08"));
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(
        gateway.day_calls(),
        vec![day("2026-08-07"), day("2026-08-08")]
    );
}

#[tokio::test(start_paused = true)]
async fn each_call_restarts_the_quiet_period() {
    let gateway = Arc::new(CountingGateway::new());
    let controller = Courtside::builder()
        .gateway(gateway.clone())
        .build()
        .unwrap();

    // five selections 150ms apart: every one lands inside the previous
    // window, so the timer keeps restarting and only the last fires
    for offset in 0..5 {
        controller.select_date(day("2026-08-07").offset(offset));
        tokio::time::sleep(Duration::from_millis(150)).await;
    }
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(gateway.day_calls(), vec![day("2026-08-11")]);
}
