//! REST client for the booking service.
//!
//! Implements [`AvailabilityGateway`] over the service's JSON API. Only the
//! transport lives here; caching, retry-on-stale, and view state are the
//! controller's concern, and request timeouts are configured on the
//! underlying client and surface as ordinary
//! [`Network`](CourtsideError::Network) failures.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::{
    AvailabilityGateway, AvailabilitySnapshot, BookingStatus, CourtsideError, DateKey, Result,
};

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Buffered session events per subscriber.
const SESSION_EVENT_CAPACITY: usize = 16;

/// Session-level signal emitted by the gateway.
///
/// The availability controller does not consume these. The owning session
/// manager subscribes via [`RestGateway::session_events`] and reacts (e.g.
/// by re-authenticating and tearing down cached state).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// The backend rejected the session credentials.
    Invalidated,
}

/// Client for the booking service's REST API.
///
/// Cheap to clone. Construct with the service base URL and a bearer token;
/// point `base_url` at a mock server for tests.
#[derive(Clone)]
pub struct RestGateway {
    http: Client,
    base_url: String,
    api_token: String,
    session_tx: broadcast::Sender<SessionEvent>,
}

impl RestGateway {
    /// Create a gateway for the service at `base_url`.
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        let (session_tx, _) = broadcast::channel(SESSION_EVENT_CAPACITY);

        Self {
            http,
            base_url: base_url.into(),
            api_token: api_token.into(),
            session_tx,
        }
    }

    /// Subscribe to session-level signals.
    pub fn session_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.session_tx.subscribe()
    }

    /// Check response status and map to the appropriate error.
    ///
    /// A 401 additionally emits [`SessionEvent::Invalidated`] before the
    /// error propagates.
    async fn check(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            let _ = self.session_tx.send(SessionEvent::Invalidated);
            return Err(CourtsideError::Unauthorized);
        }

        match status.as_u16() {
            403 => Err(CourtsideError::Forbidden {
                reason: server_reason(response, "This action is not allowed.").await,
            }),
            404 => Err(CourtsideError::NotFound),
            400 => Err(CourtsideError::BadRequest {
                reason: server_reason(response, "The request was rejected.").await,
            }),
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(Duration::from_secs);
                Err(CourtsideError::RateLimited { retry_after })
            }
            code => Err(CourtsideError::Server { status: code }),
        }
    }
}

#[async_trait]
impl AvailabilityGateway for RestGateway {
    async fn fetch_availability(&self, date: DateKey) -> Result<AvailabilitySnapshot> {
        let url = format!("{}/availability/{}", self.base_url, date);

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .send()
            .await?;
        let response = self.check(response).await?;

        let snapshot: AvailabilitySnapshot = response
            .json()
            .await
            .map_err(|e| CourtsideError::Decoding(e.to_string()))?;
        Ok(snapshot)
    }

    async fn fetch_availability_range(
        &self,
        start: DateKey,
        days: u16,
    ) -> Result<BTreeMap<DateKey, AvailabilitySnapshot>> {
        let url = format!(
            "{}/availability?start={}&days={}",
            self.base_url, start, days
        );

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .send()
            .await?;
        let response = self.check(response).await?;

        let range: RangeResponse = response
            .json()
            .await
            .map_err(|e| CourtsideError::Decoding(e.to_string()))?;

        Ok(range
            .days
            .into_iter()
            .map(|snapshot| (snapshot.date, snapshot))
            .collect())
    }

    async fn fetch_booking_status(&self) -> Result<Option<BookingStatus>> {
        let url = format!("{}/booking/status", self.base_url);

        let response = self
            .http
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .send()
            .await?;

        // no authenticated session is a normal "no status" outcome here,
        // not an error
        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        let response = self.check(response).await?;

        let status: BookingStatus = response
            .json()
            .await
            .map_err(|e| CourtsideError::Decoding(e.to_string()))?;
        Ok(Some(status))
    }

    async fn cancel_reservation(&self, reservation_id: &str) -> Result<()> {
        let url = format!("{}/reservations/{}/cancel", self.base_url, reservation_id);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .send()
            .await?;
        self.check(response).await?;
        Ok(())
    }
}

/// Extract a member-displayable reason from an error body, if the server
/// sent one.
async fn server_reason(response: Response, fallback: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(alias = "message")]
        error: Option<String>,
    }

    response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.error)
        .unwrap_or_else(|| fallback.to_string())
}

/// Multi-day availability envelope.
#[derive(Deserialize)]
struct RangeResponse {
    days: Vec<AvailabilitySnapshot>,
}
