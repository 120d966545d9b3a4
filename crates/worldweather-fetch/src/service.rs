//! Weather backend: async fetch dispatch.
//! All network work runs off the caller's thread; results are sent via mpsc.
//! Starting a request cancels the one still in flight, so only the newest
//! request ever delivers a result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::{FetchError, FetchErrorKind};
use crate::pipeline::WeatherFetchPipeline;
use crate::types::{WeatherCategory, WeatherReading};

/// Messages sent from async operations back to the consumer thread
#[derive(Debug)]
pub enum WeatherServiceMessage {
    /// Result of one fetch. Sent at most once per request id.
    FetchDone {
        request_id: u64,
        location: String,
        result: Result<WeatherReading, FetchError>,
    },
}

#[derive(Debug)]
struct InFlight {
    request_id: u64,
    token: CancellationToken,
}

/// Dispatches fetches onto a tokio runtime and reports back over a channel.
pub struct WeatherService {
    pipeline: Arc<WeatherFetchPipeline>,
    runtime: tokio::runtime::Handle,
    tx: Sender<WeatherServiceMessage>,
    next_request_id: AtomicU64,
    in_flight: Arc<Mutex<Option<InFlight>>>,
}

impl WeatherService {
    pub fn new(
        pipeline: Arc<WeatherFetchPipeline>,
        runtime: tokio::runtime::Handle,
    ) -> (Self, Receiver<WeatherServiceMessage>) {
        let (tx, rx) = std::sync::mpsc::channel();
        let service = Self {
            pipeline,
            runtime,
            tx,
            next_request_id: AtomicU64::new(1),
            in_flight: Arc::new(Mutex::new(None)),
        };
        (service, rx)
    }

    /// Request weather for `location` asynchronously and return the request id.
    /// Sends `FetchDone` on the channel when complete, unless a newer request
    /// or `cancel()` supersedes it first.
    pub fn request_fetch(&self, location: &str) -> u64 {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();

        let previous = self.in_flight.lock().replace(InFlight {
            request_id,
            token: token.clone(),
        });
        if let Some(previous) = previous {
            previous.token.cancel();
            tracing::debug!(
                "Weather request {} superseded by {}",
                previous.request_id,
                request_id
            );
        }

        let tx = self.tx.clone();
        let pipeline = self.pipeline.clone();
        let in_flight = self.in_flight.clone();
        let location = location.to_string();
        let query = location.clone();

        self.runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!("Weather request {} cancelled", request_id);
                }
                result = pipeline.fetch(&query) => {
                    deliver(&in_flight, &tx, WeatherServiceMessage::FetchDone {
                        request_id,
                        location,
                        result,
                    });
                }
            }
        });

        request_id
    }

    /// Cancel the in-flight request, if any, without starting another.
    pub fn cancel(&self) {
        if let Some(previous) = self.in_flight.lock().take() {
            previous.token.cancel();
            tracing::info!("Weather request {} cancelled", previous.request_id);
        }
    }

    /// Id of the request still awaiting a result.
    pub fn in_flight_request(&self) -> Option<u64> {
        self.in_flight.lock().as_ref().map(|f| f.request_id)
    }
}

impl Drop for WeatherService {
    fn drop(&mut self) {
        if let Some(previous) = self.in_flight.lock().take() {
            previous.token.cancel();
        }
    }
}

/// Send a finished result only if its request is still the one in flight.
///
/// The check and the send happen under the same lock, so a request that was
/// superseded or cancelled after its fetch resolved never reaches the channel.
fn deliver(
    in_flight: &Mutex<Option<InFlight>>,
    tx: &Sender<WeatherServiceMessage>,
    message: WeatherServiceMessage,
) -> bool {
    let WeatherServiceMessage::FetchDone { request_id, .. } = &message;
    let request_id = *request_id;

    let mut current = in_flight.lock();
    if !current.as_ref().is_some_and(|f| f.request_id == request_id) {
        tracing::debug!("Discarding result for superseded weather request {}", request_id);
        return false;
    }
    *current = None;
    tx.send(message).is_ok()
}

/// The single current weather state a UI renders from.
///
/// Replaced wholesale on every transition; never patched field by field.
#[derive(Debug, Clone, Default)]
pub enum FetchSlot {
    #[default]
    Idle,
    Pending {
        request_id: u64,
        location: String,
    },
    Ready {
        location: String,
        reading: WeatherReading,
        category: WeatherCategory,
    },
    Failed {
        location: String,
        kind: FetchErrorKind,
        message: &'static str,
        detail: String,
    },
}

impl FetchSlot {
    /// Mark `request_id` as the request this slot is waiting on.
    pub fn begin(&mut self, request_id: u64, location: &str) {
        *self = FetchSlot::Pending {
            request_id,
            location: location.to_string(),
        };
    }

    /// Apply a service message. Results for any request other than the
    /// pending one are dropped; returns whether the slot changed.
    pub fn apply(&mut self, message: WeatherServiceMessage) -> bool {
        let WeatherServiceMessage::FetchDone {
            request_id,
            location,
            result,
        } = message;

        match self {
            FetchSlot::Pending {
                request_id: pending,
                ..
            } if *pending == request_id => {}
            _ => {
                tracing::debug!("Dropping stale weather result {}", request_id);
                return false;
            }
        }

        *self = match result {
            Ok(reading) => FetchSlot::Ready {
                location,
                category: reading.category(),
                reading,
            },
            Err(e) => FetchSlot::Failed {
                location,
                kind: e.kind(),
                message: e.user_message(),
                detail: e.to_string(),
            },
        };
        true
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, FetchSlot::Pending { .. })
    }
}
