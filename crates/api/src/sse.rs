//! Server-Sent Events (SSE) for realtime report updates.
//!
//! Replaces polling on the public list views: mutating endpoints publish
//! an event after every successful write and subscribers patch their
//! local state from the payload instead of re-querying.

#![allow(missing_docs)]

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::stream::{self, Stream};
use komuna_core::PublicReport;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use crate::middleware::AppState;

/// SSE event types.
///
/// Events only ever carry the public-safe projection, so the stream can
/// be offered to anonymous list views.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ReportEvent {
    /// A report was submitted.
    Created { report: PublicReport },
    /// A report was mutated by an admin.
    Updated { report: PublicReport },
    /// A report was deleted.
    Deleted { id: String },
    /// Connection established.
    Connected,
}

/// Broadcast channel for report change events.
#[derive(Clone)]
pub struct ReportBroadcaster {
    sender: broadcast::Sender<ReportEvent>,
}

impl ReportBroadcaster {
    /// Create a new broadcaster.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1000);
        Self { sender }
    }

    /// Broadcast an event to all subscribers. Lagging or absent
    /// subscribers are not an error.
    pub fn broadcast(&self, event: ReportEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to report change events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ReportEvent> {
        self.sender.subscribe()
    }
}

impl Default for ReportBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Report change SSE stream.
async fn report_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.broadcaster.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| {
        result.ok().map(|event| {
            Ok(Event::default()
                .json_data(&event)
                .unwrap_or_else(|_| Event::default().data("error")))
        })
    });

    // Add initial connected event
    let initial = stream::once(async {
        Ok(Event::default()
            .json_data(&ReportEvent::Connected)
            .unwrap_or_else(|_| Event::default().data("connected")))
    });

    Sse::new(initial.chain(stream)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}

pub fn router() -> Router<AppState> {
    Router::new().route("/reports", get(report_stream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use komuna_db::entities::report::ReportStatus;

    fn sample_public_report() -> PublicReport {
        PublicReport {
            id: "report1".to_string(),
            tracking_code: "A1B2C3D4".to_string(),
            title: "Gropë".to_string(),
            description: "Gropë e madhe".to_string(),
            photo_url: None,
            has_location: false,
            latitude: None,
            longitude: None,
            neighborhood: None,
            status: ReportStatus::New,
            admin_note: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn subscribers_receive_broadcast_events() {
        let broadcaster = ReportBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        broadcaster.broadcast(ReportEvent::Created {
            report: sample_public_report(),
        });

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, ReportEvent::Created { .. }));
    }

    #[test]
    fn events_serialize_with_tag_and_no_reporter_fields() {
        let event = ReportEvent::Created {
            report: sample_public_report(),
        };
        let json = serde_json::to_string(&event).unwrap();

        assert!(json.contains("\"type\":\"created\""));
        assert!(!json.to_lowercase().contains("reporter"));
    }

    #[test]
    fn broadcast_without_subscribers_is_fine() {
        let broadcaster = ReportBroadcaster::new();
        broadcaster.broadcast(ReportEvent::Deleted {
            id: "report1".to_string(),
        });
    }
}
