use serde::{Deserialize, Serialize};

use crate::constants::stream_events;
use crate::error::FeedError;
use crate::models::{Notification, Status};

/// Frame as sent by the streaming API. `payload` is itself JSON, encoded as
/// a string (or a bare id for deletions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamFrame {
    #[serde(default)]
    pub stream: Vec<String>,
    pub event: String,
    #[serde(default)]
    pub payload: Option<String>,
}

/// Live events this core knows about.
///
/// Feeds only merge `Update` and `Notification` (see [`StreamEvent::into_status`]
/// and [`StreamEvent::into_notification`]). `StatusUpdate` and `Delete` are
/// decoded for consumers that patch or drop rows themselves; no feed in this
/// crate applies them.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// New status on a timeline
    Update(Status),
    /// Edited status
    StatusUpdate(Status),
    Notification(Notification),
    /// Status removed, by id
    Delete(String),
}

impl StreamEvent {
    /// Status to merge into a statuses feed, if this event carries a new one
    pub fn into_status(self) -> Option<Status> {
        match self {
            StreamEvent::Update(status) => Some(status),
            _ => None,
        }
    }

    /// Notification to merge into a notifications feed
    pub fn into_notification(self) -> Option<Notification> {
        match self {
            StreamEvent::Notification(notification) => Some(notification),
            _ => None,
        }
    }
}

impl StreamFrame {
    /// Typed event for this frame. `Ok(None)` for event kinds this core
    /// ignores (filters_changed, announcements, ...).
    pub fn into_event(self) -> Result<Option<StreamEvent>, FeedError> {
        let payload = self.payload.unwrap_or_default();
        let event = match self.event.as_str() {
            stream_events::UPDATE => StreamEvent::Update(serde_json::from_str(&payload)?),
            stream_events::STATUS_UPDATE => {
                StreamEvent::StatusUpdate(serde_json::from_str(&payload)?)
            }
            stream_events::NOTIFICATION => {
                StreamEvent::Notification(serde_json::from_str(&payload)?)
            }
            stream_events::DELETE => StreamEvent::Delete(payload),
            other => {
                tracing::trace!(event = other, "stream: ignoring event");
                return Ok(None);
            }
        };
        Ok(Some(event))
    }
}

/// Decode one text message from the streaming socket
pub fn parse_stream_event(text: &str) -> Result<Option<StreamEvent>, FeedError> {
    let frame: StreamFrame = serde_json::from_str(text)?;
    frame.into_event()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(event: &str, payload: serde_json::Value) -> String {
        json!({
            "stream": ["user"],
            "event": event,
            "payload": payload.to_string(),
        })
        .to_string()
    }

    #[test]
    fn test_update_frame() {
        let text = frame(
            "update",
            json!({
                "id": "42",
                "created_at": "2023-02-17T10:20:54.000Z",
                "account": {"id": "a1", "acct": "alice"}
            }),
        );

        let status = parse_stream_event(&text).unwrap().unwrap().into_status().unwrap();
        assert_eq!(status.id, "42");
    }

    #[test]
    fn test_notification_frame() {
        let text = frame(
            "notification",
            json!({
                "id": "7",
                "type": "favourite",
                "created_at": "2023-02-17T10:20:54.000Z",
                "account": {"id": "a2", "acct": "bob"},
                "status": {
                    "id": "42",
                    "created_at": "2023-02-17T10:00:00.000Z",
                    "account": {"id": "a1", "acct": "alice"}
                }
            }),
        );

        let event = parse_stream_event(&text).unwrap().unwrap();
        assert!(event.clone().into_status().is_none());
        let notification = event.into_notification().unwrap();
        assert_eq!(notification.target_id(), "42");
    }

    #[test]
    fn test_delete_frame_carries_bare_id() {
        let text = json!({"event": "delete", "payload": "42"}).to_string();
        assert_eq!(
            parse_stream_event(&text).unwrap(),
            Some(StreamEvent::Delete("42".to_string()))
        );
    }

    #[test]
    fn test_edits_and_deletions_are_not_merged() {
        let text = frame(
            "status.update",
            json!({
                "id": "42",
                "created_at": "2023-02-17T10:20:54.000Z",
                "account": {"id": "a1", "acct": "alice"}
            }),
        );
        let edit = parse_stream_event(&text).unwrap().unwrap();
        assert!(matches!(edit, StreamEvent::StatusUpdate(_)));
        assert!(edit.clone().into_status().is_none());
        assert!(edit.into_notification().is_none());

        let delete = StreamEvent::Delete("42".to_string());
        assert!(delete.clone().into_status().is_none());
        assert!(delete.into_notification().is_none());
    }

    #[test]
    fn test_unknown_event_is_ignored() {
        let text = json!({"event": "filters_changed"}).to_string();
        assert_eq!(parse_stream_event(&text).unwrap(), None);
    }

    #[test]
    fn test_malformed_payload_is_decode_error() {
        let text = json!({"event": "update", "payload": "{not json"}).to_string();
        assert!(matches!(
            parse_stream_event(&text),
            Err(FeedError::Decode { .. })
        ));
    }
}
