//! Fire-and-forget notification channel.
//!
//! Core operations emit notifications without awaiting delivery; a send
//! failure never fails the operation that triggered it. The receiving end is
//! drained into tracing logs; real delivery is a downstream concern.

use serde_json::Value;
use tokio::sync::mpsc;

/// Notification kinds emitted by the registration workflow.
pub mod kinds {
    pub const TEAM_COMPLETE: &str = "TEAM_COMPLETE";
    pub const MEMBER_WITHDREW: &str = "MEMBER_WITHDREW";
    pub const TEAM_REGISTERED: &str = "TEAM_REGISTERED";
    pub const TEAM_UNREGISTERED: &str = "TEAM_UNREGISTERED";
    pub const NAME_CHANGE_REQUESTED: &str = "NAME_CHANGE_REQUESTED";
    pub const NAME_CHANGE_APPROVED: &str = "NAME_CHANGE_APPROVED";
    pub const NAME_CHANGE_REJECTED: &str = "NAME_CHANGE_REJECTED";
    pub const SITE_CHANGE_REQUESTED: &str = "SITE_CHANGE_REQUESTED";
    pub const SITE_CHANGE_APPROVED: &str = "SITE_CHANGE_APPROVED";
    pub const SITE_CHANGE_REJECTED: &str = "SITE_CHANGE_REJECTED";
    pub const SEATS_ASSIGNED: &str = "SEATS_ASSIGNED";
}

/// One outbound notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: &'static str,
    pub recipient_ids: Vec<String>,
    pub payload: Value,
}

/// Handle for emitting notifications.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    /// Create a notifier and the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Emit a notification. Never blocks and never fails the caller.
    pub fn notify(&self, kind: &'static str, recipient_ids: Vec<String>, payload: Value) {
        let notification = Notification {
            kind,
            recipient_ids,
            payload,
        };
        if self.tx.send(notification).is_err() {
            tracing::warn!(kind, "Notification channel closed, dropping notification");
        }
    }
}

/// Drain notifications into tracing logs until the channel closes.
pub async fn log_notifications(mut rx: mpsc::UnboundedReceiver<Notification>) {
    while let Some(notification) = rx.recv().await {
        tracing::info!(
            kind = notification.kind,
            recipients = notification.recipient_ids.len(),
            payload = %notification.payload,
            "notification"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn notify_delivers_to_receiver() {
        let (notifier, mut rx) = Notifier::channel();
        notifier.notify(
            kinds::TEAM_COMPLETE,
            vec!["user-1".to_string(), "user-2".to_string()],
            json!({ "teamId": "team-1" }),
        );

        let notification = rx.recv().await.unwrap();
        assert_eq!(notification.kind, kinds::TEAM_COMPLETE);
        assert_eq!(notification.recipient_ids.len(), 2);
        assert_eq!(notification.payload["teamId"], "team-1");
    }

    #[tokio::test]
    async fn notify_survives_closed_channel() {
        let (notifier, rx) = Notifier::channel();
        drop(rx);
        // Must not panic or error.
        notifier.notify(kinds::TEAM_REGISTERED, vec![], json!({}));
    }
}
