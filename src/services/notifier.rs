//! Fan-out change notifications for websocket subscribers.
//!
//! Every successful mutation pushes one text message through a broadcast
//! channel; the websocket handler subscribes a receiver per connection.
//! Sending is fire-and-forget: with no subscribers the message is dropped.

use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct Notifier {
    tx: broadcast::Sender<String>,
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Announce that rows of `table` changed. Subscribers only learn which
    /// table moved, not what happened to it.
    pub fn table_changed(&self, table: &str) {
        let _ = self.tx.send(format!("{table} (created/updated/deleted)"));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn all_subscribers_receive_the_message() {
        let notifier = Notifier::new();
        let mut first = notifier.subscribe();
        let mut second = notifier.subscribe();

        notifier.table_changed("organizations");

        assert_eq!(
            first.recv().await.unwrap(),
            "organizations (created/updated/deleted)"
        );
        assert_eq!(
            second.recv().await.unwrap(),
            "organizations (created/updated/deleted)"
        );
    }

    #[tokio::test]
    async fn sending_without_subscribers_is_silent() {
        let notifier = Notifier::new();
        notifier.table_changed("addresses");

        let mut late = notifier.subscribe();
        notifier.table_changed("locations");
        assert_eq!(
            late.recv().await.unwrap(),
            "locations (created/updated/deleted)"
        );
    }
}
