use async_trait::async_trait;
use presensi_application::{ContextChangeNotifier, ContextChanged};
use presensi_core::AppResult;
use tokio::sync::broadcast;
use tracing::debug;


/// In-process fan-out of context changes to streaming subscribers.
#[derive(Debug, Clone)]
pub struct BroadcastContextChangeNotifier {
    sender: broadcast::Sender<ContextChanged>,
}

impl BroadcastContextChangeNotifier {
    /// Creates a notifier whose subscribers may lag by up to `capacity` events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to every event published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ContextChanged> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl ContextChangeNotifier for BroadcastContextChangeNotifier {
    async fn publish(&self, event: ContextChanged) -> AppResult<()> {
        // A send error only means nobody is listening.
        match self.sender.send(event) {
            Ok(receivers) => debug!(receivers, "context change published"),
            Err(_) => debug!("context change dropped, no subscribers"),
        }

        Ok(())
    }
}
