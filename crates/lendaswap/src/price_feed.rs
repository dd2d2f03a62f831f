//! Live price feed
//!
//! Listens on the backend's `/ws/prices` websocket and fans [`PriceUpdateMessage`]s out over a
//! broadcast channel. The connection task is started by the first subscriber and ends once every
//! receiver is gone or [`PriceFeed::stop`] is called. Dropped connections are retried with
//! exponential backoff.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use lendaswap_common::api::PriceUpdateMessage;
use lendaswap_common::ApiUrl;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::error::Error;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);
const SUBSCRIBER_CHECK_INTERVAL: Duration = Duration::from_secs(5);
const CHANNEL_CAPACITY: usize = 64;

/// Why a connection ended
#[derive(Debug, PartialEq, Eq)]
enum StreamEnd {
    /// Stop was requested
    Stopped,
    /// Every receiver was dropped
    NoSubscribers,
    /// The server went away after a successful connection
    Disconnected,
}

struct Running {
    ctrl: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

/// Price feed listener
#[derive(Debug)]
pub struct PriceFeed {
    url: Url,
    sender: broadcast::Sender<PriceUpdateMessage>,
    running: Mutex<Option<Running>>,
}

impl std::fmt::Debug for Running {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Running")
            .field("finished", &self.handle.is_finished())
            .finish()
    }
}

impl PriceFeed {
    /// Create new [`PriceFeed`] for a backend
    pub fn new(api_url: &ApiUrl) -> Result<Self, Error> {
        let url = api_url.ws_url(&["ws", "prices"])?;
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);

        Ok(Self {
            url,
            sender,
            running: Mutex::new(None),
        })
    }

    /// Websocket url
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Receive price updates, connecting if this is the first subscriber
    pub async fn subscribe(&self) -> broadcast::Receiver<PriceUpdateMessage> {
        let receiver = self.sender.subscribe();

        let mut running = self.running.lock().await;
        let alive = running
            .as_ref()
            .map(|running| !running.handle.is_finished())
            .unwrap_or(false);

        if !alive {
            let (ctrl, ctrl_rx) = mpsc::channel(1);
            let handle = tokio::spawn(run(self.url.clone(), self.sender.clone(), ctrl_rx));
            *running = Some(Running { ctrl, handle });
            tracing::debug!("Started price feed on {}", self.url);
        }

        receiver
    }

    /// Whether the connection task is alive
    pub async fn is_running(&self) -> bool {
        self.running
            .lock()
            .await
            .as_ref()
            .map(|running| !running.handle.is_finished())
            .unwrap_or(false)
    }

    /// End the connection task
    pub async fn stop(&self) {
        let running = self.running.lock().await.take();

        if let Some(running) = running {
            // A full or closed channel means the task is already on its way out
            let _ = running.ctrl.try_send(());
            if let Err(err) = running.handle.await {
                tracing::warn!("Price feed task ended abnormally: {}", err);
            }
            tracing::debug!("Stopped price feed");
        }
    }
}

/// Backoff after `current`, doubling up to the cap
fn next_backoff(current: Duration) -> Duration {
    current.saturating_mul(2).min(MAX_BACKOFF)
}

async fn run(
    url: Url,
    sender: broadcast::Sender<PriceUpdateMessage>,
    mut ctrl: mpsc::Receiver<()>,
) {
    let mut backoff = INITIAL_BACKOFF;

    loop {
        match stream_prices(&url, &sender, &mut ctrl).await {
            Ok(StreamEnd::Stopped) | Ok(StreamEnd::NoSubscribers) => break,
            Ok(StreamEnd::Disconnected) => {
                tracing::debug!("Price feed disconnected, reconnecting");
                backoff = INITIAL_BACKOFF;
            }
            Err(err) => {
                tracing::error!("Price feed connection failed: {}", err);
            }
        }

        if sender.receiver_count() == 0 {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep(backoff) => {}
            _ = ctrl.recv() => break,
        }

        backoff = next_backoff(backoff);
    }
}

async fn stream_prices(
    url: &Url,
    sender: &broadcast::Sender<PriceUpdateMessage>,
    ctrl: &mut mpsc::Receiver<()>,
) -> Result<StreamEnd, Error> {
    let request = url
        .to_string()
        .into_client_request()
        .map_err(|err| Error::PriceFeed(err.to_string()))?;

    tracing::debug!("Connecting to {}", url);
    let ws_stream = connect_async(request)
        .await
        .map(|(ws_stream, _)| ws_stream)
        .map_err(|err| Error::PriceFeed(err.to_string()))?;

    tracing::debug!("Connected to {}", url);
    let (mut write, mut read) = ws_stream.split();
    let mut check = tokio::time::interval(SUBSCRIBER_CHECK_INTERVAL);

    loop {
        tokio::select! {
            _ = ctrl.recv() => {
                if let Err(err) = write.send(Message::Close(None)).await {
                    tracing::error!("Closing error {err:?}");
                }
                return Ok(StreamEnd::Stopped);
            }
            _ = check.tick() => {
                if sender.receiver_count() == 0 {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(StreamEnd::NoSubscribers);
                }
            }
            msg = read.next() => {
                let msg = match msg {
                    Some(Ok(msg)) => msg,
                    Some(Err(err)) => {
                        tracing::debug!("Price feed read error: {}", err);
                        return Ok(StreamEnd::Disconnected);
                    }
                    None => return Ok(StreamEnd::Disconnected),
                };
                let msg = match msg {
                    Message::Text(msg) => msg,
                    Message::Close(_) => return Ok(StreamEnd::Disconnected),
                    _ => continue,
                };
                let update = match serde_json::from_str::<PriceUpdateMessage>(&msg) {
                    Ok(update) => update,
                    Err(err) => {
                        tracing::warn!("Undecodable price update: {}", err);
                        continue;
                    }
                };

                if sender.send(update).is_err() {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(StreamEnd::NoSubscribers);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_backoff_doubles_to_cap() {
        let mut backoff = INITIAL_BACKOFF;
        let mut seen = vec![backoff];
        for _ in 0..7 {
            backoff = next_backoff(backoff);
            seen.push(backoff);
        }

        assert_eq!(
            seen.iter().map(Duration::as_secs).collect::<Vec<_>>(),
            vec![1, 2, 4, 8, 16, 30, 30, 30]
        );
    }

    #[test]
    fn test_feed_url() {
        let feed = PriceFeed::new(&ApiUrl::from_str("https://api.lendaswap.com").unwrap()).unwrap();
        assert_eq!(feed.url().as_str(), "wss://api.lendaswap.com/ws/prices");

        let feed = PriceFeed::new(&ApiUrl::from_str("http://localhost:3333/api").unwrap()).unwrap();
        assert_eq!(feed.url().as_str(), "ws://localhost:3333/api/ws/prices");
    }

    #[tokio::test]
    async fn test_subscribe_starts_and_stop_ends() {
        // Nothing listens here, the task keeps retrying until stopped
        let feed = PriceFeed::new(&ApiUrl::from_str("http://127.0.0.1:9").unwrap()).unwrap();
        assert!(!feed.is_running().await);

        let _receiver = feed.subscribe().await;
        assert!(feed.is_running().await);

        feed.stop().await;
        assert!(!feed.is_running().await);
    }

    #[tokio::test]
    async fn test_task_ends_without_subscribers() {
        let feed = PriceFeed::new(&ApiUrl::from_str("http://127.0.0.1:9").unwrap()).unwrap();

        let receiver = feed.subscribe().await;
        drop(receiver);

        tokio::time::timeout(Duration::from_secs(5), async {
            while feed.is_running().await {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .unwrap();
    }
}
