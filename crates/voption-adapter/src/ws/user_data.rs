/*
[INPUT]:  Listen key and the REST client that issued it
[OUTPUT]: Background keep-alive renewal with failure accounting
[POS]:    WebSocket layer - user-data session lifecycle
[UPDATE]: When changing keep-alive cadence or terminal-failure handling
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::http::VoptionClient;

/// Default listen-key renewal cadence
pub const DEFAULT_KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(60);

/// Point-in-time view of a user-data session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDataStatus {
    pub listen_key: String,
    pub fail_count: u32,
    pub active: bool,
}

/// A listen key plus its repeating keep-alive task.
///
/// Dropping the session cancels the keep-alive task.
#[derive(Debug)]
pub struct UserDataSession {
    listen_key: String,
    fail_count: Arc<AtomicU32>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl UserDataSession {
    /// Spawn the keep-alive task; the first renewal fires after one interval
    pub fn spawn(rest: VoptionClient, listen_key: String, interval: Duration) -> Self {
        let fail_count = Arc::new(AtomicU32::new(0));
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_keep_alive(
            rest,
            listen_key.clone(),
            interval,
            fail_count.clone(),
            cancel.clone(),
        ));
        info!(interval_ms = interval.as_millis() as u64, "user data keep-alive scheduled");

        Self {
            listen_key,
            fail_count,
            cancel,
            task: Some(task),
        }
    }

    pub fn listen_key(&self) -> &str {
        &self.listen_key
    }

    pub fn fail_count(&self) -> u32 {
        self.fail_count.load(Ordering::Relaxed)
    }

    /// False once the timer was cancelled, by the caller or by an invalid listen key
    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    pub fn status(&self) -> UserDataStatus {
        UserDataStatus {
            listen_key: self.listen_key.clone(),
            fail_count: self.fail_count(),
            active: self.is_active(),
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the keep-alive task to exit after cancellation
    pub async fn join(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for UserDataSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_keep_alive(
    rest: VoptionClient,
    listen_key: String,
    interval: Duration,
    fail_count: Arc<AtomicU32>,
    cancel: CancellationToken,
) {
    let mut ticker = interval_at(Instant::now() + interval, interval);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                match rest.keep_alive_user_data_stream(&listen_key).await {
                    Ok(_) => debug!("user data keep-alive sent"),
                    Err(err) => {
                        let failures = fail_count.fetch_add(1, Ordering::Relaxed) + 1;
                        if err.is_invalid_listen_key() {
                            error!(
                                fail_count = failures,
                                error = %err,
                                "listen key expired; clearing keep-alive, resubscribe required"
                            );
                            cancel.cancel();
                            break;
                        }
                        warn!(fail_count = failures, error = %err, "user data keep-alive failed");
                    }
                }
            }
        }
    }
    debug!("user data keep-alive stopped");
}
