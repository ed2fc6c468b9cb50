use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::ResolverConfig;
use crate::contract::StorageBackend;
use crate::links::Resolution;
use crate::resolver::resolve;

/// One resolution pass running in the background.
///
/// The default links are published before the pass starts, so
/// [`LinkSession::snapshot`] always has something to show. Dropping the
/// session aborts the pass; requests in flight are abandoned.
pub struct LinkSession {
    rx: watch::Receiver<Resolution>,
    task: JoinHandle<()>,
}

impl LinkSession {
    /// Publishes the pending defaults and spawns the resolution on the current runtime.
    pub fn start<S>(config: Arc<ResolverConfig>, storage: Arc<S>) -> Self
    where
        S: StorageBackend + 'static,
    {
        let (tx, rx) = watch::channel(Resolution::pending(config.default_links()));
        let task = tokio::spawn(async move {
            let resolution = resolve(config.as_ref(), storage.as_ref()).await;
            info!(status = ?resolution.status, "[SESSION] Publishing resolution");
            tx.send_replace(resolution);
        });
        LinkSession { rx, task }
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> Resolution {
        self.rx.borrow().clone()
    }

    /// Waits for the terminal snapshot. If the pass was aborted before it
    /// published one, returns the last snapshot seen.
    pub async fn settled(&mut self) -> Resolution {
        let settled = self
            .rx
            .wait_for(|r| r.status.is_terminal())
            .await
            .map(|r| r.clone());
        match settled {
            Ok(res) => res,
            Err(_) => {
                debug!("[SESSION] Resolution task ended without a terminal snapshot");
                self.snapshot()
            }
        }
    }

    /// Abandons the pass and returns whatever was published last.
    pub fn cancel(self) -> Resolution {
        if !self.task.is_finished() {
            self.task.abort();
            info!("[SESSION] Resolution cancelled");
        }
        self.snapshot()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for LinkSession {
    fn drop(&mut self) {
        self.task.abort();
    }
}
