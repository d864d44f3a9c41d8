use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::SendError, UnboundedReceiver, UnboundedSender};
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::lookup::Resolver;
use crate::telegram::client::BotClient;
use crate::telegram::handler;
use crate::telegram::models::{Message, Update};

const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

struct ChatWorker {
    tx: UnboundedSender<String>,
    handle: JoinHandle<()>,
    /// Idle workers this one replaced and may still be draining.
    predecessors: Vec<AbortHandle>,
}

impl ChatWorker {
    /// Hands over the handle a replacement awaits, plus every predecessor
    /// it must still be able to abort.
    fn retire(self) -> (JoinHandle<()>, Vec<AbortHandle>) {
        let mut predecessors: Vec<AbortHandle> = self
            .predecessors
            .into_iter()
            .filter(|h| !h.is_finished())
            .collect();
        predecessors.push(self.handle.abort_handle());
        (self.handle, predecessors)
    }

    fn abort(&self) {
        self.handle.abort();
        for handle in &self.predecessors {
            handle.abort();
        }
    }
}

/// Polls the Bot API and runs each chat's messages in order on its own task.
pub struct BotService<R> {
    bot: Arc<BotClient>,
    resolver: Arc<R>,
    chat_idle: Duration,
    workers: HashMap<i64, ChatWorker>,
}

impl<R: Resolver> BotService<R> {
    pub fn new(bot: BotClient, resolver: R, chat_idle: Duration) -> Self {
        Self {
            bot: Arc::new(bot),
            resolver: Arc::new(resolver),
            chat_idle,
            workers: HashMap::new(),
        }
    }

    /// Runs until `shutdown` resolves, then aborts in-flight chats.
    pub async fn run<F>(mut self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut offset: Option<i64> = None;

        info!(source = self.resolver.source_name(), "Bot is polling for messages");

        loop {
            let polled = tokio::select! {
                _ = &mut shutdown => break,
                res = self.bot.get_updates(offset) => res,
            };

            match polled {
                Ok(updates) => {
                    if !updates.is_empty() {
                        debug!(count = updates.len(), "Received updates");
                    }
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        self.route(update);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to poll updates");
                    tokio::select! {
                        _ = &mut shutdown => break,
                        _ = sleep(POLL_RETRY_DELAY) => {}
                    }
                }
            }

            self.workers.retain(|_, w| !w.handle.is_finished());
        }

        info!(active_chats = self.workers.len(), "Shutting down");
        for worker in self.workers.values() {
            worker.abort();
        }

        Ok(())
    }

    fn route(&mut self, update: Update) {
        match update.message {
            Some(Message {
                chat,
                text: Some(text),
                ..
            }) => self.dispatch(chat.id, text),
            _ => debug!(update_id = update.update_id, "Ignoring non-text update"),
        }
    }

    fn dispatch(&mut self, chat_id: i64, text: String) {
        let (text, previous, predecessors) = match self.workers.remove(&chat_id) {
            Some(worker) => match worker.tx.send(text) {
                Ok(()) => {
                    self.workers.insert(chat_id, worker);
                    return;
                }
                // worker went idle and closed its queue
                Err(SendError(text)) => {
                    let (handle, predecessors) = worker.retire();
                    (text, Some(handle), predecessors)
                }
            },
            None => (text, None, Vec::new()),
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_chat(
            chat_id,
            Arc::clone(&self.bot),
            Arc::clone(&self.resolver),
            self.chat_idle,
            previous,
            text,
            rx,
        ));

        self.workers.insert(
            chat_id,
            ChatWorker {
                tx,
                handle,
                predecessors,
            },
        );
    }
}

async fn run_chat<R: Resolver>(
    chat_id: i64,
    bot: Arc<BotClient>,
    resolver: Arc<R>,
    idle: Duration,
    previous: Option<JoinHandle<()>>,
    first: String,
    mut rx: UnboundedReceiver<String>,
) {
    // the previous worker may still be draining
    if let Some(previous) = previous {
        if let Err(e) = previous.await {
            debug!(chat_id, error = %e, "Previous chat worker ended abnormally");
        }
    }

    let mut next = Some(first);
    loop {
        if let Some(text) = next.take() {
            if let Err(e) = handler::handle_text(&bot, &resolver, chat_id, &text).await {
                warn!(chat_id, error = %e, "Failed to reply");
            }
        }

        match timeout(idle, rx.recv()).await {
            Ok(Some(text)) => next = Some(text),
            Ok(None) => break,
            // recv now drains what is queued, then yields None
            Err(_) => rx.close(),
        }
    }

    debug!(chat_id, "Chat worker exited");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle_worker(handle: JoinHandle<()>, predecessors: Vec<AbortHandle>) -> ChatWorker {
        let (tx, _rx) = mpsc::unbounded_channel();
        ChatWorker {
            tx,
            handle,
            predecessors,
        }
    }

    #[tokio::test]
    async fn abort_reaches_draining_predecessors() {
        // stands in for an old worker still draining its queue
        let draining = tokio::spawn(std::future::pending::<()>());
        let watch = draining.abort_handle();

        let (previous, predecessors) = idle_worker(draining, Vec::new()).retire();
        let replacement = idle_worker(
            tokio::spawn(async move {
                let _ = previous.await;
            }),
            predecessors,
        );

        replacement.abort();

        timeout(Duration::from_secs(1), async {
            while !watch.is_finished() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("predecessor was not aborted");
        assert!(replacement.handle.await.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn retire_drops_finished_predecessors() {
        let done = tokio::spawn(async {});
        let done_abort = done.abort_handle();
        done.await.unwrap();

        let worker = idle_worker(tokio::spawn(std::future::pending::<()>()), vec![done_abort]);
        let (handle, predecessors) = worker.retire();

        assert_eq!(predecessors.len(), 1);
        handle.abort();
    }
}
