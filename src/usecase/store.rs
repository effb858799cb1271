//! The state owner.
//!
//! A single task owns [`State`] and processes mailbox messages in arrival
//! order. Actions are reduced one at a time and each result is published
//! whole. Cross-thread reads (the producer asking whether a picture is
//! pending) go through the same mailbox, so they are ordered with writes.

use super::effects::{EffectRunner, Environment};
use super::reducer::{reduce, Context};
use super::state::{Action, State};
use crate::bridge::PictureRequests;
use crate::capture::Frame;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

enum Message {
    Dispatch(Action),
    IsTakingPicture(oneshot::Sender<bool>),
    Shutdown,
}

/// Cloneable handle to the state owner.
#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::UnboundedSender<Message>,
    state: watch::Receiver<State>,
    processed: Arc<AtomicU64>,
}

impl StoreHandle {
    /// Spawns the state owner on the current runtime.
    pub fn spawn(initial: State, environment: Environment) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(initial.clone());
        let handle = Self {
            tx,
            state: state_rx,
            processed: Arc::new(AtomicU64::new(0)),
        };

        let runner = EffectRunner::new(environment, handle.clone());
        let task = tokio::spawn(run(initial, rx, state_tx, runner, Arc::clone(&handle.processed)));
        (handle, task)
    }

    /// Queues an action. Returns false once the owner has stopped.
    pub fn send(&self, action: Action) -> bool {
        let name = action.name();
        if self.tx.send(Message::Dispatch(action)).is_err() {
            tracing::debug!(action = name, "Store stopped, dropping action");
            return false;
        }
        true
    }

    /// Latest published snapshot.
    pub fn state(&self) -> State {
        self.state.borrow().clone()
    }

    /// Receiver of published snapshots.
    pub fn subscribe(&self) -> watch::Receiver<State> {
        self.state.clone()
    }

    /// Waits until a published snapshot satisfies `predicate`.
    ///
    /// Returns the last snapshot if the owner stops first.
    pub async fn wait_for(&self, mut predicate: impl FnMut(&State) -> bool) -> State {
        let mut rx = self.state.clone();
        loop {
            {
                let state = rx.borrow_and_update();
                if predicate(&state) {
                    return state.clone();
                }
            }
            if rx.changed().await.is_err() {
                return rx.borrow().clone();
            }
        }
    }

    /// Number of actions reduced so far.
    pub fn actions_processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    /// Asks the owner whether a picture is pending, blocking the caller.
    ///
    /// Must be called from a plain thread, never from inside the runtime.
    pub fn is_taking_picture_blocking(&self) -> bool {
        let (reply, response) = oneshot::channel();
        if self.tx.send(Message::IsTakingPicture(reply)).is_err() {
            return false;
        }
        response.blocking_recv().unwrap_or(false)
    }

    /// Stops the owner, aborting in-flight effects.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Message::Shutdown);
    }
}

impl PictureRequests for StoreHandle {
    fn is_taking_picture(&self) -> bool {
        self.is_taking_picture_blocking()
    }

    fn picture_taken(&self, image: Arc<Frame>) {
        self.send(Action::PictureTaken(image));
    }
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("state", &*self.state.borrow())
            .field("processed", &self.actions_processed())
            .finish()
    }
}

async fn run(
    mut state: State,
    mut rx: mpsc::UnboundedReceiver<Message>,
    state_tx: watch::Sender<State>,
    mut runner: EffectRunner,
    processed: Arc<AtomicU64>,
) {
    tracing::info!("Store started");
    while let Some(message) = rx.recv().await {
        match message {
            Message::Dispatch(action) => {
                let context = Context {
                    authorization: runner.session().authorization_status(),
                };
                tracing::debug!(action = action.name(), "Processing action");

                let (next, effects) = reduce(&state, action, &context);
                state = next;
                processed.fetch_add(1, Ordering::Relaxed);
                state_tx.send_replace(state.clone());

                for effect in effects {
                    runner.run(effect);
                }
            }
            Message::IsTakingPicture(reply) => {
                let _ = reply.send(state.is_taking_picture);
            }
            Message::Shutdown => break,
        }
    }

    // Unblock any producer waiting on a reply before detaching it.
    drop(rx);
    runner.shutdown().await;
    tracing::info!("Store stopped");
}
