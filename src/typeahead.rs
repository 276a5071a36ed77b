//! The widget runtime: one event-loop task owning a [`SearchController`].
//!
//! Keystrokes, timer fires, request completions and pointer presses all
//! arrive as events on a single channel, so controller state is only ever
//! touched from the loop task. Fetches run on their own tasks, raced
//! against their request's cancellation token.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::client::SearchBackend;
use crate::controller::{RequestId, SearchController, SearchRequest};
use crate::debounce::{DEFAULT_DELAY, Debouncer};
use crate::error::SearchError;
use crate::models::User;
use crate::pointer::{Bounds, Point, PointerBus, Subscription};
use crate::view::ViewState;

#[derive(Debug, Clone)]
pub struct TypeaheadConfig {
    pub debounce: Duration,
    /// Screen area of the widget; presses outside it close the dropdown.
    pub bounds: Bounds,
}

impl Default for TypeaheadConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DELAY,
            bounds: Bounds::new(0.0, 0.0, 480.0, 320.0),
        }
    }
}

#[derive(Debug)]
enum Event {
    Input(String),
    /// A debounce timer fired for the input of the given generation.
    Dispatch {
        generation: u64,
        text: String,
    },
    Completed {
        id: RequestId,
        outcome: Result<Vec<User>, SearchError>,
    },
    Focus,
    PointerDown(Point),
    Clear,
}

/// Handle to a running typeahead widget.
///
/// Dropping the handle stops the widget and cancels anything in flight.
pub struct Typeahead {
    events: mpsc::UnboundedSender<Event>,
    view: watch::Receiver<ViewState>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
    _pointer: Subscription,
}

impl Typeahead {
    /// Starts the widget on the current tokio runtime.
    pub fn spawn<B>(backend: B, config: TypeaheadConfig, bus: &PointerBus) -> Self
    where
        B: SearchBackend + 'static,
    {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let controller = SearchController::new();
        let (view_tx, view_rx) = watch::channel(controller.view());
        let shutdown = CancellationToken::new();

        let dispatch_tx = events_tx.clone();
        let debouncer = Debouncer::new(config.debounce, move |(generation, text): (u64, String)| {
            let _ = dispatch_tx.send(Event::Dispatch { generation, text });
        });

        let pointer_tx = events_tx.clone();
        let pointer = bus.subscribe(move |event| {
            let _ = pointer_tx.send(Event::PointerDown(event.position));
        });

        let event_loop = EventLoop {
            controller,
            debouncer,
            generation: 0,
            backend: Arc::new(backend),
            events: events_tx.clone(),
            view: view_tx,
            bounds: config.bounds,
            shutdown: shutdown.clone(),
        };
        let task = tokio::spawn(event_loop.run(events_rx));

        Self {
            events: events_tx,
            view: view_rx,
            shutdown,
            task: Some(task),
            _pointer: pointer,
        }
    }

    /// The input text changed.
    pub fn input(&self, text: impl Into<String>) {
        self.send(Event::Input(text.into()));
    }

    pub fn focus(&self) {
        self.send(Event::Focus);
    }

    pub fn clear(&self) {
        self.send(Event::Clear);
    }

    /// Latest published view.
    pub fn view(&self) -> ViewState {
        self.view.borrow().clone()
    }

    /// A receiver that is notified whenever the view changes.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view.clone()
    }

    /// Stops the widget and waits for the event loop to finish.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    fn send(&self, event: Event) {
        if self.events.send(event).is_err() {
            debug!("typeahead event loop has stopped; event dropped");
        }
    }
}

impl Drop for Typeahead {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

struct EventLoop<B> {
    controller: SearchController,
    debouncer: Debouncer<(u64, String)>,
    /// Bumped by every input and clear; a timer that fired for an older
    /// generation may still be queued and must not search.
    generation: u64,
    backend: Arc<B>,
    events: mpsc::UnboundedSender<Event>,
    view: watch::Sender<ViewState>,
    bounds: Bounds,
    shutdown: CancellationToken,
}

impl<B: SearchBackend + 'static> EventLoop<B> {
    async fn run(mut self, mut events: mpsc::UnboundedReceiver<Event>) {
        info!(debounce = ?self.debouncer.delay(), "typeahead started");

        loop {
            let event = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };
            self.handle(event);
            self.publish();
        }

        self.debouncer.cancel();
        self.controller.teardown();
        self.publish();
        info!("typeahead stopped");
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::Input(text) => {
                self.generation += 1;
                self.controller.set_query(text.clone());
                self.debouncer.call((self.generation, text));
            }
            Event::Dispatch { generation, text } => {
                if generation != self.generation {
                    debug!(generation, current = self.generation, "dropping outdated dispatch");
                    return;
                }
                if let Some(request) = self.controller.dispatch(&text) {
                    self.fetch(request);
                }
            }
            Event::Completed { id, outcome } => {
                let completion = self.controller.complete(id, outcome);
                debug!(id, ?completion, "search completed");
            }
            Event::Focus => self.controller.focus(),
            Event::PointerDown(position) => self.controller.pointer_down(position, &self.bounds),
            Event::Clear => {
                self.generation += 1;
                self.debouncer.cancel();
                self.controller.clear();
            }
        }
    }

    fn fetch(&self, request: SearchRequest) {
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();

        tokio::spawn(async move {
            let SearchRequest { id, query, cancel } = request;
            let outcome = tokio::select! {
                _ = cancel.cancelled() => Err(SearchError::Cancelled),
                result = backend.search(&query) => result,
            };
            let _ = events.send(Event::Completed { id, outcome });
        });
    }

    fn publish(&self) {
        let view = self.controller.view();
        self.view.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
    }
}
