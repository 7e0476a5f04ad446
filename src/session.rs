//! Event loop around a [`ListingController`].
//!
//! One task owns the controller and processes events in order, the way a UI
//! thread would. Fetches run as separate tasks and report back through an
//! internal channel, so several requests may be outstanding at once.
//! Snapshots go out over a `watch` channel after every event.

use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::listing::{ListingController, PageRequest};
use crate::models::{MovieSummary, QueryContext};
use crate::tmdb::CatalogApi;

#[derive(Debug)]
pub enum ListingEvent {
    EndReached,
    QueryChanged(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingSnapshot {
    pub items: Vec<MovieSummary>,
    pub page: u32,
    pub loading: bool,
    pub has_more: bool,
    pub query: String,
    pub context: QueryContext,
    /// Incremented on every publish, including ones that changed nothing.
    pub revision: u64,
}

impl ListingSnapshot {
    fn capture(c: &ListingController, revision: u64) -> Self {
        Self {
            items: c.items().to_vec(),
            page: c.page(),
            loading: c.is_loading(),
            has_more: c.has_more(),
            query: c.query().to_string(),
            context: c.context().clone(),
            revision,
        }
    }
}

type Loaded = (PageRequest, Result<Vec<MovieSummary>>);

#[derive(Debug)]
pub struct ListingSession {
    events: mpsc::UnboundedSender<ListingEvent>,
    snapshots: watch::Receiver<ListingSnapshot>,
    task: JoinHandle<()>,
}

impl ListingSession {
    /// Start the loop and request the first popular page.
    pub fn spawn(api: Arc<dyn CatalogApi>) -> Self {
        let mut controller = ListingController::new();
        let first = controller.begin_next_page();
        let (snap_tx, snap_rx) = watch::channel(ListingSnapshot::capture(&controller, 0));
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_loop(api, controller, first, event_rx, snap_tx));
        Self {
            events: event_tx,
            snapshots: snap_rx,
            task,
        }
    }

    pub fn end_reached(&self) -> Result<()> {
        self.send(ListingEvent::EndReached)
    }

    pub fn set_query(&self, text: impl Into<String>) -> Result<()> {
        self.send(ListingEvent::QueryChanged(text.into()))
    }

    pub fn snapshot(&self) -> ListingSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListingSnapshot> {
        self.snapshots.clone()
    }

    /// Close the event channel and wait for the loop to exit. Fetches still
    /// running finish on their own; their results are discarded.
    pub async fn shutdown(self) {
        drop(self.events);
        let _ = self.task.await;
    }

    fn send(&self, event: ListingEvent) -> Result<()> {
        self.events
            .send(event)
            .map_err(|_| anyhow!("listing session has stopped"))
    }
}

async fn run_loop(
    api: Arc<dyn CatalogApi>,
    mut controller: ListingController,
    first: Option<PageRequest>,
    mut events: mpsc::UnboundedReceiver<ListingEvent>,
    snapshots: watch::Sender<ListingSnapshot>,
) {
    let (loaded_tx, mut loaded_rx) = mpsc::unbounded_channel::<Loaded>();
    let mut revision = 0u64;

    if let Some(request) = first {
        spawn_fetch(&api, request, &loaded_tx);
    }

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                let request = match event {
                    ListingEvent::EndReached => controller.begin_next_page(),
                    ListingEvent::QueryChanged(text) => controller.set_query(&text),
                };
                if let Some(request) = request {
                    spawn_fetch(&api, request, &loaded_tx);
                }
            }
            Some((request, result)) = loaded_rx.recv() => {
                controller.apply(&request, result);
            }
        }
        revision += 1;
        snapshots.send_replace(ListingSnapshot::capture(&controller, revision));
    }
    info!("Listing session closed");
}

fn spawn_fetch(
    api: &Arc<dyn CatalogApi>,
    request: PageRequest,
    loaded: &mpsc::UnboundedSender<Loaded>,
) {
    debug!(page = request.page, generation = request.generation, "fetching");
    let api = Arc::clone(api);
    let loaded = loaded.clone();
    tokio::spawn(async move {
        let result = request.fetch(api.as_ref()).await;
        // The loop may already be gone; nothing to report to then.
        let _ = loaded.send((request, result));
    });
}
