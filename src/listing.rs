//! Paginated popular/search listing.
//!
//! The controller never performs I/O itself. [`ListingController::begin_next_page`]
//! and [`ListingController::set_query`] hand out [`PageRequest`] tickets, the
//! caller runs them against a [`CatalogApi`] and feeds the result back through
//! [`ListingController::apply`]. Every ticket carries the generation it was
//! issued under; a query change bumps the generation so replies to older
//! requests are dropped instead of overwriting newer results. Within a
//! generation only the ticket currently outstanding is accepted, so a reply
//! is applied at most once.

use anyhow::Result;
use tracing::{debug, error, info};

use crate::models::{MovieSummary, QueryContext};
use crate::tmdb::CatalogApi;

/// A page fetch the controller wants performed.
#[derive(Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub context: QueryContext,
    pub page: u32,
    pub generation: u64,
    serial: u64,
    guarded: bool,
}

impl PageRequest {
    pub async fn fetch(&self, api: &dyn CatalogApi) -> Result<Vec<MovieSummary>> {
        match &self.context {
            QueryContext::Browse => api.list_popular(self.page).await,
            QueryContext::Search(q) => api.search(q, self.page).await,
        }
    }

    /// Whether this request holds the fetch-in-flight guard.
    pub fn is_guarded(&self) -> bool {
        self.guarded
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Results were stored; page 1 replaces, later pages append.
    Applied { received: usize },
    /// Issued under an older generation, or already settled; ignored.
    Stale,
    /// The fetch failed; state is unchanged.
    Failed,
}

#[derive(Debug)]
pub struct ListingController {
    items: Vec<MovieSummary>,
    page: u32,
    page_loaded: bool,
    /// Serial of the outstanding guarded (paginated) request.
    in_flight: Option<u64>,
    /// Serial of the outstanding page-1 search issued by `set_query`.
    first_page_pending: Option<u64>,
    has_more: bool,
    query: String,
    context: QueryContext,
    generation: u64,
    next_serial: u64,
}

impl Default for ListingController {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingController {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            page_loaded: false,
            in_flight: None,
            first_page_pending: None,
            has_more: true,
            query: String::new(),
            context: QueryContext::Browse,
            generation: 0,
            next_serial: 0,
        }
    }

    pub fn items(&self) -> &[MovieSummary] {
        &self.items
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some() || self.first_page_pending.is_some()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn context(&self) -> &QueryContext {
        &self.context
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn issue_serial(&mut self) -> u64 {
        self.next_serial = self.next_serial.wrapping_add(1);
        self.next_serial
    }

    /// Ticket for the next page of the current context, or `None` while a
    /// paginated fetch is outstanding or once an empty page has been seen.
    pub fn begin_next_page(&mut self) -> Option<PageRequest> {
        if self.is_loading() || !self.has_more {
            debug!(
                in_flight = self.in_flight.is_some(),
                has_more = self.has_more,
                "load more ignored"
            );
            return None;
        }
        let page = if self.page_loaded {
            self.page.saturating_add(1)
        } else {
            self.page
        };
        let serial = self.issue_serial();
        self.in_flight = Some(serial);
        Some(PageRequest {
            context: self.context.clone(),
            page,
            generation: self.generation,
            serial,
            guarded: true,
        })
    }

    /// Switch query. Non-empty text yields an immediate page-1 search that
    /// does not wait on the guard; empty text returns to browsing from page 1.
    pub fn set_query(&mut self, text: &str) -> Option<PageRequest> {
        self.query = text.to_string();
        self.page = 1;
        self.page_loaded = false;
        self.has_more = true;
        self.in_flight = None;
        self.first_page_pending = None;
        self.generation = self.generation.wrapping_add(1);

        if text.is_empty() {
            self.context = QueryContext::Browse;
            return self.begin_next_page();
        }

        self.context = QueryContext::Search(text.to_string());
        let serial = self.issue_serial();
        self.first_page_pending = Some(serial);
        Some(PageRequest {
            context: self.context.clone(),
            page: 1,
            generation: self.generation,
            serial,
            guarded: false,
        })
    }

    pub fn apply(
        &mut self,
        request: &PageRequest,
        result: Result<Vec<MovieSummary>>,
    ) -> PageOutcome {
        if request.generation != self.generation {
            debug!(
                page = request.page,
                issued = request.generation,
                current = self.generation,
                "dropping stale page response"
            );
            return PageOutcome::Stale;
        }
        let slot = if request.guarded {
            &mut self.in_flight
        } else {
            &mut self.first_page_pending
        };
        if *slot != Some(request.serial) {
            debug!(
                page = request.page,
                "dropping response for a ticket no longer outstanding"
            );
            return PageOutcome::Stale;
        }
        *slot = None;

        match result {
            Ok(results) => {
                let received = results.len();
                if request.page <= 1 {
                    self.items = results;
                } else {
                    self.items.extend(results);
                }
                self.page = request.page;
                self.page_loaded = true;
                self.has_more = received > 0;
                info!(
                    page = request.page,
                    received,
                    total = self.items.len(),
                    search = request.context.is_search(),
                    "page loaded"
                );
                PageOutcome::Applied { received }
            }
            Err(e) => {
                error!("Failed to load page {}: {:#}", request.page, e);
                PageOutcome::Failed
            }
        }
    }

    /// Begin, fetch and apply the next page. `None` when nothing was requested.
    pub async fn load_next_page(&mut self, api: &dyn CatalogApi) -> Option<PageOutcome> {
        let request = self.begin_next_page()?;
        let result = request.fetch(api).await;
        Some(self.apply(&request, result))
    }

    /// Load up to `count` further pages, stopping at the first request that
    /// is not applied. A failed page is not requested again. Returns the
    /// number of pages applied.
    pub async fn load_pages(&mut self, api: &dyn CatalogApi, count: u32) -> u32 {
        let mut applied = 0;
        while applied < count {
            match self.load_next_page(api).await {
                Some(PageOutcome::Applied { .. }) => applied += 1,
                _ => break,
            }
        }
        applied
    }

    /// Switch to `text` and load up to `count` pages of its results. The
    /// first page goes through `set_query`; nothing more is requested if it
    /// is not applied.
    pub async fn search_pages(&mut self, api: &dyn CatalogApi, text: &str, count: u32) -> u32 {
        if count == 0 {
            return 0;
        }
        match self.update_query(api, text).await {
            Some(PageOutcome::Applied { .. }) => 1 + self.load_pages(api, count - 1).await,
            _ => 0,
        }
    }

    /// `set_query` followed by the fetch it asks for.
    pub async fn update_query(&mut self, api: &dyn CatalogApi, text: &str) -> Option<PageOutcome> {
        let request = self.set_query(text)?;
        let result = request.fetch(api).await;
        Some(self.apply(&request, result))
    }
}

/// When a scrolling consumer should ask for more, expressed as a fraction of
/// the visible length left before the end of the content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndReached {
    pub threshold: f32,
}

impl Default for EndReached {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

impl EndReached {
    pub fn is_near_end(&self, offset: f32, viewport: f32, content: f32) -> bool {
        if viewport <= 0.0 {
            return false;
        }
        let remaining = content - (offset + viewport);
        remaining <= self.threshold * viewport
    }
}
