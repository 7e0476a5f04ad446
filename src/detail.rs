use tracing::{error, info, warn};

use crate::models::MovieDetail;
use crate::tmdb::CatalogApi;

/// Where a detail fetch stands. Callers must match on all three before
/// touching item fields.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    NotLoaded,
    Loaded(MovieDetail),
    Failed(String),
}

#[derive(Debug)]
pub struct DetailController {
    id: i32,
    state: DetailState,
}

impl DetailController {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            state: DetailState::NotLoaded,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, DetailState::NotLoaded)
    }

    pub fn item(&self) -> Option<&MovieDetail> {
        match &self.state {
            DetailState::Loaded(item) => Some(item),
            _ => None,
        }
    }

    /// Fetch the record once. Later calls leave the settled state alone.
    pub async fn load(&mut self, api: &dyn CatalogApi) -> &DetailState {
        if !self.is_loading() {
            return &self.state;
        }
        self.state = match api.get_detail(self.id).await {
            Ok(Some(item)) => {
                info!("Loaded details for '{}' ({})", item.title, self.id);
                DetailState::Loaded(item)
            }
            Ok(None) => {
                warn!("Movie {} not found", self.id);
                DetailState::Failed("not found".to_string())
            }
            Err(e) => {
                error!("Failed to load movie {}: {:#}", self.id, e);
                DetailState::Failed(format!("{e:#}"))
            }
        };
        &self.state
    }
}
