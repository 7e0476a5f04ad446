pub mod config;
pub mod detail;
pub mod listing;
pub mod models;
pub mod render;
pub mod session;
pub mod tmdb;

pub use config::CatalogConfig;
pub use detail::{DetailController, DetailState};
pub use listing::{EndReached, ListingController, PageOutcome, PageRequest};
pub use models::{Genre, MovieDetail, MovieSummary, QueryContext};
pub use session::{ListingEvent, ListingSession, ListingSnapshot};
pub use tmdb::{CatalogApi, TmdbClient};
