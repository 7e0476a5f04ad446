//! Plain-text cards for listing entries and detail records.

use crate::config::CatalogConfig;
use crate::detail::DetailState;
use crate::models::{MovieDetail, MovieSummary};

/// Display-ready fields shared by list and detail views.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieCard {
    pub id: i32,
    pub title: String,
    pub poster_url: Option<String>,
    pub release_date: String,
    pub language: String,
    pub popularity: String,
    pub rating: String,
    pub overview: String,
    pub genres: String,
    pub adult: &'static str,
}

impl MovieCard {
    pub fn from_summary(movie: &MovieSummary, config: &CatalogConfig) -> Self {
        let genres = movie
            .genre_ids
            .iter()
            .map(|g| g.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_url: config.image_url(movie.poster_path.as_deref()),
            release_date: movie.release_date.clone(),
            language: movie.original_language.to_uppercase(),
            popularity: format!("{:.1}", movie.popularity),
            rating: movie.vote_average.to_string(),
            overview: movie.overview.clone(),
            genres,
            adult: yes_no(movie.adult),
        }
    }

    pub fn from_detail(movie: &MovieDetail, config: &CatalogConfig) -> Self {
        let genres = movie
            .genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_url: config.image_url(movie.poster_path.as_deref()),
            release_date: movie.release_date.clone(),
            language: movie.original_language.to_uppercase(),
            popularity: format!("{:.1}", movie.popularity),
            rating: movie.vote_average.to_string(),
            overview: movie.overview.clone(),
            genres,
            adult: yes_no(movie.adult),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let mut out = vec![format!("{} [#{}]", self.title, self.id)];
        if let Some(url) = &self.poster_url {
            out.push(format!("Poster: {url}"));
        }
        out.push(format!("Release Date: {}", self.release_date));
        out.push(format!("Language: {}", self.language));
        out.push(format!("Popularity: {}", self.popularity));
        out.push(format!("Rating: {}", self.rating));
        if !self.overview.is_empty() {
            out.push(self.overview.clone());
        }
        out.push(format!("Genres: {}", self.genres));
        out.push(format!("Adult: {}", self.adult));
        out
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// Text for whatever state the detail view is in.
pub fn render_detail(state: &DetailState, config: &CatalogConfig) -> String {
    match state {
        DetailState::NotLoaded => "Loading...".to_string(),
        DetailState::Loaded(movie) => {
            let mut lines = MovieCard::from_detail(movie, config).lines();
            if let Some(tagline) = movie.tagline.as_deref().filter(|t| !t.is_empty()) {
                lines.insert(1, format!("\"{tagline}\""));
            }
            if let Some(runtime) = movie.runtime.filter(|r| *r > 0) {
                lines.push(format!("Runtime: {runtime} min"));
            }
            lines.join("\n")
        }
        DetailState::Failed(reason) => format!("Movie details unavailable: {reason}"),
    }
}
