use anyhow::anyhow;
use cinescope::{
    CatalogApi, DetailController, DetailState, Genre, ListingController, MovieDetail,
    MovieSummary, PageOutcome, QueryContext,
};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Popular(u32),
    Search(String, u32),
    Detail(i32),
}

#[derive(Default)]
struct FakeCatalog {
    popular: HashMap<u32, Vec<MovieSummary>>,
    searches: HashMap<(String, u32), Vec<MovieSummary>>,
    details: HashMap<i32, MovieDetail>,
    fail_detail: bool,
    fail_popular_page: Option<u32>,
    fail_search_page: Option<u32>,
    calls: Mutex<Vec<Call>>,
}

impl FakeCatalog {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CatalogApi for FakeCatalog {
    async fn list_popular(&self, page: u32) -> anyhow::Result<Vec<MovieSummary>> {
        self.calls.lock().unwrap().push(Call::Popular(page));
        if self.fail_popular_page == Some(page) {
            return Err(anyhow!("popular page {} exploded", page));
        }
        Ok(self.popular.get(&page).cloned().unwrap_or_default())
    }

    async fn search(&self, query: &str, page: u32) -> anyhow::Result<Vec<MovieSummary>> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Search(query.to_string(), page));
        if self.fail_search_page == Some(page) {
            return Err(anyhow!("search page {} exploded", page));
        }
        Ok(self
            .searches
            .get(&(query.to_string(), page))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_detail(&self, id: i32) -> anyhow::Result<Option<MovieDetail>> {
        self.calls.lock().unwrap().push(Call::Detail(id));
        if self.fail_detail {
            return Err(anyhow!("connection reset"));
        }
        Ok(self.details.get(&id).cloned())
    }
}

fn movies(start: i32, n: usize) -> Vec<MovieSummary> {
    (0..n as i32)
        .map(|i| MovieSummary {
            id: start + i,
            title: format!("Movie {}", start + i),
            poster_path: Some(format!("/p{}.jpg", start + i)),
            release_date: "2023-05-05".to_string(),
            original_language: "en".to_string(),
            popularity: 100.0 - i as f64,
            vote_average: 6.4,
            overview: "Overview".to_string(),
            genre_ids: vec![28],
            adult: false,
        })
        .collect()
}

fn detail(id: i32) -> MovieDetail {
    MovieDetail {
        id,
        title: "The Answer".to_string(),
        poster_path: None,
        backdrop_path: None,
        release_date: "2001-01-01".to_string(),
        original_language: "en".to_string(),
        popularity: 3.0,
        vote_average: 7.1,
        overview: "Forty two.".to_string(),
        genres: vec![Genre {
            id: 878,
            name: "Science Fiction".to_string(),
        }],
        adult: false,
        runtime: Some(120),
        tagline: None,
    }
}

#[tokio::test]
async fn browse_accumulates_pages_and_requests_next_page_number() {
    let mut api = FakeCatalog::default();
    api.popular.insert(1, movies(1, 15));
    api.popular.insert(2, movies(16, 7));
    api.popular.insert(3, movies(23, 4));

    let mut c = ListingController::new();
    assert_eq!(
        c.load_next_page(&api).await,
        Some(PageOutcome::Applied { received: 15 })
    );
    assert_eq!(c.items().len(), 15);
    assert_eq!(c.page(), 1);
    assert!(c.has_more());

    c.load_next_page(&api).await;
    assert_eq!(c.page(), 2);
    assert_eq!(c.items().len(), 22);

    c.load_next_page(&api).await;
    assert_eq!(c.page(), 3);
    assert_eq!(c.items().len(), 26);

    assert_eq!(
        api.calls(),
        vec![Call::Popular(1), Call::Popular(2), Call::Popular(3)]
    );
}

#[tokio::test]
async fn empty_page_stops_further_requests() {
    let mut api = FakeCatalog::default();
    api.popular.insert(1, movies(1, 2));

    let mut c = ListingController::new();
    c.load_next_page(&api).await;
    c.load_next_page(&api).await;
    assert!(!c.has_more());
    assert_eq!(c.load_next_page(&api).await, None);
    assert_eq!(c.load_next_page(&api).await, None);
    assert_eq!(c.items().len(), 2);
    assert_eq!(api.calls(), vec![Call::Popular(1), Call::Popular(2)]);
}

#[tokio::test]
async fn failed_page_is_logged_and_retried_on_next_trigger() {
    let mut api = FakeCatalog::default();
    api.popular.insert(1, movies(1, 5));
    api.fail_popular_page = Some(2);

    let mut c = ListingController::new();
    c.load_next_page(&api).await;
    assert_eq!(c.load_next_page(&api).await, Some(PageOutcome::Failed));
    assert!(!c.is_loading());
    assert_eq!(c.page(), 1);
    assert_eq!(c.items().len(), 5);

    c.load_next_page(&api).await;
    assert_eq!(api.calls().last(), Some(&Call::Popular(2)));
}

#[tokio::test]
async fn load_pages_stops_at_first_failure_without_retrying() {
    let mut api = FakeCatalog::default();
    api.popular.insert(1, movies(1, 15));
    api.popular.insert(3, movies(31, 15));
    api.fail_popular_page = Some(2);

    let mut c = ListingController::new();
    assert_eq!(c.load_pages(&api, 5).await, 1);
    assert_eq!(api.calls(), vec![Call::Popular(1), Call::Popular(2)]);
    assert_eq!(c.items().len(), 15);
    assert_eq!(c.page(), 1);
}

#[tokio::test]
async fn load_pages_stops_once_the_feed_runs_dry() {
    let mut api = FakeCatalog::default();
    api.popular.insert(1, movies(1, 4));

    let mut c = ListingController::new();
    assert_eq!(c.load_pages(&api, 5).await, 2);
    assert_eq!(api.calls(), vec![Call::Popular(1), Call::Popular(2)]);
    assert!(!c.has_more());
}

#[tokio::test]
async fn search_pages_skips_follow_ups_when_first_page_fails() {
    let mut api = FakeCatalog::default();
    api.fail_search_page = Some(1);

    let mut c = ListingController::new();
    assert_eq!(c.search_pages(&api, "heat", 3).await, 0);
    assert_eq!(api.calls(), vec![Call::Search("heat".to_string(), 1)]);
    assert!(!c.is_loading());
}

#[tokio::test]
async fn search_pages_walks_result_pages() {
    let mut api = FakeCatalog::default();
    api.searches.insert(("heat".to_string(), 1), movies(10, 20));
    api.searches.insert(("heat".to_string(), 2), movies(30, 5));

    let mut c = ListingController::new();
    assert_eq!(c.search_pages(&api, "heat", 2).await, 2);
    assert_eq!(c.items().len(), 25);
    assert_eq!(
        api.calls(),
        vec![
            Call::Search("heat".to_string(), 1),
            Call::Search("heat".to_string(), 2),
        ]
    );
}

#[tokio::test]
async fn search_replaces_list_and_clearing_restores_browse() {
    let mut api = FakeCatalog::default();
    api.popular.insert(1, movies(1, 15));
    api.popular.insert(2, movies(16, 15));
    api.searches.insert(("dune".to_string(), 1), movies(500, 3));
    api.searches.insert(("dune".to_string(), 2), movies(503, 2));

    let mut c = ListingController::new();
    c.load_next_page(&api).await;
    c.load_next_page(&api).await;
    assert_eq!(c.items().len(), 30);

    c.update_query(&api, "dune").await;
    assert_eq!(c.context(), &QueryContext::Search("dune".to_string()));
    assert_eq!(c.items().len(), 3);
    assert_eq!(c.items()[0].id, 500);
    assert_eq!(c.page(), 1);

    c.load_next_page(&api).await;
    assert_eq!(c.items().len(), 5);
    assert_eq!(c.page(), 2);

    c.update_query(&api, "").await;
    assert_eq!(c.context(), &QueryContext::Browse);
    assert_eq!(c.query(), "");
    assert_eq!(c.page(), 1);
    assert_eq!(c.items().len(), 15);
    assert_eq!(c.items()[0].id, 1);

    assert_eq!(
        api.calls(),
        vec![
            Call::Popular(1),
            Call::Popular(2),
            Call::Search("dune".to_string(), 1),
            Call::Search("dune".to_string(), 2),
            Call::Popular(1),
        ]
    );
}

#[tokio::test]
async fn search_with_no_hits_shows_empty_list() {
    let mut api = FakeCatalog::default();
    api.popular.insert(1, movies(1, 4));

    let mut c = ListingController::new();
    c.load_next_page(&api).await;
    c.update_query(&api, "zzzz").await;
    assert!(c.items().is_empty());
    assert!(!c.has_more());
}

#[tokio::test]
async fn detail_loads_once() {
    let mut api = FakeCatalog::default();
    api.details.insert(42, detail(42));

    let mut c = DetailController::new(42);
    assert!(c.is_loading());
    assert_eq!(c.state(), &DetailState::NotLoaded);
    c.load(&api).await;
    assert_eq!(c.item().map(|d| d.title.as_str()), Some("The Answer"));
    c.load(&api).await;
    assert_eq!(api.calls(), vec![Call::Detail(42)]);
}

#[tokio::test]
async fn detail_failure_settles_without_panicking() {
    let api = FakeCatalog {
        fail_detail: true,
        ..Default::default()
    };

    let mut c = DetailController::new(42);
    let state = c.load(&api).await.clone();
    assert!(matches!(state, DetailState::Failed(ref reason) if reason.contains("connection reset")));
    assert!(!c.is_loading());
    assert!(c.item().is_none());
}

#[tokio::test]
async fn missing_detail_is_reported_as_not_found() {
    let api = FakeCatalog::default();
    let mut c = DetailController::new(7);
    c.load(&api).await;
    assert_eq!(c.state(), &DetailState::Failed("not found".to_string()));
}
