use serde::Deserialize;

/// One page of `GET /games`.
#[derive(Debug, Deserialize)]
pub struct GameListResponse {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub results: Vec<GameSummary>,
}

/// A game as listed in search and ranking results.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct GameSummary {
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub tba: bool,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub metacritic: Option<i64>,
    #[serde(default)]
    pub platforms: Option<Vec<PlatformEntry>>,
    #[serde(default)]
    pub genres: Vec<Named>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub esrb_rating: Option<Named>,
    #[serde(default)]
    pub short_screenshots: Vec<Screenshot>,
    #[serde(default)]
    pub stores: Option<Vec<StoreEntry>>,
}

/// Full record from `GET /games/{id}`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct GameDetail {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description_raw: Option<String>,
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub tba: bool,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub metacritic: Option<i64>,
    #[serde(default)]
    pub alternative_names: Vec<String>,
    #[serde(default)]
    pub platforms: Option<Vec<PlatformEntry>>,
    #[serde(default)]
    pub genres: Vec<Named>,
    #[serde(default)]
    pub developers: Vec<Named>,
    #[serde(default)]
    pub publishers: Vec<Named>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub esrb_rating: Option<Named>,
    #[serde(default)]
    pub stores: Option<Vec<StoreEntry>>,
}

/// Any `{id, name, slug}` object (genres, companies, ratings, platforms).
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Named {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlatformEntry {
    pub platform: Named,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Screenshot {
    pub image: String,
}

/// A store listing. The URL is only present on detail responses.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreEntry {
    #[serde(default)]
    pub url: Option<String>,
    pub store: Named,
}

/// Error body returned by RAWG on 4xx responses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ApiErrorBody {
    pub fn message(&self) -> Option<&str> {
        self.error.as_deref().or(self.detail.as_deref())
    }
}
