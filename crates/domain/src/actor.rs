use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifiers of the public actors offered when a user owns none, in display order.
pub const FALLBACK_ACTOR_IDS: [&str; 4] = [
    "apify/web-scraper",
    "apify/website-content-crawler",
    "apify/google-search-results-scraper",
    "apify/instagram-scraper",
];

/// Usage statistics reported for an actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorStats {
    /// Number of runs recorded by the platform.
    #[serde(default)]
    pub total_runs: u64,
    /// Start time of the most recent run.
    pub last_run_at: Option<DateTime<Utc>>,
}

/// Actor listed in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// Platform identifier, either an opaque id or `username/name`.
    pub id: String,
    /// Technical actor name.
    pub name: String,
    /// Display title, falls back to the name.
    pub title: String,
    /// Optional long description.
    pub description: Option<String>,
    /// Owner username.
    pub username: String,
    /// Whether the actor is published in the store.
    #[serde(default)]
    pub is_public: bool,
    /// Usage statistics.
    pub stats: ActorStats,
}

impl Actor {
    /// Case-insensitive search over name, title and description; a blank term matches all.
    #[must_use]
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }

        self.name.to_lowercase().contains(&term)
            || self.title.to_lowercase().contains(&term)
            || self
                .description
                .as_deref()
                .is_some_and(|description| description.to_lowercase().contains(&term))
    }
}

/// Short actor description returned together with an input schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorSummary {
    /// Platform identifier.
    pub id: String,
    /// Technical actor name.
    pub name: String,
    /// Display title, falls back to the name.
    pub title: String,
    /// Optional long description.
    pub description: Option<String>,
}

impl ActorSummary {
    /// Builds a summary, using the name when no title is set.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        title: Option<String>,
        description: Option<String>,
    ) -> Self {
        let name = name.into();
        let title = title
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| name.clone());

        Self {
            id: id.into(),
            name,
            title,
            description,
        }
    }
}

/// Returns the fixed catalog of public actors, stamped with `now` as last run time.
#[must_use]
pub fn fallback_actors(now: DateTime<Utc>) -> Vec<Actor> {
    let entries: [(&str, &str, &str, &str, u64); 4] = [
        (
            FALLBACK_ACTOR_IDS[0],
            "web-scraper",
            "Web Scraper",
            "Crawls arbitrary websites using the Chrome browser and extracts data from pages using a provided JavaScript code. The actor supports both recursive crawling and lists of URLs and automatically manages concurrency for maximum performance.",
            1_000_000,
        ),
        (
            FALLBACK_ACTOR_IDS[1],
            "website-content-crawler",
            "Website Content Crawler",
            "Crawls websites and extracts text content from web pages. Supports various output formats including HTML, Markdown, and text. Perfect for content analysis and data extraction.",
            800_000,
        ),
        (
            FALLBACK_ACTOR_IDS[2],
            "google-search-results-scraper",
            "Google Search Results Scraper",
            "Scrapes Google Search result pages (SERPs) and extracts organic results, ads, related queries, People Also Ask, and more. Supports all Google domains and custom geolocation.",
            500_000,
        ),
        (
            FALLBACK_ACTOR_IDS[3],
            "instagram-scraper",
            "Instagram Scraper",
            "Scrape Instagram posts, profiles, hashtags, stories, comments, and much more. Get unlimited Instagram data in JSON, CSV, Excel, or HTML format.",
            300_000,
        ),
    ];

    entries
        .into_iter()
        .map(|(id, name, title, description, total_runs)| Actor {
            id: id.to_owned(),
            name: name.to_owned(),
            title: title.to_owned(),
            description: Some(description.to_owned()),
            username: "apify".to_owned(),
            is_public: true,
            stats: ActorStats {
                total_runs,
                last_run_at: Some(now),
            },
        })
        .collect()
}
