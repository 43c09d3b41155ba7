use actordeck_core::{AppError, AppResult};

/// Infers actor capabilities from the little metadata available before a run.
///
/// The only capability tracked today is whether an actor needs a non-empty
/// `startUrls` list. An actor needs one when its identifier or name contains
/// one of the configured markers, or when its identifier is listed explicitly.
/// Matching is case-sensitive, like the platform's own identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorCapabilityRules {
    start_url_markers: Vec<String>,
    start_url_actor_ids: Vec<String>,
}

impl ActorCapabilityRules {
    /// Actor identifiers listed explicitly when no override is configured.
    pub const DEFAULT_START_URL_ACTOR_IDS: [&'static str; 1] = ["apify/website-content-crawler"];

    /// Markers used when no override is configured.
    pub const DEFAULT_START_URL_MARKERS: [&'static str; 2] = ["crawler", "scraper"];

    /// Creates rules from a custom marker list.
    ///
    /// The marker list replaces the defaults entirely, including the built-in
    /// explicit identifiers; add those back with [`Self::with_start_url_actor_ids`].
    pub fn new(start_url_markers: Vec<String>) -> AppResult<Self> {
        let start_url_markers: Vec<String> = start_url_markers
            .into_iter()
            .map(|marker| marker.trim().to_owned())
            .filter(|marker| !marker.is_empty())
            .collect();

        if start_url_markers.is_empty() {
            return Err(AppError::Validation(
                "at least one start URL actor marker is required".to_owned(),
            ));
        }

        Ok(Self {
            start_url_markers,
            start_url_actor_ids: Vec::new(),
        })
    }

    /// Adds actor identifiers that always need start URLs.
    #[must_use]
    pub fn with_start_url_actor_ids(mut self, actor_ids: Vec<String>) -> Self {
        self.start_url_actor_ids.extend(actor_ids);
        self
    }

    /// Returns the configured markers.
    #[must_use]
    pub fn start_url_markers(&self) -> &[String] {
        self.start_url_markers.as_slice()
    }

    /// Returns whether the actor must be started with a non-empty `startUrls` list.
    #[must_use]
    pub fn requires_start_urls(&self, actor_id: &str, actor_name: Option<&str>) -> bool {
        if self
            .start_url_actor_ids
            .iter()
            .any(|listed| listed == actor_id)
        {
            return true;
        }

        self.start_url_markers.iter().any(|marker| {
            actor_id.contains(marker.as_str())
                || actor_name.is_some_and(|name| name.contains(marker.as_str()))
        })
    }
}

impl Default for ActorCapabilityRules {
    fn default() -> Self {
        Self {
            start_url_markers: Self::DEFAULT_START_URL_MARKERS
                .iter()
                .map(|marker| (*marker).to_owned())
                .collect(),
            start_url_actor_ids: Self::DEFAULT_START_URL_ACTOR_IDS
                .iter()
                .map(|actor_id| (*actor_id).to_owned())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ActorCapabilityRules;

    #[test]
    fn crawler_and_scraper_ids_need_start_urls() {
        let rules = ActorCapabilityRules::default();

        assert!(rules.requires_start_urls("apify/website-content-crawler", None));
        assert!(rules.requires_start_urls("apify/instagram-scraper", None));
        assert!(!rules.requires_start_urls("apify/hello-world", None));
    }

    #[test]
    fn name_is_consulted_for_opaque_ids() {
        let rules = ActorCapabilityRules::default();
        assert!(rules.requires_start_urls("moJRLRc85AitArpNN", Some("my-crawler")));
        assert!(!rules.requires_start_urls("moJRLRc85AitArpNN", Some("my-actor")));
    }

    #[test]
    fn custom_markers_replace_defaults() {
        let rules = ActorCapabilityRules::new(vec![" spider ".to_owned()]);
        assert!(rules.is_ok());
        let rules = rules.unwrap_or_default();

        assert!(rules.requires_start_urls("acme/site-spider", None));
        assert!(!rules.requires_start_urls("acme/site-scraper", None));
        assert!(!rules.requires_start_urls("apify/website-content-crawler", None));
    }

    #[test]
    fn explicit_ids_match_exactly() {
        let rules = ActorCapabilityRules::new(vec!["crawler".to_owned()])
            .unwrap_or_default()
            .with_start_url_actor_ids(vec!["acme/fetch-pages".to_owned()]);

        assert!(rules.requires_start_urls("acme/fetch-pages", None));
        assert!(!rules.requires_start_urls("acme/fetch-pages-v2", None));
    }

    #[test]
    fn blank_marker_list_is_rejected() {
        assert!(ActorCapabilityRules::new(vec!["  ".to_owned()]).is_err());
    }
}
