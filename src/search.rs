use std::time::Duration;

use tracing::{debug, info};
use url::Url;

use crate::error::{LoginError, SearchError};
use crate::fetch::{LoginGate, Page, PageFetcher};
use crate::matcher;
use crate::model::{MatchCandidate, PersonRecord, SearchOutcome};
use crate::parser::{self, html};
use crate::query::SearchQuery;
use crate::settings::{Settings, SUBMIT_BUTTON};

const NO_RESULTS_PHRASES: [&str; 3] = ["no results found", "0 results", "your search returned no results"];

/// The single authenticated session against the target site. Every search
/// goes through `&mut self`, so the session is never used by two searches at
/// once.
pub struct TargetSession<F> {
    fetcher: F,
    logged_in: bool,
    timeout: Duration,
    results_marker: String,
}

impl<F: PageFetcher> TargetSession<F> {
    pub fn new(fetcher: F, settings: &Settings) -> Self {
        TargetSession {
            fetcher,
            logged_in: false,
            timeout: settings.navigation_timeout(),
            results_marker: settings.results_path_marker.clone(),
        }
    }

    /// Load the login page, then block on `gate` until the human (or the
    /// configured cookie) has completed authentication.
    pub async fn login<G: LoginGate>(&mut self, gate: &mut G, login_url: &str) -> Result<(), LoginError> {
        info!(login_url, "Opening login page");
        self.fetcher.fetch(login_url, self.timeout).await?;

        if let Some(cookie) = gate.wait_for_login(login_url)? {
            self.fetcher.use_session_cookie(&cookie)?;
        }
        self.logged_in = true;
        info!("Login confirmed, continuing with automated searches");
        Ok(())
    }

    #[cfg(test)]
    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Search the target site for one person.
    ///
    /// Navigates to the prebuilt query URL; if the site does not land on a
    /// results page, fills and submits the search form with the same values.
    pub async fn search(
        &mut self,
        person: &PersonRecord,
        query: &SearchQuery,
        search_url: &Url,
    ) -> Result<SearchOutcome, SearchError> {
        if !self.logged_in {
            return Err(SearchError::NotLoggedIn);
        }

        let mut page = self.fetcher.fetch(search_url.as_str(), self.timeout).await?;

        if page.url.contains(&self.results_marker) {
            debug!("Query URL landed on results page");
        } else {
            info!("Auto-submit did not reach results, submitting the search form");
            let form = html::fill_form(&page.html, &page.url, &query.form_values(), SUBMIT_BUTTON)?;
            page = self.fetcher.submit(&form, self.timeout).await?;
        }

        let candidates = self.parse_results(&page);
        let best = matcher::best_match(&candidates, person);
        debug!(
            results = candidates.len(),
            location = %best.location,
            death_year = %best.death_year,
            "Best match determined"
        );

        Ok(SearchOutcome::found(person.clone(), search_url.to_string(), candidates, best))
    }

    fn parse_results(&self, page: &Page) -> Vec<MatchCandidate> {
        if html::body_contains_any(&page.html, &NO_RESULTS_PHRASES) {
            debug!(url = %page.url, "No results message detected");
            return Vec::new();
        }
        if !page.url.contains(&self.results_marker) {
            debug!(url = %page.url, "Not on a results page, assuming no results");
            return Vec::new();
        }
        parser::parse_results_page(&page.html)
    }

    #[cfg(test)]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }
}
