use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use url::Url;

use crate::fetch::PageFetcher;
use crate::model::{PersonRecord, SearchOutcome};
use crate::query::SearchQuery;
use crate::search::TargetSession;
use crate::settings::Settings;

/// Minimum spacing between outbound requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayPolicy {
    pub between_people: Duration,
    pub between_pages: Duration,
}

impl Default for DelayPolicy {
    fn default() -> Self {
        DelayPolicy {
            between_people: Duration::from_millis(1_000),
            between_pages: Duration::from_millis(5_000),
        }
    }
}

impl DelayPolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        DelayPolicy {
            between_people: Duration::from_millis(settings.person_delay_ms),
            between_pages: Duration::from_millis(settings.page_delay_ms),
        }
    }
}

#[allow(async_fn_in_trait)]
pub trait Sleeper {
    async fn sleep(&self, d: Duration);
}

pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, d: Duration) {
        if !d.is_zero() {
            tokio::time::sleep(d).await;
        }
    }
}

pub struct Pacer<S> {
    policy: DelayPolicy,
    sleeper: S,
}

impl<S: Sleeper> Pacer<S> {
    pub fn new(policy: DelayPolicy, sleeper: S) -> Self {
        Pacer { policy, sleeper }
    }

    pub async fn between_people(&self) {
        info!("Waiting {:.1}s before next search", self.policy.between_people.as_secs_f64());
        self.sleeper.sleep(self.policy.between_people).await;
    }

    pub async fn between_pages(&self) {
        info!("Waiting {:.1}s before next page", self.policy.between_pages.as_secs_f64());
        self.sleeper.sleep(self.policy.between_pages).await;
    }

    #[cfg(test)]
    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }
}

/// Search the target site for each person, strictly in order and one at a
/// time. A failed search becomes an outcome with `error` set; it never stops
/// the batch. Returns one outcome per processed person, in input order.
pub async fn search_people<F: PageFetcher, S: Sleeper>(
    session: &mut TargetSession<F>,
    people: &[PersonRecord],
    limit: Option<usize>,
    search_base: &Url,
    pacer: &Pacer<S>,
) -> Vec<SearchOutcome> {
    let total = limit.map_or(people.len(), |n| n.min(people.len()));
    let mut outcomes = Vec::with_capacity(total);
    info!("Starting target searches for {} people", total);

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({eta})")
            .map(|s| s.progress_chars("=> "))
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    for (i, person) in people.iter().take(total).enumerate() {
        info!("[{}/{}] Searching for {}", i + 1, total, person.full_name);

        let query = SearchQuery::for_person(person);
        let url = query.url(search_base);

        let outcome = match session.search(person, &query, &url).await {
            Ok(outcome) => {
                log_outcome(&outcome);
                outcome
            }
            Err(e) => {
                warn!("Search failed for {}: {}", person.full_name, e);
                SearchOutcome::failed(person.clone(), url.to_string(), e.to_string())
            }
        };
        outcomes.push(outcome);
        pb.inc(1);

        if i + 1 < total {
            pacer.between_people().await;
        }
    }

    pb.finish_and_clear();
    outcomes
}

fn log_outcome(outcome: &SearchOutcome) {
    if outcome.result_count == 0 {
        info!("  No matches found");
        return;
    }
    info!("  Found {} potential matches", outcome.result_count);
    for (idx, c) in outcome.all_results.iter().enumerate() {
        info!("    {}. {} - {} - {}", idx + 1, c.name, c.death_year, c.location);
    }
    let best = &outcome.best_match;
    info!("  Best match: {} | {} ({})", best.location, best.death_year, best.match_reason);
}
