use std::ops::RangeInclusive;

use anyhow::{Context, Result};
use tracing::{info, warn};
use url::Url;

use crate::aggregate;
use crate::batch::{self, Pacer, Sleeper};
use crate::fetch::{LoginGate, PageFetcher};
use crate::model::{CombinedRecord, PersonRecord, SearchOutcome, Summary};
use crate::output;
use crate::search::TargetSession;
use crate::settings::Settings;
use crate::source;

/// Everything completed so far in a run; kept outside the run so a summary
/// can still be produced after a fatal error.
#[derive(Debug, Default)]
pub struct RunState {
    pub pages_done: usize,
    pub people: Vec<PersonRecord>,
    pub outcomes: Vec<SearchOutcome>,
    pub records: Vec<CombinedRecord>,
}

impl RunState {
    pub fn summary(&self) -> Summary {
        aggregate::summarize(self.pages_done, &self.people, &self.outcomes, &self.records)
    }
}

/// Persist the run summary. A write failure is logged, never returned.
pub fn save_summary(summary: &Summary, settings: &Settings) {
    let path = settings.output_path(&settings.summary_json);
    if let Err(e) = output::write_json(&path, summary) {
        warn!("Failed to write summary: {:#}", e);
    }
}

/// The first page of a run must load. Any later page that fails is logged
/// and treated as empty.
async fn load_people<SF: PageFetcher>(
    source_fetcher: &mut SF,
    settings: &Settings,
    page: u32,
    first: bool,
) -> Result<Vec<PersonRecord>> {
    match source::scrape_page(source_fetcher, settings, page).await {
        Err(e) if !first => {
            warn!(page, "Skipping source page: {:#}", e);
            Ok(Vec::new())
        }
        res => res,
    }
}

fn search_limit(settings: &Settings) -> Option<usize> {
    match settings.max_searches_per_page {
        0 => None,
        n => Some(n),
    }
}

/// Log in once, then for each source page: extract people, search the target
/// site for them, join, and append to the results CSV.
pub async fn run_integrated<SF, TF, G, S>(
    state: &mut RunState,
    settings: &Settings,
    pages: RangeInclusive<u32>,
    source_fetcher: &mut SF,
    session: &mut TargetSession<TF>,
    gate: &mut G,
    pacer: &Pacer<S>,
) -> Result<()>
where
    SF: PageFetcher,
    TF: PageFetcher,
    G: LoginGate,
    S: Sleeper,
{
    let search_base = Url::parse(&settings.target_search_url)
        .with_context(|| format!("Invalid target search URL: {}", settings.target_search_url))?;
    let csv_path = settings.output_path(&settings.results_csv);

    session
        .login(gate, &settings.target_login_url)
        .await
        .context("Target site login failed")?;

    let (first, last) = (*pages.start(), *pages.end());
    for page in pages {
        println!("\nProcessing source page {}/{}", page, last);

        let people = load_people(source_fetcher, settings, page, page == first).await?;
        state.pages_done += 1;
        if people.is_empty() {
            info!(page, "No people with middle names on this page");
            continue;
        }

        let outcomes = batch::search_people(session, &people, search_limit(settings), &search_base, pacer).await;
        let records = aggregate::combine(&people, &outcomes, page);
        let written = output::append_csv(&csv_path, &records);

        state.people.extend(people);
        state.outcomes.extend(outcomes);
        state.records.extend(records);
        written?;
        info!(page, total_records = state.records.len(), "Page complete");

        if page < last {
            pacer.between_pages().await;
        }
    }

    output::write_json(&settings.output_path(&settings.results_json), &state.records)?;
    Ok(())
}

/// Scrape source pages only and save the people found.
pub async fn run_source_only<SF, S>(
    state: &mut RunState,
    settings: &Settings,
    pages: RangeInclusive<u32>,
    source_fetcher: &mut SF,
    pacer: &Pacer<S>,
) -> Result<()>
where
    SF: PageFetcher,
    S: Sleeper,
{
    let (first, last) = (*pages.start(), *pages.end());
    for page in pages {
        let people = load_people(source_fetcher, settings, page, page == first).await?;
        state.pages_done += 1;
        for (i, p) in people.iter().enumerate() {
            info!(
                "{}. {} | given: {} | middle names: {} | id: {} | born: {} | place: {}",
                i + 1,
                p.full_name,
                p.given_names,
                p.middle_name_count,
                p.id,
                p.birth_info,
                p.birth_place
            );
        }
        state.people.extend(people);

        if page < last {
            pacer.between_pages().await;
        }
    }

    output::write_json(&settings.output_path(&settings.people_json), &state.people)?;
    output::write_csv(&settings.output_path(&settings.people_csv), &state.people)?;
    Ok(())
}
