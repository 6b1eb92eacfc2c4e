use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::Config;
use serde::Deserialize;

const SOURCE_SEARCH_URL: &str = "https://www.bayanne.info/Shetland/search.php?mylastname=&lnqualify=exists&mybirthplace=SHI%2C+SCT&bpqualify=contains&mybirthyear=1900&byqualify=lt&mydeathplace=&dpqualify=dnexist&mydeathyear=&dyqualify=dnexist&mygender=M&gequalify=equals&tree=ID1&mybool=AND&nr=50&showspouse=&showdeath=&offset=0&tree=ID1&tngpage=1";
const TARGET_SEARCH_URL: &str =
    "https://www.scotlandspeople.gov.uk/search-records/statutory-records/stat_deaths";
const TARGET_LOGIN_URL: &str = "https://www.scotlandspeople.gov.uk/user/login";
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Element ids of the target site's death-record search form.
pub const FORENAME_FIELD: &str = "edit-search-params-nrs-forename";
pub const SURNAME_FIELD: &str = "edit-search-params-nrs-surname";
pub const BIRTH_YEAR_FIELD: &str = "edit-search-params-nrs-dob";
pub const SUBMIT_BUTTON: &str = "edit-actions-submit";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub source_search_url: String,
    pub page_size: u32,
    pub target_search_url: String,
    pub target_login_url: String,
    pub results_path_marker: String,
    pub user_agent: String,
    pub navigation_timeout_ms: u64,
    pub person_delay_ms: u64,
    pub page_delay_ms: u64,
    pub max_searches_per_page: usize,
    pub session_cookie: Option<String>,
    pub output_dir: PathBuf,
    pub results_csv: String,
    pub results_json: String,
    pub summary_json: String,
    pub people_json: String,
    pub people_csv: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            source_search_url: SOURCE_SEARCH_URL.to_string(),
            page_size: 50,
            target_search_url: TARGET_SEARCH_URL.to_string(),
            target_login_url: TARGET_LOGIN_URL.to_string(),
            results_path_marker: "/record-results/".to_string(),
            user_agent: USER_AGENT.to_string(),
            navigation_timeout_ms: 30_000,
            person_delay_ms: 1_000,
            page_delay_ms: 5_000,
            max_searches_per_page: 10,
            session_cookie: None,
            output_dir: PathBuf::from("."),
            results_csv: "genealogy_results.csv".to_string(),
            results_json: "integrated-results.json".to_string(),
            summary_json: "integrated-summary.json".to_string(),
            people_json: "results.json".to_string(),
            people_csv: "results.csv".to_string(),
        }
    }
}

impl Settings {
    /// Defaults, then `genealogy.toml` if present, then `GENEALOGY_*` env vars.
    pub fn load() -> Result<Self> {
        Config::builder()
            .add_source(config::File::with_name("genealogy").required(false))
            .add_source(config::Environment::with_prefix("GENEALOGY").try_parsing(true))
            .build()
            .context("Failed to read settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn output_path(&self, file: &str) -> PathBuf {
        self.output_dir.join(file)
    }
}
