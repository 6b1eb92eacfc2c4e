use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

// ── Source site ──

/// One person row from the family-tree listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    pub full_name: String,
    pub surname: String,
    pub given_names: String,
    pub first_names: Vec<String>,
    pub middle_name_count: usize,
    pub id: String,
    pub birth_info: String,
    pub birth_place: String,
    pub row_index: usize,
}

impl PersonRecord {
    pub fn first_name(&self) -> &str {
        self.first_names.first().map(String::as_str).unwrap_or("")
    }

    pub fn middle_names(&self) -> String {
        self.first_names.iter().skip(1).cloned().collect::<Vec<_>>().join(" ")
    }
}

// ── Target site ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    pub name: String,
    pub surname: String,
    pub forename: String,
    pub death_year: String,
    pub location: String,
    pub mothers_maiden_name: String,
    pub age_at_death: String,
    pub gender: String,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BestMatch {
    pub location: String,
    pub death_year: String,
    pub match_reason: String,
}

/// Result of searching the target site for one person.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub person: PersonRecord,
    pub search_url: String,
    pub all_results: Vec<MatchCandidate>,
    pub result_count: usize,
    pub best_match: BestMatch,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchOutcome {
    pub fn found(
        person: PersonRecord,
        search_url: String,
        all_results: Vec<MatchCandidate>,
        best_match: BestMatch,
    ) -> Self {
        SearchOutcome {
            person,
            search_url,
            result_count: all_results.len(),
            all_results,
            best_match,
            error: None,
        }
    }

    /// Placeholder for a search that failed; the batch keeps going.
    pub fn failed(person: PersonRecord, search_url: String, error: String) -> Self {
        SearchOutcome {
            person,
            search_url,
            all_results: Vec::new(),
            result_count: 0,
            best_match: BestMatch {
                location: String::new(),
                death_year: String::new(),
                match_reason: "Error".to_string(),
            },
            error: Some(error),
        }
    }
}

// ── Output projections ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombinedRecord {
    pub page: u32,
    #[serde(rename = "bayanne_fullName")]
    pub full_name: String,
    #[serde(rename = "bayanne_surname")]
    pub surname: String,
    #[serde(rename = "bayanne_givenNames")]
    pub given_names: String,
    #[serde(rename = "bayanne_firstName")]
    pub first_name: String,
    #[serde(rename = "bayanne_middleNames")]
    pub middle_names: String,
    #[serde(rename = "bayanne_middleNameCount")]
    pub middle_name_count: usize,
    #[serde(rename = "bayanne_id")]
    pub id: String,
    #[serde(rename = "bayanne_birthInfo")]
    pub birth_info: String,
    #[serde(rename = "bayanne_birthPlace")]
    pub birth_place: String,
    #[serde(rename = "sp_searchUrl")]
    pub sp_search_url: String,
    #[serde(rename = "sp_resultCount")]
    pub sp_result_count: usize,
    #[serde(rename = "sp_location")]
    pub sp_location: String,
    #[serde(rename = "sp_deathYear")]
    pub sp_death_year: String,
    #[serde(rename = "sp_matchReason")]
    pub sp_match_reason: String,
    #[serde(rename = "sp_error")]
    pub sp_error: String,
    #[serde(rename = "sp_allMatches")]
    pub sp_all_matches: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_pages: usize,
    pub total_bayanne_records: usize,
    #[serde(rename = "totalSPSearches")]
    pub total_sp_searches: usize,
    #[serde(rename = "spRecordsWithMatches")]
    pub sp_records_with_matches: usize,
    #[serde(rename = "spRecordsWithErrors")]
    pub sp_records_with_errors: usize,
    pub average_matches_per_person: f64,
    pub page_breakdown: BTreeMap<String, usize>,
    pub generated_at: DateTime<Utc>,
}

impl Summary {
    pub fn print(&self) {
        println!("\nSummary:");
        println!("  Pages processed:        {}", self.total_pages);
        println!("  Source records:         {}", self.total_bayanne_records);
        println!("  Target searches:        {}", self.total_sp_searches);
        println!("  Records with matches:   {}", self.sp_records_with_matches);
        println!("  Records with errors:    {}", self.sp_records_with_errors);
        println!("  Avg matches per person: {:.2}", self.average_matches_per_person);
        for (page, count) in &self.page_breakdown {
            println!("    {}: {}", page, count);
        }
    }
}
