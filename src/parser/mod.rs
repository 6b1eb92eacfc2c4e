pub mod extract;
pub mod html;
pub mod names;

use crate::model::{MatchCandidate, PersonRecord};

/// Source listing page → people with at least one middle name.
pub fn parse_source_page(html: &str) -> Vec<PersonRecord> {
    extract::person_records(&html::source_rows(html), extract::has_middle_name)
}

/// Target results page → candidates, in table order.
pub fn parse_results_page(html: &str) -> Vec<MatchCandidate> {
    extract::match_candidates(&html::result_rows(html))
}
