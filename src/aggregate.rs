use std::collections::BTreeMap;

use chrono::Utc;

use crate::model::{CombinedRecord, PersonRecord, SearchOutcome, Summary};

/// Join each person with its outcome by id. The first outcome with a matching
/// id wins; duplicate ids are not deduplicated.
pub fn combine(people: &[PersonRecord], outcomes: &[SearchOutcome], page: u32) -> Vec<CombinedRecord> {
    people
        .iter()
        .map(|p| {
            let outcome = outcomes.iter().find(|o| o.person.id == p.id);
            combine_one(p, outcome, page)
        })
        .collect()
}

fn combine_one(p: &PersonRecord, outcome: Option<&SearchOutcome>, page: u32) -> CombinedRecord {
    let mut record = CombinedRecord {
        page,
        full_name: p.full_name.clone(),
        surname: p.surname.clone(),
        given_names: p.given_names.clone(),
        first_name: p.first_name().to_string(),
        middle_names: p.middle_names(),
        middle_name_count: p.middle_name_count,
        id: p.id.clone(),
        birth_info: p.birth_info.clone(),
        birth_place: p.birth_place.clone(),
        sp_search_url: String::new(),
        sp_result_count: 0,
        sp_location: String::new(),
        sp_death_year: String::new(),
        sp_match_reason: String::new(),
        sp_error: String::new(),
        sp_all_matches: "[]".to_string(),
    };

    if let Some(o) = outcome {
        record.sp_search_url = o.search_url.clone();
        record.sp_result_count = o.result_count;
        record.sp_location = o.best_match.location.clone();
        record.sp_death_year = o.best_match.death_year.clone();
        record.sp_match_reason = o.best_match.match_reason.clone();
        record.sp_error = o.error.clone().unwrap_or_default();
        record.sp_all_matches = serde_json::to_string(&o.all_results).unwrap_or_else(|_| "[]".to_string());
    }
    record
}

/// Run counters. The mean is 0 when there were no searches.
pub fn summarize(
    pages: usize,
    people: &[PersonRecord],
    outcomes: &[SearchOutcome],
    records: &[CombinedRecord],
) -> Summary {
    let searches = outcomes.len();
    let total_matches: usize = outcomes.iter().map(|o| o.result_count).sum();
    let average = if searches == 0 {
        0.0
    } else {
        total_matches as f64 / searches as f64
    };

    let mut page_breakdown = BTreeMap::new();
    for r in records {
        *page_breakdown.entry(format!("page_{}", r.page)).or_insert(0) += 1;
    }

    Summary {
        total_pages: pages,
        total_bayanne_records: people.len(),
        total_sp_searches: searches,
        sp_records_with_matches: outcomes.iter().filter(|o| o.result_count > 0).count(),
        sp_records_with_errors: outcomes.iter().filter(|o| o.error.is_some()).count(),
        average_matches_per_person: average,
        page_breakdown,
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{BestMatch, MatchCandidate};
    use crate::parser::extract::{has_middle_name, person_records};
    use crate::parser::html::TableRow;
    use crate::testutil::person;

    fn candidate(location: &str, year: &str) -> MatchCandidate {
        MatchCandidate {
            name: "JOHN SMITH".to_string(),
            surname: "SMITH".to_string(),
            forename: "JOHN".to_string(),
            death_year: year.to_string(),
            location: location.to_string(),
            mothers_maiden_name: String::new(),
            age_at_death: String::new(),
            gender: String::new(),
            reference: String::new(),
        }
    }

    #[test]
    fn end_to_end_single_result() {
        let rows = vec![TableRow::from_texts(&["", "SMITH, John Robert", "ID1", "1850", "Shetland"])];
        let people = person_records(&rows, has_middle_name);
        assert_eq!(people[0].first_names, vec!["John", "Robert"]);
        assert_eq!(people[0].middle_name_count, 1);

        let cands = vec![candidate("Lerwick", "1920")];
        let best = crate::matcher::best_match(&cands, &people[0]);
        let outcome = SearchOutcome::found(people[0].clone(), "https://x/?q".into(), cands, best);

        let combined = combine(&people, &[outcome], 1);
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].sp_location, "Lerwick");
        assert_eq!(combined[0].sp_death_year, "1920");
        assert_eq!(combined[0].sp_match_reason, "Single result");
        assert_eq!(combined[0].first_name, "John");
        assert_eq!(combined[0].middle_names, "Robert");
        assert!(combined[0].sp_all_matches.contains("\"deathYear\":\"1920\""));
    }

    #[test]
    fn missing_outcome_leaves_target_fields_empty() {
        let people = vec![person("SMITH, John Robert", "ID1", "1850", "Shetland")];
        let other = person("BROWN, Peter James", "ID9", "1850", "Unst");
        let outcome = SearchOutcome::failed(other, "u".into(), "boom".into());

        let r = &combine(&people, &[outcome], 2)[0];
        assert_eq!(r.page, 2);
        assert_eq!(r.sp_search_url, "");
        assert_eq!(r.sp_result_count, 0);
        assert_eq!(r.sp_location, "");
        assert_eq!(r.sp_death_year, "");
        assert_eq!(r.sp_match_reason, "");
        assert_eq!(r.sp_error, "");
        assert_eq!(r.sp_all_matches, "[]");
    }

    #[test]
    fn first_outcome_wins_for_duplicate_ids() {
        let p = person("SMITH, John Robert", "ID1", "1850", "Shetland");
        let first = SearchOutcome::found(
            p.clone(),
            "a".into(),
            vec![candidate("Lerwick", "1920")],
            BestMatch {
                location: "Lerwick".into(),
                death_year: "1920".into(),
                match_reason: "Single result".into(),
            },
        );
        let second = SearchOutcome::failed(p.clone(), "b".into(), "late".into());

        let combined = combine(&[p.clone(), p], &[first, second], 1);
        assert_eq!(combined.len(), 2);
        assert!(combined.iter().all(|r| r.sp_search_url == "a" && r.sp_error.is_empty()));
    }

    #[test]
    fn summary_counts() {
        let a = person("SMITH, John Robert", "ID1", "1850", "Shetland");
        let b = person("BROWN, Peter James", "ID2", "1850", "Unst");
        let c = person("HAY, Ola Magnus", "ID3", "1850", "Yell");
        let outcomes = vec![
            SearchOutcome::found(
                a.clone(),
                "a".into(),
                vec![candidate("L", "1"), candidate("M", "2"), candidate("N", "3")],
                BestMatch {
                    location: "Multiple".into(),
                    death_year: "Multiple".into(),
                    match_reason: "Multiple results (3), no maiden name match".into(),
                },
            ),
            SearchOutcome::failed(b.clone(), "b".into(), "timeout".into()),
        ];
        let people = vec![a, b, c];
        let mut records = combine(&people[..2], &outcomes, 1);
        records.extend(combine(&people[2..], &[], 2));

        let s = summarize(2, &people, &outcomes, &records);
        assert_eq!(s.total_pages, 2);
        assert_eq!(s.total_bayanne_records, 3);
        assert_eq!(s.total_sp_searches, 2);
        assert_eq!(s.sp_records_with_matches, 1);
        assert_eq!(s.sp_records_with_errors, 1);
        assert_eq!(s.average_matches_per_person, 1.5);
        assert_eq!(s.page_breakdown.get("page_1"), Some(&2));
        assert_eq!(s.page_breakdown.get("page_2"), Some(&1));
    }

    #[test]
    fn summary_of_nothing_has_zero_mean() {
        let s = summarize(0, &[], &[], &[]);
        assert_eq!(s.average_matches_per_person, 0.0);
        assert_eq!(s.total_pages, 0);
        assert!(s.average_matches_per_person.is_finite());
    }
}
