use crate::model::{BestMatch, MatchCandidate, PersonRecord};

/// Pick the best candidate for `person`.
///
/// Several candidates are told apart by looking for a mother's maiden name
/// inside the person's birth place text; the first hit in table order wins.
pub fn best_match(candidates: &[MatchCandidate], person: &PersonRecord) -> BestMatch {
    match candidates {
        [] => BestMatch {
            location: String::new(),
            death_year: String::new(),
            match_reason: "No results".to_string(),
        },
        [only] => BestMatch {
            location: only.location.clone(),
            death_year: only.death_year.clone(),
            match_reason: "Single result".to_string(),
        },
        many => many
            .iter()
            .find(|c| {
                !c.mothers_maiden_name.is_empty() && person.birth_place.contains(&c.mothers_maiden_name)
            })
            .map(|c| BestMatch {
                location: c.location.clone(),
                death_year: c.death_year.clone(),
                match_reason: format!("Mother's maiden name match: {}", c.mothers_maiden_name),
            })
            .unwrap_or_else(|| BestMatch {
                location: "Multiple".to_string(),
                death_year: "Multiple".to_string(),
                match_reason: format!("Multiple results ({}), no maiden name match", many.len()),
            }),
    }
}
