use crate::model::{MatchCandidate, PersonRecord};
use crate::parser::html::TableRow;
use crate::parser::names::parse_name;

const SOURCE_MIN_CELLS: usize = 4;
const RESULT_MIN_CELLS: usize = 8;

/// Source listing rows → person records passing `keep`, in row order.
///
/// Rows with fewer than four cells or without a "SURNAME, Given" name in
/// cell 1 are skipped.
pub fn person_records<F>(rows: &[TableRow], keep: F) -> Vec<PersonRecord>
where
    F: Fn(&PersonRecord) -> bool,
{
    rows.iter()
        .enumerate()
        .filter_map(|(idx, row)| person_record(idx, row))
        .filter(|p| keep(p))
        .collect()
}

/// The listing filter used by every run: at least one middle name.
pub fn has_middle_name(person: &PersonRecord) -> bool {
    person.middle_name_count >= 1
}

fn person_record(row_index: usize, row: &TableRow) -> Option<PersonRecord> {
    if row.cells.len() < SOURCE_MIN_CELLS {
        return None;
    }
    let full_name = row.text(1);
    let name = parse_name(full_name)?;

    Some(PersonRecord {
        full_name: full_name.to_string(),
        surname: name.surname,
        given_names: name.given_names,
        first_names: name.first_names,
        middle_name_count: name.middle_name_count,
        id: row.text(2).to_string(),
        birth_info: row.text(3).to_string(),
        birth_place: row.text(4).to_string(),
        row_index,
    })
}

/// Results-table rows → candidates, in table order.
pub fn match_candidates(rows: &[TableRow]) -> Vec<MatchCandidate> {
    rows.iter().filter_map(match_candidate).collect()
}

fn match_candidate(row: &TableRow) -> Option<MatchCandidate> {
    if row.cells.len() < RESULT_MIN_CELLS {
        return None;
    }
    let surname = row.notes(0);
    let forename = row.notes(1);
    let year = row.notes(5);
    if surname.is_empty() || forename.is_empty() || year.is_empty() {
        return None;
    }

    Some(MatchCandidate {
        name: format!("{} {}", forename, surname),
        surname: surname.to_string(),
        forename: forename.to_string(),
        death_year: year.to_string(),
        location: row.notes(7).to_string(),
        mothers_maiden_name: row.notes(3).to_string(),
        age_at_death: row.notes(2).to_string(),
        gender: row.notes(4).to_string(),
        reference: row.text(6).to_string(),
    })
}
