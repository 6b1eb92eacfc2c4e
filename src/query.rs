use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::model::PersonRecord;
use crate::settings::{BIRTH_YEAR_FIELD, FORENAME_FIELD, SURNAME_FIELD};

static YEAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{4})\b").unwrap());

/// What gets typed into the target site's search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub forenames: String,
    pub surname: String,
    pub birth_year: Option<String>,
}

impl SearchQuery {
    /// First name plus the first middle name only; later middle names are
    /// not sent.
    pub fn for_person(person: &PersonRecord) -> Self {
        let forenames = match (person.first_names.first(), person.first_names.get(1)) {
            (Some(first), Some(middle)) => format!("{} {}", first, middle),
            (Some(first), None) => first.clone(),
            _ => String::new(),
        };

        SearchQuery {
            forenames,
            surname: person.surname.clone(),
            birth_year: birth_year(&person.birth_info),
        }
    }

    pub fn url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        {
            let mut q = url.query_pairs_mut();
            q.append_pair("forename", &self.forenames);
            q.append_pair("surname", &self.surname);
            if let Some(year) = &self.birth_year {
                q.append_pair("birth_year", year);
            }
        }
        url
    }

    /// (element id, value) pairs for the search-form fallback.
    pub fn form_values(&self) -> Vec<(&'static str, &str)> {
        let mut fields = vec![
            (FORENAME_FIELD, self.forenames.as_str()),
            (SURNAME_FIELD, self.surname.as_str()),
        ];
        if let Some(year) = &self.birth_year {
            fields.push((BIRTH_YEAR_FIELD, year.as_str()));
        }
        fields
    }
}

/// First standalone four-digit number in free-text birth info.
pub fn birth_year(birth_info: &str) -> Option<String> {
    YEAR_RE
        .captures(birth_info)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::names::parse_name;

    fn person(full_name: &str, birth_info: &str) -> PersonRecord {
        let n = parse_name(full_name).unwrap();
        PersonRecord {
            full_name: full_name.to_string(),
            surname: n.surname,
            given_names: n.given_names,
            first_names: n.first_names,
            middle_name_count: n.middle_name_count,
            id: "I1".to_string(),
            birth_info: birth_info.to_string(),
            birth_place: String::new(),
            row_index: 0,
        }
    }

    fn base() -> Url {
        Url::parse("https://records.example/search-records/stat_deaths").unwrap()
    }

    #[test]
    fn only_first_middle_name_used() {
        let q = SearchQuery::for_person(&person("JAMIESON, Thomas Robert William", "abt 1845"));
        assert_eq!(q.forenames, "Thomas Robert");
        assert_eq!(q.surname, "JAMIESON");
        assert_eq!(q.birth_year.as_deref(), Some("1845"));
    }

    #[test]
    fn url_encodes_each_parameter() {
        let q = SearchQuery::for_person(&person("SMITH, John Robert", "b. 12 Mar 1850"));
        assert_eq!(
            q.url(&base()).as_str(),
            "https://records.example/search-records/stat_deaths?forename=John+Robert&surname=SMITH&birth_year=1850"
        );
    }

    #[test]
    fn birth_year_omitted_when_absent() {
        let q = SearchQuery::for_person(&person("SMITH, John Robert", "unknown"));
        assert_eq!(q.birth_year, None);
        assert!(!q.url(&base()).as_str().contains("birth_year"));
        assert_eq!(q.form_values().len(), 2);
    }

    #[test]
    fn first_year_wins() {
        assert_eq!(birth_year("1850 or 1851").as_deref(), Some("1850"));
        assert_eq!(birth_year("18501"), None);
        assert_eq!(birth_year("c.1849"), Some("1849".to_string()));
    }

    #[test]
    fn form_values_use_field_ids() {
        let q = SearchQuery::for_person(&person("SMITH, John Robert", "1850"));
        assert_eq!(
            q.form_values(),
            vec![
                (FORENAME_FIELD, "John Robert"),
                (SURNAME_FIELD, "SMITH"),
                (BIRTH_YEAR_FIELD, "1850"),
            ]
        );
    }
}
