/// "SURNAME, Given Middle…" split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedName {
    pub surname: String,
    pub given_names: String,
    pub first_names: Vec<String>,
    pub middle_name_count: usize,
}

/// Returns `None` when the text is not a person name: no comma, or nothing
/// after it.
pub fn parse_name(text: &str) -> Option<ParsedName> {
    let (surname, given) = text.split_once(',')?;
    let surname = surname.trim();
    let given_names = given.trim();
    if given_names.is_empty() {
        return None;
    }

    let first_names: Vec<String> = given_names.split_whitespace().map(str::to_string).collect();
    let middle_name_count = first_names.len().saturating_sub(1);

    Some(ParsedName {
        surname: surname.to_string(),
        given_names: given_names.to_string(),
        first_names,
        middle_name_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_comma_is_rejected() {
        assert_eq!(parse_name("John Robert Smith"), None);
        assert_eq!(parse_name(""), None);
        assert_eq!(parse_name("Name"), None);
    }

    #[test]
    fn empty_given_names_rejected() {
        assert_eq!(parse_name("SMITH,"), None);
        assert_eq!(parse_name("SMITH,   "), None);
    }

    #[test]
    fn single_given_name_has_no_middle() {
        let n = parse_name("SMITH, John").unwrap();
        assert_eq!(n.surname, "SMITH");
        assert_eq!(n.first_names, vec!["John"]);
        assert_eq!(n.middle_name_count, 0);
    }

    #[test]
    fn middle_names_counted() {
        let n = parse_name("  SMITH ,  John   Robert Magnus ").unwrap();
        assert_eq!(n.surname, "SMITH");
        assert_eq!(n.given_names, "John   Robert Magnus");
        assert_eq!(n.first_names, vec!["John", "Robert", "Magnus"]);
        assert_eq!(n.middle_name_count, 2);
    }

    #[test]
    fn splits_on_first_comma_only() {
        let n = parse_name("SMITH, John, Jr").unwrap();
        assert_eq!(n.surname, "SMITH");
        assert_eq!(n.given_names, "John, Jr");
        assert_eq!(n.first_names, vec!["John,", "Jr"]);
    }
}
