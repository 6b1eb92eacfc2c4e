use anyhow::{Context, Result};
use tracing::info;
use url::Url;

use crate::fetch::PageFetcher;
use crate::model::PersonRecord;
use crate::parser;
use crate::settings::Settings;

/// Listing URL for 1-based `page`: rewrites `offset` and `tngpage`, leaves
/// every other parameter (duplicates included) as is.
pub fn page_url(base: &str, page: u32, page_size: u32) -> Result<Url> {
    let mut url = Url::parse(base).with_context(|| format!("Invalid source URL: {}", base))?;
    let offset = page
        .saturating_sub(1)
        .checked_mul(page_size)
        .with_context(|| format!("Source page {} is out of range", page))?
        .to_string();
    let page_str = page.to_string();

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = match k.as_ref() {
                "offset" => offset.clone(),
                "tngpage" => page_str.clone(),
                _ => v.into_owned(),
            };
            (k.into_owned(), v)
        })
        .collect();

    let has = |key: &str| pairs.iter().any(|(k, _)| k == key);
    let (need_offset, need_page) = (!has("offset"), !has("tngpage"));

    {
        let mut q = url.query_pairs_mut();
        q.clear();
        q.extend_pairs(&pairs);
        if need_offset {
            q.append_pair("offset", &offset);
        }
        if need_page {
            q.append_pair("tngpage", &page_str);
        }
    }
    Ok(url)
}

/// Fetch one listing page and return the people with middle names on it.
pub async fn scrape_page<F: PageFetcher>(
    fetcher: &mut F,
    settings: &Settings,
    page: u32,
) -> Result<Vec<PersonRecord>> {
    let url = page_url(&settings.source_search_url, page, settings.page_size)?;
    info!(page, %url, "Loading source page");

    let fetched = fetcher
        .fetch(url.as_str(), settings.navigation_timeout())
        .await
        .with_context(|| format!("Failed to load source page {}", page))?;

    let people = parser::parse_source_page(&fetched.html);
    info!(page, people = people.len(), "Extracted people with middle names");
    Ok(people)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{fixture, ScriptedFetcher};

    const BASE: &str = "https://tree.example/search.php?mygender=M&tree=ID1&nr=50&offset=0&tree=ID1&tngpage=1";

    #[test]
    fn first_page_offset_zero() {
        let url = page_url(BASE, 1, 50).unwrap();
        assert_eq!(
            url.as_str(),
            "https://tree.example/search.php?mygender=M&tree=ID1&nr=50&offset=0&tree=ID1&tngpage=1"
        );
    }

    #[test]
    fn later_pages_shift_offset() {
        let url = page_url(BASE, 3, 50).unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("offset".into(), "100".into())));
        assert!(pairs.contains(&("tngpage".into(), "3".into())));
        assert_eq!(pairs.iter().filter(|(k, _)| k == "tree").count(), 2);
    }

    #[test]
    fn missing_params_appended() {
        let url = page_url("https://tree.example/search.php?nr=50", 2, 50).unwrap();
        assert_eq!(url.as_str(), "https://tree.example/search.php?nr=50&offset=50&tngpage=2");
    }

    #[test]
    fn huge_page_number_is_an_error() {
        let err = page_url(BASE, u32::MAX, 50).unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert!(page_url(BASE, u32::MAX, 1).is_ok());
    }

    #[test]
    fn bad_base_url() {
        assert!(page_url("not a url", 1, 50).is_err());
    }

    #[tokio::test]
    async fn scrape_page_parses_listing() {
        let html = fixture("source_page");
        let mut fetcher = ScriptedFetcher::new();
        fetcher.push_page("https://tree.example/search.php?offset=0", &html);

        let settings = Settings {
            source_search_url: BASE.to_string(),
            ..Settings::default()
        };
        let people = scrape_page(&mut fetcher, &settings, 1).await.unwrap();
        assert_eq!(people.len(), 2);
        assert_eq!(fetcher.requested, vec![page_url(BASE, 1, 50).unwrap().to_string()]);
    }

    #[tokio::test]
    async fn scrape_page_failure_is_fatal() {
        let mut fetcher = ScriptedFetcher::new();
        fetcher.push_timeout();
        let err = scrape_page(&mut fetcher, &Settings::default(), 2).await.unwrap_err();
        assert!(err.to_string().contains("source page 2"));
    }
}
