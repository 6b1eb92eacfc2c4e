//! Test doubles for the fetcher and the sleeper.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use crate::batch::Sleeper;
use crate::error::FetchError;
use crate::fetch::{Page, PageFetcher};
use crate::model::PersonRecord;
use crate::parser::html::FormSubmission;
use crate::parser::names::parse_name;

/// Replays queued responses in order, one per fetch or submit.
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: VecDeque<Result<Page, FetchError>>,
    pub requested: Vec<String>,
    pub submitted: Vec<FormSubmission>,
    pub cookie: Option<String>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&mut self, url: &str, html: &str) {
        self.responses.push_back(Ok(Page { url: url.to_string(), html: html.to_string() }));
    }

    pub fn push_front_page(&mut self, url: &str, html: &str) {
        self.responses.push_front(Ok(Page { url: url.to_string(), html: html.to_string() }));
    }

    pub fn push_timeout(&mut self) {
        self.responses.push_back(Err(FetchError::Timeout {
            url: "https://records.example/".to_string(),
            timeout_ms: 30_000,
        }));
    }

    fn next(&mut self, url: &str) -> Result<Page, FetchError> {
        self.responses
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Status { url: url.to_string(), status: 404 }))
    }
}

impl PageFetcher for ScriptedFetcher {
    async fn fetch(&mut self, url: &str, _timeout: Duration) -> Result<Page, FetchError> {
        self.requested.push(url.to_string());
        self.next(url)
    }

    async fn submit(&mut self, form: &FormSubmission, _timeout: Duration) -> Result<Page, FetchError> {
        self.submitted.push(form.clone());
        self.next(&form.action)
    }

    fn use_session_cookie(&mut self, cookie: &str) -> Result<(), FetchError> {
        self.cookie = Some(cookie.to_string());
        Ok(())
    }
}

/// Records requested sleeps instead of sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    pub slept: RefCell<Vec<Duration>>,
}

impl Sleeper for RecordingSleeper {
    async fn sleep(&self, d: Duration) {
        self.slept.borrow_mut().push(d);
    }
}

pub fn person(full_name: &str, id: &str, birth_info: &str, birth_place: &str) -> PersonRecord {
    let n = parse_name(full_name).unwrap();
    PersonRecord {
        full_name: full_name.to_string(),
        surname: n.surname,
        given_names: n.given_names,
        first_names: n.first_names,
        middle_name_count: n.middle_name_count,
        id: id.to_string(),
        birth_info: birth_info.to_string(),
        birth_place: birth_place.to_string(),
        row_index: 0,
    }
}

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
}
