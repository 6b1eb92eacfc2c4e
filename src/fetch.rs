use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

use reqwest::header::{HeaderValue, COOKIE};
use reqwest::{Client, RequestBuilder};
use tracing::debug;

use crate::error::{FetchError, LoginError};
use crate::parser::html::{FormMethod, FormSubmission};

/// A fetched page: where navigation ended up, and its markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub url: String,
    pub html: String,
}

/// Navigation against one site session. Implementations must not be shared
/// between concurrent searches.
#[allow(async_fn_in_trait)]
pub trait PageFetcher {
    async fn fetch(&mut self, url: &str, timeout: Duration) -> Result<Page, FetchError>;

    async fn submit(&mut self, form: &FormSubmission, timeout: Duration) -> Result<Page, FetchError>;

    /// Attach credentials obtained by the login gate to later requests.
    fn use_session_cookie(&mut self, cookie: &str) -> Result<(), FetchError>;
}

pub struct HttpFetcher {
    client: Client,
    cookie: Option<HeaderValue>,
}

impl HttpFetcher {
    pub fn new(user_agent: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .cookie_store(true)
            .build()?;
        Ok(HttpFetcher { client, cookie: None })
    }

    fn with_cookie(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.cookie {
            Some(c) => req.header(COOKIE, c.clone()),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder, url: &str, timeout: Duration) -> Result<Page, FetchError> {
        let start = Instant::now();
        let response = self
            .with_cookie(req)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, url, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
        }
        let final_url = response.url().to_string();
        let html = response.text().await.map_err(|e| classify(e, url, timeout))?;

        debug!(url, final_url = %final_url, latency_ms = start.elapsed().as_millis() as u64, "fetched");
        Ok(Page { url: final_url, html })
    }
}

fn classify(e: reqwest::Error, url: &str, timeout: Duration) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout { url: url.to_string(), timeout_ms: timeout.as_millis() as u64 }
    } else {
        FetchError::Http { url: url.to_string(), source: e }
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&mut self, url: &str, timeout: Duration) -> Result<Page, FetchError> {
        self.send(self.client.get(url), url, timeout).await
    }

    async fn submit(&mut self, form: &FormSubmission, timeout: Duration) -> Result<Page, FetchError> {
        let req = match form.method {
            FormMethod::Get => self.client.get(&form.action).query(&form.fields),
            FormMethod::Post => self.client.post(&form.action).form(&form.fields),
        };
        self.send(req, &form.action, timeout).await
    }

    fn use_session_cookie(&mut self, cookie: &str) -> Result<(), FetchError> {
        let value = HeaderValue::from_str(cookie.trim()).map_err(|e| FetchError::Cookie(e.to_string()))?;
        self.cookie = Some(value);
        Ok(())
    }
}

// ── Login ──

/// Blocks until authentication with the target site is complete. Returns a
/// session cookie to use, if the gate produced one.
pub trait LoginGate {
    fn wait_for_login(&mut self, login_url: &str) -> Result<Option<String>, LoginError>;
}

impl<G: LoginGate + ?Sized> LoginGate for Box<G> {
    fn wait_for_login(&mut self, login_url: &str) -> Result<Option<String>, LoginError> {
        (**self).wait_for_login(login_url)
    }
}

/// Asks a human to log in with their browser and paste the session cookie.
pub struct InteractiveLogin<R, W> {
    input: R,
    output: W,
}

impl InteractiveLogin<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        InteractiveLogin { input: std::io::stdin().lock(), output: std::io::stdout() }
    }
}

impl<R: BufRead, W: Write> InteractiveLogin<R, W> {
    #[cfg(test)]
    pub fn new(input: R, output: W) -> Self {
        InteractiveLogin { input, output }
    }
}

impl<R: BufRead, W: Write> LoginGate for InteractiveLogin<R, W> {
    fn wait_for_login(&mut self, login_url: &str) -> Result<Option<String>, LoginError> {
        writeln!(self.output, "\nPlease log in manually in your browser: {}", login_url)?;
        writeln!(self.output, "Then paste the site's Cookie header value below,")?;
        write!(self.output, "or just press Enter to continue without one: ")?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        let cookie = line.trim();
        Ok((!cookie.is_empty()).then(|| cookie.to_string()))
    }
}

/// Non-interactive gate: a cookie supplied through settings.
pub struct PresetCookie(pub String);

impl LoginGate for PresetCookie {
    fn wait_for_login(&mut self, _login_url: &str) -> Result<Option<String>, LoginError> {
        Ok(Some(self.0.clone()))
    }
}
