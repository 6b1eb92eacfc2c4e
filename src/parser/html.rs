//! HTML plumbing: table rows, page text probes and search-form filling.
//!
//! Everything here works on already-fetched markup with the scraper crate; no
//! network access happens in this module.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::FormError;

static SOURCE_ROWS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table tr").unwrap());
static RESULT_ROWS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tbody tr").unwrap());
static CELLS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static CELL_NOTES: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".cell-notes").unwrap());
static BODY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());
static FORMS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("form").unwrap());
static CONTROLS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("input[name], select[name], textarea[name]").unwrap()
});
static OPTIONS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("option").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCell {
    /// Trimmed text content of the whole cell.
    pub text: String,
    /// Trimmed text of the first `.cell-notes` element inside the cell.
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

impl TableRow {
    #[cfg(test)]
    pub fn from_texts(texts: &[&str]) -> Self {
        TableRow {
            cells: texts
                .iter()
                .map(|t| TableCell { text: t.to_string(), notes: None })
                .collect(),
        }
    }

    pub fn text(&self, idx: usize) -> &str {
        self.cells.get(idx).map(|c| c.text.as_str()).unwrap_or("")
    }

    pub fn notes(&self, idx: usize) -> &str {
        self.cells
            .get(idx)
            .and_then(|c| c.notes.as_deref())
            .unwrap_or("")
    }
}

/// Rows of every table on a source listing page.
pub fn source_rows(html: &str) -> Vec<TableRow> {
    table_rows(html, &SOURCE_ROWS)
}

/// Body rows of the target site's results table.
pub fn result_rows(html: &str) -> Vec<TableRow> {
    table_rows(html, &RESULT_ROWS)
}

fn table_rows(html: &str, rows: &Selector) -> Vec<TableRow> {
    let doc = Html::parse_document(html);
    doc.select(rows)
        .map(|row| TableRow {
            cells: row.select(&CELLS).map(cell).collect(),
        })
        .collect()
}

fn cell(td: ElementRef) -> TableCell {
    TableCell {
        text: element_text(td),
        notes: td.select(&CELL_NOTES).next().map(element_text),
    }
}

fn element_text(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// True if the page body contains any of `phrases` (case-insensitive).
pub fn body_contains_any(html: &str, phrases: &[&str]) -> bool {
    let doc = Html::parse_document(html);
    let body = doc
        .select(&BODY)
        .next()
        .map(|b| b.text().collect::<String>())
        .unwrap_or_default()
        .to_lowercase();
    phrases.iter().any(|p| body.contains(&p.to_lowercase()))
}

// ── Form fallback ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    Get,
    Post,
}

/// A filled-in form, ready for the fetcher to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub method: FormMethod,
    pub action: String,
    pub fields: Vec<(String, String)>,
}

/// Locate the form holding the element with id `fields[0].0`, set each listed
/// field (by element id) to its value, and press the `submit_id` button.
/// Other named controls keep their current values.
pub fn fill_form(
    html: &str,
    page_url: &str,
    fields: &[(&str, &str)],
    submit_id: &str,
) -> Result<FormSubmission, FormError> {
    let doc = Html::parse_document(html);
    let (anchor_id, _) = fields.first().ok_or(FormError::FormNotFound)?;
    let anchor = id_selector(anchor_id)?;
    let form = doc
        .select(&FORMS)
        .find(|f| f.select(&anchor).next().is_some())
        .ok_or(FormError::FormNotFound)?;

    let mut values: Vec<(String, String)> = form.select(&CONTROLS).filter_map(control_value).collect();

    for (id, value) in fields {
        let name = named_control(form, id)?;
        match values.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => values.push((name, value.to_string())),
        }
    }

    let submit_sel = id_selector(submit_id)?;
    let submit = form
        .select(&submit_sel)
        .next()
        .ok_or_else(|| FormError::MissingField(submit_id.to_string()))?;
    if let Some(name) = submit.value().attr("name") {
        let value = submit.value().attr("value").unwrap_or("");
        values.push((name.to_string(), value.to_string()));
    }

    let method = match form.value().attr("method") {
        Some(m) if m.eq_ignore_ascii_case("post") => FormMethod::Post,
        _ => FormMethod::Get,
    };

    Ok(FormSubmission {
        method,
        action: resolve_action(page_url, form.value().attr("action"))?,
        fields: values,
    })
}

fn id_selector(id: &str) -> Result<Selector, FormError> {
    Selector::parse(&format!("#{}", id)).map_err(|_| FormError::MissingField(id.to_string()))
}

fn named_control(form: ElementRef, id: &str) -> Result<String, FormError> {
    let sel = id_selector(id)?;
    form.select(&sel)
        .next()
        .and_then(|el| el.value().attr("name"))
        .map(str::to_string)
        .ok_or_else(|| FormError::MissingField(id.to_string()))
}

/// Current value of a named control, or `None` if a browser would not send it.
fn control_value(el: ElementRef) -> Option<(String, String)> {
    let v = el.value();
    let name = v.attr("name")?.to_string();
    match v.name() {
        "input" => {
            let kind = v.attr("type").unwrap_or("text").to_ascii_lowercase();
            match kind.as_str() {
                "submit" | "button" | "image" | "reset" | "file" => None,
                "checkbox" | "radio" => v
                    .attr("checked")
                    .map(|_| (name, v.attr("value").unwrap_or("on").to_string())),
                _ => Some((name, v.attr("value").unwrap_or("").to_string())),
            }
        }
        "select" => {
            let options: Vec<ElementRef> = el.select(&OPTIONS).collect();
            let chosen = options
                .iter()
                .find(|o| o.value().attr("selected").is_some())
                .or_else(|| options.first())?;
            let value = chosen
                .value()
                .attr("value")
                .map(str::to_string)
                .unwrap_or_else(|| element_text(*chosen));
            Some((name, value))
        }
        "textarea" => Some((name, el.text().collect())),
        _ => None,
    }
}

fn resolve_action(page_url: &str, action: Option<&str>) -> Result<String, FormError> {
    let base = Url::parse(page_url).map_err(|e| FormError::Action(format!("{}: {}", page_url, e)))?;
    match action.map(str::trim).filter(|a| !a.is_empty()) {
        None => Ok(base.to_string()),
        Some(a) => base
            .join(a)
            .map(|u| u.to_string())
            .map_err(|e| FormError::Action(format!("{}: {}", a, e))),
    }
}
