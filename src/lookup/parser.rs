use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use serde_json::Value;

use crate::lookup::error::LookupError;
use crate::lookup::models::LookupOutcome;

const TITLE: &str = "h1";
const INFO_CONTAINER: &str = "div.imei-info";
const ROW: &str = "div.row";
const LABEL_COLUMN: &str = "div.col-xs-5";
const VALUE_COLUMN: &str = "div.col-xs-7";

#[derive(Deserialize)]
struct DeviceRecord {
    brand: Option<String>,
    model: Option<String>,
}

fn selector(css: &str) -> Result<Selector, LookupError> {
    Selector::parse(css).map_err(|e| LookupError::Parse(format!("selector {css:?}: {e}")))
}

/// Concatenated text of an element with whitespace runs collapsed.
fn text_of(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses an imei24 check page into labelled rows.
pub fn parse_info_page(html: &str) -> Result<LookupOutcome, LookupError> {
    let doc = Html::parse_document(html);

    let info = doc
        .select(&selector(INFO_CONTAINER)?)
        .next()
        .ok_or(LookupError::NotFound)?;

    let title = doc
        .select(&selector(TITLE)?)
        .next()
        .map(text_of)
        .filter(|t| !t.is_empty());

    let label_sel = selector(LABEL_COLUMN)?;
    let value_sel = selector(VALUE_COLUMN)?;

    let mut fields = Vec::new();
    for (idx, row) in info.select(&selector(ROW)?).enumerate() {
        let column = |sel: &Selector, name: &str| {
            row.select(sel)
                .next()
                .map(text_of)
                .ok_or_else(|| LookupError::Parse(format!("row {} has no {name} column", idx + 1)))
        };
        let label = column(&label_sel, "label")?
            .trim_end_matches(':')
            .trim_end()
            .to_string();
        let value = column(&value_sel, "value")?;
        fields.push((label, value));
    }

    if title.is_none() && fields.is_empty() {
        return Err(LookupError::Parse("info container is empty".into()));
    }

    Ok(LookupOutcome::Found { title, fields })
}

/// Parses a `{brand, model, ...}` API body.
///
/// Valid JSON that lacks either field comes back as
/// [`LookupOutcome::PartialOrUnrecognized`] rather than an error.
pub fn parse_device_json(body: &str) -> Result<LookupOutcome, LookupError> {
    let value: Value = serde_json::from_str(body)?;

    let record = if value.is_object() {
        DeviceRecord::deserialize(&value).ok()
    } else {
        None
    };

    let non_empty = |v: Option<String>| {
        v.map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    match record.map(|r| (non_empty(r.brand), non_empty(r.model))) {
        Some((Some(brand), Some(model))) => Ok(LookupOutcome::brand_model(brand, model)),
        _ => Ok(LookupOutcome::PartialOrUnrecognized {
            raw_payload: value.to_string(),
        }),
    }
}
