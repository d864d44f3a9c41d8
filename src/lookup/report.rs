//! Turns a [`LookupOutcome`] into the reply text shown to the user.

use crate::lookup::models::{Failure, FailureKind, LookupOutcome};

pub const GREETING: &str =
    "👋 Hi! Send me an IMEI (15 digits) and I will look up the device details.";
pub const CHECKING: &str = "🔍 Checking IMEI...";

/// Renders an outcome. Pure: the same outcome always gives the same text.
pub fn format(outcome: &LookupOutcome) -> String {
    match outcome {
        LookupOutcome::Found { title, fields } => format_found(title.as_deref(), fields),
        LookupOutcome::PartialOrUnrecognized { raw_payload } => format!(
            "⚠️ The lookup service returned incomplete data for this IMEI.\n{raw_payload}"
        ),
        LookupOutcome::Failure(failure) => format_failure(failure),
    }
}

/// A bare Brand/Model pair renders as a two-line block whatever the title.
/// Anything else is the title line (if any) then one `label: value` line
/// per field.
fn format_found(title: Option<&str>, fields: &[(String, String)]) -> String {
    if let [(brand_label, brand), (model_label, model)] = fields {
        if brand_label == "Brand" && model_label == "Model" {
            return format!("Brand: {brand}\nModel: {model}");
        }
    }

    title
        .map(str::to_string)
        .into_iter()
        .chain(fields.iter().map(|(label, value)| format!("{label}: {value}")))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_failure(failure: &Failure) -> String {
    match failure.kind {
        FailureKind::InvalidInput => "❌ Invalid IMEI. It must be exactly 15 digits.".to_string(),
        FailureKind::HttpError { status } => format!("❌ HTTP error: {status}"),
        FailureKind::Timeout => "⏱️ The lookup server did not respond in time.".to_string(),
        FailureKind::NetworkError => "❌ Could not reach the lookup service.".to_string(),
        FailureKind::ParseError => "❌ Could not retrieve the IMEI information.".to_string(),
        FailureKind::InvalidPayload => {
            "❌ The lookup service sent a response in an invalid format.".to_string()
        }
        FailureKind::NotFound => "❌ No information found for this IMEI.".to_string(),
        FailureKind::InternalError => {
            "❌ Sorry, something went wrong while checking this IMEI.".to_string()
        }
    }
}
