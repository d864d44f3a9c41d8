use crate::lookup::models::{Failure, FailureKind, Imei};

pub const IMEI_LEN: usize = 15;

/// Accepts exactly 15 ASCII digits. No separators are stripped and no
/// checksum is verified.
pub fn validate(text: &str) -> Result<Imei, Failure> {
    if text.len() == IMEI_LEN && text.bytes().all(|b| b.is_ascii_digit()) {
        Ok(Imei(text.to_string()))
    } else {
        Err(Failure::new(
            FailureKind::InvalidInput,
            format!("rejected {} chars", text.chars().count()),
        ))
    }
}
