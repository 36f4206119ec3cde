//! Helpers that read the model's final answer before it is persisted.

use std::sync::LazyLock;

use regex::Regex;

static CONFIDENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Confidence:\s*(\d+)%").expect("valid confidence pattern"));

pub const PRESCRIPTION_MARKER: &str = "PRESCRIPTION REQUIRED";

/// The first `Confidence: N%` in the reply as `"N%"`, or `"N/A"`.
pub fn confidence_score(reply: &str) -> String {
    CONFIDENCE
        .captures(reply)
        .and_then(|c| c.get(1))
        .map(|m| format!("{}%", m.as_str()))
        .unwrap_or_else(|| "N/A".to_string())
}

/// Whether a symptom-mode reply is a real medical answer worth saving, as opposed to
/// small talk like "Hi" or "Thanks".
pub fn is_symptom_check(reply: &str) -> bool {
    reply.contains("Causes") || reply.contains("Confidence:") || reply.contains("Remedies")
}

/// `"Rx"` if the medicine reply flags a prescription requirement, else `"OTC"`.
pub fn prescription_status(reply: &str) -> &'static str {
    if reply.contains(PRESCRIPTION_MARKER) {
        "Rx"
    } else {
        "OTC"
    }
}
