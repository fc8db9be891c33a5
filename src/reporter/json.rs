use crate::aggregator::Verdict;
use crate::reporter::Reporter;

pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for JsonReporter {
    fn report(&self, verdict: &Verdict) -> String {
        serde_json::to_string_pretty(verdict)
            .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize verdict: {}"}}"#, e))
    }
}
