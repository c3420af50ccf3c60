//! Token and cost accounting types.
//!
//! These mirror the usage blocks emitted by assistant CLIs: a snake_case
//! aggregate on `result` events and a camelCase per-model breakdown.

use serde::{Deserialize, Serialize};

/// Aggregate token usage for a session or a single message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens consumed from the input side.
    #[serde(default)]
    pub input_tokens: u64,
    /// Tokens produced by the model.
    #[serde(default)]
    pub output_tokens: u64,
    /// Tokens written to the prompt cache.
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
    /// Tokens read back from the prompt cache.
    #[serde(default)]
    pub cache_read_input_tokens: u64,
}

impl TokenUsage {
    /// Input plus output tokens.
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Usage statistics for a specific model within a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelUsage {
    /// Tokens consumed from the input side.
    #[serde(default)]
    pub input_tokens: u64,
    /// Tokens produced by the model.
    #[serde(default)]
    pub output_tokens: u64,
    /// Tokens read back from the prompt cache.
    #[serde(default)]
    pub cache_read_input_tokens: u64,
    /// Tokens written to the prompt cache.
    #[serde(default)]
    pub cache_creation_input_tokens: u64,
    /// Cost attributed to this model, in USD.
    #[serde(default, rename = "costUSD")]
    pub cost_usd: f64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn token_usage_total() {
        let usage = TokenUsage {
            input_tokens: 10,
            output_tokens: 32,
            ..TokenUsage::default()
        };
        assert_eq!(usage.total(), 42);
    }

    #[test]
    fn token_usage_missing_fields_default_to_zero() {
        let usage: TokenUsage = serde_json::from_str(r#"{"input_tokens": 5}"#).unwrap();
        assert_eq!(usage.input_tokens, 5);
        assert_eq!(usage.output_tokens, 0);
        assert_eq!(usage.cache_read_input_tokens, 0);
    }

    #[test]
    fn model_usage_uses_camel_case_wire_names() {
        let json = r#"{
            "inputTokens": 100,
            "outputTokens": 50,
            "cacheReadInputTokens": 7,
            "costUSD": 0.0125
        }"#;
        let usage: ModelUsage = serde_json::from_str(json).unwrap();
        assert_eq!(usage.input_tokens, 100);
        assert_eq!(usage.output_tokens, 50);
        assert_eq!(usage.cache_read_input_tokens, 7);
        assert!((usage.cost_usd - 0.0125).abs() < f64::EPSILON);

        let round = serde_json::to_value(&usage).unwrap();
        assert!(round.get("costUSD").is_some());
        assert!(round.get("inputTokens").is_some());
    }
}
