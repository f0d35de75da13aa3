//! Stubbed reply computation.
//!
//! There is no model call. A reply is the prompt with whitespace collapsed,
//! prefixed by the model label and truncated to a fixed character budget.
//! Only the prompt part is ever cut, so the label prefix always survives.

use std::time::Duration;

use crate::model_registry::ModelInfo;

pub const DEFAULT_MAX_REPLY_CHARS: usize = 500;

const ELLIPSIS: char = '…';

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplyConfig {
    /// Upper bound on reply length, counted in chars.
    pub max_chars: usize,
    /// Multiplier applied to each model's `latency_ms`. Zero disables the delay.
    pub latency_scale: f64,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_REPLY_CHARS,
            latency_scale: 1.0,
        }
    }
}

impl ReplyConfig {
    pub fn instant() -> Self {
        Self {
            latency_scale: 0.0,
            ..Self::default()
        }
    }

    pub fn delay_for(&self, model: &ModelInfo) -> Duration {
        if self.latency_scale <= 0.0 || !self.latency_scale.is_finite() {
            return Duration::ZERO;
        }
        let millis = (model.latency_ms as f64 * self.latency_scale).round() as u64;
        Duration::from_millis(millis)
    }

    pub fn compose(&self, model: &ModelInfo, prompt: &str) -> String {
        compose_reply(&model.label, prompt, self.max_chars)
    }

    /// Raise `max_chars` so every label in `models` fits with room for at
    /// least one prompt char.
    pub fn fitted_to(mut self, models: &[ModelInfo]) -> Self {
        let floor = models
            .iter()
            .map(|model| min_reply_chars(&model.label))
            .max()
            .unwrap_or(0);

        if self.max_chars < floor {
            tracing::warn!(
                target: "core.reply",
                configured = self.max_chars,
                minimum = floor,
                "Reply limit is too small for the model labels, raising it"
            );
            self.max_chars = floor;
        }
        self
    }
}

/// Smallest reply that still holds `"<label>: "` plus one char.
pub fn min_reply_chars(label: &str) -> usize {
    label.chars().count() + 3
}

/// Effective limit for a reply under `label`: `max_chars`, but never below
/// [`min_reply_chars`].
pub fn reply_limit(label: &str, max_chars: usize) -> usize {
    max_chars.max(min_reply_chars(label))
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `"<label>: <prompt>"`, cut to at most [`reply_limit`] chars. The label
/// prefix is kept whole; only the prompt is truncated.
pub fn compose_reply(label: &str, prompt: &str, max_chars: usize) -> String {
    let prefix = format!("{label}: ");
    let budget = reply_limit(label, max_chars) - prefix.chars().count();
    let body = truncate_chars(&normalize_whitespace(prompt), budget);
    format!("{prefix}{body}")
}

/// Cut `text` to at most `max_chars` chars, marking the cut with an ellipsis.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let mut out: String = text.chars().take(max_chars - 1).collect();
    let trimmed_len = out.trim_end().len();
    out.truncate(trimmed_len);
    out.push(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn model(label: &str, latency_ms: u64) -> ModelInfo {
        ModelInfo {
            id: label.to_lowercase(),
            label: label.to_string(),
            context_tokens: 1024,
            latency_ms,
            aliases: vec![],
        }
    }

    #[rstest]
    #[case("hello", "hello")]
    #[case("  hello  ", "hello")]
    #[case("a \n\t b", "a b")]
    #[case("one   two\r\nthree", "one two three")]
    #[case("", "")]
    fn normalizes_whitespace(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize_whitespace(input), expected);
    }

    #[test]
    fn reply_is_label_prefixed() {
        assert_eq!(
            compose_reply("Grok 2 (demo)", "  hello  ", 500),
            "Grok 2 (demo): hello"
        );
    }

    #[test]
    fn long_replies_are_cut_with_ellipsis() {
        let prompt = "x".repeat(1000);
        let reply = compose_reply("Grok Mini (demo)", &prompt, 40);
        assert_eq!(reply.chars().count(), 40);
        assert!(reply.starts_with("Grok Mini (demo): "));
        assert!(reply.ends_with('…'));
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(5)]
    #[case(13)]
    #[case(16)]
    fn tiny_limits_keep_the_label(#[case] max_chars: usize) {
        let reply = compose_reply("Grok 2 (demo)", "hello", max_chars);
        assert_eq!(reply, "Grok 2 (demo): …");
        assert_eq!(reply.chars().count(), min_reply_chars("Grok 2 (demo)"));
    }

    #[test]
    fn limit_just_above_prefix_cuts_prompt_only() {
        assert_eq!(compose_reply("AB", "hello world", 7), "AB: he…");
        assert_eq!(compose_reply("AB", "hi", 7), "AB: hi");
    }

    #[test]
    fn fitted_to_raises_small_limits() {
        let models = vec![model("Short", 0), model("A Longer Label", 0)];
        let config = ReplyConfig {
            max_chars: 0,
            latency_scale: 0.0,
        }
        .fitted_to(&models);
        assert_eq!(config.max_chars, min_reply_chars("A Longer Label"));

        let roomy = ReplyConfig::default().fitted_to(&models);
        assert_eq!(roomy.max_chars, DEFAULT_MAX_REPLY_CHARS);
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        let reply = truncate_chars("ééééé", 3);
        assert_eq!(reply, "éé…");
    }

    #[test]
    fn exact_fit_is_untouched() {
        assert_eq!(truncate_chars("abc", 3), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn delay_scales_with_model_latency() {
        let config = ReplyConfig {
            max_chars: 10,
            latency_scale: 0.5,
        };
        assert_eq!(
            config.delay_for(&model("A", 400)),
            Duration::from_millis(200)
        );
        assert_eq!(
            ReplyConfig::instant().delay_for(&model("A", 400)),
            Duration::ZERO
        );
    }
}
