use crate::config::TokenizerConfig;
use crate::error::{AppError, Result};
use tiktoken_rs::CoreBPE;

// Shared read-only between bundling runs.
pub trait TokenCounter: Send + Sync {
    fn model(&self) -> &str;

    fn count_tokens(&self, text: &str) -> Result<usize>;
}

pub struct TiktokenCounter {
    model: String,
    bpe: CoreBPE,
    allow_special_tokens: bool,
}

impl TiktokenCounter {
    // Codec construction is the expensive part; build once at start-up.
    pub fn for_model(model: &str, allow_special_tokens: bool) -> Result<Self> {
        log::debug!("Initializing tokenizer for model '{}'", model);
        let bpe = tiktoken_rs::get_bpe_from_model(model).map_err(|e| {
            AppError::TikToken(format!(
                "Unable to get tokenizer codec for model '{}': {}",
                model, e
            ))
        })?;
        Ok(Self {
            model: model.to_string(),
            bpe,
            allow_special_tokens,
        })
    }

    pub fn from_config(config: &TokenizerConfig) -> Result<Self> {
        Self::for_model(&config.model, config.allow_special_tokens)
    }
}

impl std::fmt::Debug for TiktokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TiktokenCounter")
            .field("model", &self.model)
            .field("allow_special_tokens", &self.allow_special_tokens)
            .finish_non_exhaustive()
    }
}

impl TokenCounter for TiktokenCounter {
    fn model(&self) -> &str {
        &self.model
    }

    fn count_tokens(&self, text: &str) -> Result<usize> {
        // Control sequences such as <|endoftext|> are plain text unless the
        // model's special tokens are enabled.
        let count = if self.allow_special_tokens {
            self.bpe.encode_with_special_tokens(text).len()
        } else {
            self.bpe.encode_ordinary(text).len()
        };
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter(allow_special_tokens: bool) -> TiktokenCounter {
        TiktokenCounter::for_model("gpt-4", allow_special_tokens).unwrap()
    }

    #[test]
    fn counts_plain_text() {
        let counter = counter(false);
        assert_eq!(counter.model(), "gpt-4");
        assert_eq!(counter.count_tokens("").unwrap(), 0);
        let n = counter.count_tokens("package main\n\nfunc main() {}\n").unwrap();
        assert!(n > 0);
    }

    #[test]
    fn counting_is_deterministic() {
        let counter = counter(false);
        let text = "// Start File: a.go\n\npackage a\n\n// End File: a.go\n\n";
        assert_eq!(
            counter.count_tokens(text).unwrap(),
            counter.count_tokens(text).unwrap()
        );
    }

    #[test]
    fn control_sequences_count_as_ordinary_text_by_default() {
        let text = "The model stops at <|endoftext|>.";
        let ordinary = counter(false).count_tokens(text).unwrap();
        let special = counter(true).count_tokens(text).unwrap();
        assert!(ordinary > special, "{ordinary} <= {special}");

        let fim = "x <|fim_prefix|> y";
        assert!(TiktokenCounter::for_model("gpt-4o", false)
            .unwrap()
            .count_tokens(fim)
            .is_ok());
    }

    #[test]
    fn unknown_model_fails_to_initialize() {
        let err = TiktokenCounter::for_model("not-a-model", false).unwrap_err();
        assert!(matches!(err, AppError::TikToken(_)));
    }
}
