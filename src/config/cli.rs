use crate::adapters::openai::{OpenAiConfig, RetryPolicy, DEFAULT_BASE_URL};
use crate::core::CompletionOptions;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Every flag defaults to the values of the classic run: an English menu for
/// the sample profile, without sugar, written to `./result.json`.
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "meal-planner")]
#[command(about = "Generate a daily menu and its grocery list with a language model")]
pub struct CliConfig {
    #[arg(long, default_value = "English")]
    pub language: String,

    #[arg(long, default_value = "No sugar", help = "Free-text notes appended to the menu prompt")]
    pub notes: String,

    #[arg(long, help = "TOML profile file (defaults to the built-in sample profile)")]
    pub profile: Option<PathBuf>,

    #[arg(long, default_value = ".")]
    pub output_path: String,

    #[arg(long, default_value = "gpt-3.5-turbo")]
    pub model: String,

    #[arg(long, default_value = "4096")]
    pub max_tokens: u32,

    #[arg(long, default_value = "5")]
    pub max_retries: u32,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, default_value = "60")]
    pub timeout_seconds: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            max_retries: self.max_retries,
        }
    }

    pub fn client_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            base_url: self.base_url.clone(),
            request_timeout: Duration::from_secs(self.timeout_seconds),
            retry: RetryPolicy::default(),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("language", &self.language)?;
        validate_non_empty_string("model", &self.model)?;
        validate_path("output_path", &self.output_path)?;
        validate_url("base_url", &self.base_url)?;
        validate_range("max_tokens", self.max_tokens, 1, 128_000)?;
        validate_range("max_retries", self.max_retries, 0, 10)?;
        validate_range("timeout_seconds", self.timeout_seconds, 1, 3600)?;
        Ok(())
    }
}
