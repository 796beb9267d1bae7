//! Text-to-markup conversion service configuration.

use serde::{Deserialize, Serialize};

/// Which converter turns raw buffer text into markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionProvider {
    /// OpenAI-compatible chat-completions endpoint.
    #[default]
    Llm,
    /// Echo the input back unchanged.
    Passthrough,
}

/// Conversion service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Converter implementation.
    #[serde(default)]
    pub provider: ConversionProvider,
    /// Chat-completions endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Bearer API key sent to the endpoint.
    #[serde(default)]
    pub api_key: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Instruction prepended to every text, separated by a newline.
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Request timeout in seconds. Unset means no timeout.
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            provider: ConversionProvider::default(),
            endpoint: default_endpoint(),
            api_key: String::new(),
            model: default_model(),
            prompt: default_prompt(),
            request_timeout_seconds: None,
        }
    }
}

fn default_endpoint() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_prompt() -> String {
    "Convert this text to latex. Return only the plain inner latex code only. \
     Make sure to break lines where they are broken by a slash n to show them \
     as multiple lines in the output."
        .to_string()
}
