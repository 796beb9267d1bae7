//! Text-to-markup conversion.
//!
//! A [`Converter`] is an opaque, fallible async function from raw buffer
//! text to LaTeX markup. Failures surface as `UpstreamFailure`.

pub mod llm;
pub mod passthrough;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use texroom_core::config::conversion::{ConversionConfig, ConversionProvider};
use texroom_core::result::AppResult;

pub use llm::LlmConverter;
pub use passthrough::PassthroughConverter;

/// Converts raw text into markup.
#[async_trait]
pub trait Converter: Send + Sync + std::fmt::Debug + 'static {
    /// Convert `text`. Any failure is reported as `UpstreamFailure`.
    async fn convert(&self, text: &str) -> AppResult<String>;
}

/// Builds the converter selected by `conversion.provider`.
pub fn build_converter(config: &ConversionConfig) -> AppResult<Arc<dyn Converter>> {
    let converter: Arc<dyn Converter> = match config.provider {
        ConversionProvider::Llm => {
            info!(endpoint = %config.endpoint, model = %config.model, "Using LLM converter");
            Arc::new(LlmConverter::new(config)?)
        }
        ConversionProvider::Passthrough => {
            info!("Using passthrough converter");
            Arc::new(PassthroughConverter)
        }
    };
    Ok(converter)
}
