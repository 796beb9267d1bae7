//! Identity converter for development.

use async_trait::async_trait;

use texroom_core::result::AppResult;

use super::Converter;

/// Returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughConverter;

#[async_trait]
impl Converter for PassthroughConverter {
    async fn convert(&self, text: &str) -> AppResult<String> {
        Ok(text.to_string())
    }
}
