use serde_json::json;

use super::prompts::{EXTRACTION_MAX_TOKENS, EXTRACTION_SYSTEM_PROMPT, EXTRACTION_TEMPERATURE};
use super::{
    Billed, ClinicalError, ClinicalService, ExtractRequest, ExtractResponse, parse_json_answer,
};
use crate::domain::provider::CompletionRequest;

impl ClinicalService {
    /// Extract structured medical data from free text.
    ///
    /// An answer that is not a JSON object is returned as `{ raw_text }`.
    pub async fn extract(
        &self,
        request: &ExtractRequest,
    ) -> Result<Billed<ExtractResponse>, ClinicalError> {
        let completion = self
            .provider
            .complete(CompletionRequest {
                system: EXTRACTION_SYSTEM_PROMPT.to_string(),
                user: request.text.clone(),
                temperature: EXTRACTION_TEMPERATURE,
                max_tokens: EXTRACTION_MAX_TOKENS,
            })
            .await?;

        let extracted_info = parse_json_answer(&completion.text).unwrap_or_else(|| {
            tracing::debug!("Extraction answer is not JSON, returning raw text");
            json!({ "raw_text": completion.text })
        });

        Ok(self.bill(ExtractResponse { extracted_info }, completion.tokens))
    }
}
