use serde_json::{Value, json};

use super::prompts::{
    DIAGNOSIS_DISCLAIMER, DIAGNOSIS_MAX_TOKENS, DIAGNOSIS_SYSTEM_PROMPT, DIAGNOSIS_TEMPERATURE,
    diagnosis_user_message,
};
use super::{Billed, ClinicalError, ClinicalService, DiagnosisRequest, parse_json_answer};
use crate::domain::provider::CompletionRequest;

impl ClinicalService {
    /// Synthesize a differential diagnosis and treatment plan.
    ///
    /// An answer that is not a JSON object is returned as
    /// `{ diagnosis, disclaimer }` with the answer text under `diagnosis`.
    pub async fn diagnose(
        &self,
        request: &DiagnosisRequest,
    ) -> Result<Billed<Value>, ClinicalError> {
        let medical_info = Value::Object(request.medical_info.clone()).to_string();

        let completion = self
            .provider
            .complete(CompletionRequest {
                system: DIAGNOSIS_SYSTEM_PROMPT.to_string(),
                user: diagnosis_user_message(&medical_info),
                temperature: DIAGNOSIS_TEMPERATURE,
                max_tokens: DIAGNOSIS_MAX_TOKENS,
            })
            .await?;

        let diagnosis = parse_json_answer(&completion.text).unwrap_or_else(|| {
            tracing::debug!("Diagnosis answer is not JSON, returning raw text");
            json!({
                "diagnosis": completion.text,
                "disclaimer": DIAGNOSIS_DISCLAIMER,
            })
        });

        Ok(self.bill(diagnosis, completion.tokens))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::domain::clinical::DiagnosisRequest;
    use crate::domain::clinical::prompts::DIAGNOSIS_DISCLAIMER;
    use crate::testing::{StubAudio, StubProvider, clinical_service};

    fn request() -> DiagnosisRequest {
        serde_json::from_value(json!({
            "medical_info": { "symptoms": ["fever"], "duration": "2 days" }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_diagnose_serializes_medical_info_into_prompt() {
        let provider = StubProvider::completion(r#"{"diagnosis":"flu"}"#, 300);
        let service = clinical_service(provider.clone(), StubAudio::bytes(b"x"));

        let billed = service.diagnose(&request()).await.unwrap();
        assert_eq!(billed.data, json!({"diagnosis": "flu"}));

        let sent = provider.last_completion().unwrap();
        assert!(sent.user.contains(r#"{"symptoms":["fever"],"duration":"2 days"}"#));
        assert_eq!(sent.temperature, 0.7);
        assert_eq!(sent.max_tokens, 800);
    }

    #[tokio::test]
    async fn test_diagnose_falls_back_with_disclaimer() {
        let provider = StubProvider::completion("Probably a cold.", 40);
        let service = clinical_service(provider, StubAudio::bytes(b"x"));

        let billed = service.diagnose(&request()).await.unwrap();
        assert_eq!(
            billed.data,
            json!({"diagnosis": "Probably a cold.", "disclaimer": DIAGNOSIS_DISCLAIMER})
        );
        assert_eq!(billed.usage.tokens, 40);
    }
}
