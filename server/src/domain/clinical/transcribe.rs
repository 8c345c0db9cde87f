use super::{Billed, ClinicalError, ClinicalService, TranscribeRequest, TranscribeResponse};
use crate::domain::usage::estimate_tokens;

impl ClinicalService {
    /// Download the audio and transcribe it.
    ///
    /// Providers that report no usage are billed by the estimated token
    /// count of the transcript.
    pub async fn transcribe(
        &self,
        request: &TranscribeRequest,
    ) -> Result<Billed<TranscribeResponse>, ClinicalError> {
        let audio = self.audio.fetch(&request.url).await?;
        if audio.is_empty() {
            return Err(ClinicalError::EmptyAudio);
        }
        tracing::debug!(size = audio.len(), "Transcribing audio");

        let transcription = self.provider.transcribe(audio).await?;
        let tokens = transcription
            .tokens
            .unwrap_or_else(|| estimate_tokens(&transcription.text));

        Ok(self.bill(
            TranscribeResponse {
                transcript: transcription.text,
            },
            tokens,
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::clinical::{ClinicalError, TranscribeRequest};
    use crate::testing::{StubAudio, StubProvider, clinical_service};

    #[tokio::test]
    async fn test_transcribe_estimates_tokens_when_unreported() {
        let provider = StubProvider::transcript("patient reports a cough");
        let service = clinical_service(provider.clone(), StubAudio::bytes(b"RIFF"));

        let billed = service
            .transcribe(&TranscribeRequest {
                url: "https://example.com/a.mp3".into(),
            })
            .await
            .unwrap();

        assert_eq!(billed.data.transcript, "patient reports a cough");
        // 23 chars -> 6 tokens
        assert_eq!(billed.usage.tokens, 6);
        assert!(billed.usage.cost_usd > 0.0);
        assert_eq!(provider.transcribe_calls(), 1);
    }

    #[tokio::test]
    async fn test_transcribe_rejects_empty_audio_before_provider() {
        let provider = StubProvider::transcript("unused");
        let service = clinical_service(provider.clone(), StubAudio::bytes(b""));

        let err = service
            .transcribe(&TranscribeRequest {
                url: "https://example.com/a.mp3".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ClinicalError::EmptyAudio));
        assert_eq!(err.to_string(), "Downloaded audio is empty");
        assert_eq!(provider.transcribe_calls(), 0);
    }

    #[tokio::test]
    async fn test_transcribe_propagates_download_failure() {
        let provider = StubProvider::transcript("unused");
        let service = clinical_service(provider.clone(), StubAudio::failing(404));

        let err = service
            .transcribe(&TranscribeRequest {
                url: "https://example.com/missing.mp3".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ClinicalError::Provider(_)));
        assert_eq!(provider.transcribe_calls(), 0);
    }
}
