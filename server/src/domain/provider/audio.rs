use async_trait::async_trait;

use super::{AudioSource, ProviderError};

/// Downloads audio over plain HTTP(S)
pub struct HttpAudioSource {
    client: reqwest::Client,
}

impl HttpAudioSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AudioSource for HttpAudioSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        let resp = self.client.get(url).send().await?;

        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "Audio download rejected");
            return Err(ProviderError::Download {
                status: resp.status().as_u16(),
            });
        }

        let bytes = resp.bytes().await?;
        tracing::debug!(size = bytes.len(), "Audio downloaded");
        Ok(bytes.to_vec())
    }
}
