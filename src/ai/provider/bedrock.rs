//! Amazon Bedrock Provider
//!
//! Titan text models over the Bedrock runtime HTTP API, authorized with a
//! Bedrock API key sent as a bearer token.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{
    ErrorClassifier, LlmProvider, ProviderConfig, build_client, ensure_success, non_empty_output,
    resolve_api_key,
};
use crate::types::Result;

const PROVIDER: &str = "bedrock";
const DEFAULT_MODEL: &str = "amazon.titan-text-lite-v1";
const DEFAULT_REGION: &str = "us-west-2";
const API_KEY_ENV: &str = "AWS_BEARER_TOKEN_BEDROCK";

pub struct BedrockProvider {
    api_key: SecretString,
    /// `https://bedrock-runtime.<region>.amazonaws.com` unless overridden
    runtime_base: String,
    /// `https://bedrock.<region>.amazonaws.com` unless overridden
    control_base: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl std::fmt::Debug for BedrockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedrockProvider")
            .field("api_key", &"[REDACTED]")
            .field("runtime_base", &self.runtime_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl BedrockProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key = resolve_api_key(&config, API_KEY_ENV, "Bedrock")?;

        let region = if config.region.trim().is_empty() {
            DEFAULT_REGION.to_string()
        } else {
            config.region.trim().to_string()
        };

        let (runtime_base, control_base) = match config.api_base {
            Some(base) => {
                let base = base.trim_end_matches('/').to_string();
                (base.clone(), base)
            }
            None => (
                format!("https://bedrock-runtime.{}.amazonaws.com", region),
                format!("https://bedrock.{}.amazonaws.com", region),
            ),
        };

        Ok(Self {
            api_key,
            runtime_base,
            control_base,
            model: config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: config.temperature,
            client: build_client(config.timeout_secs)?,
        })
    }

    fn invoke_url(&self) -> String {
        format!("{}/model/{}/invoke", self.runtime_base, self.model)
    }

    fn build_request(&self, prompt: &str, max_tokens: u32) -> TitanRequest {
        TitanRequest {
            input_text: prompt.to_string(),
            text_generation_config: TextGenerationConfig {
                max_token_count: max_tokens,
                temperature: self.temperature,
            },
        }
    }
}

#[async_trait]
impl LlmProvider for BedrockProvider {
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        info!(
            "Generating with Bedrock (model: {}, max tokens: {})",
            self.model, max_tokens
        );

        let response = self
            .client
            .post(self.invoke_url())
            .bearer_auth(self.api_key.expose_secret())
            .header("Accept", "application/json")
            .json(&self.build_request(prompt, max_tokens))
            .send()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER))?;

        let body: TitanResponse = ensure_success(response, PROVIDER)
            .await?
            .json()
            .await
            .map_err(|e| ErrorClassifier::classify_transport(&e, PROVIDER))?;

        debug!("Received {} result(s) from Bedrock", body.results.len());
        non_empty_output(
            body.results.first().map(|r| r.output_text.as_str()),
            PROVIDER,
        )
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/foundation-models", self.control_base);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                let count = resp
                    .json::<FoundationModels>()
                    .await
                    .map(|m| m.model_summaries.len())
                    .unwrap_or(0);
                info!("Bedrock API is available ({} foundation models)", count);
                Ok(true)
            }
            Ok(resp) => {
                warn!("Bedrock API check failed: {}", resp.status());
                Ok(false)
            }
            Err(e) => {
                warn!("Bedrock API check failed: {}", e);
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TitanRequest {
    input_text: String,
    text_generation_config: TextGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextGenerationConfig {
    max_token_count: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct TitanResponse {
    #[serde(default)]
    results: Vec<TitanResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TitanResult {
    #[serde(default)]
    output_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FoundationModels {
    #[serde(default)]
    model_summaries: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(api_base: Option<&str>) -> BedrockProvider {
        BedrockProvider::new(ProviderConfig {
            api_key: Some(SecretString::from("bedrock-test-key")),
            api_base: api_base.map(String::from),
            ..ProviderConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_regional_endpoints() {
        let p = provider(None);
        assert_eq!(
            p.invoke_url(),
            "https://bedrock-runtime.us-west-2.amazonaws.com/model/amazon.titan-text-lite-v1/invoke"
        );
        assert_eq!(p.control_base, "https://bedrock.us-west-2.amazonaws.com");
    }

    #[test]
    fn test_endpoint_override() {
        let p = provider(Some("http://localhost:4566/"));
        assert_eq!(
            p.invoke_url(),
            "http://localhost:4566/model/amazon.titan-text-lite-v1/invoke"
        );
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(provider(None).build_request("hi", 50)).unwrap();
        assert_eq!(body["inputText"], "hi");
        assert_eq!(body["textGenerationConfig"]["maxTokenCount"], 50);
    }

    #[test]
    fn test_response_shape() {
        let body: TitanResponse = serde_json::from_str(
            r#"{"inputTextTokenCount": 3, "results": [{"tokenCount": 4, "outputText": "\nAdds numbers.", "completionReason": "FINISH"}]}"#,
        )
        .unwrap();
        assert_eq!(body.results[0].output_text, "\nAdds numbers.");
    }

    #[test]
    fn test_debug_hides_key() {
        let debug = format!("{:?}", provider(None));
        assert!(!debug.contains("bedrock-test-key"));
    }
}
