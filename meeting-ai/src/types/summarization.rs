//! Types for generative-model summarization.
//!
//! Each hosted model family expects its own request shape and returns the generated
//! text at a different path. [`ModelFamily`] is the closed set of supported shapes;
//! [`Request`] is the logical request that gets mapped onto one of them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Error;

pub const DEFAULT_MAX_TOKENS: u32 = 150;
pub const DEFAULT_TEMPERATURE: f64 = 0.05;
pub const DEFAULT_TOP_P: f64 = 1.0;
pub const DEFAULT_TOP_K: u32 = 250;
pub const DEFAULT_STOP_SEQUENCE: &str = "Human:";

/// Request/response convention of a hosted model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    /// Anthropic Claude text completions (`anthropic.*`).
    Claude,
    /// AI21 Jurassic (`ai21.*`).
    Jurassic,
    /// Amazon Titan text generation; also the shape used for any other model id.
    Titan,
}

impl ModelFamily {
    /// Resolve the family from a model identifier.
    ///
    /// Ids outside the Anthropic and AI21 namespaces use the Titan shape, which is the
    /// generic text-generation contract of the model runtime.
    pub fn from_model_id(model_id: &str) -> Self {
        if model_id.starts_with("anthropic.") {
            ModelFamily::Claude
        } else if model_id.starts_with("ai21.") {
            ModelFamily::Jurassic
        } else {
            ModelFamily::Titan
        }
    }
}

#[derive(Debug, Serialize)]
struct ClaudeBody<'a> {
    prompt: &'a str,
    max_tokens_to_sample: u32,
    temperature: f64,
    top_k: u32,
    top_p: f64,
    stop_sequences: [&'a str; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JurassicBody<'a> {
    prompt: &'a str,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    stop_sequences: [&'a str; 1],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TitanBody<'a> {
    input_text: &'a str,
    text_generation_config: TitanGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TitanGenerationConfig {
    max_token_count: u32,
    temperature: f64,
    top_p: f64,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    completion: String,
}

#[derive(Debug, Deserialize)]
struct JurassicResponse {
    completions: Vec<JurassicCompletion>,
}

#[derive(Debug, Deserialize)]
struct JurassicCompletion {
    data: JurassicData,
}

#[derive(Debug, Deserialize)]
struct JurassicData {
    text: String,
}

#[derive(Debug, Deserialize)]
struct TitanResponse {
    results: Vec<TitanResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TitanResult {
    output_text: String,
}

/// Logical summarization request, independent of any model family's wire shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub prompt_text: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    /// Only sent to the Claude family.
    pub top_k: Option<u32>,
    pub stop_sequence: String,
    pub model_family: ModelFamily,
}

impl Request {
    /// Request with the default generation parameters for the given family.
    pub fn new(prompt_text: impl Into<String>, model_family: ModelFamily) -> Self {
        Self {
            prompt_text: prompt_text.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            top_k: Some(DEFAULT_TOP_K),
            stop_sequence: DEFAULT_STOP_SEQUENCE.to_string(),
            model_family,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Build the family-specific JSON body.
    pub fn to_body(&self) -> Result<Value, Error> {
        let body = match self.model_family {
            ModelFamily::Claude => serde_json::to_value(ClaudeBody {
                prompt: &self.prompt_text,
                max_tokens_to_sample: self.max_tokens,
                temperature: self.temperature,
                top_k: self.top_k.unwrap_or(DEFAULT_TOP_K),
                top_p: self.top_p,
                stop_sequences: [self.stop_sequence.as_str()],
            }),
            ModelFamily::Jurassic => serde_json::to_value(JurassicBody {
                prompt: &self.prompt_text,
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                top_p: self.top_p,
                stop_sequences: [self.stop_sequence.as_str()],
            }),
            ModelFamily::Titan => serde_json::to_value(TitanBody {
                input_text: &self.prompt_text,
                text_generation_config: TitanGenerationConfig {
                    max_token_count: self.max_tokens,
                    temperature: self.temperature,
                    top_p: self.top_p,
                },
            }),
        };
        body.map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Pull the generated text out of a family-specific response body.
    pub fn extract_text(&self, response: &[u8]) -> Result<String, Error> {
        match self.model_family {
            ModelFamily::Claude => {
                let parsed: ClaudeResponse = serde_json::from_slice(response)?;
                Ok(parsed.completion)
            }
            ModelFamily::Jurassic => {
                let parsed: JurassicResponse = serde_json::from_slice(response)?;
                parsed
                    .completions
                    .into_iter()
                    .next()
                    .map(|c| c.data.text)
                    .ok_or_else(|| Error::Deserialization("response has no completions".into()))
            }
            ModelFamily::Titan => {
                let parsed: TitanResponse = serde_json::from_slice(response)?;
                parsed
                    .results
                    .into_iter()
                    .next()
                    .map(|r| r.output_text)
                    .ok_or_else(|| Error::Deserialization("response has no results".into()))
            }
        }
    }
}

/// Which summary to ask the model for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    General,
    ThreeSentences,
    PerSpeaker,
    FollowUps,
}

impl Style {
    fn instruction(&self) -> &'static str {
        match self {
            Style::General => "Please summarize the above meeting transcript",
            Style::ThreeSentences => {
                "Please summarize the above meeting transcript in 3 sentences"
            }
            Style::PerSpeaker => {
                "Please summarize the above meeting transcript on a per speaker basis"
            }
            Style::FollowUps => {
                "Please provide the follow ups each person should take away from the above meeting transcript"
            }
        }
    }

    /// Human/Assistant completion prompt wrapping the transcript.
    pub fn prompt(&self, transcript: &str) -> String {
        format!(
            "\n\nHuman:\n<meeting transcript>\n{}\n</meeting transcript>\n\n{}\n\n\nAssistant:",
            transcript,
            self.instruction()
        )
    }
}

impl std::str::FromStr for Style {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "general" => Ok(Style::General),
            "three_sentences" => Ok(Style::ThreeSentences),
            "per_speaker" => Ok(Style::PerSpeaker),
            "follow_ups" => Ok(Style::FollowUps),
            other => Err(Error::Configuration(format!("unknown summary style: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn model_ids_resolve_to_families() {
        assert_eq!(
            ModelFamily::from_model_id("anthropic.claude-v2:1"),
            ModelFamily::Claude
        );
        assert_eq!(
            ModelFamily::from_model_id("anthropic.claude-instant-v1"),
            ModelFamily::Claude
        );
        assert_eq!(
            ModelFamily::from_model_id("ai21.j2-ultra"),
            ModelFamily::Jurassic
        );
        assert_eq!(
            ModelFamily::from_model_id("amazon.titan-tg1-large"),
            ModelFamily::Titan
        );
        assert_eq!(
            ModelFamily::from_model_id("somebody.unknown-model"),
            ModelFamily::Titan
        );
    }

    #[test]
    fn claude_body_carries_top_k_and_stop_sequence() {
        let body = Request::new("hi", ModelFamily::Claude)
            .with_temperature(0.0)
            .to_body()
            .unwrap();
        assert_eq!(
            body,
            json!({
                "prompt": "hi",
                "max_tokens_to_sample": 150,
                "temperature": 0.0,
                "top_k": 250,
                "top_p": 1.0,
                "stop_sequences": ["Human:"]
            })
        );
    }

    #[test]
    fn jurassic_body_uses_camel_case_and_no_top_k() {
        let body = Request::new("hi", ModelFamily::Jurassic).to_body().unwrap();
        assert_eq!(body["maxTokens"], json!(150));
        assert_eq!(body["stopSequences"], json!(["Human:"]));
        assert!(body.get("top_k").is_none());
        assert!(body.get("topK").is_none());
    }

    #[test]
    fn titan_body_nests_generation_config() {
        let body = Request::new("hi", ModelFamily::Titan)
            .with_max_tokens(300)
            .to_body()
            .unwrap();
        assert_eq!(body["inputText"], json!("hi"));
        assert_eq!(body["textGenerationConfig"]["maxTokenCount"], json!(300));
        assert!(body["textGenerationConfig"].get("stopSequences").is_none());
    }

    #[test]
    fn extracts_text_per_family() {
        let claude = Request::new("p", ModelFamily::Claude);
        assert_eq!(
            claude
                .extract_text(br#"{"completion":"claude says","stop_reason":"stop"}"#)
                .unwrap(),
            "claude says"
        );

        let jurassic = Request::new("p", ModelFamily::Jurassic);
        assert_eq!(
            jurassic
                .extract_text(br#"{"id":1,"completions":[{"data":{"text":"j2 says"}}]}"#)
                .unwrap(),
            "j2 says"
        );

        let titan = Request::new("p", ModelFamily::Titan);
        assert_eq!(
            titan
                .extract_text(br#"{"inputTextTokenCount":3,"results":[{"outputText":"titan says"}]}"#)
                .unwrap(),
            "titan says"
        );
    }

    #[test]
    fn missing_extraction_path_is_an_error() {
        let titan = Request::new("p", ModelFamily::Titan);
        assert!(titan.extract_text(br#"{"results":[]}"#).is_err());

        let claude = Request::new("p", ModelFamily::Claude);
        assert!(claude.extract_text(br#"{"outputText":"wrong shape"}"#).is_err());
    }

    #[test]
    fn prompt_wraps_transcript() {
        let prompt = Style::General.prompt("we shipped it");
        assert!(prompt.starts_with("\n\nHuman:"));
        assert!(prompt.contains("<meeting transcript>\nwe shipped it\n</meeting transcript>"));
        assert!(prompt.ends_with("Assistant:"));
    }

    #[test]
    fn styles_parse_from_config_values() {
        assert_eq!("per_speaker".parse::<Style>().unwrap(), Style::PerSpeaker);
        assert_eq!("GENERAL".parse::<Style>().unwrap(), Style::General);
        assert!("haiku".parse::<Style>().is_err());
    }
}
