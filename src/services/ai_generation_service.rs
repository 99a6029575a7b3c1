use crate::error::ServiceError;
use crate::models::candidate::{GeneratedCandidate, GenerationOutcome, RejectReason};
use crate::models::location::{DistrictContext, Language};
use crate::services::collaborators::TextGenerator;
use async_trait::async_trait;
use log::debug;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::OnceLock;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const NAME_TOKEN: &str = "PLACE_NAME";
const DESCRIPTION_TOKEN: &str = "ONE_SENTENCE_DESCRIPTION";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// OpenAI-compatible chat completion client.
#[derive(Clone)]
pub struct AiGenerationService {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl AiGenerationService {
    pub fn new() -> Result<Self, ServiceError> {
        let api_key = env::var("AI_API_KEY")
            .map_err(|_| ServiceError::Environment("AI_API_KEY not set".to_string()))?;
        let base_url = env::var("AI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = env::var("AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            client,
            base_url,
            model,
            api_key,
        })
    }
}

#[async_trait]
impl TextGenerator for AiGenerationService {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "You are a local travel expert. Only name real, currently operating places.",
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.9,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url.trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ServiceError::Response(format!(
                "Completion request failed with status {}: {}",
                status, error_text
            )));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Response(format!("Failed to parse response: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ServiceError::Response("Completion had no content".to_string()))
    }
}

/// Prompt asking for exactly one real place of `subcategory` in the district,
/// avoiding every name in `exclusions`.
pub fn build_prompt(
    district: &DistrictContext,
    subcategory: &str,
    exclusions: &[String],
    language: Language,
) -> String {
    let mut prompt = format!(
        "Recommend one real, currently operating {} located in {}.\n",
        subcategory,
        district.display_path()
    );
    if !exclusions.is_empty() {
        prompt.push_str(&format!(
            "Do NOT suggest any of these places: {}.\n",
            exclusions.join(", ")
        ));
    }
    prompt.push_str(&format!(
        "Use the official name as it appears on maps. Answer in {}.\n",
        language.prompt_name()
    ));
    prompt.push_str(&format!(
        "Reply with JSON only: {{\"name\": \"{}\", \"description\": \"{}\"}}",
        NAME_TOKEN, DESCRIPTION_TOKEN
    ));
    prompt
}

fn templated_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\bexploration|\bexplore|探索|巡禮|散策)\s*$").expect("valid regex")
    })
}

fn placeholder_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[^}]*\}|<[^>]*>|PLACE_NAME|ONE_SENTENCE").expect("valid regex"))
}

fn json_object() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"))
}

/// True when a proposed name is a templated non-answer rather than a place.
pub fn is_templated_name(name: &str, district: &DistrictContext, subcategory: &str) -> bool {
    let trimmed = name.trim();
    let lowered = trimmed.to_lowercase();
    templated_suffix().is_match(trimmed)
        || placeholder_token().is_match(trimmed)
        || lowered == district.district_name.to_lowercase()
        || lowered == district.region_name.to_lowercase()
        || lowered == subcategory.to_lowercase()
}

/// Turns a raw completion into a candidate, or says why it is unusable.
pub fn parse_completion(raw: &str, district: &DistrictContext, subcategory: &str) -> GenerationOutcome {
    let parsed = json_object()
        .find(raw)
        .and_then(|m| serde_json::from_str::<GeneratedCandidate>(m.as_str()).ok())
        .or_else(|| parse_plain_line(raw));

    let Some(mut candidate) = parsed else {
        debug!("Unparseable completion: {:?}", raw);
        return GenerationOutcome::Rejected {
            reason: RejectReason::Unparseable,
            proposed: None,
        };
    };

    candidate.name = candidate
        .name
        .trim()
        .trim_matches(|c: char| c == '"' || c == '「' || c == '」')
        .trim()
        .to_string();
    candidate.description = candidate.description.trim().to_string();

    if candidate.name.is_empty() {
        return GenerationOutcome::Rejected {
            reason: RejectReason::Unparseable,
            proposed: None,
        };
    }

    if is_templated_name(&candidate.name, district, subcategory) {
        return GenerationOutcome::Rejected {
            reason: RejectReason::Templated,
            proposed: Some(candidate.name),
        };
    }

    GenerationOutcome::Candidate(candidate)
}

/// Fallback for completions that ignored the JSON instruction:
/// "Name - description" or just "Name" on the first non-empty line.
fn parse_plain_line(raw: &str) -> Option<GeneratedCandidate> {
    let line = raw
        .lines()
        .map(|l| l.trim().trim_start_matches(['-', '*', '#']).trim())
        .find(|l| !l.is_empty() && !l.starts_with("```"))?;

    if line.contains('{') || line.contains('}') {
        return None;
    }

    let (name, description) = match line.split_once(" - ").or_else(|| line.split_once('：')) {
        Some((name, description)) => (name, description),
        None => (line, ""),
    };

    Some(GeneratedCandidate {
        name: name.to_string(),
        description: description.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn district() -> DistrictContext {
        DistrictContext {
            district_id: 10,
            district_name: "XYZ".into(),
            region_name: "Taipei".into(),
            region_id: 1,
            country_name: "Taiwan".into(),
            country_id: 886,
            centroid: None,
        }
    }

    #[test]
    fn test_prompt_names_location_subcategory_and_exclusions() {
        let prompt = build_prompt(
            &district(),
            "temple",
            &["Longshan Temple".into(), "Qingshan Temple".into()],
            Language::En,
        );
        assert!(prompt.contains("temple"));
        assert!(prompt.contains("XYZ, Taipei, Taiwan"));
        assert!(prompt.contains("Longshan Temple, Qingshan Temple"));
        assert!(prompt.contains("English"));
    }

    #[test]
    fn test_parses_json_inside_code_fence() {
        let raw = "```json\n{\"name\": \"Longshan Temple\", \"description\": \"Historic temple.\"}\n```";
        assert_eq!(
            parse_completion(raw, &district(), "temple"),
            GenerationOutcome::Candidate(GeneratedCandidate {
                name: "Longshan Temple".into(),
                description: "Historic temple.".into(),
            })
        );
    }

    #[test]
    fn test_parses_plain_text_fallback() {
        let outcome = parse_completion("Bopiliao Historic Block - Qing dynasty street", &district(), "old street");
        match outcome {
            GenerationOutcome::Candidate(c) => {
                assert_eq!(c.name, "Bopiliao Historic Block");
                assert_eq!(c.description, "Qing dynasty street");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_rejects_exploration_suffix() {
        let raw = r#"{"name": "XYZ District Exploration", "description": "Walk around."}"#;
        assert_eq!(
            parse_completion(raw, &district(), "temple"),
            GenerationOutcome::Rejected {
                reason: RejectReason::Templated,
                proposed: Some("XYZ District Exploration".into()),
            }
        );
        assert!(is_templated_name("萬華區探索", &district(), "temple"));
    }

    #[test]
    fn test_rejects_echoed_placeholder_tokens() {
        let raw = r#"{"name": "PLACE_NAME", "description": "ONE_SENTENCE_DESCRIPTION"}"#;
        assert!(matches!(
            parse_completion(raw, &district(), "temple"),
            GenerationOutcome::Rejected { reason: RejectReason::Templated, .. }
        ));
        assert!(is_templated_name("{district} temple", &district(), "temple"));
        assert!(is_templated_name("Taipei", &district(), "temple"));
    }

    #[test]
    fn test_empty_completion_is_unparseable() {
        assert!(matches!(
            parse_completion("   \n", &district(), "temple"),
            GenerationOutcome::Rejected { reason: RejectReason::Unparseable, proposed: None }
        ));
    }
}
