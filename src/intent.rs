use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::AiConfig;
use crate::models::{DashboardType, QueryIntent, TimePeriod};

/// Maps a free-text question to a `QueryIntent`. Implementations never fail;
/// anything that goes wrong resolves to the keyword parser's answer.
#[async_trait]
pub trait IntentParser: Send + Sync {
    fn backend_name(&self) -> &'static str;

    fn ai_enabled(&self) -> bool;

    async fn parse(&self, query: &str) -> QueryIntent;
}

// Tested in priority order; the first set with a hit decides the dashboard.
const KEYWORD_RULES: &[(DashboardType, &[&str], &str)] = &[
    (
        DashboardType::Attrition,
        &["attrition", "turnover", "retention", "tenure"],
        "employee attrition analysis",
    ),
    (
        DashboardType::Hours,
        &["hours", "time", "tracking"],
        "time tracking analysis",
    ),
    (DashboardType::BandAnalysis, &["band", "level"], "band distribution"),
    (
        DashboardType::Demographics,
        &["demographic", "age"],
        "employee demographics",
    ),
    (
        DashboardType::LocationCompare,
        &["compare", "vs", "versus"],
        "location comparison",
    ),
    (DashboardType::Project, &["project", "allocation"], "project allocation"),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordParser;

impl KeywordParser {
    pub fn interpret(&self, query: &str) -> QueryIntent {
        let query = query.to_lowercase();

        let (dashboard_type, focus) = KEYWORD_RULES
            .iter()
            .find(|(_, words, _)| words.iter().any(|word| query.contains(word)))
            .map(|(dashboard_type, _, focus)| (*dashboard_type, *focus))
            .unwrap_or((DashboardType::General, "general overview"));

        QueryIntent {
            dashboard_type,
            filters: BTreeMap::new(),
            focus: focus.to_string(),
            time_period: detect_time_period(&query),
        }
    }
}

fn detect_time_period(query: &str) -> Option<TimePeriod> {
    if query.contains("quarter") {
        Some(TimePeriod::ThisQuarter)
    } else if query.contains("month") {
        Some(TimePeriod::ThisMonth)
    } else {
        None
    }
}

#[async_trait]
impl IntentParser for KeywordParser {
    fn backend_name(&self) -> &'static str {
        "keyword"
    }

    fn ai_enabled(&self) -> bool {
        false
    }

    async fn parse(&self, query: &str) -> QueryIntent {
        self.interpret(query)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    #[error("vertex request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("vertex api error {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("vertex returned no candidate text")]
    EmptyResponse,
    #[error("intent json did not match the expected shape: {0}")]
    Json(#[from] serde_json::Error),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Gemini on Vertex AI via the `generateContent` REST endpoint.
pub struct VertexParser {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
    timeout: Duration,
    fallback: KeywordParser,
}

impl VertexParser {
    /// Returns `None` when the project id or access token is missing.
    pub fn from_config(config: &AiConfig) -> Option<Result<Self, IntentError>> {
        let project_id = config.project_id.as_deref()?;
        let access_token = config.access_token.as_deref()?;

        let client = match reqwest::Client::builder().build() {
            Ok(client) => client,
            Err(err) => return Some(Err(err.into())),
        };

        let endpoint = config.endpoint.clone().unwrap_or_else(|| {
            format!(
                "https://{location}-aiplatform.googleapis.com/v1/projects/{project_id}/locations/{location}/publishers/google/models/{model}:generateContent",
                location = config.location,
                model = config.model,
            )
        });

        Some(Ok(Self {
            client,
            endpoint,
            access_token: access_token.to_string(),
            timeout: config.timeout,
            fallback: KeywordParser,
        }))
    }

    async fn request(&self, query: &str) -> Result<QueryIntent, IntentError> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(build_prompt(query)),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                max_output_tokens: 512,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(IntentError::Status { status, body });
        }

        decode_response(&response.text().await?)
    }

    /// One request bounded by the configured timeout, without the fallback.
    async fn try_parse(&self, query: &str) -> Result<QueryIntent, IntentError> {
        match tokio::time::timeout(self.timeout, self.request(query)).await {
            Ok(result) => result,
            Err(_) => Err(IntentError::Timeout(self.timeout)),
        }
    }
}

/// Pulls the first candidate text out of a `generateContent` body and parses it.
fn decode_response(body: &str) -> Result<QueryIntent, IntentError> {
    let parsed: GenerateResponse = serde_json::from_str(body)?;
    let text = parsed
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .find_map(|part| part.text)
        .ok_or(IntentError::EmptyResponse)?;

    parse_intent_json(&text)
}

#[async_trait]
impl IntentParser for VertexParser {
    fn backend_name(&self) -> &'static str {
        "vertex_ai"
    }

    fn ai_enabled(&self) -> bool {
        true
    }

    async fn parse(&self, query: &str) -> QueryIntent {
        match self.try_parse(query).await {
            Ok(intent) => intent,
            Err(err) => {
                tracing::warn!(error = %err, "vertex intent parsing failed, using keyword parser");
                self.fallback.interpret(query)
            }
        }
    }
}

pub fn build_prompt(query: &str) -> String {
    format!(
        r#"Parse this employee data query into JSON format.

Query: "{query}"

Available data: Corporate_ID, Full_Name, Age, Work_Location, Supervisory_Organization_Siglum,
Job_Profile_Name, Position_Title, Band (BI/BII/BIII/BIV/BV), Department, Hire_Date, Tenure_Years,
Employment_Status, Time Tracking (Hours, Work_Type, Project_Code, Entry_Date, Quarter, Month)

Return ONLY JSON (no markdown):
{{
    "dashboard_type": "attrition" | "hours" | "demographics" | "band_analysis" | "location_compare" | "project" | "general",
    "filters": {{}},
    "focus": "description",
    "time_period": "this quarter" | "this month" | "last 90 days" | null
}}"#
    )
}

/// Removes a surrounding markdown code fence and its optional `json` tag.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    if !text.starts_with("```") {
        return text;
    }

    let inner = text.split("```").nth(1).unwrap_or_default();
    inner.strip_prefix("json").unwrap_or(inner).trim()
}

pub fn parse_intent_json(text: &str) -> Result<QueryIntent, IntentError> {
    Ok(serde_json::from_str(strip_code_fence(text))?)
}

/// Chooses the AI-backed parser when it is configured and its client builds,
/// the keyword parser otherwise.
pub fn select_parser(config: &AiConfig) -> Arc<dyn IntentParser> {
    match VertexParser::from_config(config) {
        Some(Ok(parser)) => {
            tracing::info!(model = %config.model, location = %config.location, "vertex ai intent parsing enabled");
            Arc::new(parser)
        }
        Some(Err(err)) => {
            tracing::warn!(error = %err, "vertex ai initialization failed, using keyword parser");
            Arc::new(KeywordParser)
        }
        None => {
            tracing::info!("vertex ai not configured, using keyword parser");
            Arc::new(KeywordParser)
        }
    }
}
