use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use super::traits::AnalysisProvider;
use crate::errors::CoreError;
use crate::models::analysis::{Analysis, AnalysisResponse, GroundingSource};
use crate::models::price::{normalize_price_map, parse_price_text, PriceMap};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const PROVIDER: &str = "Gemini";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Persona and output contract for stock analysis. The model must answer with a
/// single JSON object in the `Analysis` shape.
pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are "Poonji Mitra", an AI portfolio manager and quantitative analyst for the Indian equity markets (NSE/BSE).
Always use the Google Search tool to ground your answer in the latest price, news and market data for the current or most recent trading session.
Combine news interpretation, technical indicators (RSI, MACD, Bollinger Bands, EMA 20/50/200, volume shocks) and sector context.
Assign a probability rating (High/Medium/Low) for the stock moving 3-5% in the next trading session.
Tone: professional, terse, objective. If data is ambiguous, advise "Wait and Watch".
Respond with a single valid JSON object and nothing else:
{"stock": string, "newsSummary": string, "technicalSignals": string, "probability": "High" | "Medium" | "Low", "traderNote": string}"#;

const PRICE_SYSTEM_PROMPT: &str = "You are a market data assistant for the Indian equity markets (NSE). \
Use the Google Search tool to find the latest traded price of each requested ticker. \
Respond with a single JSON object mapping each ticker, in uppercase, to its price in INR as a number. \
Omit tickers you cannot find. Do not include any other text.";

/// Google Gemini `generateContent` gateway with Google Search grounding.
///
/// - **Requires**: API key (settings `gemini_api_key` or `GEMINI_API_KEY`).
/// - **Analysis**: one call per query; grounding chunks become `GroundingSource`s.
/// - **Prices**: one call per refresh for all tickers at once.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one grounded prompt and return the raw candidate.
    async fn generate(&self, system_prompt: &str, user_text: &str) -> Result<Candidate, CoreError> {
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_prompt.to_string(),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: user_text.to_string(),
                }],
            }],
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
        };

        let url = format!("{BASE_URL}/{}:generateContent", self.model);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), &text));
        }

        let data: GenerateContentResponse = response.json().await.map_err(|e| {
            CoreError::remote(PROVIDER, format!("Failed to parse response: {e}"))
        })?;

        if let Some(reason) = data.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(CoreError::remote(
                PROVIDER,
                format!("Request was rejected: {reason}"),
            ));
        }

        data.candidates
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| CoreError::remote(PROVIDER, "Response contained no candidates"))
    }
}

// ── Gemini API request/response types ──────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    tools: Vec<Tool>,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Serialize)]
struct GoogleSearch {}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    grounding_chunks: Option<Vec<GroundingChunk>>,
}

#[derive(Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

impl Candidate {
    fn text(&self) -> String {
        self.content
            .as_ref()
            .and_then(|c| c.parts.as_ref())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }

    fn sources(&self) -> Vec<GroundingSource> {
        let chunks = self
            .grounding_metadata
            .as_ref()
            .and_then(|m| m.grounding_chunks.as_ref());
        let Some(chunks) = chunks else {
            return Vec::new();
        };

        let mut sources: Vec<GroundingSource> = Vec::new();
        for web in chunks.iter().filter_map(|c| c.web.as_ref()) {
            let Some(uri) = web.uri.as_deref() else {
                continue;
            };
            let title = web.title.clone().unwrap_or_default();
            if let Some(source) = GroundingSource::parse(uri, title) {
                if !sources.iter().any(|s| s.uri == source.uri) {
                    sources.push(source);
                }
            }
        }
        sources
    }
}

#[async_trait]
impl AnalysisProvider for GeminiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn analyze(&self, query: &str) -> Result<AnalysisResponse, CoreError> {
        let candidate = self.generate(ANALYSIS_SYSTEM_PROMPT, query).await?;
        let text = candidate.text();

        let json = extract_json_object(&text).ok_or_else(|| {
            CoreError::remote(PROVIDER, "The AI response did not contain a JSON object")
        })?;
        let analysis: Analysis = serde_json::from_str(json).map_err(|e| {
            CoreError::remote(PROVIDER, format!("The AI returned an invalid analysis: {e}"))
        })?;

        let sources = candidate.sources();
        debug!(
            "Gemini analysis for '{}' parsed with {} sources",
            analysis.stock,
            sources.len()
        );
        Ok(AnalysisResponse { analysis, sources })
    }

    async fn fetch_prices(&self, tickers: &[String]) -> Result<PriceMap, CoreError> {
        let tickers: Vec<&str> = tickers
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if tickers.is_empty() {
            return Ok(PriceMap::new());
        }

        let prompt = format!(
            "Current market prices for these NSE tickers: {}",
            tickers.join(", ")
        );
        let candidate = self.generate(PRICE_SYSTEM_PROMPT, &prompt).await?;
        let prices = parse_price_response(&candidate.text())?;

        if prices.len() < tickers.len() {
            warn!(
                "Gemini returned prices for {} of {} tickers",
                prices.len(),
                tickers.len()
            );
        }
        Ok(prices)
    }
}

/// Map a non-2xx status to a gateway error, keeping the body short.
fn status_error(status: u16, body: &str) -> CoreError {
    let message = match status {
        400 => "Bad request (check the model name and query)".to_string(),
        401 | 403 => "Invalid or unauthorized API key".to_string(),
        429 => "Rate limit or quota exceeded".to_string(),
        500..=599 => format!("Server error (HTTP {status})"),
        _ => {
            let snippet: String = body.chars().take(200).collect();
            format!("HTTP {status}: {snippet}")
        }
    };
    CoreError::remote(PROVIDER, message)
}

/// Find the JSON object inside model output that may be wrapped in a
/// markdown fence or surrounded by prose.
pub(crate) fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Parse `{"TICKER": price, ...}` where prices may be numbers or strings.
pub(crate) fn parse_price_response(text: &str) -> Result<PriceMap, CoreError> {
    let json = extract_json_object(text).ok_or_else(|| {
        CoreError::remote(PROVIDER, "The AI price response did not contain a JSON object")
    })?;
    let raw: HashMap<String, serde_json::Value> = serde_json::from_str(json).map_err(|e| {
        CoreError::remote(PROVIDER, format!("The AI returned unparseable price data: {e}"))
    })?;

    let values = raw.into_iter().filter_map(|(ticker, value)| {
        let price = match value {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => parse_price_text(&s),
            _ => None,
        }?;
        Some((ticker, price))
    });
    Ok(normalize_price_map(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_json_from_fenced_text() {
        let text = "```json\n{\"TCS\": 3550}\n```";
        assert_eq!(extract_json_object(text), Some("{\"TCS\": 3550}"));
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn parses_mixed_price_values() {
        let map = parse_price_response(r#"{"tcs": 3550.5, "INFY": "₹1,480.10", "WIPRO": null}"#)
            .unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["TCS"], 3550.5);
        assert_eq!(map["INFY"], 1480.1);
    }

    #[test]
    fn empty_object_is_not_an_error() {
        let map = parse_price_response("{}").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn non_object_price_response_is_remote_error() {
        let err = parse_price_response("Sorry, I cannot help").unwrap_err();
        assert!(err.is_remote());
        let err = parse_price_response("{not json}").unwrap_err();
        assert!(matches!(err, CoreError::Remote { .. }));
    }

    #[test]
    fn status_errors_name_the_provider() {
        let err = status_error(429, "");
        assert_eq!(
            err.to_string(),
            "AI gateway error (Gemini): Rate limit or quota exceeded"
        );
        let long_body = "x".repeat(500);
        let err = status_error(418, &long_body);
        assert!(err.to_string().len() < 300);
    }

    #[test]
    fn candidate_collects_deduplicated_valid_sources() {
        let json = r#"{
            "content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}]},
            "groundingMetadata": {"groundingChunks": [
                {"web": {"uri": "https://a.example/x", "title": "A"}},
                {"web": {"uri": "https://a.example/x", "title": "A again"}},
                {"web": {"uri": "javascript:alert(1)", "title": "bad"}},
                {"web": {"title": "no uri"}},
                {}
            ]}
        }"#;
        let candidate: Candidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.text(), "{\"a\":1}");
        let sources = candidate.sources();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title, "A");
    }
}
