// ============================================================================
// ADVICE SERVICE
// ============================================================================
// Purpose: Proxy to the chat-completion API for the six-category premium
//          advice text. Never fails toward the caller: a bad reply
//          degrades to a line-split of the raw text, a dead upstream
//          degrades to the static bundle.
// ============================================================================

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const LINES_PER_CATEGORY: usize = 3;

const SYSTEM_PROMPT: &str = r#"You are the advice writer for TwinPersona, a personality quiz about the gap between someone's inner self and the impression they give off.

You receive an MBTI type, a TwinPersona Character Code (outward impression type) and a gap level from 1 (aligned) to 5 (living as twins).

Write warm, specific, second-person advice. No hedging, no disclaimers, no mention of MBTI validity.

Respond with strict JSON only, no markdown fences, exactly this shape:
{
  "career": ["...", "..."],
  "relationships": ["...", "..."],
  "romance": ["...", "..."],
  "growth": ["...", "..."],
  "lifestyle": ["...", "..."],
  "stress": ["...", "..."]
}

Two or three short sentences per category, each sentence its own array entry."#;

/// Six-category advice payload. Every array is non-empty by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceBundle {
    pub career: Vec<String>,
    pub relationships: Vec<String>,
    pub romance: Vec<String>,
    pub growth: Vec<String>,
    pub lifestyle: Vec<String>,
    pub stress: Vec<String>,
}

/// Decided once at the proxy boundary: callers branch on the variant,
/// never on an error.
#[derive(Debug, Clone)]
pub enum AdviceOutcome {
    /// Parsed straight from the model reply
    Generated(AdviceBundle),
    /// Line-split or static substitute after an upstream problem
    Fallback(AdviceBundle),
}

impl AdviceOutcome {
    pub fn bundle(&self) -> &AdviceBundle {
        match self {
            Self::Generated(b) | Self::Fallback(b) => b,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            Self::Generated(_) => "ai",
            Self::Fallback(_) => "fallback",
        }
    }
}

// Chat-completion wire structs (internal)

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageContent,
}

#[derive(Deserialize)]
struct ChatMessageContent {
    content: String,
}

#[derive(Clone)]
pub struct AdviceService {
    http_client: reqwest::Client,
    api_base: String,
}

impl AdviceService {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self {
            http_client,
            api_base: OPENAI_API_BASE.to_string(),
        }
    }

    /// Override the API base URL (mocked upstream in tests)
    pub fn with_api_base(http_client: reqwest::Client, api_base: String) -> Self {
        Self { http_client, api_base }
    }

    /// Generate the advice bundle. Infallible toward the caller.
    pub async fn generate(&self, mbti: &str, character_code: &str, gap_level: u8) -> AdviceOutcome {
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            warn!("OPENAI_API_KEY not configured, serving static advice bundle");
            return AdviceOutcome::Fallback(default_bundle());
        }

        let request = ChatRequest {
            model: DEFAULT_MODEL.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(mbti, character_code, gap_level),
                },
            ],
            temperature: 0.7,
            max_tokens: 1024,
        };

        let res = match self
            .http_client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                error!(error = %e, "Advice upstream request failed");
                return AdviceOutcome::Fallback(default_bundle());
            }
        };

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            error!(status = %status, error = %body, "Advice upstream returned an error");
            return AdviceOutcome::Fallback(default_bundle());
        }

        let reply: ChatResponse = match res.json().await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "Failed to decode advice upstream reply");
                return AdviceOutcome::Fallback(default_bundle());
            }
        };

        let content = reply
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();

        if content.trim().is_empty() {
            warn!("Empty advice reply, serving static bundle");
            return AdviceOutcome::Fallback(default_bundle());
        }

        match parse_bundle(&content) {
            Some(bundle) => {
                info!(mbti = %mbti, character_code = %character_code, "🤖 Advice generated");
                AdviceOutcome::Generated(bundle)
            }
            None => {
                warn!("Advice reply was not the expected JSON shape, line-splitting");
                AdviceOutcome::Fallback(bundle_from_lines(&content))
            }
        }
    }
}

fn build_prompt(mbti: &str, character_code: &str, gap_level: u8) -> String {
    format!(
        "MBTI type: {}\nCharacter Code: {}\nGap level: {} of 5\n\nWrite the six-category advice JSON.",
        mbti, character_code, gap_level
    )
}

/// Strict-JSON parse of the model reply, tolerant of markdown fences.
/// Returns None when the shape is wrong or any category came back empty.
fn parse_bundle(content: &str) -> Option<AdviceBundle> {
    let clean = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let bundle: AdviceBundle = serde_json::from_str(clean).ok()?;

    let complete = !bundle.career.is_empty()
        && !bundle.relationships.is_empty()
        && !bundle.romance.is_empty()
        && !bundle.growth.is_empty()
        && !bundle.lifestyle.is_empty()
        && !bundle.stress.is_empty();

    complete.then_some(bundle)
}

/// Distribute a free-text reply over the six categories: three lines
/// each, in the fixed order career, relationships, romance, growth,
/// lifestyle, stress. Categories the text ran out of lines for fall back
/// to the static sentences.
fn bundle_from_lines(content: &str) -> AdviceBundle {
    let lines: Vec<String> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(|l| l.to_string())
        .collect();

    let slot = |index: usize, defaults: &[&str]| -> Vec<String> {
        let start = index * LINES_PER_CATEGORY;
        let chunk: Vec<String> = lines
            .iter()
            .skip(start)
            .take(LINES_PER_CATEGORY)
            .cloned()
            .collect();
        if chunk.is_empty() {
            defaults.iter().map(|s| s.to_string()).collect()
        } else {
            chunk
        }
    };

    AdviceBundle {
        career: slot(0, DEFAULT_CAREER),
        relationships: slot(1, DEFAULT_RELATIONSHIPS),
        romance: slot(2, DEFAULT_ROMANCE),
        growth: slot(3, DEFAULT_GROWTH),
        lifestyle: slot(4, DEFAULT_LIFESTYLE),
        stress: slot(5, DEFAULT_STRESS),
    }
}

/// Static bundle served when the upstream is unreachable
pub fn default_bundle() -> AdviceBundle {
    AdviceBundle {
        career: DEFAULT_CAREER.iter().map(|s| s.to_string()).collect(),
        relationships: DEFAULT_RELATIONSHIPS.iter().map(|s| s.to_string()).collect(),
        romance: DEFAULT_ROMANCE.iter().map(|s| s.to_string()).collect(),
        growth: DEFAULT_GROWTH.iter().map(|s| s.to_string()).collect(),
        lifestyle: DEFAULT_LIFESTYLE.iter().map(|s| s.to_string()).collect(),
        stress: DEFAULT_STRESS.iter().map(|s| s.to_string()).collect(),
    }
}

const DEFAULT_CAREER: &[&str] = &[
    "Pick work where your natural pace is an asset, not a compromise.",
    "Tell one colleague what you are actually good at; visibility follows honesty.",
];
const DEFAULT_RELATIONSHIPS: &[&str] = &[
    "The people closest to you already see past your first impression.",
    "Name the gap out loud once; it turns confusion into an inside joke.",
];
const DEFAULT_ROMANCE: &[&str] = &[
    "Let someone meet the inner you a little earlier than feels safe.",
    "Mismatched first impressions make the best origin stories.",
];
const DEFAULT_GROWTH: &[&str] = &[
    "Your gap is range, not inconsistency. Practice switching on purpose.",
    "Keep a note of moments when the outside you surprised the inside you.",
];
const DEFAULT_LIFESTYLE: &[&str] = &[
    "Schedule time that matches your inner tempo, not your public one.",
    "One recurring solo ritual keeps both of your selves on speaking terms.",
];
const DEFAULT_STRESS: &[&str] = &[
    "Stress means the two of you are out of sync; slow the outer one down first.",
    "Say no once a week, in the voice that finds it hardest.",
];
