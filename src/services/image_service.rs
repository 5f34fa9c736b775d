// ============================================================================
// IMAGE SERVICE
// ============================================================================
// Purpose: Proxy to the image-generation API for premium character
//          artwork. Every categorical prompt input is a closed enum with
//          a default arm; a dead upstream degrades to a deterministic
//          placeholder graphic instead of an error.
// ============================================================================

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "dall-e-3";
const IMAGE_SIZE: &str = "1024x1024";

/// Scores as the client echoes them back from the quiz result
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImageScores {
    pub charisma: u8,
    pub empathy: u8,
    pub mystery: u8,
    pub energy: u8,
}

/// Presentation gender for the artwork. Anything unrecognized renders the
/// neutral variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Female,
    Male,
    Neutral,
}

impl Gender {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "female" | "woman" => Self::Female,
            "male" | "man" => Self::Male,
            _ => Self::Neutral,
        }
    }

    fn subject(&self) -> &'static str {
        match self {
            Self::Female => "a young woman",
            Self::Male => "a young man",
            Self::Neutral => "an androgynous young person",
        }
    }
}

/// Occupation category driving the outfit description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupation {
    Office,
    Creative,
    Student,
    Medical,
    Tech,
    Service,
    Unspecified,
}

impl Occupation {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|r| r.to_ascii_lowercase()) {
            Some(ref r) if r.contains("office") || r.contains("business") => Self::Office,
            Some(ref r) if r.contains("creat") || r.contains("design") || r.contains("art") => {
                Self::Creative
            }
            Some(ref r) if r.contains("student") => Self::Student,
            Some(ref r) if r.contains("medic") || r.contains("nurse") || r.contains("doctor") => {
                Self::Medical
            }
            Some(ref r) if r.contains("tech") || r.contains("engineer") || r.contains("it") => {
                Self::Tech
            }
            Some(ref r) if r.contains("service") || r.contains("retail") || r.contains("cafe") => {
                Self::Service
            }
            _ => Self::Unspecified,
        }
    }

    fn outfit(&self) -> &'static str {
        match self {
            Self::Office => "wearing a crisp tailored suit",
            Self::Creative => "wearing an artfully layered, paint-flecked outfit",
            Self::Student => "wearing a relaxed campus outfit with a backpack",
            Self::Medical => "wearing clean medical scrubs",
            Self::Tech => "wearing a casual hoodie over a graphic tee",
            Self::Service => "wearing a neat apron over a friendly uniform",
            Self::Unspecified => "wearing stylish everyday clothes",
        }
    }
}

/// Decided once at the proxy boundary
#[derive(Debug, Clone)]
pub enum ImageOutcome {
    /// URL handed back by the provider
    Generated { image_url: String },
    /// Deterministic placeholder graphic, provider unavailable
    Placeholder { data_uri: String },
}

impl ImageOutcome {
    pub fn source(&self) -> &'static str {
        match self {
            Self::Generated { .. } => "dalle",
            Self::Placeholder { .. } => "placeholder",
        }
    }
}

// Image API wire structs (internal)

#[derive(Serialize)]
struct ImageRequest {
    model: String,
    prompt: String,
    n: u8,
    size: String,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Clone)]
pub struct ImageService {
    http_client: reqwest::Client,
    api_base: String,
}

impl ImageService {
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

    /// Generate one square character portrait. Infallible toward the
    /// caller: every failure path returns the placeholder.
    pub async fn generate(
        &self,
        mbti_code: &str,
        character_code: &str,
        scores: ImageScores,
        gender: Gender,
        occupation: Occupation,
    ) -> ImageOutcome {
        let api_key = std::env::var("DALLE_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .unwrap_or_default();
        if api_key.is_empty() {
            warn!("Image API key not configured, serving placeholder artwork");
            return ImageOutcome::Placeholder {
                data_uri: placeholder_data_uri(character_code),
            };
        }

        let prompt = build_prompt(mbti_code, character_code, scores, gender, occupation);

        let request = ImageRequest {
            model: DEFAULT_MODEL.to_string(),
            prompt,
            n: 1,
            size: IMAGE_SIZE.to_string(),
        };

        let res = match self
            .http_client
            .post(format!("{}/images/generations", self.api_base))
            .bearer_auth(&api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                error!(error = %e, "Image upstream request failed");
                return ImageOutcome::Placeholder {
                    data_uri: placeholder_data_uri(character_code),
                };
            }
        };

        if !res.status().is_success() {
            let status = res.status();
            error!(status = %status, "Image upstream returned an error");
            return ImageOutcome::Placeholder {
                data_uri: placeholder_data_uri(character_code),
            };
        }

        let reply: ImageResponse = match res.json().await {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "Failed to decode image upstream reply");
                return ImageOutcome::Placeholder {
                    data_uri: placeholder_data_uri(character_code),
                };
            }
        };

        match reply.data.into_iter().next().and_then(|d| d.url) {
            Some(image_url) => {
                info!(character_code = %character_code, "🎨 Character artwork generated");
                ImageOutcome::Generated { image_url }
            }
            None => {
                warn!("Image upstream returned no result, serving placeholder");
                ImageOutcome::Placeholder {
                    data_uri: placeholder_data_uri(character_code),
                }
            }
        }
    }
}

/// Render the descriptive prompt from the closed lookup tables
fn build_prompt(
    mbti_code: &str,
    character_code: &str,
    scores: ImageScores,
    gender: Gender,
    occupation: Occupation,
) -> String {
    format!(
        "Soft anime-style portrait of {subject}, {outfit}. Personality: {traits}. \
         First impression: {style}. Mood: {intensity}. Square composition, pastel \
         background, single character, no text.",
        subject = gender.subject(),
        outfit = occupation.outfit(),
        traits = trait_adjectives(mbti_code),
        style = impression_style(character_code),
        intensity = intensity_qualifier(scores),
    )
}

/// Adjectives per MBTI letter; unknown letters fall back to the balanced
/// wording rather than failing.
fn trait_adjectives(mbti_code: &str) -> String {
    let mut parts: Vec<&'static str> = Vec::with_capacity(4);
    let mut chars = mbti_code.chars();

    parts.push(match chars.next() {
        Some('E') => "outgoing and expressive",
        Some('I') => "thoughtful and self-contained",
        _ => "even-keeled",
    });
    parts.push(match chars.next() {
        Some('S') => "grounded and practical",
        Some('N') => "imaginative and far-sighted",
        _ => "observant",
    });
    parts.push(match chars.next() {
        Some('T') => "sharp and analytical",
        Some('F') => "warm-hearted and empathetic",
        _ => "fair-minded",
    });
    parts.push(match chars.next() {
        Some('J') => "composed and organized",
        Some('P') => "spontaneous and adaptable",
        _ => "easygoing",
    });

    parts.join(", ")
}

/// Styling direction per Character Code letter, same default-arm rule
fn impression_style(character_code: &str) -> String {
    let mut parts: Vec<&'static str> = Vec::with_capacity(4);
    let mut chars = character_code.chars();

    parts.push(match chars.next() {
        Some('W') => "inviting smile",
        Some('C') => "cool, collected gaze",
        _ => "neutral expression",
    });
    parts.push(match chars.next() {
        Some('O') => "open posture",
        Some('R') => "reserved posture",
        _ => "relaxed posture",
    });
    parts.push(match chars.next() {
        Some('P') => "playful styling",
        Some('M') => "refined styling",
        _ => "simple styling",
    });
    parts.push(match chars.next() {
        Some('D') => "dynamic lighting",
        Some('S') => "calm, still lighting",
        _ => "soft lighting",
    });

    parts.join(", ")
}

fn intensity_qualifier(scores: ImageScores) -> &'static str {
    let average = (scores.charisma as u32
        + scores.empathy as u32
        + scores.mystery as u32
        + scores.energy as u32)
        / 4;

    if average >= 70 {
        "vivid and high-energy"
    } else if average < 30 {
        "muted and serene"
    } else {
        "balanced and gentle"
    }
}

// ============================================================================
// PLACEHOLDER ARTWORK
// ============================================================================

const PLACEHOLDER_PALETTE: &[(&str, &str)] = &[
    ("#FDE2E4", "#E4557F"),
    ("#E2ECE9", "#2F8F6B"),
    ("#DFE7FD", "#3F5AC9"),
    ("#FFF1E6", "#D97B29"),
    ("#EAE4E9", "#7B5AA6"),
    ("#E8F4FD", "#2380B8"),
];

/// Deterministic vector-graphic stand-in: the same Character Code always
/// renders the same card, so clients can cache by code.
pub fn placeholder_data_uri(character_code: &str) -> String {
    let palette_index =
        character_code.bytes().map(|b| b as usize).sum::<usize>() % PLACEHOLDER_PALETTE.len();
    let (background, accent) = PLACEHOLDER_PALETTE[palette_index];

    let label: String = character_code.chars().take(4).collect();

    let svg = format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="512" height="512" viewBox="0 0 512 512"><rect width="512" height="512" fill="{background}"/><circle cx="256" cy="200" r="88" fill="{accent}" opacity="0.85"/><rect x="136" y="312" width="240" height="120" rx="60" fill="{accent}" opacity="0.6"/><text x="256" y="478" font-family="sans-serif" font-size="44" font-weight="bold" fill="{accent}" text-anchor="middle">{label}</text></svg>"##
    );

    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCORES: ImageScores = ImageScores {
        charisma: 50,
        empathy: 50,
        mystery: 50,
        energy: 50,
    };

    #[test]
    fn test_gender_parse_has_default_arm() {
        assert_eq!(Gender::parse("female"), Gender::Female);
        assert_eq!(Gender::parse("MALE"), Gender::Male);
        assert_eq!(Gender::parse("robot"), Gender::Neutral);
        assert_eq!(Gender::parse(""), Gender::Neutral);
    }

    #[test]
    fn test_occupation_parse_has_default_arm() {
        assert_eq!(Occupation::parse(Some("office worker")), Occupation::Office);
        assert_eq!(Occupation::parse(Some("graphic designer")), Occupation::Creative);
        assert_eq!(Occupation::parse(Some("astronaut")), Occupation::Unspecified);
        assert_eq!(Occupation::parse(None), Occupation::Unspecified);
    }

    #[test]
    fn test_prompt_embeds_all_tables() {
        let prompt = build_prompt("INFP", "CRMS", SCORES, Gender::Neutral, Occupation::Tech);
        assert!(prompt.contains("thoughtful and self-contained"));
        assert!(prompt.contains("cool, collected gaze"));
        assert!(prompt.contains("hoodie"));
        assert!(prompt.contains("balanced and gentle"));
    }

    #[test]
    fn test_trait_adjectives_unknown_letters_fall_back() {
        let traits = trait_adjectives("XXXX");
        assert!(traits.contains("even-keeled"));
        assert!(traits.contains("easygoing"));
    }

    #[test]
    fn test_intensity_bands() {
        let high = ImageScores { charisma: 90, empathy: 80, mystery: 70, energy: 60 };
        assert_eq!(intensity_qualifier(high), "vivid and high-energy");

        let low = ImageScores { charisma: 10, empathy: 20, mystery: 30, energy: 20 };
        assert_eq!(intensity_qualifier(low), "muted and serene");

        assert_eq!(intensity_qualifier(SCORES), "balanced and gentle");
    }

    #[test]
    fn test_placeholder_is_deterministic_per_code() {
        let a = placeholder_data_uri("WOPD");
        let b = placeholder_data_uri("WOPD");
        assert_eq!(a, b);
        assert!(a.starts_with("data:image/svg+xml;base64,"));
    }

    #[test]
    fn test_placeholder_embeds_code_label() {
        let uri = placeholder_data_uri("CRMS");
        let payload = uri.strip_prefix("data:image/svg+xml;base64,").unwrap();
        let svg = String::from_utf8(STANDARD.decode(payload).unwrap()).unwrap();
        assert!(svg.contains(">CRMS</text>"));
    }
}
