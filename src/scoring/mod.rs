//! Quiz scoring engine.
//!
//! Pure data transform: questionnaire answers in, MBTI type + Character
//! Code + derived presentation fields out. No I/O, no state; the HTTP
//! handler in `api::quiz` is a thin wrapper so native clients can share
//! the canonical tables.

pub mod character_code;
pub mod mbti;

use serde::Serialize;

pub use character_code::{score_character_code, CharacterAnswer, CharacterCode};
pub use mbti::{score_mbti, MbtiAnswer, MbtiType};

use character_code::{Impression, Pace, Presence, Vibe};
use mbti::{Attitude, Judgment, Lifestyle};

/// Playful 0-100 meters derived from how lopsided each axis was.
/// Entertainment values, not psychometrics.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EntertainmentScores {
    pub charisma: u8,
    pub empathy: u8,
    pub mystery: u8,
    pub energy: u8,
}

#[derive(Debug, Serialize)]
pub struct QuizResult {
    pub mbti: MbtiType,
    pub mbti_code: String,
    pub character: CharacterCode,
    pub character_code: String,
    pub title: &'static str,
    pub compatibility: Vec<&'static str>,
    pub advice: &'static str,
    pub scores: EntertainmentScores,
    /// 1 (inner self and outward impression line up) to 5 (full twin-gap)
    pub gap_level: u8,
}

impl QuizResult {
    pub fn build(mbti_answers: &[MbtiAnswer], character_answers: &[CharacterAnswer]) -> Self {
        let (mbti, mbti_tallies) = score_mbti(mbti_answers);
        let (character, character_tallies) = score_character_code(character_answers);

        let scores = EntertainmentScores {
            charisma: meter(mbti_tallies.attitude.margin(), character_tallies.presence.margin()),
            empathy: meter(-mbti_tallies.judgment.margin(), character_tallies.impression.margin()),
            mystery: meter(-mbti_tallies.attitude.margin(), -character_tallies.impression.margin()),
            energy: meter(character_tallies.vibe.margin(), character_tallies.pace.margin()),
        };

        let gap_level = gap_level(&mbti, &character);

        QuizResult {
            mbti_code: mbti.code(),
            character_code: character.code(),
            title: character.title(),
            compatibility: mbti::compatibility(&mbti.code()),
            advice: gap_advice(gap_level),
            scores,
            gap_level,
            mbti,
            character,
        }
    }
}

/// Fold two signed margins (-1..=1 each) into a 0-100 meter centered at 50
fn meter(a: f64, b: f64) -> u8 {
    let blended = (a + b) / 2.0;
    let value = 50.0 + blended * 50.0;
    value.round().clamp(0.0, 100.0) as u8
}

/// How far the outward impression diverges from the inner type. Each of
/// the four aligned axis pairs that disagrees adds one level.
fn gap_level(mbti: &MbtiType, character: &CharacterCode) -> u8 {
    let mut mismatches = 0u8;

    // Extraverted inner self reads as an open presence
    if matches!(mbti.attitude, Attitude::Extraverted) != matches!(character.presence, Presence::Open)
    {
        mismatches += 1;
    }
    // Feeling types usually come across warm
    if matches!(mbti.judgment, Judgment::Feeling) != matches!(character.impression, Impression::Warm)
    {
        mismatches += 1;
    }
    // Perceiving lifestyles read playful, judging ones mature
    if matches!(mbti.lifestyle, Lifestyle::Perceiving) != matches!(character.vibe, Vibe::Playful) {
        mismatches += 1;
    }
    // Extraversion also shows up as pace
    if matches!(mbti.attitude, Attitude::Extraverted) != matches!(character.pace, Pace::Dynamic) {
        mismatches += 1;
    }

    mismatches + 1
}

/// One-line local advice per gap level, used as-is by the client and as
/// seed context for the AI advice proxy.
fn gap_advice(gap_level: u8) -> &'static str {
    match gap_level {
        1 => "What you see is what you get. Lean into that honesty; it is rarer than you think.",
        2 => "Your inside and outside mostly agree. The small gap is charm, not friction.",
        3 => "People meet half of you first. Let the other half out a little earlier.",
        4 => "Your first impression hides most of who you are. Surprise people on purpose.",
        _ => "You are living as twins: one inside, one outside. Introduce them to each other.",
    }
}
