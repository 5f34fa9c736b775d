//! Character Code scoring.
//!
//! The Character Code is the outward-impression counterpart to the MBTI
//! type: four axes describing how the person comes across, 16 combined
//! types. Same majority rule as the MBTI scorer; ties favor the
//! first-listed letter (W, O, P, D).

use serde::{Deserialize, Serialize};

use super::mbti::AxisTally;

/// One impression-questionnaire answer, mapped to the letter it favors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterAnswer {
    /// Warm first impression
    W,
    /// Cool first impression
    C,
    /// Open, talkative presence
    O,
    /// Reserved presence
    R,
    /// Playful vibe
    P,
    /// Mature vibe
    M,
    /// Dynamic pace
    D,
    /// Still, unhurried pace
    S,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Impression {
    Warm,
    Cool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Presence {
    Open,
    Reserved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Vibe {
    Playful,
    Mature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pace {
    Dynamic,
    Still,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CharacterCode {
    pub impression: Impression,
    pub presence: Presence,
    pub vibe: Vibe,
    pub pace: Pace,
}

impl CharacterCode {
    pub fn code(&self) -> String {
        let mut code = String::with_capacity(4);
        code.push(match self.impression {
            Impression::Warm => 'W',
            Impression::Cool => 'C',
        });
        code.push(match self.presence {
            Presence::Open => 'O',
            Presence::Reserved => 'R',
        });
        code.push(match self.vibe {
            Vibe::Playful => 'P',
            Vibe::Mature => 'M',
        });
        code.push(match self.pace {
            Pace::Dynamic => 'D',
            Pace::Still => 'S',
        });
        code
    }

    /// Display title for each of the 16 codes
    pub fn title(&self) -> &'static str {
        use Impression::*;
        use Pace::*;
        use Presence::*;
        use Vibe::*;

        match (self.impression, self.presence, self.vibe, self.pace) {
            (Warm, Open, Playful, Dynamic) => "The Sunburst Entertainer",
            (Warm, Open, Playful, Still) => "The Cozy Jester",
            (Warm, Open, Mature, Dynamic) => "The Rallying Host",
            (Warm, Open, Mature, Still) => "The Gentle Anchor",
            (Warm, Reserved, Playful, Dynamic) => "The Secret Spark",
            (Warm, Reserved, Playful, Still) => "The Soft Daydreamer",
            (Warm, Reserved, Mature, Dynamic) => "The Quiet Guardian",
            (Warm, Reserved, Mature, Still) => "The Hearthkeeper",
            (Cool, Open, Playful, Dynamic) => "The Electric Trickster",
            (Cool, Open, Playful, Still) => "The Deadpan Charmer",
            (Cool, Open, Mature, Dynamic) => "The Sharp Conductor",
            (Cool, Open, Mature, Still) => "The Poised Narrator",
            (Cool, Reserved, Playful, Dynamic) => "The Masked Comet",
            (Cool, Reserved, Playful, Still) => "The Sly Observer",
            (Cool, Reserved, Mature, Dynamic) => "The Lone Strategist",
            (Cool, Reserved, Mature, Still) => "The Midnight Scholar",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CharacterTallies {
    pub impression: AxisTally,
    pub presence: AxisTally,
    pub vibe: AxisTally,
    pub pace: AxisTally,
}

/// Count answers per impression axis and pick the majority letter of each.
pub fn score_character_code(answers: &[CharacterAnswer]) -> (CharacterCode, CharacterTallies) {
    let mut impression = AxisTally::default();
    let mut presence = AxisTally::default();
    let mut vibe = AxisTally::default();
    let mut pace = AxisTally::default();

    for answer in answers {
        match answer {
            CharacterAnswer::W => impression.first += 1,
            CharacterAnswer::C => impression.second += 1,
            CharacterAnswer::O => presence.first += 1,
            CharacterAnswer::R => presence.second += 1,
            CharacterAnswer::P => vibe.first += 1,
            CharacterAnswer::M => vibe.second += 1,
            CharacterAnswer::D => pace.first += 1,
            CharacterAnswer::S => pace.second += 1,
        }
    }

    let code = CharacterCode {
        impression: if impression.first >= impression.second {
            Impression::Warm
        } else {
            Impression::Cool
        },
        presence: if presence.first >= presence.second {
            Presence::Open
        } else {
            Presence::Reserved
        },
        vibe: if vibe.first >= vibe.second {
            Vibe::Playful
        } else {
            Vibe::Mature
        },
        pace: if pace.first >= pace.second {
            Pace::Dynamic
        } else {
            Pace::Still
        },
    };

    (
        code,
        CharacterTallies {
            impression,
            presence,
            vibe,
            pace,
        },
    )
}
