//! MBTI axis scoring.
//!
//! Majority letter per axis; an exact tie always resolves to the
//! first-listed letter of the axis (E, S, T, J) so repeated runs over the
//! same answers can never flip the type.

use serde::{Deserialize, Serialize};

/// One questionnaire answer, already mapped to the letter it favors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MbtiAnswer {
    E,
    I,
    S,
    N,
    T,
    F,
    J,
    P,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attitude {
    Extraverted,
    Introverted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Perception {
    Sensing,
    Intuitive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Judgment {
    Thinking,
    Feeling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifestyle {
    Judging,
    Perceiving,
}

/// Per-axis answer counts, kept around for the entertainment scores
#[derive(Debug, Clone, Copy, Default)]
pub struct AxisTally {
    pub first: usize,
    pub second: usize,
}

impl AxisTally {
    /// Signed margin in -1.0..=1.0 toward the first-listed letter.
    /// An axis nobody answered counts as perfectly balanced.
    pub fn margin(&self) -> f64 {
        let total = self.first + self.second;
        if total == 0 {
            return 0.0;
        }
        (self.first as f64 - self.second as f64) / total as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MbtiType {
    pub attitude: Attitude,
    pub perception: Perception,
    pub judgment: Judgment,
    pub lifestyle: Lifestyle,
}

impl MbtiType {
    pub fn code(&self) -> String {
        let mut code = String::with_capacity(4);
        code.push(match self.attitude {
            Attitude::Extraverted => 'E',
            Attitude::Introverted => 'I',
        });
        code.push(match self.perception {
            Perception::Sensing => 'S',
            Perception::Intuitive => 'N',
        });
        code.push(match self.judgment {
            Judgment::Thinking => 'T',
            Judgment::Feeling => 'F',
        });
        code.push(match self.lifestyle {
            Lifestyle::Judging => 'J',
            Lifestyle::Perceiving => 'P',
        });
        code
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MbtiTallies {
    pub attitude: AxisTally,
    pub perception: AxisTally,
    pub judgment: AxisTally,
    pub lifestyle: AxisTally,
}

/// Count answers per axis and pick the majority letter of each.
pub fn score_mbti(answers: &[MbtiAnswer]) -> (MbtiType, MbtiTallies) {
    let mut attitude = AxisTally::default();
    let mut perception = AxisTally::default();
    let mut judgment = AxisTally::default();
    let mut lifestyle = AxisTally::default();

    for answer in answers {
        match answer {
            MbtiAnswer::E => attitude.first += 1,
            MbtiAnswer::I => attitude.second += 1,
            MbtiAnswer::S => perception.first += 1,
            MbtiAnswer::N => perception.second += 1,
            MbtiAnswer::T => judgment.first += 1,
            MbtiAnswer::F => judgment.second += 1,
            MbtiAnswer::J => lifestyle.first += 1,
            MbtiAnswer::P => lifestyle.second += 1,
        }
    }

    // first >= second keeps ties on the first-listed letter
    let mbti = MbtiType {
        attitude: if attitude.first >= attitude.second {
            Attitude::Extraverted
        } else {
            Attitude::Introverted
        },
        perception: if perception.first >= perception.second {
            Perception::Sensing
        } else {
            Perception::Intuitive
        },
        judgment: if judgment.first >= judgment.second {
            Judgment::Thinking
        } else {
            Judgment::Feeling
        },
        lifestyle: if lifestyle.first >= lifestyle.second {
            Lifestyle::Judging
        } else {
            Lifestyle::Perceiving
        },
    };

    (
        mbti,
        MbtiTallies {
            attitude,
            perception,
            judgment,
            lifestyle,
        },
    )
}

/// Best-match MBTI types for the computed one. Entertainment, not
/// psychology: pairs follow the usual pop-MBTI complement tables.
pub fn compatibility(code: &str) -> Vec<&'static str> {
    match code {
        "ENFP" => vec!["INTJ", "INFJ"],
        "ENFJ" => vec!["INFP", "ISFP"],
        "ENTP" => vec!["INFJ", "INTJ"],
        "ENTJ" => vec!["INTP", "INFP"],
        "ESFP" => vec!["ISTJ", "ISFJ"],
        "ESFJ" => vec!["ISFP", "ISTP"],
        "ESTP" => vec!["ISFJ", "ISTJ"],
        "ESTJ" => vec!["ISTP", "INTP"],
        "INFP" => vec!["ENFJ", "ENTJ"],
        "INFJ" => vec!["ENFP", "ENTP"],
        "INTP" => vec!["ENTJ", "ESTJ"],
        "INTJ" => vec!["ENFP", "ENTP"],
        "ISFP" => vec!["ENFJ", "ESFJ"],
        "ISFJ" => vec!["ESTP", "ESFP"],
        "ISTP" => vec!["ESFJ", "ESTJ"],
        "ISTJ" => vec!["ESFP", "ESTP"],
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_majority_per_axis() {
        use MbtiAnswer::*;
        let answers = vec![E, E, I, N, N, S, F, F, T, P, P, J];
        let (mbti, _) = score_mbti(&answers);
        assert_eq!(mbti.code(), "ENFP");
    }

    #[test]
    fn test_exact_tie_resolves_to_first_listed() {
        // 14 E against 14 I must always land on E, never flip between runs
        let mut answers = vec![MbtiAnswer::E; 14];
        answers.extend(vec![MbtiAnswer::I; 14]);

        for _ in 0..10 {
            let (mbti, _) = score_mbti(&answers);
            assert_eq!(mbti.attitude, Attitude::Extraverted);
        }
    }

    #[test]
    fn test_all_axes_tie_gives_estj() {
        use MbtiAnswer::*;
        let answers = vec![E, I, S, N, T, F, J, P];
        let (mbti, _) = score_mbti(&answers);
        assert_eq!(mbti.code(), "ESTJ");
    }

    #[test]
    fn test_empty_answers_still_produce_a_type() {
        let (mbti, tallies) = score_mbti(&[]);
        assert_eq!(mbti.code(), "ESTJ");
        assert_eq!(tallies.attitude.margin(), 0.0);
    }

    #[test]
    fn test_determinism_over_identical_input() {
        use MbtiAnswer::*;
        let answers = vec![I, I, I, N, N, F, F, F, P, P, T, J];
        let (a, _) = score_mbti(&answers);
        let (b, _) = score_mbti(&answers);
        assert_eq!(a, b);
    }

    #[test]
    fn test_margin_range() {
        let full = AxisTally { first: 10, second: 0 };
        assert_eq!(full.margin(), 1.0);
        let even = AxisTally { first: 7, second: 7 };
        assert_eq!(even.margin(), 0.0);
        let against = AxisTally { first: 0, second: 5 };
        assert_eq!(against.margin(), -1.0);
    }

    #[test]
    fn test_compatibility_covers_all_sixteen_types() {
        for a in ["E", "I"] {
            for p in ["S", "N"] {
                for j in ["T", "F"] {
                    for l in ["J", "P"] {
                        let code = format!("{}{}{}{}", a, p, j, l);
                        assert!(!compatibility(&code).is_empty(), "no matches for {}", code);
                    }
                }
            }
        }
        assert!(compatibility("ABCD").is_empty());
    }
}
