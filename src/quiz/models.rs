use core::fmt;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Number of questions requested from the model in one generation.
pub const QUIZ_LENGTH: usize = 10;

/// Number of questions actually served and scored. The model generates
/// [`QUIZ_LENGTH`] questions but the quiz stops after this many.
pub const PLAYED_QUESTIONS: usize = 7;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionKey {
    A,
    B,
    C,
    D,
}

impl OptionKey {
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "A" => Some(OptionKey::A),
            "B" => Some(OptionKey::B),
            "C" => Some(OptionKey::C),
            "D" => Some(OptionKey::D),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OptionKey::A => "A",
            OptionKey::B => "B",
            OptionKey::C => "C",
            OptionKey::D => "D",
        }
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Question {
    pub prompt: String,
    pub options: BTreeMap<OptionKey, String>,
    pub correct_option: OptionKey,
    pub explanation: String,
}

impl Question {
    pub fn option_text(&self, key: OptionKey) -> Option<&str> {
        self.options.get(&key).map(String::as_str)
    }

    pub fn is_correct(&self, choice: OptionKey) -> bool {
        self.correct_option == choice
    }
}

/// An ordered set of questions, fixed once stored in a session.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Quiz {
    questions: Vec<Question>,
}

impl Quiz {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }
}
