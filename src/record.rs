use serde::{Deserialize, Serialize};
use validator::Validate;
use validator_derive::Validate;

use std::fmt;
use std::str::FromStr;

use crate::senti::Sentiment;
use crate::Error;

pub const MIN_AGE: u8 = 10;
pub const MAX_AGE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];
}

impl Default for Gender {
    fn default() -> Self {
        Gender::Male
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        };
        f.pad(name)
    }
}

impl FromStr for Gender {
    type Err = String;

    /// Accepts the name in any case or its 1-based position in [`Gender::ALL`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let choice = s.trim();
        if let Ok(idx) = choice.parse::<usize>() {
            return idx
                .checked_sub(1)
                .and_then(|idx| Gender::ALL.get(idx).copied())
                .ok_or_else(|| format!("no gender option {}", idx));
        }
        Gender::ALL
            .iter()
            .find(|gender| gender.to_string().eq_ignore_ascii_case(choice))
            .copied()
            .ok_or_else(|| format!("unknown gender {:?}", choice))
    }
}

/// One stored row. Column order on disk follows field order here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeedbackRecord {
    pub name: String,
    pub gender: Gender,
    pub age: u8,
    pub email: String,
    pub feedback: String,
    pub sentiment: Sentiment,
}

/// Raw values as entered on the form
#[derive(Debug, Clone, Default, Validate)]
pub struct FeedbackForm {
    pub name: String,
    pub gender: Gender,
    #[validate(range(min = 10, max = 100))]
    pub age: u8,
    pub email: String,
    pub feedback: String,
}

/// A form that passed validation and is waiting for its sentiment
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub gender: Gender,
    pub age: u8,
    pub email: String,
    pub feedback: String,
}

impl FeedbackForm {
    pub fn submit(self) -> Result<Candidate, Error> {
        let feedback = self.feedback.trim();
        if feedback.is_empty() {
            return Err(Error::EmptyFeedback);
        }
        self.validate()?;
        Ok(Candidate {
            feedback: feedback.to_string(),
            name: self.name,
            gender: self.gender,
            age: self.age,
            email: self.email,
        })
    }
}

impl Candidate {
    pub fn into_record(self, sentiment: Sentiment) -> FeedbackRecord {
        FeedbackRecord {
            name: self.name,
            gender: self.gender,
            age: self.age,
            email: self.email,
            feedback: self.feedback,
            sentiment,
        }
    }
}
