use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::id::{random_code, Id};

pub const SHARE_CODE_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromFormField)]
#[serde(rename_all = "lowercase")]
pub enum PollKind {
    #[field(value = "political")]
    Political,
    #[field(value = "community")]
    Community,
}

impl Default for PollKind {
    fn default() -> Self {
        Self::Community
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: Id,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: Id,
    pub title: String,
    pub category: String,
    pub description: String,
    pub options: Vec<PollOption>,
    pub share_code: String,
    #[serde(rename = "type")]
    pub kind: PollKind,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl Poll {
    /// Look up one of this poll's options.
    pub fn option(&self, option_id: &Id) -> Option<&PollOption> {
        self.options.iter().find(|option| &option.id == option_id)
    }

    /// Only approved polls may be voted on or shown to non-admins.
    pub fn is_open(&self) -> bool {
        self.approved
    }
}

/// A poll as submitted by a user. Options are plain texts; ids are assigned
/// by the server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPoll {
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub options: Vec<String>,
    #[serde(rename = "type", default)]
    pub kind: PollKind,
}

impl NewPoll {
    /// Validate and build the poll. `approved` is decided by the caller,
    /// based on who is creating it.
    pub fn into_poll(self, share_code: String, approved: bool) -> Result<Poll> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::bad_request("Poll title must not be empty"));
        }
        let options = self
            .options
            .iter()
            .map(|text| text.trim())
            .filter(|text| !text.is_empty())
            .enumerate()
            .map(|(i, text)| PollOption {
                id: Id::from(format!("opt{}", i + 1).as_str()),
                text: text.to_string(),
            })
            .collect::<Vec<_>>();
        if options.len() < 2 {
            return Err(Error::bad_request("A poll needs at least two options"));
        }

        Ok(Poll {
            id: Id::generate(),
            title: title.to_string(),
            category: self.category.trim().to_string(),
            description: self.description.trim().to_string(),
            options,
            share_code,
            kind: self.kind,
            approved,
            created_at: Utc::now(),
        })
    }
}

/// A fresh share code. Uniqueness is checked by the registry.
pub fn new_share_code() -> String {
    random_code(SHARE_CODE_LENGTH)
}

/// Query filters for the poll list.
#[derive(Debug, Default, FromForm)]
pub struct PollFilter {
    #[field(name = "type")]
    pub kind: Option<PollKind>,
    pub approved: Option<bool>,
}

impl PollFilter {
    pub fn matches(&self, poll: &Poll) -> bool {
        self.kind.map_or(true, |kind| kind == poll.kind)
            && self.approved.map_or(true, |approved| approved == poll.approved)
    }
}

/// A poll together with its current number of votes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollSummary {
    #[serde(flatten)]
    pub poll: Poll,
    pub votes: usize,
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl NewPoll {
        pub fn example() -> Self {
            Self::with_options(&["Yes", "No"])
        }

        pub fn with_options(options: &[&str]) -> Self {
            Self {
                title: "Should the park open at night?".into(),
                category: "City".into(),
                description: String::new(),
                options: options.iter().map(|o| o.to_string()).collect(),
                kind: PollKind::Community,
            }
        }
    }

    impl Poll {
        pub fn example(options: &[&str]) -> Self {
            NewPoll::with_options(options)
                .into_poll(new_share_code(), true)
                .unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_ids_are_sequential_and_unique() {
        let poll = Poll::example(&["A", " ", "B", "C"]);
        let ids = poll.options.iter().map(|o| o.id.to_string()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["opt1", "opt2", "opt3"]);
        assert_eq!(poll.option(&Id::from("opt2")).unwrap().text, "B");
        assert_eq!(poll.share_code.len(), SHARE_CODE_LENGTH);
    }

    #[test]
    fn needs_two_options_and_title() {
        assert!(NewPoll::with_options(&["Only"])
            .into_poll(new_share_code(), false)
            .is_err());

        let mut untitled = NewPoll::example();
        untitled.title = String::new();
        assert!(untitled.into_poll(new_share_code(), false).is_err());
    }

    #[test]
    fn kind_serializes_as_type() {
        let poll = Poll::example(&["A", "B"]);
        let json = rocket::serde::json::serde_json::to_value(&poll).unwrap();
        assert_eq!(json["type"], "community");
        assert!(json["shareCode"].is_string());
    }

    #[test]
    fn filter_by_kind_and_approval() {
        let mut poll = Poll::example(&["A", "B"]);
        poll.approved = false;
        let filter = PollFilter {
            kind: Some(PollKind::Community),
            approved: Some(true),
        };
        assert!(!filter.matches(&poll));
        assert!(PollFilter::default().matches(&poll));
    }
}
