use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::id::Id;

/// The office a candidate runs for. President and Senator are decided
/// country-wide; the rest are subnational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromFormField)]
pub enum Office {
    President,
    Senator,
    Governor,
    Mayor,
    #[serde(rename = "MP")]
    #[field(value = "MP")]
    Mp,
    Deputy,
}

impl Display for Office {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::President => "President",
            Self::Senator => "Senator",
            Self::Governor => "Governor",
            Self::Mayor => "Mayor",
            Self::Mp => "MP",
            Self::Deputy => "Deputy",
        };
        formatter.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: Id,
    pub name: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub role: Office,
    pub party: String,
}

impl Candidate {
    /// Candidates written out when no candidates file exists yet.
    pub fn seed() -> Vec<Candidate> {
        let brazilian = |id: &str, name: &str, state: &str, party: &str| Candidate {
            id: id.into(),
            name: name.to_string(),
            country: "Brazil".to_string(),
            state: state.to_string(),
            city: state.to_string(),
            role: Office::President,
            party: party.to_string(),
        };
        vec![
            brazilian("1", "João Silva", "São Paulo", "PT"),
            brazilian("2", "Maria Santos", "São Paulo", "PSDB"),
            brazilian("3", "Pedro Oliveira", "Rio de Janeiro", "PL"),
        ]
    }
}

/// Admin input for a new candidate. Missing locations become `"Unknown"`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCandidate {
    pub name: String,
    pub party: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    pub role: Office,
}

impl NewCandidate {
    pub fn into_candidate(self) -> Result<Candidate> {
        let name = self.name.trim();
        let party = self.party.trim();
        if name.is_empty() || party.is_empty() {
            return Err(Error::bad_request("Candidate name and party are required"));
        }
        let or_unknown = |s: &str| match s.trim() {
            "" => "Unknown".to_string(),
            s => s.to_string(),
        };
        Ok(Candidate {
            id: Id::generate(),
            name: name.to_string(),
            country: or_unknown(&self.country),
            state: or_unknown(&self.state),
            city: or_unknown(&self.city),
            role: self.role,
            party: party.to_string(),
        })
    }
}

/// Query filters for the candidate list. Place names match case-insensitively.
#[derive(Debug, Default, FromForm)]
pub struct CandidateFilter {
    pub country: Option<String>,
    pub state: Option<String>,
    pub role: Option<Office>,
}

impl CandidateFilter {
    pub fn matches(&self, candidate: &Candidate) -> bool {
        let place = |want: &Option<String>, have: &str| {
            want.as_ref()
                .map_or(true, |want| want.to_lowercase() == have.to_lowercase())
        };
        place(&self.country, &candidate.country)
            && place(&self.state, &candidate.state)
            && self.role.map_or(true, |role| role == candidate.role)
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl NewCandidate {
        pub fn example() -> Self {
            Self {
                name: "Ana Costa".into(),
                party: "PSB".into(),
                country: "Brazil".into(),
                state: "Bahia".into(),
                city: "".into(),
                role: Office::Governor,
            }
        }
    }
}
