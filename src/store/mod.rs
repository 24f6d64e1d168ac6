//! Application state shared by every request.

use std::path::Path;

use chrono::Utc;
use log::{info, warn};
use rocket::tokio::sync::RwLock;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{
    candidate::{Candidate, NewCandidate},
    id::Id,
    poll::{PollFilter, PollSummary},
    results::{Export, Stats},
    user::{Credentials, Registration, Role, User},
    vote::{PoliticalBallot, PollVoteRequest, VoteRequest},
};

mod ledger;
mod persist;
mod ranking;
mod reference;
mod registry;
mod tally;
mod trend;

pub use ledger::Ledger;
use persist::JsonFile;
pub use reference::ReferenceData;
pub use registry::Registry;

const CANDIDATES_FILE: &str = "candidates.json";
const USERS_FILE: &str = "users.json";

/// Everything the server knows. Lock order is always `registry` before
/// `ledger`.
pub struct Store {
    pub registry: RwLock<Registry>,
    pub ledger: RwLock<Ledger>,
    reference: ReferenceData,
    candidates_file: JsonFile,
    users_file: JsonFile,
}

impl Store {
    /// Load persisted candidates and users, seeding defaults and the
    /// bootstrap admin where missing, and read the reference tables.
    pub async fn load(config: &Config) -> Result<Self> {
        let reference = ReferenceData::load(config.reference_dir()).await;
        let store = Self::open(
            config.data_dir(),
            reference,
            config.admin_unlimited_votes(),
        )
        .await?;
        store
            .ensure_admin_exists(config.admin_username(), config.admin_password())
            .await?;
        Ok(store)
    }

    async fn open(
        data_dir: &Path,
        reference: ReferenceData,
        admin_unlimited_votes: bool,
    ) -> Result<Self> {
        let candidates_file = JsonFile::new(data_dir, CANDIDATES_FILE);
        let users_file = JsonFile::new(data_dir, USERS_FILE);

        let candidates = match candidates_file.load::<Vec<Candidate>>().await? {
            Some(candidates) => candidates,
            None => {
                let seed = Candidate::seed();
                candidates_file.save(&seed).await?;
                info!("Seeded {} candidates", seed.len());
                seed
            }
        };
        let users = users_file.load::<Vec<User>>().await?.unwrap_or_default();
        info!(
            "Loaded {} candidates and {} users",
            candidates.len(),
            users.len()
        );

        Ok(Self {
            registry: RwLock::new(Registry::new(candidates, users)),
            ledger: RwLock::new(Ledger::new(admin_unlimited_votes)),
            reference,
            candidates_file,
            users_file,
        })
    }

    /// Create the configured admin if there is no admin at all.
    ///
    /// This operation is idempotent.
    async fn ensure_admin_exists(&self, username: &str, password: &str) -> Result<()> {
        let mut registry = self.registry.write().await;
        if registry.has_admin() {
            return Ok(());
        }
        let admin = User::new(
            Registration {
                username: username.to_string(),
                password: password.to_string(),
                name: "Administrator".to_string(),
            },
            Role::Admin,
        )?;
        registry.add_user(admin)?;
        self.users_file.save(registry.users()).await?;
        warn!("No admin found, created admin {username:?}");
        Ok(())
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    // Users

    pub async fn register(&self, registration: Registration) -> Result<User> {
        let user = User::new(registration, Role::User)?;
        let mut registry = self.registry.write().await;
        let user = registry.add_user(user)?.clone();
        self.users_file.save(registry.users()).await?;
        info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User> {
        self.registry
            .read()
            .await
            .user_by_name(&credentials.username)
            .filter(|user| user.verify_password(&credentials.password))
            .cloned()
            .ok_or_else(|| {
                Error::Unauthenticated(
                    "No user found with the provided username and password combination."
                        .to_string(),
                )
            })
    }

    pub async fn user(&self, id: &Id) -> Result<User> {
        self.registry
            .read()
            .await
            .user(id)
            .cloned()
            .ok_or_else(|| Error::Unauthenticated(format!("unknown user {id}")))
    }

    // Candidates

    pub async fn add_candidate(&self, new_candidate: NewCandidate) -> Result<Candidate> {
        let candidate = new_candidate.into_candidate()?;
        let mut registry = self.registry.write().await;
        let candidate = registry.add_candidate(candidate).clone();
        self.candidates_file.save(registry.candidates()).await?;
        info!("Added candidate {} ({})", candidate.name, candidate.id);
        Ok(candidate)
    }

    pub async fn remove_candidate(&self, id: &Id) -> Result<()> {
        let mut registry = self.registry.write().await;
        let candidate = registry.remove_candidate(id)?;
        self.candidates_file.save(registry.candidates()).await?;
        info!("Removed candidate {} ({})", candidate.name, candidate.id);
        Ok(())
    }

    // Votes

    /// Cast a political vote for the user with `user_id`.
    pub async fn cast_political_vote(&self, user_id: &Id, request: VoteRequest) -> Result<()> {
        let registry = self.registry.read().await;
        let user = registry
            .user(user_id)
            .ok_or_else(|| Error::Unauthenticated(format!("unknown user {user_id}")))?;

        let candidate_id = request.candidate_id.trim();
        if candidate_id.is_empty() {
            return Err(Error::bad_request("Candidate id must not be empty"));
        }
        let candidate_id = candidate_id
            .parse::<Id>()
            .map_err(|e| Error::bad_request(e.to_string()))?;
        let candidate = registry
            .candidate(&candidate_id)
            .ok_or_else(|| Error::not_found(format!("Candidate {candidate_id}")))?;

        // The race is the candidate's, whatever the client claims.
        if request.role != candidate.role
            || request.country.trim().to_lowercase() != candidate.country.to_lowercase()
        {
            return Err(Error::bad_request(format!(
                "Candidate {candidate_id} runs for {} of {}",
                candidate.role, candidate.country
            )));
        }

        let candidate_name = request
            .candidate_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| candidate.name.clone());
        let ballot = PoliticalBallot {
            role: candidate.role,
            country: candidate.country.clone(),
            state: candidate.state.clone(),
            candidate_id,
            candidate_name,
        };

        self.ledger
            .write()
            .await
            .cast_political_vote(user, ballot)?;
        Ok(())
    }

    /// Cast a poll vote for the user with `user_id`.
    pub async fn cast_poll_vote(&self, user_id: &Id, request: PollVoteRequest) -> Result<()> {
        let registry = self.registry.read().await;
        let user = registry
            .user(user_id)
            .ok_or_else(|| Error::Unauthenticated(format!("unknown user {user_id}")))?;
        let poll = registry
            .poll(&request.poll_id)
            .ok_or_else(|| Error::not_found(format!("Poll {}", request.poll_id)))?;

        self.ledger.write().await.cast_poll_vote(
            user,
            request.user_name,
            poll,
            &request.option_id,
        )?;
        Ok(())
    }

    pub async fn clear_votes(&self) {
        self.ledger.write().await.clear();
    }

    // Polls

    /// Polls matching `filter`, each with its vote count. Non-admins only
    /// ever see approved polls.
    pub async fn poll_summaries(&self, filter: &PollFilter, admin: bool) -> Vec<PollSummary> {
        let registry = self.registry.read().await;
        let ledger = self.ledger.read().await;
        registry
            .polls()
            .iter()
            .filter(|poll| filter.matches(poll) && (admin || poll.is_open()))
            .map(|poll| PollSummary {
                poll: poll.clone(),
                votes: ledger.poll_vote_count(&poll.id),
            })
            .collect()
    }

    /// Delete a poll along with its votes, candles and rank.
    pub async fn remove_poll(&self, id: &Id) -> Result<()> {
        let mut registry = self.registry.write().await;
        let poll = registry.remove_poll(id)?;
        self.ledger.write().await.remove_poll(id);
        info!("Removed poll {} ({})", poll.title, poll.id);
        Ok(())
    }

    // Overview

    pub async fn stats(&self) -> Stats {
        let registry = self.registry.read().await;
        let ledger = self.ledger.read().await;
        Stats {
            votes: ledger.votes().len(),
            poll_votes: ledger.poll_votes().len(),
            candidates: registry.candidates().len(),
            countries: self.reference.country_count(),
            polls: registry.polls().len(),
            users: registry.users().len(),
        }
    }

    pub async fn export(&self) -> Export {
        let registry = self.registry.read().await;
        let ledger = self.ledger.read().await;
        Export {
            candidates: registry.candidates().to_vec(),
            votes: ledger.votes().to_vec(),
            poll_votes: ledger.poll_votes().to_vec(),
            polls: registry.polls().to_vec(),
            export_date: Utc::now(),
        }
    }
}
