use chrono::Utc;
use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::model::{
    id::Id,
    poll::Poll,
    results::{PollTally, RaceFilter, RaceTally},
    trend::CandleHistory,
    user::User,
    vote::{PoliticalBallot, PoliticalVote, PollVote},
};

use super::{tally, trend::TrendBook};

/// The append-only record of every ballot cast since startup, plus the
/// candle series derived from poll votes.
///
/// All eligibility rules live here: a user gets one vote per race
/// (office + country) and one vote per poll. Admins are exempt when
/// `admin_unlimited_votes` is set.
#[derive(Debug)]
pub struct Ledger {
    votes: Vec<PoliticalVote>,
    poll_votes: Vec<PollVote>,
    trends: TrendBook,
    admin_unlimited_votes: bool,
}

impl Ledger {
    pub fn new(admin_unlimited_votes: bool) -> Self {
        Self {
            votes: Vec::new(),
            poll_votes: Vec::new(),
            trends: TrendBook::default(),
            admin_unlimited_votes,
        }
    }

    pub fn votes(&self) -> &[PoliticalVote] {
        &self.votes
    }

    pub fn poll_votes(&self) -> &[PollVote] {
        &self.poll_votes
    }

    fn exempt(&self, user: &User) -> bool {
        self.admin_unlimited_votes && user.is_admin()
    }

    /// Record a political vote by `user`.
    pub fn cast_political_vote(
        &mut self,
        user: &User,
        ballot: PoliticalBallot,
    ) -> Result<&PoliticalVote> {
        let country = ballot.country.trim();
        if country.is_empty() {
            return Err(Error::bad_request("Country must not be empty"));
        }
        let race_country = country.to_lowercase();

        if !self.exempt(user)
            && self.votes.iter().any(|vote| {
                vote.user_id == user.id
                    && vote.role == ballot.role
                    && vote.country.to_lowercase() == race_country
            })
        {
            debug!("Rejected repeat {} vote by {} in {country}", ballot.role, user.id);
            return Err(Error::DuplicateVote(format!(
                "{} of {country}",
                ballot.role
            )));
        }

        let vote = PoliticalVote {
            id: Id::generate(),
            user_id: user.id.clone(),
            role: ballot.role,
            country: country.to_string(),
            state: ballot.state.trim().to_string(),
            candidate_id: ballot.candidate_id,
            candidate_name: ballot.candidate_name,
            timestamp: Utc::now(),
        };
        info!(
            "Vote {} recorded: {} of {} for {}",
            vote.id, vote.role, vote.country, vote.candidate_name
        );
        self.votes.push(vote);
        Ok(&self.votes[self.votes.len() - 1])
    }

    /// Record a vote by `user` for one option of `poll`, then update the
    /// poll's candle series.
    pub fn cast_poll_vote(
        &mut self,
        user: &User,
        user_name: Option<String>,
        poll: &Poll,
        option_id: &Id,
    ) -> Result<&PollVote> {
        if !poll.is_open() {
            return Err(Error::not_found(format!("Poll {}", poll.id)));
        }
        let option = poll.option(option_id).ok_or_else(|| {
            Error::not_found(format!("Option {option_id} of poll {}", poll.id))
        })?;

        if !self.exempt(user)
            && self
                .poll_votes
                .iter()
                .any(|vote| vote.poll_id == poll.id && vote.user_id == user.id)
        {
            debug!("Rejected repeat vote by {} in poll {}", user.id, poll.id);
            return Err(Error::DuplicateVote(format!("poll {}", poll.title)));
        }

        let user_name = user_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| user.name.clone());
        let vote = PollVote {
            id: Id::generate(),
            poll_id: poll.id.clone(),
            user_id: user.id.clone(),
            user_name,
            option_id: option.id.clone(),
            option_text: option.text.clone(),
            timestamp: Utc::now(),
        };
        info!("Poll vote {} recorded in poll {}", vote.id, poll.id);
        self.poll_votes.push(vote);

        if self.trends.record(poll, &self.poll_votes) {
            debug!("New candle for poll {}", poll.id);
        }
        Ok(&self.poll_votes[self.poll_votes.len() - 1])
    }

    /// Erase every vote and candle. Irreversible.
    pub fn clear(&mut self) {
        warn!(
            "Clearing {} votes and {} poll votes",
            self.votes.len(),
            self.poll_votes.len()
        );
        self.votes.clear();
        self.poll_votes.clear();
        self.trends.clear();
    }

    /// Forget a deleted poll's votes and candles.
    pub fn remove_poll(&mut self, poll_id: &Id) {
        self.poll_votes.retain(|vote| &vote.poll_id != poll_id);
        self.trends.remove_poll(poll_id);
    }

    pub fn poll_vote_count(&self, poll_id: &Id) -> usize {
        self.poll_votes
            .iter()
            .filter(|vote| &vote.poll_id == poll_id)
            .count()
    }

    pub fn race_tallies(&self, filter: &RaceFilter) -> Vec<RaceTally> {
        tally::race_tallies(self.votes.iter().filter(|vote| filter.matches(vote)))
    }

    pub fn poll_tally(&self, poll: &Poll) -> PollTally {
        tally::poll_tally(poll, &self.poll_votes)
    }

    pub fn candle_history(&self, poll: &Poll) -> CandleHistory {
        self.trends.history(poll, &self.poll_votes)
    }
}
