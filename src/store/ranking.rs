use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::model::{
    id::Id,
    poll::{Poll, PollKind},
    results::RankedPoll,
};

/// Admin-chosen ranks for approved community polls. Polls without an
/// override rank by their position in creation order.
#[derive(Debug, Default)]
pub struct PollRanking {
    overrides: HashMap<Id, u32>,
}

fn eligible(polls: &[Poll]) -> impl Iterator<Item = &Poll> {
    polls
        .iter()
        .filter(|poll| poll.approved && poll.kind == PollKind::Community)
}

impl PollRanking {
    fn rank_at(&self, poll: &Poll, position: usize) -> u32 {
        self.overrides
            .get(&poll.id)
            .copied()
            .unwrap_or(position as u32 + 1)
    }

    /// The effective rank of `poll_id`, if it is eligible for ranking.
    pub fn rank_of(&self, polls: &[Poll], poll_id: &Id) -> Option<u32> {
        eligible(polls)
            .enumerate()
            .find(|(_, poll)| &poll.id == poll_id)
            .map(|(position, poll)| self.rank_at(poll, position))
    }

    /// All eligible polls, best rank first. Equal ranks keep creation order.
    pub fn ranked(&self, polls: &[Poll]) -> Vec<RankedPoll> {
        let mut ranked = eligible(polls)
            .enumerate()
            .map(|(position, poll)| RankedPoll {
                rank: self.rank_at(poll, position),
                poll: poll.clone(),
            })
            .collect::<Vec<_>>();
        ranked.sort_by_key(|entry| entry.rank);
        ranked
    }

    pub fn set(&mut self, polls: &[Poll], poll_id: &Id, rank: u32) -> Result<()> {
        if rank == 0 {
            return Err(Error::bad_request("Ranks start at 1"));
        }
        self.rank_of(polls, poll_id)
            .ok_or_else(|| Error::not_found(format!("Ranked poll {poll_id}")))?;
        self.overrides.insert(poll_id.clone(), rank);
        Ok(())
    }

    /// Exchange the ranks of two polls.
    pub fn swap(&mut self, polls: &[Poll], first: &Id, second: &Id) -> Result<()> {
        let mut first_rank = None;
        let mut second_rank = None;
        for (position, poll) in eligible(polls).enumerate() {
            if &poll.id == first {
                first_rank = Some(self.rank_at(poll, position));
            }
            if &poll.id == second {
                second_rank = Some(self.rank_at(poll, position));
            }
        }
        let first_rank =
            first_rank.ok_or_else(|| Error::not_found(format!("Ranked poll {first}")))?;
        let second_rank =
            second_rank.ok_or_else(|| Error::not_found(format!("Ranked poll {second}")))?;

        self.overrides.insert(first.clone(), second_rank);
        self.overrides.insert(second.clone(), first_rank);
        Ok(())
    }

    pub fn remove(&mut self, poll_id: &Id) {
        self.overrides.remove(poll_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polls() -> Vec<Poll> {
        let mut political = Poll::example(&["Yes", "No"]);
        political.kind = PollKind::Political;
        let mut pending = Poll::example(&["Yes", "No"]);
        pending.approved = false;
        vec![
            Poll::example(&["A", "B"]),
            political,
            Poll::example(&["C", "D"]),
            pending,
            Poll::example(&["E", "F"]),
        ]
    }

    fn order(ranking: &PollRanking, polls: &[Poll]) -> Vec<Id> {
        ranking.ranked(polls).into_iter().map(|r| r.poll.id).collect()
    }

    #[test]
    fn default_rank_is_creation_order() {
        let polls = polls();
        let ranking = PollRanking::default();
        assert_eq!(
            order(&ranking, &polls),
            vec![polls[0].id.clone(), polls[2].id.clone(), polls[4].id.clone()]
        );
        assert_eq!(ranking.rank_of(&polls, &polls[4].id), Some(3));
        assert_eq!(ranking.rank_of(&polls, &polls[1].id), None);
        assert_eq!(ranking.rank_of(&polls, &polls[3].id), None);
    }

    #[test]
    fn swap_exchanges_ranks() {
        let polls = polls();
        let mut ranking = PollRanking::default();
        ranking.swap(&polls, &polls[0].id, &polls[4].id).unwrap();
        assert_eq!(
            order(&ranking, &polls),
            vec![polls[4].id.clone(), polls[2].id.clone(), polls[0].id.clone()]
        );
    }

    #[test]
    fn set_moves_poll() {
        let polls = polls();
        let mut ranking = PollRanking::default();
        ranking.set(&polls, &polls[4].id, 1).unwrap();
        // Ties keep creation order.
        assert_eq!(
            order(&ranking, &polls),
            vec![polls[0].id.clone(), polls[4].id.clone(), polls[2].id.clone()]
        );
        assert!(ranking.set(&polls, &polls[4].id, 0).is_err());
    }

    #[test]
    fn ineligible_polls_cannot_be_ranked() {
        let polls = polls();
        let mut ranking = PollRanking::default();
        assert!(matches!(
            ranking.swap(&polls, &polls[0].id, &polls[1].id),
            Err(Error::NotFound(_))
        ));
        assert!(ranking.set(&polls, &polls[3].id, 2).is_err());
        // A failed swap leaves no overrides behind.
        assert_eq!(ranking.rank_of(&polls, &polls[0].id), Some(1));
    }
}
