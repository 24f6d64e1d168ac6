//! Read-only aggregation over the vote ledger.

use crate::model::{
    poll::Poll,
    results::{CandidateResult, OptionTally, PollTally, RaceTally},
    trend::OptionStanding,
    vote::{PoliticalVote, PollVote},
};

/// `count / total` as a percentage rounded to one decimal place, or zero
/// when there are no votes at all.
pub fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 * 1000.0 / total as f64).round() / 10.0
}

/// Tally political votes per race (country + office).
///
/// Races appear in the order their first vote was cast. Within a race,
/// candidates are sorted by votes descending; ties keep the order in which
/// each candidate first received a vote.
pub fn race_tallies<'a>(votes: impl IntoIterator<Item = &'a PoliticalVote>) -> Vec<RaceTally> {
    let mut races: Vec<RaceTally> = Vec::new();
    for vote in votes {
        let i = match races
            .iter()
            .position(|race| race.country == vote.country && race.role == vote.role)
        {
            Some(i) => i,
            None => {
                races.push(RaceTally {
                    country: vote.country.clone(),
                    role: vote.role,
                    total: 0,
                    results: Vec::new(),
                });
                races.len() - 1
            }
        };
        let race = &mut races[i];
        race.total += 1;
        match race
            .results
            .iter_mut()
            .find(|result| result.candidate_name == vote.candidate_name)
        {
            Some(result) => result.votes += 1,
            None => race.results.push(CandidateResult {
                candidate_name: vote.candidate_name.clone(),
                votes: 1,
                percent: 0.0,
            }),
        }
    }

    for race in &mut races {
        // `sort_by` is stable, which gives the first-seen tie-break.
        race.results.sort_by(|a, b| b.votes.cmp(&a.votes));
        let total = race.total;
        for result in &mut race.results {
            result.percent = percent(result.votes, total);
        }
    }
    races
}

/// Vote counts for each option of `poll`, in option order. Votes for other
/// polls are ignored.
pub fn option_standings(poll: &Poll, votes: &[PollVote]) -> Vec<OptionStanding> {
    let mut standings = poll
        .options
        .iter()
        .map(|option| OptionStanding {
            id: option.id.clone(),
            text: option.text.clone(),
            votes: 0,
        })
        .collect::<Vec<_>>();
    for vote in votes.iter().filter(|vote| vote.poll_id == poll.id) {
        if let Some(standing) = standings.iter_mut().find(|s| s.id == vote.option_id) {
            standing.votes += 1;
        }
    }
    standings
}

/// The two options with the most votes, leader first. Ties keep option
/// order. `None` if the poll has fewer than two options.
pub fn top_two(poll: &Poll, votes: &[PollVote]) -> Option<(OptionStanding, OptionStanding)> {
    let mut standings = option_standings(poll, votes);
    if standings.len() < 2 {
        return None;
    }
    standings.sort_by(|a, b| b.votes.cmp(&a.votes));
    let mut top = standings.into_iter();
    Some((top.next()?, top.next()?))
}

/// Per-option counts and percentages for one poll.
pub fn poll_tally(poll: &Poll, votes: &[PollVote]) -> PollTally {
    let standings = option_standings(poll, votes);
    let total = standings.iter().map(|s| s.votes).sum();
    PollTally {
        poll_id: poll.id.clone(),
        total,
        options: standings
            .into_iter()
            .map(|s| OptionTally {
                percent: percent(s.votes, total),
                option_id: s.id,
                text: s.text,
                votes: s.votes,
            })
            .collect(),
    }
}
