use std::collections::HashMap;

use chrono::Utc;

use crate::model::{
    id::Id,
    poll::Poll,
    trend::{Candle, CandleHistory},
    vote::PollVote,
};

use super::tally::top_two;

/// Minimum move of the leader's share, in percentage points, before a new
/// candle is appended.
const CANDLE_THRESHOLD: f64 = 0.1;

/// Share at which every new series opens.
const OPENING_PCT: f64 = 50.0;

/// Candle series for every poll, keyed by poll and the leading pair of
/// options at the time each candle was recorded.
///
/// When the top two options change, recording continues under a new key;
/// the old series is kept but no longer reported.
#[derive(Debug, Default)]
pub struct TrendBook {
    series: HashMap<String, Vec<Candle>>,
}

fn series_key(poll_id: &Id, first: &Id, second: &Id) -> String {
    format!("{poll_id}_{first}_{second}")
}

impl TrendBook {
    /// Record the current standing of `poll` if it moved enough since the
    /// last candle. Returns whether a candle was appended.
    pub fn record(&mut self, poll: &Poll, votes: &[PollVote]) -> bool {
        let (first, second) = match top_two(poll, votes) {
            Some(pair) => pair,
            None => return false,
        };
        let total = votes.iter().filter(|v| v.poll_id == poll.id).count();
        if total == 0 {
            return false;
        }

        let pct1 = first.votes as f64 * 100.0 / total as f64;
        let pct2 = 100.0 - pct1;
        let series = self
            .series
            .entry(series_key(&poll.id, &first.id, &second.id))
            .or_default();

        let candle = match series.last() {
            Some(last) => {
                if (last.close_pct - pct1).abs() <= CANDLE_THRESHOLD {
                    return false;
                }
                Candle {
                    timestamp: Utc::now(),
                    open_pct: last.close_pct,
                    close_pct: pct1,
                    high_pct: last.high_pct.max(pct1).max(pct2),
                    low_pct: last.low_pct.min(pct1).min(pct2),
                    votes1: first.votes,
                    votes2: second.votes,
                    total,
                }
            }
            None => Candle {
                timestamp: Utc::now(),
                open_pct: OPENING_PCT,
                close_pct: pct1,
                high_pct: pct1.max(pct2),
                low_pct: pct1.min(pct2),
                votes1: first.votes,
                votes2: second.votes,
                total,
            },
        };
        series.push(candle);
        true
    }

    /// The current top two options of `poll` and the series recorded under
    /// that pair.
    pub fn history(&self, poll: &Poll, votes: &[PollVote]) -> CandleHistory {
        match top_two(poll, votes) {
            Some((first, second)) => {
                let history = self
                    .series
                    .get(&series_key(&poll.id, &first.id, &second.id))
                    .cloned()
                    .unwrap_or_default();
                CandleHistory {
                    option1: Some(first),
                    option2: Some(second),
                    history,
                }
            }
            None => CandleHistory {
                option1: None,
                option2: None,
                history: Vec::new(),
            },
        }
    }

    /// Drop every series belonging to `poll_id`.
    pub fn remove_poll(&mut self, poll_id: &Id) {
        let prefix = format!("{poll_id}_");
        self.series.retain(|key, _| !key.starts_with(&prefix));
    }

    pub fn clear(&mut self) {
        self.series.clear();
    }

    /// Number of series, across all polls and pairs.
    #[cfg(test)]
    fn len(&self) -> usize {
        self.series.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Push a vote and record, like the ledger does.
    fn vote(book: &mut TrendBook, votes: &mut Vec<PollVote>, poll: &Poll, option: &str) -> bool {
        let user = format!("u{}", votes.len());
        votes.push(PollVote::example(poll, &user, option));
        book.record(poll, votes)
    }

    #[test]
    fn first_vote_seeds_series_at_fifty() {
        let poll = Poll::example(&["A", "B"]);
        let mut book = TrendBook::default();
        let mut votes = Vec::new();

        assert!(vote(&mut book, &mut votes, &poll, "opt1"));
        let history = book.history(&poll, &votes);
        assert_eq!(history.option1.as_ref().unwrap().text, "A");
        assert_eq!(history.option2.as_ref().unwrap().text, "B");
        let seed = &history.history[0];
        assert_eq!(seed.open_pct, 50.0);
        assert_eq!(seed.close_pct, 100.0);
        assert_eq!(seed.high_pct, 100.0);
        assert_eq!(seed.low_pct, 0.0);
        assert_eq!((seed.votes1, seed.votes2, seed.total), (1, 0, 1));
    }

    #[test]
    fn candles_chain_open_to_previous_close() {
        let poll = Poll::example(&["A", "B"]);
        let mut book = TrendBook::default();
        let mut votes = Vec::new();

        vote(&mut book, &mut votes, &poll, "opt1"); // 100%
        vote(&mut book, &mut votes, &poll, "opt1"); // 100%, unchanged
        assert!(vote(&mut book, &mut votes, &poll, "opt2")); // 66.7%

        let history = book.history(&poll, &votes).history;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].open_pct, history[0].close_pct);
        assert!((history[1].close_pct - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(history[1].high_pct, 100.0);
        assert_eq!(history[1].low_pct, 0.0);
        assert_eq!(history[1].total, 3);
    }

    #[test]
    fn small_moves_do_not_add_candles() {
        let poll = Poll::example(&["A", "B"]);
        let mut book = TrendBook::default();
        // 600 vs 400 puts the leader at exactly 60%.
        let mut votes = (0..1000)
            .map(|i| PollVote::example(&poll, &format!("u{i}"), if i < 600 { "opt1" } else { "opt2" }))
            .collect::<Vec<_>>();
        assert!(book.record(&poll, &votes));

        // One more vote for A: 601/1001 = 60.04%, a move of 0.04 points.
        votes.push(PollVote::example(&poll, "x1", "opt1"));
        assert!(!book.record(&poll, &votes));

        // Two more for A: 603/1003 = 60.12%, a move of 0.12 points from the last candle.
        votes.push(PollVote::example(&poll, "x2", "opt1"));
        votes.push(PollVote::example(&poll, "x3", "opt1"));
        assert!(book.record(&poll, &votes));

        let history = book.history(&poll, &votes).history;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].open_pct, 60.0);
    }

    #[test]
    fn leader_change_starts_new_series() {
        let poll = Poll::example(&["A", "B"]);
        let mut book = TrendBook::default();
        let mut votes = Vec::new();

        vote(&mut book, &mut votes, &poll, "opt1");
        vote(&mut book, &mut votes, &poll, "opt2"); // tie keeps A first, 50%
        vote(&mut book, &mut votes, &poll, "opt2"); // B leads now

        let history = book.history(&poll, &votes);
        assert_eq!(history.option1.as_ref().unwrap().text, "B");
        assert_eq!(history.history.len(), 1);
        assert_eq!(history.history[0].open_pct, 50.0);
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn single_option_poll_has_no_history() {
        let mut poll = Poll::example(&["A", "B"]);
        poll.options.truncate(1);
        let mut book = TrendBook::default();
        let mut votes = Vec::new();

        assert!(!vote(&mut book, &mut votes, &poll, "opt1"));
        let history = book.history(&poll, &votes);
        assert!(history.option1.is_none() && history.option2.is_none());
        assert!(history.history.is_empty());
    }

    #[test]
    fn remove_poll_keeps_other_polls() {
        let first = Poll::example(&["A", "B"]);
        let second = Poll::example(&["C", "D"]);
        let mut book = TrendBook::default();
        let mut votes = Vec::new();
        vote(&mut book, &mut votes, &first, "opt1");
        vote(&mut book, &mut votes, &second, "opt2");

        book.remove_poll(&first.id);
        assert!(book.history(&first, &votes).history.is_empty());
        assert_eq!(book.history(&second, &votes).history.len(), 1);
    }
}
