use itertools::Itertools;
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use tracing::trace;

use crate::action::{BuildError, Split};
use crate::cache::{PairTable, UsageCache};
use crate::fairness::FairnessTracker;
use crate::model::entity::Index;
use crate::model::history::Score;
use crate::model::weights::Weights;
use crate::rng::SeededRng;

const TIE_EPSILON: Score = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct BuiltMatch {
    /// `[0, 1]` vs `[2, 3]`.
    pub players: [Index; 4],
    /// Some players were already on court this round.
    pub fallback: bool,
    pub penalty: Score,
}

/// Greedy four-player selection for one court slot.
pub struct MatchBuilder<'a> {
    n_players: usize,
    teammates: &'a PairTable,
    opponents: &'a PairTable,
    weights: &'a Weights,
}

impl<'a> MatchBuilder<'a> {
    pub fn new(n_players: usize, teammates: &'a PairTable, opponents: &'a PairTable, weights: &'a Weights) -> Self {
        MatchBuilder { n_players, teammates, opponents, weights }
    }

    /// Picks four players from `pool` (falling back to the whole roster when the
    /// pool is short) and records the chosen pairings in `usage`.
    pub fn build(
        &self,
        pool: &[Index],
        fairness: &FairnessTracker,
        usage: &mut UsageCache,
        rng: &mut SeededRng,
    ) -> Result<BuiltMatch, BuildError> {
        if self.n_players < 4 {
            return Err(BuildError::InsufficientRoster(self.n_players));
        }

        let fallback = pool.iter().unique().count() < 4;
        let mut busy = vec![fallback; self.n_players];
        pool.iter().for_each(|p| busy[*p] = false);
        let candidates: Vec<Index> = if fallback {
            (0..self.n_players).collect()
        } else {
            pool.iter().copied().unique().collect()
        };

        let mut ranked = fairness.rank(&candidates, rng);
        ranked.sort_by_key(|p| busy[*p]);

        let fair_cost = |c: Index| -> Score {
            let mut cost = fairness.play_count(c) as Score * self.weights.fairness;
            if fairness.no_double_rest() && fairness.rest_streak(c) == 0 {
                cost += self.weights.rest;
            }
            if busy[c] {
                cost += self.weights.round_reuse;
            }
            cost
        };

        let free = ranked.iter().filter(|p| !busy[**p]).count();
        let window = self.weights.top_k.max(1).min(if free > 0 { free } else { ranked.len() });
        let first = ranked[..window].choose(rng).copied();

        let second = first.and_then(|a| {
            self.pick_min(&ranked, &[a], rng, |c| {
                self.teammates.get_pair(a, c) * self.weights.team_history
                    + usage.teammate_count(a, c) as Score * self.weights.local_repeat
                    + fair_cost(c)
            })
        });

        let third = first.zip(second).and_then(|(a, b)| {
            self.pick_min(&ranked, &[a, b], rng, |c| {
                (self.opponents.get_pair(a, c) + self.opponents.get_pair(b, c)) * self.weights.opponent_history
                    + (usage.teammate_count(a, c) + usage.teammate_count(b, c)) as Score * self.weights.local_repeat
                    + (usage.opponent_count(a, c) + usage.opponent_count(b, c)) as Score * self.weights.opponent_history
                    + fair_cost(c)
            })
        });

        let fourth = first.zip(second).zip(third).and_then(|((a, b), c)| {
            self.pick_min(&ranked, &[a, b, c], rng, |d| {
                self.teammates.get_pair(c, d) * self.weights.team_history
                    + usage.teammate_count(c, d) as Score * self.weights.local_repeat
                    + usage.matchup_count([a, b], [c, d]) as Score * self.weights.matchup_repeat
                    + (self.opponents.get_pair(a, d) + self.opponents.get_pair(b, d)) * self.weights.opponent_history
                    + (usage.opponent_count(a, d) + usage.opponent_count(b, d)) as Score * self.weights.opponent_history
                    + fair_cost(d)
            })
        });

        let picks = fill_distinct([first, second, third, fourth], &ranked, self.n_players)
            .ok_or(BuildError::InsufficientRoster(self.n_players))?;
        let base: Score = picks.iter().map(|p| fair_cost(*p)).sum();

        let (players, penalty) = self.arrange(picks, usage, rng);
        usage.record(players);
        trace!(?players, penalty = penalty + base, fallback, "match built");

        Ok(BuiltMatch { players, fallback, penalty: penalty + base })
    }

    /// Lowest-cost candidate outside `exclude`; `weights.jitter` noise is added
    /// to every cost. Exact ties lean towards the candidate ranked earlier.
    fn pick_min<F>(&self, ranked: &[Index], exclude: &[Index], rng: &mut SeededRng, cost: F) -> Option<Index>
    where
        F: Fn(Index) -> Score,
    {
        let scored: Vec<(Index, Score)> = ranked
            .iter()
            .copied()
            .filter(|c| !exclude.contains(c))
            .map(|c| (c, cost(c) + rng.next_f64() * self.weights.jitter))
            .collect();
        let best = scored.iter().map(|(_, s)| *s).fold(Score::INFINITY, Score::min);
        let ties: Vec<Index> = scored
            .iter()
            .filter(|(_, s)| *s - best <= TIE_EPSILON)
            .map(|(c, _)| *c)
            .collect();
        let preference: Vec<Score> = (0..ties.len()).rev().map(|rank| (rank + 1) as Score).collect();
        WeightedIndex::new(&preference).ok().map(|dist| ties[dist.sample(rng)])
    }

    /// Full penalty of a finished layout, fairness excluded (it does not vary
    /// with the split).
    pub fn arrangement_cost(&self, players: [Index; 4], usage: &UsageCache) -> Score {
        let [a, b, c, d] = players;
        let w = self.weights;
        let team_history = self.teammates.get_pair(a, b) + self.teammates.get_pair(c, d);
        let local = (usage.teammate_count(a, b) + usage.teammate_count(c, d)) as Score;
        let matchup = usage.matchup_count([a, b], [c, d]) as Score;
        let (opp_history, opp_local) = [a, b]
            .into_iter()
            .cartesian_product([c, d])
            .fold((0.0, 0.0), |(h, l), (x, y)| {
                (h + self.opponents.get_pair(x, y), l + usage.opponent_count(x, y) as Score)
            });

        team_history * w.team_history
            + local * w.local_repeat
            + matchup * w.matchup_repeat
            + (opp_history + opp_local) * w.opponent_history
    }

    fn arrange(&self, picks: [Index; 4], usage: &UsageCache, rng: &mut SeededRng) -> ([Index; 4], Score) {
        let layouts: Vec<([Index; 4], Score)> = Split::ALL
            .iter()
            .map(|split| {
                let players = split.apply(picks);
                (players, self.arrangement_cost(players, usage))
            })
            .collect();
        let best = layouts.iter().map(|(_, s)| *s).fold(Score::INFINITY, Score::min);
        let ties: Vec<&([Index; 4], Score)> = layouts.iter().filter(|(_, s)| *s - best <= TIE_EPSILON).collect();
        match ties.choose(rng) {
            Some((players, score)) => (*players, *score),
            None => (picks, best),
        }
    }
}

/// Collapses colliding picks and tops the match up from `ranked`, then from the
/// whole roster, keeping every player distinct.
fn fill_distinct(picks: [Option<Index>; 4], ranked: &[Index], n_players: usize) -> Option<[Index; 4]> {
    let mut chosen: Vec<Index> = picks.iter().flatten().copied().unique().collect();
    for candidate in ranked.iter().copied().chain(0..n_players) {
        if chosen.len() == 4 {
            break;
        }
        if !chosen.contains(&candidate) {
            chosen.push(candidate);
        }
    }
    chosen.try_into().ok()
}
