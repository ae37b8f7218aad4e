use std::cmp::Reverse;

use rand::seq::SliceRandom;

use crate::model::entity::Index;
use crate::rng::SeededRng;

/// Per-player play counts and rest streaks for one run.
#[derive(Debug, Clone)]
pub struct FairnessTracker {
    play_count: Vec<u32>,
    rest_streak: Vec<u32>,
    no_double_rest: bool,
}

impl FairnessTracker {
    pub fn new(n_players: usize, no_double_rest: bool) -> FairnessTracker {
        FairnessTracker {
            play_count: vec![0; n_players],
            rest_streak: vec![0; n_players],
            no_double_rest,
        }
    }

    pub fn no_double_rest(&self) -> bool {
        self.no_double_rest
    }

    pub fn play_count(&self, player: Index) -> u32 {
        self.play_count[player]
    }

    /// Always zero unless no-double-rest mode is on.
    pub fn rest_streak(&self, player: Index) -> u32 {
        if self.no_double_rest { self.rest_streak[player] } else { 0 }
    }

    pub fn play_counts(&self) -> &[u32] {
        &self.play_count
    }

    pub fn record_played(&mut self, players: &[Index]) {
        players.iter().for_each(|p| self.play_count[*p] += 1);
    }

    /// Bumps the streak of everyone who sat out the round. Once the whole roster
    /// has rested at least once the cycle restarts. Returns true on reset.
    pub fn record_rested_round(&mut self, rested: &[Index]) -> bool {
        if !self.no_double_rest {
            return false;
        }
        rested.iter().for_each(|p| self.rest_streak[*p] += 1);
        if self.rest_streak.iter().all(|streak| *streak >= 1) {
            self.rest_streak.iter_mut().for_each(|streak| *streak = 0);
            return true;
        }
        false
    }

    /// Orders `pool` so that players owed a game come first: rested players
    /// ahead of unrested ones, then fewest plays. Remaining ties follow a
    /// seeded shuffle.
    pub fn rank(&self, pool: &[Index], rng: &mut SeededRng) -> Vec<Index> {
        let mut ranked = pool.to_vec();
        ranked.shuffle(rng);
        ranked.sort_by_key(|p| (Reverse(self.rest_streak(*p)), self.play_count[*p]));
        ranked
    }
}
