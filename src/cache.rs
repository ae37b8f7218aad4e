use std::collections::HashMap;

use itertools::Itertools;

use crate::model::entity::{Index, Roster};
use crate::model::history::{History, Score};

fn ordered(a: Index, b: Index) -> (Index, Index) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Unordered team-vs-team key over roster indices.
pub fn matchup_key(team1: [Index; 2], team2: [Index; 2]) -> [(Index, Index); 2] {
    let x = ordered(team1[0], team1[1]);
    let y = ordered(team2[0], team2[1]);
    if x <= y { [x, y] } else { [y, x] }
}

/// Dense symmetric matrix of historical penalties, resolved once per run so the
/// builder never hashes player ids in its inner loops.
#[derive(Debug, Clone)]
pub struct PairTable {
    size: usize,
    values: Vec<Score>,
}

impl PairTable {
    pub fn build<F>(roster: &Roster, penalty: F) -> PairTable
    where
        F: Fn(&str, &str) -> Score,
    {
        let size = roster.len();
        let mut values = vec![0.0; size * size];
        for (a, b) in roster.indices().tuple_combinations() {
            let score = penalty(roster.id(a), roster.id(b));
            values[a * size + b] = score;
            values[b * size + a] = score;
        }
        PairTable { size, values }
    }

    pub fn teammates(roster: &Roster, history: &History) -> PairTable {
        PairTable::build(roster, |a, b| history.teammate_penalty(a, b))
    }

    pub fn opponents(roster: &Roster, history: &History) -> PairTable {
        PairTable::build(roster, |a, b| history.opponent_penalty(a, b))
    }

    pub fn get_pair(&self, a: Index, b: Index) -> Score {
        self.values[a * self.size + b]
    }
}

/// Pairings and matchups created so far in the current run.
#[derive(Debug, Clone, Default)]
pub struct UsageCache {
    teammates: HashMap<(Index, Index), u32>,
    opponents: HashMap<(Index, Index), u32>,
    matchups: HashMap<[(Index, Index); 2], u32>,
}

impl UsageCache {
    pub fn new() -> UsageCache {
        UsageCache::default()
    }

    pub fn teammate_count(&self, a: Index, b: Index) -> u32 {
        self.teammates.get(&ordered(a, b)).copied().unwrap_or(0)
    }

    pub fn opponent_count(&self, a: Index, b: Index) -> u32 {
        self.opponents.get(&ordered(a, b)).copied().unwrap_or(0)
    }

    pub fn matchup_count(&self, team1: [Index; 2], team2: [Index; 2]) -> u32 {
        self.matchups.get(&matchup_key(team1, team2)).copied().unwrap_or(0)
    }

    /// Records a finalised match laid out as `[a, b, c, d]` (`a, b` vs `c, d`).
    pub fn record(&mut self, players: [Index; 4]) {
        let [a, b, c, d] = players;
        *self.teammates.entry(ordered(a, b)).or_insert(0) += 1;
        *self.teammates.entry(ordered(c, d)).or_insert(0) += 1;
        for (x, y) in [a, b].into_iter().cartesian_product([c, d]) {
            *self.opponents.entry(ordered(x, y)).or_insert(0) += 1;
        }
        *self.matchups.entry(matchup_key([a, b], [c, d])).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entity::PairKey;
    use crate::model::history::PairCounts;

    fn roster(n: usize) -> Roster {
        Roster::new(&(1..=n).map(|i| format!("P{i}")).collect::<Vec<_>>())
    }

    #[test]
    fn test_pair_table_is_symmetric() {
        let mut teammates = PairCounts::new();
        teammates.set(PairKey::new("P1", "P3"), 2);
        let history = History::new(teammates, PairCounts::new());
        let table = PairTable::teammates(&roster(4), &history);
        assert_eq!(table.get_pair(0, 2), 4.0);
        assert_eq!(table.get_pair(2, 0), 4.0);
        assert_eq!(table.get_pair(0, 1), 0.0);
        assert_eq!(table.get_pair(1, 1), 0.0);
    }

    #[test]
    fn test_usage_record() {
        let mut usage = UsageCache::new();
        usage.record([0, 1, 2, 3]);
        assert_eq!(usage.teammate_count(1, 0), 1);
        assert_eq!(usage.teammate_count(0, 2), 0);
        assert_eq!(usage.opponent_count(3, 0), 1);
        assert_eq!(usage.opponent_count(2, 3), 0);
        assert_eq!(usage.matchup_count([3, 2], [1, 0]), 1);
        assert_eq!(usage.matchup_count([0, 2], [1, 3]), 0);
    }
}
