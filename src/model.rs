pub mod entity {
    use std::fmt;
    use std::str::FromStr;

    use serde::{Deserialize, Serialize};

    /// Opaque player token supplied by the caller (name, UUID, ...).
    pub type PlayerId = String;

    /// Position of a player inside a [`Roster`].
    pub type Index = usize;

    /// Canonical unordered pair of players: `PairKey::new(a, b) == PairKey::new(b, a)`.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct PairKey(PlayerId, PlayerId);

    impl PairKey {
        pub fn new(a: &str, b: &str) -> PairKey {
            if a <= b {
                PairKey(a.to_string(), b.to_string())
            } else {
                PairKey(b.to_string(), a.to_string())
            }
        }

        pub fn first(&self) -> &str {
            &self.0
        }

        pub fn second(&self) -> &str {
            &self.1
        }
    }

    impl fmt::Display for PairKey {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}|{}", self.0, self.1)
        }
    }

    impl FromStr for PairKey {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.split_once('|') {
                Some((a, b)) if !a.is_empty() && !b.is_empty() => Ok(PairKey::new(a, b)),
                _ => Err(format!("invalid pair key {s:?}, expected \"a|b\"")),
            }
        }
    }

    /// Roster with duplicates collapsed; the first occurrence keeps its position.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Roster {
        ids: Vec<PlayerId>,
    }

    impl Roster {
        pub fn new(players: &[PlayerId]) -> Roster {
            let mut ids: Vec<PlayerId> = Vec::with_capacity(players.len());
            for id in players {
                if !ids.contains(id) {
                    ids.push(id.clone());
                }
            }
            Roster { ids }
        }

        pub fn len(&self) -> usize {
            self.ids.len()
        }

        pub fn is_empty(&self) -> bool {
            self.ids.is_empty()
        }

        pub fn id(&self, index: Index) -> &PlayerId {
            &self.ids[index]
        }

        pub fn indices(&self) -> std::ops::Range<Index> {
            0..self.ids.len()
        }

        pub fn ids(&self) -> &[PlayerId] {
            &self.ids
        }
    }

    /// One court in one round. `players[0..2]` face `players[2..4]`.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Match {
        pub match_index: usize,
        pub round: usize,
        pub court: usize,
        pub players: [PlayerId; 4],
    }

    impl Match {
        pub fn team_a(&self) -> [&PlayerId; 2] {
            [&self.players[0], &self.players[1]]
        }

        pub fn team_b(&self) -> [&PlayerId; 2] {
            [&self.players[2], &self.players[3]]
        }

        pub fn teammate_keys(&self) -> [PairKey; 2] {
            [
                PairKey::new(&self.players[0], &self.players[1]),
                PairKey::new(&self.players[2], &self.players[3]),
            ]
        }

        pub fn opponent_keys(&self) -> [PairKey; 4] {
            let [a, b] = self.team_a();
            let [c, d] = self.team_b();
            [
                PairKey::new(a, c),
                PairKey::new(a, d),
                PairKey::new(b, c),
                PairKey::new(b, d),
            ]
        }

        /// Unordered team-vs-team key.
        pub fn matchup_key(&self) -> (PairKey, PairKey) {
            let [x, y] = self.teammate_keys();
            if x <= y { (x, y) } else { (y, x) }
        }
    }
}


pub mod history {
    use std::collections::HashMap;

    use serde::{Deserialize, Serialize};

    use super::entity::{Match, PairKey, PlayerId};

    pub type Score = f64;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct PairCountEntry {
        pub a: PlayerId,
        pub b: PlayerId,
        pub count: u32,
    }

    /// Pair-key → count table. Serialised as a list of `{a, b, count}` entries.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(from = "Vec<PairCountEntry>", into = "Vec<PairCountEntry>")]
    pub struct PairCounts(HashMap<PairKey, u32>);

    impl PairCounts {
        pub fn new() -> PairCounts {
            PairCounts(HashMap::new())
        }

        pub fn get_pair(&self, a: &str, b: &str) -> u32 {
            self.0.get(&PairKey::new(a, b)).copied().unwrap_or(0)
        }

        pub fn set(&mut self, key: PairKey, count: u32) {
            self.0.insert(key, count);
        }

        pub fn increment(&mut self, key: PairKey) {
            *self.0.entry(key).or_insert(0) += 1;
        }

        pub fn merge(&mut self, other: &PairCounts) {
            for (key, count) in other.iter() {
                *self.0.entry(key.clone()).or_insert(0) += count;
            }
        }

        pub fn len(&self) -> usize {
            self.0.len()
        }

        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }

        pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &u32)> {
            self.0.iter()
        }
    }

    impl From<Vec<PairCountEntry>> for PairCounts {
        fn from(entries: Vec<PairCountEntry>) -> Self {
            let mut counts = PairCounts::new();
            for entry in entries {
                *counts.0.entry(PairKey::new(&entry.a, &entry.b)).or_insert(0) += entry.count;
            }
            counts
        }
    }

    impl From<PairCounts> for Vec<PairCountEntry> {
        fn from(counts: PairCounts) -> Self {
            let mut entries: Vec<PairCountEntry> = counts.0
                .into_iter()
                .map(|(key, count)| PairCountEntry {
                    a: key.first().to_string(),
                    b: key.second().to_string(),
                    count,
                })
                .collect();
            entries.sort_by(|x, y| (&x.a, &x.b).cmp(&(&y.a, &y.b)));
            entries
        }
    }

    /// Persisted teammate/opponent frequencies. Read-only during a run.
    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct History {
        #[serde(default)]
        pub teammate_history: PairCounts,
        #[serde(default)]
        pub opponent_history: PairCounts,
    }

    impl History {
        pub fn new(teammate_history: PairCounts, opponent_history: PairCounts) -> History {
            History { teammate_history, opponent_history }
        }

        /// Squared count: a second partnership costs four times the first.
        pub fn teammate_penalty(&self, a: &str, b: &str) -> Score {
            let count = self.teammate_history.get_pair(a, b) as Score;
            count * count
        }

        pub fn opponent_penalty(&self, a: &str, b: &str) -> Score {
            self.opponent_history.get_pair(a, b) as Score
        }

        /// Folds a finished match into the tables the way a persistence layer would.
        pub fn record_match(&mut self, game: &Match) {
            for key in game.teammate_keys() {
                self.teammate_history.increment(key);
            }
            for key in game.opponent_keys() {
                self.opponent_history.increment(key);
            }
        }

        pub fn merge(&mut self, other: &History) {
            self.teammate_history.merge(&other.teammate_history);
            self.opponent_history.merge(&other.opponent_history);
        }

        pub fn from_matches(matches: &[Match]) -> History {
            let mut history = History::default();
            matches.iter().for_each(|game| history.record_match(game));
            history
        }
    }
}


pub mod weights {
    use serde::{Deserialize, Serialize};

    use super::history::Score;

    fn default_team_history() -> Score { 200.0 }
    fn default_local_repeat() -> Score { 50.0 }
    fn default_matchup_repeat() -> Score { 150.0 }
    fn default_opponent_history() -> Score { 20.0 }
    fn default_fairness() -> Score { 25.0 }
    fn default_rest() -> Score { 500.0 }
    fn default_round_reuse() -> Score { 1000.0 }
    fn default_jitter() -> Score { 1.0 }
    fn default_top_k() -> usize { 3 }

    /// Relative penalty weights used by the match builder.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Weights {
        /// Multiplier on the squared historical teammate count.
        #[serde(default = "default_team_history")]
        pub team_history: Score,

        /// Teammate pair already used earlier in this run.
        #[serde(default = "default_local_repeat")]
        pub local_repeat: Score,

        /// Team-vs-team matchup already played earlier in this run.
        #[serde(default = "default_matchup_repeat")]
        pub matchup_repeat: Score,

        #[serde(default = "default_opponent_history")]
        pub opponent_history: Score,

        /// Per match already played this run.
        #[serde(default = "default_fairness")]
        pub fairness: Score,

        /// Applied to players who have not rested yet in the current rest cycle.
        #[serde(default = "default_rest")]
        pub rest: Score,

        /// Player already on another court this round (fallback fills only).
        #[serde(default = "default_round_reuse")]
        pub round_reuse: Score,

        /// Upper bound of the uniform noise added to every candidate cost.
        #[serde(default = "default_jitter")]
        pub jitter: Score,

        /// Size of the window the first player is drawn from.
        #[serde(default = "default_top_k")]
        pub top_k: usize,
    }

    impl Default for Weights {
        fn default() -> Self {
            Weights {
                team_history: default_team_history(),
                local_repeat: default_local_repeat(),
                matchup_repeat: default_matchup_repeat(),
                opponent_history: default_opponent_history(),
                fairness: default_fairness(),
                rest: default_rest(),
                round_reuse: default_round_reuse(),
                jitter: default_jitter(),
                top_k: default_top_k(),
            }
        }
    }

    impl Weights {
        pub fn named(&self) -> [(&'static str, Score); 8] {
            [
                ("teamHistory", self.team_history),
                ("localRepeat", self.local_repeat),
                ("matchupRepeat", self.matchup_repeat),
                ("opponentHistory", self.opponent_history),
                ("fairness", self.fairness),
                ("rest", self.rest),
                ("roundReuse", self.round_reuse),
                ("jitter", self.jitter),
            ]
        }
    }
}
