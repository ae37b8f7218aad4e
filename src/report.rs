use std::fmt;

use itertools::{Itertools, MinMaxResult};
use serde::Serialize;

use crate::model::entity::{Match, PairKey, PlayerId, Roster};

/// Summary of a generated schedule: how evenly play was spread and which
/// pairings repeated within it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleReport {
    pub matches: usize,
    pub rounds: usize,
    /// Roster order; players who never played are listed with zero.
    pub play_counts: Vec<(PlayerId, usize)>,
    pub max_play_spread: usize,
    /// Teammate pairs used more than once, most repeated first.
    pub repeated_teammates: Vec<(String, usize)>,
    pub repeated_matchups: usize,
}

impl ScheduleReport {
    pub fn from_matches(matches: &[Match], players: &[PlayerId]) -> ScheduleReport {
        let roster = Roster::new(players);
        let counts = matches.iter().flat_map(|m| m.players.iter()).counts();
        let play_counts: Vec<(PlayerId, usize)> = roster
            .ids()
            .iter()
            .map(|id| (id.clone(), counts.get(id).copied().unwrap_or(0)))
            .collect();
        let max_play_spread = match play_counts.iter().map(|(_, n)| *n).minmax() {
            MinMaxResult::NoElements | MinMaxResult::OneElement(_) => 0,
            MinMaxResult::MinMax(min, max) => max - min,
        };

        let repeated_teammates: Vec<(String, usize)> = matches
            .iter()
            .flat_map(|m| m.teammate_keys())
            .counts()
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .sorted_by(|(ka, na), (kb, nb)| nb.cmp(na).then_with(|| ka.cmp(kb)))
            .map(|(key, n): (PairKey, usize)| (key.to_string(), n))
            .collect();

        let repeated_matchups: usize = matches
            .iter()
            .map(|m| m.matchup_key())
            .counts()
            .values()
            .map(|n| n.saturating_sub(1))
            .sum();

        ScheduleReport {
            matches: matches.len(),
            rounds: matches.iter().map(|m| m.round).max().unwrap_or(0),
            play_counts,
            max_play_spread,
            repeated_teammates,
            repeated_matchups,
        }
    }
}

impl fmt::Display for ScheduleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} matches over {} rounds", self.matches, self.rounds)?;
        writeln!(
            f,
            "plays: {}",
            self.play_counts.iter().map(|(id, n)| format!("{id}={n}")).join(", ")
        )?;
        writeln!(f, "max play spread: {}", self.max_play_spread)?;
        if self.repeated_teammates.is_empty() {
            writeln!(f, "repeated teammates: none")?;
        } else {
            writeln!(
                f,
                "repeated teammates: {}",
                self.repeated_teammates.iter().map(|(key, n)| format!("{key} x{n}")).join(", ")
            )?;
        }
        write!(f, "repeated matchups: {}", self.repeated_matchups)
    }
}
