//! Round/court driver: fills every slot with the match builder and keeps the
//! fairness counters up to date between slots.

use rand::seq::SliceRandom;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::action::BuildError;
use crate::builder::MatchBuilder;
use crate::cache::{PairTable, UsageCache};
use crate::config::ScheduleConfig;
use crate::fairness::FairnessTracker;
use crate::model::entity::{Index, Match, Roster};
use crate::rng::SeededRng;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScheduleError {
    #[error("courts must be a positive integer, got {0}")]
    InvalidCourts(usize),

    #[error("matchesPerCourt must be a positive integer, got {0}")]
    InvalidMatchesPerCourt(usize),

    #[error("{courts} courts x {matches_per_court} matches per court is too many matches")]
    TooManyMatches { courts: usize, matches_per_court: usize },

    #[error("weight {name} must be finite and non-negative, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Generates the matches for one session.
///
/// Fewer than four distinct players is not an error: the result is simply empty.
pub fn generate_schedule(config: &ScheduleConfig) -> Result<Vec<Match>, ScheduleError> {
    config.validate()?;
    let roster = Roster::new(&config.players);
    if roster.len() < 4 {
        info!(players = roster.len(), "not enough players to form a match");
        return Ok(Vec::new());
    }
    let rng = SeededRng::from_seed_str(&config.seed_string());
    Scheduler::new(config, roster, rng).run()
}

struct Scheduler<'a> {
    config: &'a ScheduleConfig,
    roster: Roster,
    rng: SeededRng,
    fairness: FairnessTracker,
    usage: UsageCache,
    /// Roster indices after the initial seeded shuffle.
    order: Vec<Index>,
    matches: Vec<Match>,
}

impl<'a> Scheduler<'a> {
    fn new(config: &'a ScheduleConfig, roster: Roster, mut rng: SeededRng) -> Scheduler<'a> {
        let mut order: Vec<Index> = roster.indices().collect();
        order.shuffle(&mut rng);
        Scheduler {
            fairness: FairnessTracker::new(roster.len(), config.no_double_rest),
            usage: UsageCache::new(),
            matches: Vec::new(),
            config,
            roster,
            rng,
            order,
        }
    }

    fn run(mut self) -> Result<Vec<Match>, ScheduleError> {
        let config = self.config;
        let total = config.total_matches();
        let courts = config.courts;
        let rounds = total.div_ceil(courts);
        let teammates = PairTable::teammates(&self.roster, &config.history);
        let opponents = PairTable::opponents(&self.roster, &config.history);
        let builder = MatchBuilder::new(self.roster.len(), &teammates, &opponents, &config.weights);

        info!(
            players = self.roster.len(),
            courts,
            rounds,
            total,
            no_double_rest = config.no_double_rest,
            "generating schedule"
        );

        for round in 1..=rounds {
            if self.matches.len() >= total {
                break;
            }
            self.play_round(&builder, round, total)?;
        }

        if self.matches.len() < total {
            warn!(requested = total, emitted = self.matches.len(), "schedule ended short");
        }
        self.matches.truncate(total);
        Ok(self.matches)
    }

    fn play_round(&mut self, builder: &MatchBuilder<'_>, round: usize, total: usize) -> Result<(), ScheduleError> {
        let mut on_court = vec![false; self.roster.len()];

        for court in 1..=self.config.courts {
            if self.matches.len() >= total {
                break;
            }
            let pool: Vec<Index> = self.order.iter().copied().filter(|p| !on_court[*p]).collect();
            let built = builder.build(&pool, &self.fairness, &mut self.usage, &mut self.rng)?;
            if built.fallback {
                warn!(round, court, free = pool.len(), "too few free players, reusing players already on court");
            }

            self.fairness.record_played(&built.players);
            built.players.iter().for_each(|p| on_court[*p] = true);

            let game = Match {
                match_index: self.matches.len() + 1,
                round,
                court,
                players: built.players.map(|p| self.roster.id(p).clone()),
            };
            debug!(
                index = game.match_index,
                round,
                court,
                players = ?game.players,
                penalty = built.penalty,
                "match scheduled"
            );
            self.matches.push(game);
        }

        if self.fairness.no_double_rest() {
            let rested: Vec<Index> = self.order.iter().copied().filter(|p| !on_court[*p]).collect();
            if self.fairness.record_rested_round(&rested) {
                debug!(round, "every player has rested, rest cycle restarted");
            }
        }
        Ok(())
    }
}
