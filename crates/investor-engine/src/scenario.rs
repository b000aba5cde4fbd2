//! Seeded player activity against a deployed game.
//!
//! The scenario registers a fixed number of players, has each approve the
//! game for unlimited spending, then advances a [`ManualClock`] one rate
//! period per simulated day. Every day each player may buy one affordable
//! property and may claim, with the configured probabilities. The currency
//! ledger is audited after every day, and its journal is replayed once
//! at the end; an anomaly aborts the run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info, warn};

use investor_game::{DeployedGame, GameError, ManualClock};
use investor_ledger::{ConservationResult, CredentialLedger, CurrencyLedger};
use investor_types::{Address, Amount, GameStats, PropertyHoldings, PropertyType, to_display};

use crate::error::EngineError;

// -----------------------------------------------------------------------
// Configuration
// -----------------------------------------------------------------------

/// Configuration for the simulated run, loaded from the `simulation`
/// section of `investor-config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioConfig {
    /// Number of players to register.
    #[serde(default = "default_players")]
    pub players: u32,

    /// Number of rate periods to simulate.
    #[serde(default = "default_days")]
    pub days: u32,

    /// Seed for the activity generator.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Chance per player per day of claiming.
    #[serde(default = "default_claim_probability")]
    pub claim_probability: f64,

    /// Chance per player per day of buying one property.
    #[serde(default = "default_purchase_probability")]
    pub purchase_probability: f64,
}

impl ScenarioConfig {
    /// Reject probabilities outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (name, value) in [
            ("claim_probability", self.claim_probability),
            ("purchase_probability", self.purchase_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::Scenario {
                    message: format!("{name} must be within [0, 1], got {value}"),
                });
            }
        }
        Ok(())
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            players: default_players(),
            days: default_days(),
            seed: default_seed(),
            claim_probability: default_claim_probability(),
            purchase_probability: default_purchase_probability(),
        }
    }
}

const fn default_players() -> u32 {
    8
}

const fn default_days() -> u32 {
    30
}

const fn default_seed() -> u64 {
    42
}

const fn default_claim_probability() -> f64 {
    0.5
}

const fn default_purchase_probability() -> f64 {
    0.4
}

// -----------------------------------------------------------------------
// Report
// -----------------------------------------------------------------------

/// Final state of one simulated player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSummary {
    /// The player.
    pub player: Address,
    /// Currency balance at the end of the run.
    pub balance: Amount,
    /// Properties held at the end of the run.
    pub holdings: PropertyHoldings,
    /// Lifetime rewards claimed.
    pub total_claimed: Amount,
    /// Journal entries that moved this player's currency.
    pub movements: usize,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    /// Days simulated.
    pub days: u32,
    /// Claims that paid out nothing.
    pub empty_claims: u64,
    /// Claims refused because the treasury ran dry.
    pub refused_claims: u64,
    /// Per-player end state, in registration order.
    pub players: Vec<PlayerSummary>,
    /// The game's aggregate counters.
    pub stats: GameStats,
    /// Currency left in the game's treasury.
    pub treasury: Amount,
}

// -----------------------------------------------------------------------
// Run
// -----------------------------------------------------------------------

/// Drive `game` through the configured scenario.
///
/// `clock` must be a handle on the same [`ManualClock`] the game reads.
pub fn run(
    game: &mut DeployedGame<ManualClock>,
    clock: &ManualClock,
    config: &ScenarioConfig,
) -> Result<ScenarioReport, EngineError> {
    config.validate()?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let spender = game.address();

    let mut players = Vec::new();
    for _ in 0..config.players {
        let player = Address::new();
        game.join_game(player)?;
        game.currency_mut()
            .approve(player, spender, Amount::MAX)
            .map_err(|e| EngineError::Scenario {
                message: format!("approval failed for {player}: {e}"),
            })?;
        players.push(player);
    }
    info!(players = players.len(), "Players registered");

    let period = game.rules().catalog.rate_period_secs();
    let mut empty_claims: u64 = 0;
    let mut refused_claims: u64 = 0;

    for day in 1..=config.days {
        clock.advance(period)?;

        for player in &players {
            if rng.random_bool(config.purchase_probability) {
                buy_affordable(game, *player, &mut rng)?;
            }
            if rng.random_bool(config.claim_probability) {
                match game.claim_rewards(*player) {
                    Ok(0) => empty_claims = empty_claims.saturating_add(1),
                    Ok(_) => {}
                    Err(GameError::TreasuryDepleted { amount, .. }) => {
                        warn!(player = %player, amount, "treasury cannot cover claim");
                        refused_claims = refused_claims.saturating_add(1);
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        }

        if let ConservationResult::Anomaly(anomaly) = game.verify_conservation() {
            return Err(EngineError::Conservation {
                day,
                message: anomaly.message,
            });
        }
        debug!(
            day,
            claims = game.stats().claims,
            purchase_revenue = game.stats().purchase_revenue,
            "Day complete"
        );
    }

    if let ConservationResult::Anomaly(anomaly) = game.currency().verify_conservation_strict() {
        return Err(EngineError::Conservation {
            day: config.days,
            message: anomaly.message,
        });
    }

    let summaries = players
        .iter()
        .map(|player| {
            let account = game.player_account(*player);
            PlayerSummary {
                player: *player,
                balance: game.currency().balance_of(*player),
                holdings: account.holdings,
                total_claimed: account.total_claimed,
                movements: game.currency().entries_for(*player).len(),
            }
        })
        .collect();

    Ok(ScenarioReport {
        days: config.days,
        empty_claims,
        refused_claims,
        players: summaries,
        stats: *game.stats(),
        treasury: game.currency().balance_of(game.address()),
    })
}

/// Buy one unit of a randomly chosen property the player can afford.
fn buy_affordable(
    game: &mut DeployedGame<ManualClock>,
    player: Address,
    rng: &mut impl Rng,
) -> Result<(), EngineError> {
    let balance = game.currency().balance_of(player);
    let affordable: Vec<PropertyType> = game
        .rules()
        .catalog
        .iter()
        .filter(|(_, terms)| terms.unit_cost <= balance)
        .map(|(property, _)| property)
        .collect();
    if affordable.is_empty() {
        return Ok(());
    }

    let idx = rng.random_range(0..affordable.len());
    if let Some(property) = affordable.get(idx) {
        game.buy_property(player, *property, 1)?;
    }
    Ok(())
}

/// Log the end-of-run summary, rendering amounts in whole tokens.
pub fn log_report(report: &ScenarioReport, game: &DeployedGame<ManualClock>) {
    let decimals = game.currency().metadata().decimals;
    let whole = |amount: Amount| to_display(amount, decimals).unwrap_or(Decimal::MAX);
    let holders = game
        .currency()
        .holders()
        .filter(|(_, balance)| *balance > 0)
        .count();

    info!(
        days = report.days,
        players = report.players.len(),
        credentials = game.credentials().total_minted(),
        holders,
        claims = report.stats.claims,
        empty_claims = report.empty_claims,
        refused_claims = report.refused_claims,
        purchase_revenue = %whole(report.stats.purchase_revenue),
        rewards_paid = %whole(report.stats.rewards_paid),
        grants_paid = %whole(report.stats.grants_paid),
        treasury = %whole(report.treasury),
        "Simulation complete"
    );

    for summary in &report.players {
        info!(
            player = %summary.player,
            balance = %whole(summary.balance),
            claimed = %whole(summary.total_claimed),
            movements = summary.movements,
            basic = summary.holdings.basic,
            medium = summary.holdings.medium,
            premium = summary.holdings.premium,
            "Player summary"
        );
    }
}
