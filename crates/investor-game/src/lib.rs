//! Game ledger core for Idle Investor.
//!
//! Players join once, buy properties with the game currency, accrue
//! rewards over time in proportion to what they hold, and claim those
//! rewards back into their balance. Each player also receives a one-off
//! credential token on joining.
//!
//! # Modules
//!
//! - [`game`] -- [`GameLedger`]: registration, purchases, claims, queries.
//! - [`accrual`] -- Pure reward computation and settlement.
//! - [`catalog`] -- [`PropertyCatalog`] of per-type cost and yield.
//! - [`clock`] -- [`Clock`] trait, [`SystemClock`], [`ManualClock`].
//! - [`config`] -- Loading `investor-config.yaml` into [`GameConfig`].
//! - [`bootstrap`] -- [`deploy`]: wire the collaborators and the game.
//! - [`error`] -- [`GameError`].

pub mod accrual;
pub mod bootstrap;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod game;

pub use bootstrap::{BootstrapError, DeployedGame, Deployment, deploy};
pub use catalog::{CatalogError, PropertyCatalog, PropertyTerms};
pub use clock::{Clock, ClockError, ManualClock, SystemClock};
pub use config::{ConfigError, GameConfig};
pub use error::GameError;
pub use game::{GameLedger, GameRules, JoinReceipt, PurchaseReceipt};
