//! One-shot deployment of the currency, the credential registry, and the
//! game.
//!
//! # Sequence
//!
//! 1. Validate the configuration and build the game rules
//! 2. Mint the entire currency supply to the deployer
//! 3. Create the credential registry, owned by the deployer
//! 4. Allocate the game address and move the whole supply to it
//! 5. Hand credential ownership to the game
//! 6. Construct the [`GameLedger`]
//!
//! After step 5 the deployer holds nothing and can mint nothing; the game
//! is the only source of grants, rewards, and credentials.

use tracing::info;

use investor_ledger::{
    CredentialLedger, CredentialRegistry, CurrencyLedger, LedgerError, TokenLedger,
};
use investor_types::Address;

use crate::clock::Clock;
use crate::config::{ConfigError, GameConfig};
use crate::game::GameLedger;

/// Errors that can occur during deployment.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The configuration is invalid.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// A collaborator rejected a deployment step.
    #[error("deployment step '{step}' failed: {source}")]
    Ledger {
        /// The step that failed.
        step: &'static str,
        /// The ledger's reason.
        source: LedgerError,
    },
}

/// The game ledger type produced by [`deploy`].
pub type DeployedGame<K> = GameLedger<TokenLedger, CredentialRegistry, K>;

/// A freshly deployed game.
#[derive(Debug)]
pub struct Deployment<K> {
    /// The game, holding the whole currency supply.
    pub game: DeployedGame<K>,
    /// The account that performed the deployment.
    pub deployer: Address,
}

/// Deploy a game from `config` on behalf of `deployer`.
///
/// # Errors
///
/// Returns [`BootstrapError::Config`] if the configuration fails
/// validation, or [`BootstrapError::Ledger`] if a collaborator rejects a
/// step.
pub fn deploy<K: Clock>(
    config: &GameConfig,
    deployer: Address,
    clock: K,
) -> Result<Deployment<K>, BootstrapError> {
    config.validate()?;
    let rules = config.rules()?;
    let supply = config.initial_supply()?;

    let mut currency = TokenLedger::with_genesis(config.currency_metadata(), deployer, supply)
        .map_err(|source| BootstrapError::Ledger {
            step: "currency genesis",
            source,
        })?;
    let mut credentials = CredentialRegistry::new(config.credential_metadata(), deployer);

    let game_address = Address::new();
    currency
        .transfer(deployer, game_address, supply)
        .map_err(|source| BootstrapError::Ledger {
            step: "supply transfer",
            source,
        })?;
    credentials
        .transfer_ownership(deployer, game_address)
        .map_err(|source| BootstrapError::Ledger {
            step: "credential ownership transfer",
            source,
        })?;

    info!(
        currency = config.currency.symbol,
        credential = config.credential.symbol,
        game = %game_address,
        deployer = %deployer,
        supply,
        welcome_grant = rules.welcome_grant,
        rate_period_secs = rules.catalog.rate_period_secs(),
        "Deployment complete"
    );

    Ok(Deployment {
        game: GameLedger::new(game_address, currency, credentials, clock, rules),
        deployer,
    })
}
