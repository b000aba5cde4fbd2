//! The game ledger: registration, purchases, accrual, and claims.
//!
//! [`GameLedger`] owns per-player state and calls out to a
//! [`CurrencyLedger`] and a [`CredentialLedger`]. Every mutating operation
//! runs in three steps:
//!
//! 1. **Checks** on a local copy of the caller's account.
//! 2. **Effects**: the updated account is written back.
//! 3. **Interactions**: funds move and credentials are minted.
//!
//! The whole sequence runs inside `GameLedger::transact`, which takes
//! checkpoints of both collaborators and a snapshot of the game's own
//! state. If any step fails, everything is restored and the error is
//! returned, so callers never observe a partial operation.
//!
//! Operations take `&mut self`, which rules out re-entrant calls from a
//! collaborator while an operation is in flight.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, error, warn};

use investor_ledger::{ConservationResult, CredentialLedger, CurrencyLedger, Revertible};
use investor_types::{
    Address, Amount, GameEvent, GameStats, PlayerAccount, PlayerJoinedDetails, PropertyHoldings,
    PropertyPurchasedDetails, PropertyType, RewardsClaimedDetails, Timestamp, TokenId,
};

use crate::accrual;
use crate::catalog::PropertyCatalog;
use crate::clock::Clock;
use crate::error::GameError;

// ---------------------------------------------------------------------------
// Rules and receipts
// ---------------------------------------------------------------------------

/// Parameters fixed when the game is deployed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRules {
    /// Property prices and yields.
    pub catalog: PropertyCatalog,
    /// Base units paid to each player on joining.
    pub welcome_grant: Amount,
}

/// Outcome of a successful [`GameLedger::join_game`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JoinReceipt {
    /// Welcome grant paid to the player.
    pub grant: Amount,
    /// Credential minted to the player.
    pub credential: TokenId,
    /// Registration time.
    pub joined_at: Timestamp,
}

/// Outcome of a successful [`GameLedger::buy_property`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PurchaseReceipt {
    /// Property type bought.
    pub property: PropertyType,
    /// Units bought.
    pub quantity: u64,
    /// Total price paid.
    pub cost: Amount,
    /// Units of `property` now held.
    pub holding: u64,
    /// Rewards settled by this purchase.
    pub settled: Amount,
    /// Banked rewards after settlement.
    pub banked: Amount,
}

// ---------------------------------------------------------------------------
// Game ledger
// ---------------------------------------------------------------------------

/// The idle-investor game state machine.
#[derive(Debug)]
pub struct GameLedger<C, N, K> {
    address: Address,
    currency: C,
    credentials: N,
    clock: K,
    rules: GameRules,
    accounts: BTreeMap<Address, PlayerAccount>,
    events: Vec<GameEvent>,
    stats: GameStats,
}

/// Everything [`GameLedger::transact`] needs to undo an operation.
struct Savepoint<CC, NC> {
    currency: CC,
    credentials: NC,
    account: Option<PlayerAccount>,
    events: usize,
    stats: GameStats,
}

impl<C, N, K> GameLedger<C, N, K>
where
    C: CurrencyLedger + Revertible,
    N: CredentialLedger + Revertible,
    K: Clock,
{
    /// Create a game at `address`.
    ///
    /// The game pays grants and claims from its own currency balance and
    /// must own the credential ledger to mint.
    pub fn new(address: Address, currency: C, credentials: N, clock: K, rules: GameRules) -> Self {
        if credentials.owner() != address {
            warn!(
                game = %address,
                owner = %credentials.owner(),
                "game does not own the credential ledger; registrations will fail"
            );
        }
        Self {
            address,
            currency,
            credentials,
            clock,
            rules,
            accounts: BTreeMap::new(),
            events: Vec::new(),
            stats: GameStats::default(),
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// The game's own address.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Deployment parameters.
    pub const fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// The currency ledger.
    pub const fn currency(&self) -> &C {
        &self.currency
    }

    /// Mutable access to the currency ledger, for calls players make on
    /// it directly such as `approve`.
    pub const fn currency_mut(&mut self) -> &mut C {
        &mut self.currency
    }

    /// The credential ledger.
    pub const fn credentials(&self) -> &N {
        &self.credentials
    }

    /// Committed events, oldest first.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Aggregate counters over committed operations.
    pub const fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// Every registered player, in address order.
    pub fn players(&self) -> impl Iterator<Item = Address> + '_ {
        self.accounts
            .iter()
            .filter(|(_, account)| account.joined)
            .map(|(player, _)| *player)
    }

    // -- Queries ------------------------------------------------------------

    /// Whether `player` has joined.
    pub fn has_joined(&self, player: Address) -> bool {
        self.accounts.get(&player).is_some_and(|a| a.joined)
    }

    /// Property counts held by `player`. All zero if never joined.
    pub fn get_player_properties(&self, player: Address) -> PropertyHoldings {
        self.accounts
            .get(&player)
            .map_or(PropertyHoldings::EMPTY, |a| a.holdings)
    }

    /// Full account state of `player`.
    pub fn player_account(&self, player: Address) -> PlayerAccount {
        self.accounts.get(&player).cloned().unwrap_or_default()
    }

    /// Rewards `player` could claim right now.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ArithmeticOverflow`] if the computation
    /// overflows.
    pub fn calculate_rewards(&self, player: Address) -> Result<Amount, GameError> {
        self.accounts.get(&player).map_or(Ok(0), |account| {
            accrual::pending_rewards(account, &self.rules.catalog, self.clock.now())
        })
    }

    /// Check that the currency ledger still reconciles.
    pub fn verify_conservation(&self) -> ConservationResult {
        self.currency.verify_conservation()
    }

    // -- Operations ---------------------------------------------------------

    /// Register `player`, pay the welcome grant, and mint a credential.
    ///
    /// # Errors
    ///
    /// - [`GameError::AlreadyRegistered`] if `player` has joined before.
    /// - [`GameError::TreasuryDepleted`] if the game cannot pay the grant.
    /// - [`GameError::CredentialIssue`] if the mint is refused.
    pub fn join_game(&mut self, player: Address) -> Result<JoinReceipt, GameError> {
        let now = self.clock.now();
        if self.has_joined(player) {
            return Err(GameError::AlreadyRegistered { player });
        }

        let mut account = PlayerAccount {
            joined: true,
            last_settled_at: now,
            joined_at: Some(now),
            ..PlayerAccount::unregistered()
        };
        let grant = self.rules.welcome_grant;
        let players = self
            .stats
            .total_players
            .checked_add(1)
            .ok_or(GameError::overflow("player count"))?;
        let grants_paid = self
            .stats
            .grants_paid
            .checked_add(grant)
            .ok_or(GameError::overflow("grants paid"))?;

        self.transact(player, "join_game", |game| {
            game.accounts.insert(player, account.clone());

            if grant > 0 {
                game.currency
                    .transfer(game.address, player, grant)
                    .map_err(|source| GameError::TreasuryDepleted {
                        amount: grant,
                        source,
                    })?;
            }
            let credential = game
                .credentials
                .mint(game.address, player)
                .map_err(|source| GameError::CredentialIssue { source })?;

            account.credential = Some(credential);
            game.accounts.insert(player, account);
            game.stats.total_players = players;
            game.stats.grants_paid = grants_paid;
            game.events.push(GameEvent::PlayerJoined(PlayerJoinedDetails {
                player,
                grant,
                credential,
                at: now,
            }));

            debug!(player = %player, grant, credential = %credential, "player joined");
            Ok(JoinReceipt {
                grant,
                credential,
                joined_at: now,
            })
        })
    }

    /// Buy `quantity` units of `property`, settling accrual first.
    ///
    /// The cost is pulled from `player` with the game as spender, so the
    /// player must have approved at least the cost.
    ///
    /// # Errors
    ///
    /// - [`GameError::NotRegistered`] if `player` has not joined.
    /// - [`GameError::InvalidQuantity`] if `quantity` is zero.
    /// - [`GameError::UnknownPropertyType`] if `property` is not for sale.
    /// - [`GameError::ArithmeticOverflow`] if the cost or a count overflows.
    /// - [`GameError::PaymentFailed`] if the balance or allowance is short.
    pub fn buy_property(
        &mut self,
        player: Address,
        property: PropertyType,
        quantity: u64,
    ) -> Result<PurchaseReceipt, GameError> {
        let now = self.clock.now();
        let mut account = self.registered(player)?.clone();
        if quantity == 0 {
            return Err(GameError::InvalidQuantity);
        }
        let cost = self.rules.catalog.cost_of(property, quantity)?;

        let settled = accrual::settle(&mut account, &self.rules.catalog, now)?;
        account.holdings = account
            .holdings
            .checked_add(property, quantity)
            .ok_or(GameError::overflow("property holdings"))?;
        let sold = self
            .stats
            .properties_sold
            .checked_add(property, quantity)
            .ok_or(GameError::overflow("properties sold"))?;
        let revenue = self
            .stats
            .purchase_revenue
            .checked_add(cost)
            .ok_or(GameError::overflow("purchase revenue"))?;

        let receipt = PurchaseReceipt {
            property,
            quantity,
            cost,
            holding: account.holdings.count(property),
            settled,
            banked: account.banked_rewards,
        };

        self.transact(player, "buy_property", |game| {
            game.accounts.insert(player, account);

            game.currency
                .transfer_from(game.address, player, game.address, cost)
                .map_err(|source| GameError::PaymentFailed { cost, source })?;

            game.stats.properties_sold = sold;
            game.stats.purchase_revenue = revenue;
            game.events
                .push(GameEvent::PropertyPurchased(PropertyPurchasedDetails {
                    player,
                    property,
                    quantity,
                    cost,
                    settled,
                    at: now,
                }));

            debug!(
                player = %player,
                property_type = %property,
                quantity,
                amount = cost,
                settled,
                "property purchased"
            );
            Ok(receipt)
        })
    }

    /// [`buy_property`](Self::buy_property) addressed by wire tag.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownPropertyType`] for an unknown tag, and
    /// otherwise the errors of [`buy_property`](Self::buy_property).
    pub fn buy_property_tag(
        &mut self,
        player: Address,
        tag: u8,
        quantity: u64,
    ) -> Result<PurchaseReceipt, GameError> {
        let property =
            PropertyType::from_tag(tag).ok_or(GameError::UnknownPropertyType { tag })?;
        self.buy_property(player, property, quantity)
    }

    /// Pay out everything `player` has accrued and reset the cursor.
    ///
    /// Returns the amount paid. Accrual below one base unit stays on the
    /// account. A claim of zero changes nothing, including the cursor.
    ///
    /// # Errors
    ///
    /// - [`GameError::NotRegistered`] if `player` has not joined.
    /// - [`GameError::ArithmeticOverflow`] if accrual overflows.
    /// - [`GameError::TreasuryDepleted`] if the game cannot pay.
    pub fn claim_rewards(&mut self, player: Address) -> Result<Amount, GameError> {
        let now = self.clock.now();
        let mut account = self.registered(player)?.clone();
        accrual::settle(&mut account, &self.rules.catalog, now)?;
        let amount = account.banked_rewards;
        if amount == 0 {
            debug!(player = %player, "nothing to claim");
            return Ok(0);
        }

        account.banked_rewards = 0;
        account.total_claimed = account
            .total_claimed
            .checked_add(amount)
            .ok_or(GameError::overflow("total claimed"))?;
        let rewards_paid = self
            .stats
            .rewards_paid
            .checked_add(amount)
            .ok_or(GameError::overflow("rewards paid"))?;
        let claims = self
            .stats
            .claims
            .checked_add(1)
            .ok_or(GameError::overflow("claim count"))?;

        self.transact(player, "claim_rewards", |game| {
            game.accounts.insert(player, account);

            game.currency
                .transfer(game.address, player, amount)
                .map_err(|source| GameError::TreasuryDepleted { amount, source })?;

            game.stats.rewards_paid = rewards_paid;
            game.stats.claims = claims;
            game.events.push(GameEvent::RewardsClaimed(RewardsClaimedDetails {
                player,
                amount,
                at: now,
            }));

            debug!(player = %player, amount, "rewards claimed");
            Ok(amount)
        })
    }

    // -- Internals ----------------------------------------------------------

    fn registered(&self, player: Address) -> Result<&PlayerAccount, GameError> {
        self.accounts
            .get(&player)
            .filter(|a| a.joined)
            .ok_or(GameError::NotRegistered { player })
    }

    /// Run `body` as a single all-or-nothing operation on behalf of `player`.
    fn transact<T>(
        &mut self,
        player: Address,
        operation: &'static str,
        body: impl FnOnce(&mut Self) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let savepoint = Savepoint {
            currency: self.currency.checkpoint(),
            credentials: self.credentials.checkpoint(),
            account: self.accounts.get(&player).cloned(),
            events: self.events.len(),
            stats: self.stats,
        };

        match body(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                if let Err(rollback) = self.restore(player, operation, savepoint) {
                    error!(
                        player = %player,
                        operation,
                        error = %err,
                        rollback_error = %rollback,
                        "rollback failed, game state may be inconsistent"
                    );
                    return Err(rollback);
                }
                warn!(player = %player, operation, error = %err, "operation rolled back");
                Err(err)
            }
        }
    }

    fn restore(
        &mut self,
        player: Address,
        operation: &'static str,
        savepoint: Savepoint<C::Checkpoint, N::Checkpoint>,
    ) -> Result<(), GameError> {
        self.currency
            .revert_to(savepoint.currency)
            .map_err(|source| GameError::Rollback { operation, source })?;
        self.credentials
            .revert_to(savepoint.credentials)
            .map_err(|source| GameError::Rollback { operation, source })?;

        match savepoint.account {
            Some(account) => {
                self.accounts.insert(player, account);
            }
            None => {
                self.accounts.remove(&player);
            }
        }
        self.events.truncate(savepoint.events);
        self.stats = savepoint.stats;
        Ok(())
    }
}
