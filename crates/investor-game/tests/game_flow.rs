//! End-to-end tests for the game ledger.
//!
//! Each test deploys a fresh game through [`investor_game::deploy`] with a
//! zero-decimal currency so amounts read as whole tokens, then drives it
//! with a [`ManualClock`] handle.

#![allow(clippy::unwrap_used)]
#![allow(clippy::arithmetic_side_effects)]

use investor_game::{
    DeployedGame, GameConfig, GameError, ManualClock, PurchaseReceipt, deploy,
};
use investor_ledger::{CredentialLedger, CurrencyLedger, LedgerError};
use investor_types::{Address, Amount, GameEvent, PropertyHoldings, PropertyType};

const DAY: u64 = 86_400;
const START: u64 = 1_700_000_000;

struct World {
    game: DeployedGame<ManualClock>,
    clock: ManualClock,
    deployer: Address,
}

fn world() -> World {
    let yaml = r"
currency:
  decimals: 0
  initial_supply: 1000000
game:
  welcome_grant: 100
  rate_period_secs: 86400
properties:
  basic: { unit_cost: 50, yield_rate: 1 }
  medium: { unit_cost: 200, yield_rate: 5 }
  premium: { unit_cost: 1000, yield_rate: 30 }
";
    let config = GameConfig::parse(yaml).unwrap();
    let clock = ManualClock::new(START);
    let deployer = Address::new();
    let deployment = deploy(&config, deployer, clock.clone()).unwrap();
    World {
        game: deployment.game,
        clock,
        deployer,
    }
}

impl World {
    fn balance(&self, holder: Address) -> Amount {
        self.game.currency().balance_of(holder)
    }

    fn approve(&mut self, player: Address, amount: Amount) {
        let spender = self.game.address();
        self.game
            .currency_mut()
            .approve(player, spender, amount)
            .unwrap();
    }

    fn fund(&mut self, player: Address, amount: Amount) {
        let treasury = self.game.address();
        self.game
            .currency_mut()
            .transfer(treasury, player, amount)
            .unwrap();
    }

    fn joined_player(&mut self) -> Address {
        let player = Address::new();
        self.game.join_game(player).unwrap();
        self.approve(player, 1_000_000);
        player
    }

    fn total_balance(&self, holders: &[Address]) -> Amount {
        holders.iter().map(|h| self.balance(*h)).sum()
    }
}

#[test]
fn example_scenario_from_join_to_claim() {
    let mut w = world();
    let player = Address::new();

    let receipt = w.game.join_game(player).unwrap();
    assert_eq!(receipt.grant, 100);
    assert_eq!(w.balance(player), 100);
    assert_eq!(w.game.credentials().balance_of(player), 1);
    assert!(w.game.has_joined(player));

    w.approve(player, 1_000);
    w.game.buy_property(player, PropertyType::Basic, 1).unwrap();
    assert_eq!(w.balance(player), 50);
    assert_eq!(w.game.get_player_properties(player).basic, 1);

    w.clock.advance(DAY).unwrap();
    assert_eq!(w.game.calculate_rewards(player).unwrap(), 1);

    assert_eq!(w.game.claim_rewards(player).unwrap(), 1);
    assert_eq!(w.balance(player), 51);
    assert_eq!(w.game.calculate_rewards(player).unwrap(), 0);
}

#[test]
fn second_join_is_rejected_without_side_effects() {
    let mut w = world();
    let player = Address::new();
    w.game.join_game(player).unwrap();

    let treasury = w.balance(w.game.address());
    let result = w.game.join_game(player);

    assert!(matches!(result, Err(GameError::AlreadyRegistered { .. })));
    assert_eq!(w.balance(player), 100);
    assert_eq!(w.balance(w.game.address()), treasury);
    assert_eq!(w.game.credentials().balance_of(player), 1);
    assert_eq!(w.game.credentials().total_minted(), 1);
    assert_eq!(w.game.stats().total_players, 1);
}

#[test]
fn unregistered_player_cannot_buy_or_claim() {
    let mut w = world();
    let stranger = Address::new();

    assert!(!w.game.has_joined(stranger));
    assert!(matches!(
        w.game.buy_property(stranger, PropertyType::Basic, 1),
        Err(GameError::NotRegistered { .. })
    ));
    assert!(matches!(
        w.game.claim_rewards(stranger),
        Err(GameError::NotRegistered { .. })
    ));
    assert_eq!(w.game.calculate_rewards(stranger).unwrap(), 0);
    assert_eq!(w.game.get_player_properties(stranger), PropertyHoldings::EMPTY);
}

#[test]
fn settlement_happens_before_holdings_change() {
    let mut w = world();
    let player = w.joined_player();
    w.fund(player, 10_000);

    // Hold n = 2 medium from t0.
    w.game.buy_property(player, PropertyType::Medium, 2).unwrap();

    // At t1 = t0 + 3 days, buy m = 3 more.
    w.clock.advance(3 * DAY).unwrap();
    let receipt = w.game.buy_property(player, PropertyType::Medium, 3).unwrap();
    assert_eq!(receipt.settled, 2 * 5 * 3);
    assert_eq!(receipt.holding, 5);

    // At t2 = t1 + 2 days: n*r*(t1-t0) + (n+m)*r*(t2-t1).
    w.clock.advance(2 * DAY).unwrap();
    let expected = 2 * 5 * 3 + 5 * 5 * 2;
    assert_eq!(w.game.calculate_rewards(player).unwrap(), expected);
}

#[test]
fn settlement_keeps_partial_periods() {
    let mut w = world();
    let player = w.joined_player();

    // Half a day on one basic, then three quarters of a day on two.
    w.game.buy_property(player, PropertyType::Basic, 1).unwrap();
    w.clock.advance(DAY / 2).unwrap();
    let receipt = w.game.buy_property(player, PropertyType::Basic, 1).unwrap();
    assert_eq!(receipt.settled, 0);

    w.clock.advance(3 * DAY / 4).unwrap();
    assert_eq!(w.game.calculate_rewards(player).unwrap(), 2);
    assert_eq!(w.game.claim_rewards(player).unwrap(), 2);
}

#[test]
fn overflowing_purchase_changes_nothing() {
    let clock = ManualClock::new(START);
    let mut game = deploy(&GameConfig::default(), Address::new(), clock).unwrap().game;
    let player = Address::new();
    game.join_game(player).unwrap();
    let spender = game.address();
    game.currency_mut()
        .approve(player, spender, Amount::MAX)
        .unwrap();

    let account = game.player_account(player);
    let balance = game.currency().balance_of(player);
    let treasury = game.currency().balance_of(spender);
    let events = game.events().len();
    let stats = *game.stats();

    let result = game.buy_property(player, PropertyType::Premium, u64::MAX);

    assert!(matches!(result, Err(GameError::ArithmeticOverflow { .. })));
    assert_eq!(game.player_account(player), account);
    assert_eq!(game.currency().balance_of(player), balance);
    assert_eq!(game.currency().balance_of(spender), treasury);
    assert_eq!(game.events().len(), events);
    assert_eq!(*game.stats(), stats);
}

#[test]
fn mixed_holdings_accrue_per_type() {
    let mut w = world();
    let player = w.joined_player();
    w.fund(player, 5_000);

    w.game.buy_property(player, PropertyType::Basic, 4).unwrap();
    w.game.buy_property(player, PropertyType::Medium, 2).unwrap();
    w.game.buy_property_tag(player, 2, 1).unwrap();
    assert_eq!(
        w.game.get_player_properties(player),
        PropertyHoldings {
            basic: 4,
            medium: 2,
            premium: 1,
        }
    );

    w.clock.advance(10 * DAY).unwrap();
    assert_eq!(
        w.game.calculate_rewards(player).unwrap(),
        (4 + 2 * 5 + 30) * 10
    );
}

#[test]
fn claim_resets_accrual() {
    let mut w = world();
    let player = w.joined_player();
    w.game.buy_property(player, PropertyType::Basic, 2).unwrap();

    w.clock.advance(5 * DAY).unwrap();
    assert_eq!(w.game.claim_rewards(player).unwrap(), 10);
    assert_eq!(w.game.calculate_rewards(player).unwrap(), 0);

    // A second claim at the same instant pays nothing.
    let before = w.balance(player);
    assert_eq!(w.game.claim_rewards(player).unwrap(), 0);
    assert_eq!(w.balance(player), before);

    w.clock.advance(DAY).unwrap();
    assert_eq!(w.game.calculate_rewards(player).unwrap(), 2);
    assert_eq!(w.game.player_account(player).total_claimed, 10);
}

#[test]
fn zero_holdings_claim_is_a_no_op() {
    let mut w = world();
    let player = w.joined_player();
    w.clock.advance(30 * DAY).unwrap();

    let account = w.game.player_account(player);
    let events = w.game.events().len();

    assert_eq!(w.game.calculate_rewards(player).unwrap(), 0);
    assert_eq!(w.game.claim_rewards(player).unwrap(), 0);
    assert_eq!(w.game.player_account(player), account);
    assert_eq!(w.game.events().len(), events);
    assert_eq!(w.balance(player), 100);
}

#[test]
fn purchase_without_allowance_fails_cleanly() {
    let mut w = world();
    let player = Address::new();
    w.game.join_game(player).unwrap();
    w.clock.advance(DAY).unwrap();

    let account = w.game.player_account(player);
    let result = w.game.buy_property(player, PropertyType::Basic, 1);

    assert!(matches!(
        result,
        Err(GameError::PaymentFailed {
            cost: 50,
            source: LedgerError::InsufficientAllowance { .. },
        })
    ));
    assert_eq!(w.game.player_account(player), account);
    assert_eq!(w.balance(player), 100);
}

#[test]
fn purchase_without_balance_fails_cleanly() {
    let mut w = world();
    let player = w.joined_player();
    w.game.buy_property(player, PropertyType::Basic, 1).unwrap();
    w.clock.advance(4 * DAY).unwrap();

    let account = w.game.player_account(player);
    let treasury = w.balance(w.game.address());
    let result = w.game.buy_property(player, PropertyType::Premium, 1);

    assert!(matches!(
        result,
        Err(GameError::PaymentFailed {
            cost: 1_000,
            source: LedgerError::InsufficientBalance { .. },
        })
    ));
    // Holdings, cursor, and banked rewards are untouched.
    assert_eq!(w.game.player_account(player), account);
    assert_eq!(w.game.calculate_rewards(player).unwrap(), 4);
    assert_eq!(w.balance(player), 50);
    assert_eq!(w.balance(w.game.address()), treasury);
}

#[test]
fn invalid_purchases_are_rejected() {
    let mut w = world();
    let player = w.joined_player();

    assert!(matches!(
        w.game.buy_property(player, PropertyType::Basic, 0),
        Err(GameError::InvalidQuantity)
    ));
    assert!(matches!(
        w.game.buy_property_tag(player, 3, 1),
        Err(GameError::UnknownPropertyType { tag: 3 })
    ));
    assert!(matches!(
        w.game.buy_property(player, PropertyType::Premium, u64::MAX),
        Err(GameError::PaymentFailed { .. })
    ));
    assert!(w.game.get_player_properties(player).is_empty());
}

#[test]
fn currency_is_conserved_across_operations() {
    let mut w = world();
    let players: Vec<Address> = (0..4).map(|_| w.joined_player()).collect();
    let supply = w.game.currency().total_supply();

    for (i, player) in players.iter().enumerate() {
        let quantity = u64::try_from(i % 2).unwrap() + 1;
        w.game
            .buy_property(*player, PropertyType::Basic, quantity)
            .unwrap();
    }
    // A failing purchase in the middle of the sequence.
    let first = players.first().copied().unwrap();
    assert!(w.game.buy_property(first, PropertyType::Premium, 1).is_err());

    for day in 1..=7_u64 {
        w.clock.advance(DAY).unwrap();
        for player in players.iter().skip(usize::try_from(day % 2).unwrap()) {
            w.game.claim_rewards(*player).unwrap();
        }

        let mut holders = players.clone();
        holders.push(w.game.address());
        holders.push(w.deployer);
        assert_eq!(w.total_balance(&holders), supply);
        assert!(w.game.verify_conservation().is_balanced());
    }
}

#[test]
fn events_and_stats_track_committed_operations() {
    let mut w = world();
    let player = w.joined_player();
    let receipt: PurchaseReceipt = w.game.buy_property(player, PropertyType::Basic, 1).unwrap();
    w.clock.advance(2 * DAY).unwrap();
    w.game.claim_rewards(player).unwrap();
    let _ = w.game.buy_property(player, PropertyType::Premium, 1);

    let kinds: Vec<&str> = w
        .game
        .events()
        .iter()
        .map(|e| match e {
            GameEvent::PlayerJoined(_) => "joined",
            GameEvent::PropertyPurchased(_) => "purchased",
            GameEvent::RewardsClaimed(_) => "claimed",
        })
        .collect();
    assert_eq!(kinds, vec!["joined", "purchased", "claimed"]);
    assert!(w.game.events().iter().all(|e| e.player() == player));

    let stats = w.game.stats();
    assert_eq!(stats.total_players, 1);
    assert_eq!(stats.properties_sold.basic, 1);
    assert_eq!(stats.purchase_revenue, receipt.cost);
    assert_eq!(stats.grants_paid, 100);
    assert_eq!(stats.rewards_paid, 2);
    assert_eq!(stats.claims, 1);
}

#[test]
fn credential_uri_uses_configured_base() {
    let mut w = world();
    let player = Address::new();
    let receipt = w.game.join_game(player).unwrap();

    let uri = w.game.credentials().token_uri(receipt.credential).unwrap();
    assert!(uri.ends_with(&format!("/{}", receipt.credential)));
    assert_eq!(w.game.credentials().owner_of(receipt.credential), Some(player));
}

#[test]
fn receipts_serialize_for_clients() {
    let mut w = world();
    let player = w.joined_player();
    let joined = serde_json::to_value(w.game.join_game(Address::new()).unwrap()).unwrap();
    assert_eq!(joined["grant"], 100);
    assert_eq!(joined["credential"], 1);

    let bought = w.game.buy_property(player, PropertyType::Basic, 2).unwrap();
    let json = serde_json::to_value(bought).unwrap();
    assert_eq!(json["property"], "Basic");
    assert_eq!(json["cost"], 100);
}
