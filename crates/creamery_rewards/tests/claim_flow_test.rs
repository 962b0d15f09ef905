//! Integration tests for the daily claim flow: admin-only configuration,
//! the two-type reward table and the one-day cooldown.

use std::sync::Arc;
use std::thread;

use alloy_primitives::{Address, U256};
use creamery_rewards::{
    encode_reward_data, ItemFactory, ItemLedger, Rarity, RarityThresholds, RewardError,
    RewardKind, RewardRange, RewardTypePolicy, SeededEntropy,
};
use creamery_shared::{AccessControl, Role, RoleRegistry};
use creamery_token::{MilkToken, TokenConfig};

const DAY: u64 = 24 * 60 * 60;
const T0: u64 = 1_700_000_000;

/// `[type][rarity] = (min, max, ids)`
const REWARDS: [[(u64, u64, &[u64]); 5]; 2] = [
    [
        (50, 75, &[1]),
        (125, 200, &[1, 2, 3]),
        (300, 400, &[1, 2, 5]),
        (500, 700, &[1, 2, 6]),
        (800, 900, &[1, 8]),
    ],
    [
        (1, 2, &[1, 2]),
        (3, 5, &[1, 2, 3]),
        (7, 9, &[1, 2, 3]),
        (10, 11, &[1, 2, 3]),
        (13, 15, &[1, 2, 3]),
    ],
];

struct Fixture {
    factory: ItemFactory<ItemLedger>,
    factory_roles: Arc<RoleRegistry>,
    deployer: Address,
    admin: Address,
    user: Address,
}

fn range(min: u64, max: u64, ids: &[u64]) -> RewardRange {
    RewardRange::new(
        U256::from(min),
        U256::from(max),
        ids.iter().copied().map(U256::from).collect(),
    )
    .unwrap()
}

fn thresholds() -> RarityThresholds {
    RarityThresholds::new(50, 70, 80, 90, 100, 150).unwrap()
}

fn deploy() -> Fixture {
    let deployer = Address::repeat_byte(0xD0);
    let factory_address = Address::repeat_byte(0xF0);

    let token_roles = Arc::new(RoleRegistry::new(deployer));
    let token = Arc::new(MilkToken::new(
        Address::repeat_byte(0x11),
        &TokenConfig::new("MilkReward", "MLK"),
        token_roles.clone(),
    ));
    let factory_roles = Arc::new(RoleRegistry::new(deployer));
    let factory = ItemFactory::new(
        factory_address,
        "oursite/{id}.json",
        token,
        factory_roles.clone(),
        Arc::new(ItemLedger::new()),
    );
    token_roles
        .grant_role(deployer, Role::contract(), factory_address)
        .unwrap();

    Fixture {
        factory,
        factory_roles,
        deployer,
        admin: Address::repeat_byte(0xAD),
        user: Address::repeat_byte(0x05),
    }
}

/// Grants ADMIN and loads the full table plus the rolls.
fn configured() -> Fixture {
    let f = deploy();
    f.factory_roles
        .grant_role(f.deployer, Role::admin(), f.admin)
        .unwrap();
    for (reward_type, row) in (0u32..).zip(REWARDS.iter()) {
        for (rarity, (min, max, ids)) in Rarity::ALL.into_iter().zip(row.iter()) {
            let data = encode_reward_data(&range(*min, *max, ids));
            f.factory
                .set_reward_encoded(f.admin, reward_type, rarity, &data)
                .unwrap();
        }
    }
    f.factory.set_rarity_rolls(f.admin, thresholds()).unwrap();
    f
}

fn missing_role_message(account: Address, role: Role) -> String {
    format!("AccessControl: account {account:#x} is missing role {role}")
}

#[test]
fn test_only_deployer_has_default_admin() {
    let f = deploy();
    assert!(f.factory_roles.has_role(Role::DEFAULT_ADMIN, f.deployer));
    assert!(!f.factory_roles.has_role(Role::DEFAULT_ADMIN, f.user));
}

#[test]
fn test_only_admin_can_set_rarity_rolls() {
    let f = deploy();

    let err = f
        .factory
        .set_rarity_rolls(f.admin, thresholds())
        .unwrap_err();
    assert!(matches!(err, RewardError::Unauthorized(_)));
    assert_eq!(err.to_string(), missing_role_message(f.admin, Role::admin()));
    assert_eq!(f.factory.rarity_rolls(), None);

    f.factory_roles
        .grant_role(f.deployer, Role::admin(), f.admin)
        .unwrap();
    f.factory.set_rarity_rolls(f.admin, thresholds()).unwrap();

    let rolls = f.factory.rarity_rolls().unwrap();
    assert_eq!(rolls.common(), 50);
    assert_eq!(rolls.uncommon(), 70);
    assert_eq!(rolls.rare(), 80);
    assert_eq!(rolls.epic(), 90);
    assert_eq!(rolls.legendary(), 100);
    assert_eq!(rolls.max_roll(), 150);
}

#[test]
fn test_only_admin_can_set_reward() {
    let f = deploy();
    let data = encode_reward_data(&range(10, 20, &[1, 2, 3, 4, 5]));

    let err = f
        .factory
        .set_reward_encoded(f.admin, 1, Rarity::Rare, &data)
        .unwrap_err();
    assert_eq!(err.to_string(), missing_role_message(f.admin, Role::admin()));
    assert!(f.factory.reward(1, Rarity::Rare).is_err());
}

#[test]
fn test_only_admin_can_set_typed_reward_and_policy() {
    let f = deploy();

    let err = f
        .factory
        .set_reward(f.user, 0, Rarity::Epic, range(1, 2, &[7]))
        .unwrap_err();
    assert_eq!(err.to_string(), missing_role_message(f.user, Role::admin()));
    assert!(f.factory.reward(0, Rarity::Epic).is_err());

    let before = f.factory.reward_type_policy();
    let err = f
        .factory
        .set_reward_type_policy(f.user, RewardTypePolicy::Fixed { reward_type: 1 })
        .unwrap_err();
    assert_eq!(err.to_string(), missing_role_message(f.user, Role::admin()));
    assert_eq!(f.factory.reward_type_policy(), before);
    assert!(f.factory.drain_events().is_empty());
}

#[test]
fn test_table_is_stored_as_configured() {
    let f = configured();
    for (reward_type, row) in (0u32..).zip(REWARDS.iter()) {
        for (rarity, (min, max, ids)) in Rarity::ALL.into_iter().zip(row.iter()) {
            assert_eq!(
                f.factory.reward(reward_type, rarity).unwrap(),
                range(*min, *max, ids)
            );
        }
    }
}

#[test]
fn test_cannot_claim_twice_in_a_single_day() {
    let f = configured();
    let entropy = U256::from(100u64);
    let first = f.factory.claim(f.user, entropy, T0).unwrap();

    let err = f
        .factory
        .claim(f.user, entropy, T0 + DAY / 2)
        .unwrap_err();
    assert_eq!(err.to_string(), "Claimed in the last 24 hours");
    assert!(matches!(
        err,
        RewardError::ClaimTooSoon {
            last_claim: T0,
            next_claim_at,
            ..
        } if next_claim_at == T0 + DAY
    ));

    // The rejected claim changed nothing
    assert_eq!(f.factory.last_claim(f.user), Some(T0));
    assert_eq!(
        f.factory.registry().balance_of(f.user, first.item_id),
        U256::from(1u64)
    );
}

#[test]
fn test_can_claim_after_24_hours() {
    let f = configured();
    let entropy = U256::from(100u64);
    let first = f.factory.claim(f.user, entropy, T0).unwrap();
    let second = f.factory.claim(f.user, entropy, T0 + DAY + 1).unwrap();

    assert_eq!(first, second);
    assert_eq!(f.factory.last_claim(f.user), Some(T0 + DAY + 1));
    assert_eq!(
        f.factory.registry().balance_of(f.user, first.item_id),
        U256::from(2u64)
    );
}

#[test]
fn test_claim_draws_from_the_rolled_cell() {
    let f = configured();
    // roll 100 mod 150 = 100, past the epic threshold
    let outcome = f.factory.claim(f.user, U256::from(100u64), T0).unwrap();
    assert_eq!(outcome.rarity, Rarity::Legendary);

    let (min, max, ids) = REWARDS[outcome.reward_type as usize][Rarity::Legendary as usize];
    assert!(outcome.amount >= U256::from(min) && outcome.amount <= U256::from(max));
    assert!(ids.iter().any(|id| U256::from(*id) == outcome.item_id));
}

#[test]
fn test_token_rewards_mint_to_the_claimer() {
    let f = configured();
    f.factory
        .set_reward_kind(f.admin, 0, RewardKind::Token)
        .unwrap();

    let mut entropy = SeededEntropy::new(7);
    let mut minted = U256::ZERO;
    for (i, account) in (1u8..=40).map(Address::repeat_byte).enumerate() {
        let outcome = f
            .factory
            .claim(account, entropy.next_entropy(), T0 + i as u64)
            .unwrap();
        let balance = f.factory.token().balance_of(account);
        if outcome.reward_type == 0 {
            assert_eq!(outcome.kind, RewardKind::Token);
            assert_eq!(balance, outcome.amount * f.factory.token().unit());
        } else {
            assert_eq!(outcome.kind, RewardKind::Item);
            assert_eq!(balance, U256::ZERO);
        }
        minted += balance;
    }
    assert_eq!(f.factory.token().total_supply(), minted);
}

#[test]
fn test_concurrent_claims_for_one_account_pass_the_gate_once() {
    let f = configured();
    let factory = &f.factory;
    let user = f.user;

    let successes: usize = thread::scope(|scope| {
        let handles: Vec<_> = (0u64..8)
            .map(|seed| scope.spawn(move || factory.claim(user, U256::from(seed), T0).is_ok()))
            .collect();
        handles
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum()
    });

    assert_eq!(successes, 1);
    assert_eq!(f.factory.registry().items_held(user), U256::from(1u64));
}
