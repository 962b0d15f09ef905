//! # Item Factory
//!
//! The reward issuance engine. Nothing is handed out without passing here.
//!
//! ## The Golden Path: Daily Claim
//!
//! ```text
//! claim(account, entropy, now)
//!        │
//!        ▼
//!  Cooldown gate ──> Reward type ──> Rarity ──> Table lookup ──> Item pick
//!                    (policy)        (roll)     (type, rarity)   (range, ids)
//!                                                                     │
//!              ┌──────────────────────────────────────────────────────┘
//!              ▼
//!        Reserve mint ──> Item grant ──> Commit mint ──> Record claim
//!        (token kinds)        │
//!                             └─ failure: reservation released
//! ```
//!
//! The engine state lock is held from the cooldown check to the record, so
//! two claims for one account can never both pass the gate. Token rewards
//! reserve supply before the item grant and credit it only once the grant
//! succeeds; a failed grant releases the reservation and the claim fails
//! with `TransactionRolledBack`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use alloy_primitives::{hex, Address, U256};
use creamery_shared::{AccessControl, Role, Timestamp};
use creamery_token::MilkToken;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::claims::ClaimLedger;
use crate::entropy::{self, ITEM_DOMAIN, REWARD_TYPE_DOMAIN};
use crate::error::{RewardError, RewardResult};
use crate::events::FactoryEvent;
use crate::rarity::{select_rarity, Rarity, RarityThresholds};
use crate::registry::ItemRegistry;
use crate::reward_table::{
    decode_reward_data, pick_item, ItemId, RewardRange, RewardTable, RewardType,
};

/// Placeholder replaced by [`ItemFactory::resolve_uri`].
pub const URI_ID_PLACEHOLDER: &str = "{id}";

// ============================================================================
// Policies
// ============================================================================

/// How a claim picks its reward type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RewardTypePolicy {
    /// Every claim draws from the same type.
    Fixed {
        /// The type drawn.
        reward_type: RewardType,
    },
    /// `keccak256(entropy || "type") mod types`.
    EntropyDerived {
        /// Number of types, drawn from `0..types`.
        types: u32,
    },
}

impl Default for RewardTypePolicy {
    fn default() -> Self {
        Self::EntropyDerived { types: 2 }
    }
}

impl RewardTypePolicy {
    /// Rejects an entropy-derived policy over zero types.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration`.
    pub fn validate(self) -> RewardResult<Self> {
        match self {
            Self::EntropyDerived { types: 0 } => Err(RewardError::InvalidConfiguration(
                "reward type policy needs at least one type".into(),
            )),
            _ => Ok(self),
        }
    }

    /// Reward type for `entropy`.
    #[must_use]
    pub fn reward_type_for(self, entropy: U256) -> RewardType {
        match self {
            Self::Fixed { reward_type } => reward_type,
            Self::EntropyDerived { types } => {
                let derived = entropy::derive(entropy, REWARD_TYPE_DOMAIN);
                // Remainder is below `types`, a u32
                (derived % U256::from(types.max(1))).to::<u32>()
            }
        }
    }
}

/// What a reward type pays out besides the item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardKind {
    /// Only the item is granted.
    #[default]
    Item,
    /// `amount` whole tokens are minted as well.
    Token,
}

/// Result of a successful claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClaimOutcome {
    /// Reward type drawn.
    pub reward_type: RewardType,
    /// Rarity drawn.
    pub rarity: Rarity,
    /// Item granted.
    pub item_id: ItemId,
    /// Value drawn from the range.
    pub amount: U256,
    /// Payout kind of the reward type.
    pub kind: RewardKind,
    /// Token base units minted (zero for item rewards).
    pub minted: U256,
}

// ============================================================================
// Engine
// ============================================================================

#[derive(Debug, Default)]
struct FactoryState {
    thresholds: Option<RarityThresholds>,
    table: RewardTable,
    claims: ClaimLedger,
    policy: RewardTypePolicy,
    kinds: HashMap<RewardType, RewardKind>,
}

impl FactoryState {
    fn kind_of(&self, reward_type: RewardType) -> RewardKind {
        self.kinds.get(&reward_type).copied().unwrap_or_default()
    }
}

/// Rarity-tiered daily reward engine.
///
/// `Send + Sync`; share it behind an `Arc`.
pub struct ItemFactory<R: ItemRegistry> {
    address: Address,
    uri_template: String,
    token: Arc<MilkToken>,
    access: Arc<dyn AccessControl>,
    registry: Arc<R>,
    state: Mutex<FactoryState>,
    events: Mutex<Vec<FactoryEvent>>,
}

impl<R: ItemRegistry> ItemFactory<R> {
    /// Creates an engine with the default one-day cooldown.
    ///
    /// `address` is the identity the engine presents to the token ledger; it
    /// needs the `CONTRACT` role there before token rewards can be minted.
    pub fn new(
        address: Address,
        uri_template: impl Into<String>,
        token: Arc<MilkToken>,
        access: Arc<dyn AccessControl>,
        registry: Arc<R>,
    ) -> Self {
        Self::with_claims(address, uri_template, token, access, registry, ClaimLedger::default())
    }

    /// Creates an engine with a custom cooldown.
    pub fn with_cooldown(
        address: Address,
        uri_template: impl Into<String>,
        token: Arc<MilkToken>,
        access: Arc<dyn AccessControl>,
        registry: Arc<R>,
        cooldown_secs: u64,
    ) -> Self {
        Self::with_claims(
            address,
            uri_template,
            token,
            access,
            registry,
            ClaimLedger::new(cooldown_secs),
        )
    }

    fn with_claims(
        address: Address,
        uri_template: impl Into<String>,
        token: Arc<MilkToken>,
        access: Arc<dyn AccessControl>,
        registry: Arc<R>,
        claims: ClaimLedger,
    ) -> Self {
        Self {
            address,
            uri_template: uri_template.into(),
            token,
            access,
            registry,
            state: Mutex::new(FactoryState {
                claims,
                ..FactoryState::default()
            }),
            events: Mutex::new(Vec::new()),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Engine identity.
    #[inline]
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Token ledger rewards are minted on.
    #[inline]
    #[must_use]
    pub fn token(&self) -> &Arc<MilkToken> {
        &self.token
    }

    /// Item registry grants go to.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<R> {
        &self.registry
    }

    /// Metadata URI template, e.g. `hostingsite/{id}.json`.
    #[inline]
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri_template
    }

    /// Metadata URI of one item: `{id}` becomes the 64-digit lowercase hex id.
    #[must_use]
    pub fn resolve_uri(&self, item_id: ItemId) -> String {
        let id = hex::encode(item_id.to_be_bytes::<32>());
        self.uri_template.replace(URI_ID_PLACEHOLDER, &id)
    }

    /// Current rarity thresholds.
    #[must_use]
    pub fn rarity_rolls(&self) -> Option<RarityThresholds> {
        self.state.lock().thresholds
    }

    /// Configured range of one table cell.
    ///
    /// # Errors
    ///
    /// `RewardNotConfigured` if the cell was never set.
    pub fn reward(&self, reward_type: RewardType, rarity: Rarity) -> RewardResult<RewardRange> {
        self.state.lock().table.lookup(reward_type, rarity).cloned()
    }

    /// Current reward-type policy.
    #[must_use]
    pub fn reward_type_policy(&self) -> RewardTypePolicy {
        self.state.lock().policy
    }

    /// Payout kind of a reward type.
    #[must_use]
    pub fn reward_kind(&self, reward_type: RewardType) -> RewardKind {
        self.state.lock().kind_of(reward_type)
    }

    /// Last successful claim of `account`.
    #[must_use]
    pub fn last_claim(&self, account: Address) -> Option<Timestamp> {
        self.state.lock().claims.last_claim(account)
    }

    /// Earliest time `account` may claim again. `None` if it never claimed.
    #[must_use]
    pub fn next_claim_at(&self, account: Address) -> Option<Timestamp> {
        self.state.lock().claims.next_claim_at(account)
    }

    /// True if a claim by `account` at `now` passes the cooldown gate.
    #[must_use]
    pub fn can_claim(&self, account: Address, now: Timestamp) -> bool {
        self.state.lock().claims.can_claim(account, now)
    }

    /// Cooldown between two claims of one account.
    #[must_use]
    pub fn cooldown_secs(&self) -> u64 {
        self.state.lock().claims.cooldown_secs()
    }

    // ========================================================================
    // Administration (ADMIN_ROLE)
    // ========================================================================

    /// Replaces the rarity thresholds.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` holds `ADMIN`.
    pub fn set_rarity_rolls(&self, caller: Address, thresholds: RarityThresholds) -> RewardResult<()> {
        self.access.check_role(Role::admin(), caller)?;
        self.state.lock().thresholds = Some(thresholds);

        info!(
            common = thresholds.common(),
            uncommon = thresholds.uncommon(),
            rare = thresholds.rare(),
            epic = thresholds.epic(),
            legendary = thresholds.legendary(),
            max_roll = thresholds.max_roll(),
            "rarity rolls updated"
        );
        self.emit(FactoryEvent::RarityRollsUpdated { caller, thresholds });
        Ok(())
    }

    /// Replaces one reward table cell.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` holds `ADMIN`.
    pub fn set_reward(
        &self,
        caller: Address,
        reward_type: RewardType,
        rarity: Rarity,
        range: RewardRange,
    ) -> RewardResult<()> {
        self.access.check_role(Role::admin(), caller)?;
        info!(
            reward_type,
            %rarity,
            min = %range.min(),
            max = %range.max(),
            ids = range.ids().len(),
            "reward updated"
        );
        self.state.lock().table.set(reward_type, rarity, range);
        self.emit(FactoryEvent::RewardUpdated {
            caller,
            reward_type,
            rarity,
        });
        Ok(())
    }

    /// Replaces one cell from ABI-encoded `(uint256 min, uint256 max, uint256[] ids)`.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, or `InvalidConfiguration` for undecodable or invalid data.
    pub fn set_reward_encoded(
        &self,
        caller: Address,
        reward_type: RewardType,
        rarity: Rarity,
        data: &[u8],
    ) -> RewardResult<()> {
        self.access.check_role(Role::admin(), caller)?;
        let range = decode_reward_data(data)?;
        self.set_reward(caller, reward_type, rarity, range)
    }

    /// Replaces the reward-type policy.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, or `InvalidConfiguration` for a policy over zero types.
    pub fn set_reward_type_policy(&self, caller: Address, policy: RewardTypePolicy) -> RewardResult<()> {
        self.access.check_role(Role::admin(), caller)?;
        let policy = policy.validate()?;
        self.state.lock().policy = policy;
        info!(?policy, "reward type policy updated");
        Ok(())
    }

    /// Sets what a reward type pays out besides the item.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless `caller` holds `ADMIN`.
    pub fn set_reward_kind(&self, caller: Address, reward_type: RewardType, kind: RewardKind) -> RewardResult<()> {
        self.access.check_role(Role::admin(), caller)?;
        self.state.lock().kinds.insert(reward_type, kind);
        info!(reward_type, ?kind, "reward kind updated");
        Ok(())
    }

    // ========================================================================
    // Claim
    // ========================================================================

    /// Grants the daily reward for `entropy` to `account` at time `now`.
    ///
    /// Anyone may call this on behalf of `account`. Same entropy and same
    /// configuration always give the same outcome.
    ///
    /// # Errors
    ///
    /// - `ClaimTooSoon` if the cooldown has not elapsed
    /// - `RarityRollsNotConfigured` / `RewardNotConfigured` for missing config
    /// - `Token` / `Registry` / `TransactionRolledBack` if a payout fails
    ///
    /// On any error no state changes.
    pub fn claim(&self, account: Address, entropy: U256, now: Timestamp) -> RewardResult<ClaimOutcome> {
        let mut state = self.state.lock();

        if let Err(err) = state.claims.ensure_can_claim(account, now) {
            warn!(account = %format!("{account:#x}"), now, "claim rejected: cooldown");
            return Err(err);
        }

        let thresholds = state
            .thresholds
            .ok_or(RewardError::RarityRollsNotConfigured)?;
        let reward_type = state.policy.reward_type_for(entropy);
        let rarity = select_rarity(entropy, &thresholds);
        let pick = pick_item(
            state.table.lookup(reward_type, rarity)?,
            entropy::derive(entropy, ITEM_DOMAIN),
        );
        let kind = state.kind_of(reward_type);
        debug!(
            roll = thresholds.roll(entropy),
            reward_type,
            %rarity,
            item_id = %pick.item_id,
            amount = %pick.amount,
            "claim rolled"
        );

        let reservation = match kind {
            RewardKind::Item => None,
            RewardKind::Token => {
                let value = pick
                    .amount
                    .checked_mul(self.token.unit())
                    .ok_or(RewardError::ArithmeticOverflow)?;
                Some(self.token.game_reserve_mint(self.address, account, value)?)
            }
        };

        if let Err(err) = self.registry.grant(account, pick.item_id, 1) {
            let Some(reservation) = reservation else {
                return Err(err);
            };
            warn!(
                account = %format!("{account:#x}"),
                reserved = %reservation.amount(),
                %err,
                "claim rolled back"
            );
            drop(reservation);
            return Err(RewardError::TransactionRolledBack {
                reason: err.to_string(),
            });
        }

        let minted = reservation.map_or(U256::ZERO, |reservation| {
            let value = reservation.amount();
            reservation.commit();
            value
        });
        state.claims.record_claim(account, now);
        drop(state);

        info!(
            account = %format!("{account:#x}"),
            reward_type,
            %rarity,
            item_id = %pick.item_id,
            amount = %pick.amount,
            "daily claim"
        );
        self.emit(FactoryEvent::DailyClaim {
            account,
            reward_type,
            rarity,
            item_id: pick.item_id,
            amount: pick.amount,
            claimed_at: now,
        });

        Ok(ClaimOutcome {
            reward_type,
            rarity,
            item_id: pick.item_id,
            amount: pick.amount,
            kind,
            minted,
        })
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Drains all pending engine events, oldest first.
    pub fn drain_events(&self) -> Vec<FactoryEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    fn emit(&self, event: FactoryEvent) {
        self.events.lock().push(event);
    }
}

impl<R: ItemRegistry> fmt::Debug for ItemFactory<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemFactory")
            .field("address", &format_args!("{:#x}", self.address))
            .field("uri_template", &self.uri_template)
            .field("token", &format_args!("{:#x}", self.token.address()))
            .finish_non_exhaustive()
    }
}
