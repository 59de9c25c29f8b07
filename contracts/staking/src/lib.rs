#![cfg_attr(not(feature = "std"), no_std, no_main)]

/// # Dr. Birdy Books — Tiered Staking Ledger
///
/// **Role:** Custodies staked $BIRDY, computes USD-denominated access
/// tiers from the price feeds, enforces the minimum staking duration, and
/// deploys a bounded share of the pooled stake to the Yield Strategy.
///
/// ```text
///   staker ──stake/unstake──► [Staking Ledger] ──surplus──► [Yield Strategy]
///                                   │   ▲
///                         submit_price   └── release_stake (recall)
///                                   │
///                          primary / backup feeds
/// ```
///
/// ## Tier model
///
/// A position's USD value is `staked × price / ONE_TOKEN` with the price
/// in 8-decimal USD per whole token.  The tier is the highest index whose
/// threshold is ≤ that value; below the first threshold there is no tier
/// and no access.  A stale or missing price never degrades to "tier 0":
/// tier-dependent reads fail with `OracleUnavailable` instead.
///
/// ## Pool accounting
///
/// `total_staked` is the sum of every recorded position.  Of the custody
/// backing it, up to `max_yield_deployment_bps` may sit in the Yield
/// Strategy, tracked as `yield_deployed`; deployment moves only the shared
/// pool balance and never any individual position.  Unstaking recalls from
/// the strategy when the liquid share cannot cover the withdrawal, so:
///
/// ```text
///   liquid custody + yield_deployed == total_staked       (always)
///   yield_deployed ≤ total_staked × max_yield_deployment_bps / 10_000
/// ```
#[ink::contract]
mod birdy_staking {
    use ink::prelude::vec::Vec;
    use ink::storage::Mapping;
    use ink::env::call::{build_call, ExecutionInput, Selector};

    // =========================================================================
    // CONSTANTS
    // =========================================================================

    /// Denominator for all basis-point calculations.
    pub const BPS_DENOMINATOR: u128 = 10_000;

    /// One whole $BIRDY in base units (18 decimals).
    pub const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

    /// USD prices carry 8-decimal precision, matching the feed format the
    /// protocol's reporters mirror from their upstream aggregators.
    pub const PRICE_PRECISION: u128 = 100_000_000;

    /// Default minimum staking duration: 24 hours in milliseconds.
    pub const DEFAULT_MIN_STAKING_DURATION_MS: u64 = 86_400_000;

    /// Default maximum feed age before a price counts as stale (1 hour).
    pub const DEFAULT_MAX_PRICE_AGE_MS: u64 = 3_600_000;

    /// Default ceiling on the pooled stake share deployable to the Yield
    /// Strategy: 50%.
    pub const DEFAULT_MAX_YIELD_DEPLOYMENT_BPS: u128 = 5_000;

    /// Default tier thresholds in 8-decimal USD: $25, $50, $100.
    pub const DEFAULT_TIER_THRESHOLDS: [u128; 3] =
        [25 * PRICE_PRECISION, 50 * PRICE_PRECISION, 100 * PRICE_PRECISION];

    // =========================================================================
    // TYPES
    // =========================================================================

    /// Per-account staking record.
    ///
    /// `first_stake_at` is set when the balance first leaves zero and
    /// cleared on full unstake; partial unstakes never reset it.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
    #[cfg_attr(
        feature = "std",
        derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
    )]
    pub struct StakePosition {
        pub amount: Balance,
        pub first_stake_at: Timestamp,
    }

    /// Identifies which feed slot a price submission landed in.
    #[derive(Debug, PartialEq, Eq, Clone, Copy, scale::Encode, scale::Decode)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum FeedKind {
        Primary,
        Backup,
    }

    // =========================================================================
    // STORAGE
    // =========================================================================

    #[ink(storage)]
    pub struct BirdyStaking {
        // ── Access control ────────────────────────────────────────────────
        owner: AccountId,

        // ── Sockets ───────────────────────────────────────────────────────
        /// The $BIRDY token custodied by this ledger.
        staking_token: Option<AccountId>,
        /// Yield Strategy receiving deployed surplus stake.
        yield_strategy: Option<AccountId>,

        // ── Ledger ────────────────────────────────────────────────────────
        positions: Mapping<AccountId, StakePosition>,
        /// Sum of all recorded positions.
        total_staked: Balance,
        /// Share of the pool currently sitting in the Yield Strategy.
        yield_deployed: Balance,

        // ── Tier table ────────────────────────────────────────────────────
        /// Strictly increasing USD thresholds (8-decimal).  Index = tier.
        tier_thresholds: Vec<Balance>,

        // ── Duration gate ─────────────────────────────────────────────────
        min_staking_duration: Timestamp,
        /// When enabled, `min_staking_duration_override` replaces the
        /// configured duration (a zero override unlocks immediately).
        min_staking_duration_override_enabled: bool,
        min_staking_duration_override: Timestamp,

        // ── Yield deployment ──────────────────────────────────────────────
        yield_enabled: bool,
        max_yield_deployment_bps: u128,

        // ── Price feeds ───────────────────────────────────────────────────
        /// Account authorized to push to the primary feed slot.
        primary_oracle: Option<AccountId>,
        primary_price: Balance,
        primary_updated_at: Timestamp,
        /// Account authorized to push to the backup feed slot.
        backup_oracle: Option<AccountId>,
        backup_price: Balance,
        backup_updated_at: Timestamp,
        /// A feed older than this is stale.
        max_price_age: Timestamp,

        // ── Safety ────────────────────────────────────────────────────────
        paused: bool,
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    #[ink(event)]
    pub struct Staked {
        #[ink(topic)]
        account: AccountId,
        amount: Balance,
        new_position: Balance,
    }

    #[ink(event)]
    pub struct Unstaked {
        #[ink(topic)]
        account: AccountId,
        amount: Balance,
        new_position: Balance,
    }

    /// Emitted when surplus pool stake is pushed to the Yield Strategy.
    #[ink(event)]
    pub struct YieldDeployed {
        amount: Balance,
        total_deployed: Balance,
    }

    /// Emitted when a deployment attempt could not reach the strategy; the
    /// pool keeps the funds liquid and retries on the next stake.
    #[ink(event)]
    pub struct YieldDeploymentSkipped {
        amount: Balance,
    }

    /// Emitted when deployed stake is recalled to cover an unstake.
    #[ink(event)]
    pub struct YieldRecalled {
        amount: Balance,
        total_deployed: Balance,
    }

    #[ink(event)]
    pub struct PriceSubmitted {
        #[ink(topic)]
        feed: FeedKind,
        price: Balance,
        at: Timestamp,
    }

    #[ink(event)]
    pub struct TiersUpdated {
        tier_count: u32,
    }

    #[ink(event)]
    pub struct OwnershipTransferred {
        #[ink(topic)]
        previous: AccountId,
        #[ink(topic)]
        new: AccountId,
    }

    // =========================================================================
    // ERRORS
    // =========================================================================

    #[derive(Debug, PartialEq, Eq, scale::Encode, scale::Decode)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        /// Caller is not the contract owner.
        NotOwner,
        /// Contract is paused.
        ContractPaused,
        /// No staking token has been configured.
        StakingTokenNotSet,
        /// No primary price oracle has been configured.
        OracleNotSet,
        /// Stake/unstake amount is zero.
        ZeroAmount,
        /// Unstake amount exceeds the recorded position.
        InsufficientBalance,
        /// The minimum staking duration has not elapsed.
        DurationNotElapsed,
        /// Neither feed can currently serve a usable price.
        OracleUnavailable,
        /// A submitted price of zero is never usable.
        InvalidPrice,
        /// Caller is not a registered feed reporter.
        NotOracle,
        /// Tier thresholds must be non-empty and strictly increasing.
        InvalidTiers,
        /// A BPS parameter exceeds the 10_000 denominator.
        InvalidBps,
        /// An arithmetic operation overflowed.
        Overflow,
        /// A token transfer to or from the ledger failed.
        TransferFailed,
        /// The Yield Strategy refused or failed a stake recall.
        YieldRecallFailed,
    }

    // =========================================================================
    // IMPLEMENTATION
    // =========================================================================

    impl BirdyStaking {
        // ---------------------------------------------------------------------
        // Constructor
        // ---------------------------------------------------------------------

        /// Deploy the ledger with the default tier table and durations.
        /// The staking token and the feeds are wired afterwards through the
        /// owner-gated setters; `stake` refuses to run until both exist.
        #[ink(constructor)]
        pub fn new() -> Self {
            let mut tier_thresholds = Vec::new();
            for threshold in DEFAULT_TIER_THRESHOLDS {
                tier_thresholds.push(threshold);
            }

            Self {
                owner: Self::env().caller(),
                staking_token: None,
                yield_strategy: None,
                positions: Mapping::default(),
                total_staked: 0,
                yield_deployed: 0,
                tier_thresholds,
                min_staking_duration: DEFAULT_MIN_STAKING_DURATION_MS,
                min_staking_duration_override_enabled: false,
                min_staking_duration_override: 0,
                yield_enabled: false,
                max_yield_deployment_bps: DEFAULT_MAX_YIELD_DEPLOYMENT_BPS,
                primary_oracle: None,
                primary_price: 0,
                primary_updated_at: 0,
                backup_oracle: None,
                backup_price: 0,
                backup_updated_at: 0,
                max_price_age: DEFAULT_MAX_PRICE_AGE_MS,
                paused: false,
            }
        }

        // =====================================================================
        // STAKE / UNSTAKE
        // =====================================================================

        /// Stake `amount` $BIRDY.
        ///
        /// Pulls the tokens from the caller (requires a prior `approve` on
        /// the token), records the position, and tops the Yield Strategy's
        /// deployed share up to the configured ceiling.  The first nonzero
        /// stake starts the minimum-duration clock.
        #[ink(message)]
        pub fn stake(&mut self, amount: Balance) -> Result<(), Error> {
            self.assert_not_paused()?;
            if amount == 0 {
                return Err(Error::ZeroAmount);
            }
            let token = self.staking_token.ok_or(Error::StakingTokenNotSet)?;
            if self.primary_oracle.is_none() {
                return Err(Error::OracleNotSet);
            }

            let caller = self.env().caller();
            let now = self.env().block_timestamp();

            self.apply_stake(caller, amount, now)?;
            self.collect_stake(token, caller, amount)?;
            self.deploy_surplus_to_yield(token);
            Ok(())
        }

        /// Unstake `amount` $BIRDY back to the caller.
        ///
        /// Requires the minimum staking duration (or an active override) to
        /// have elapsed since the position's first stake.  If the liquid
        /// pool share cannot cover the withdrawal, the difference is
        /// recalled from the Yield Strategy first.
        #[ink(message)]
        pub fn unstake(&mut self, amount: Balance) -> Result<(), Error> {
            self.assert_not_paused()?;
            let token = self.staking_token.ok_or(Error::StakingTokenNotSet)?;

            let caller = self.env().caller();
            let now = self.env().block_timestamp();

            let liquid = self.total_staked.saturating_sub(self.yield_deployed);
            let recall = amount.saturating_sub(liquid);

            self.apply_unstake(caller, amount, now)?;

            if recall > 0 {
                self.yield_deployed = self.yield_deployed.saturating_sub(recall);
                self.recall_stake_from_strategy(recall)?;
                self.env().emit_event(YieldRecalled {
                    amount: recall,
                    total_deployed: self.yield_deployed,
                });
            }

            self.payout_stake(token, caller, amount)
        }

        /// Record a stake: checks and ledger effects only, no token
        /// movement.  `stake` performs the custody pull afterwards.
        fn apply_stake(&mut self, account: AccountId, amount: Balance, now: Timestamp) -> Result<(), Error> {
            if amount == 0 {
                return Err(Error::ZeroAmount);
            }

            let mut position = self.positions.get(account).unwrap_or_default();
            if position.amount == 0 {
                position.first_stake_at = now;
            }
            position.amount = position
                .amount
                .checked_add(amount)
                .ok_or(Error::Overflow)?;

            self.total_staked = self
                .total_staked
                .checked_add(amount)
                .ok_or(Error::Overflow)?;
            self.positions.insert(account, &position);

            self.env().emit_event(Staked {
                account,
                amount,
                new_position: position.amount,
            });
            Ok(())
        }

        /// Record an unstake: duration gate, balance check, and ledger
        /// effects only.  Clears `first_stake_at` when the position
        /// reaches zero.
        fn apply_unstake(&mut self, account: AccountId, amount: Balance, now: Timestamp) -> Result<(), Error> {
            if amount == 0 {
                return Err(Error::ZeroAmount);
            }

            let mut position = self.positions.get(account).unwrap_or_default();
            if position.amount < amount {
                return Err(Error::InsufficientBalance);
            }
            if !self.duration_elapsed(position.first_stake_at, now) {
                return Err(Error::DurationNotElapsed);
            }

            position.amount = position.amount.saturating_sub(amount);
            if position.amount == 0 {
                position.first_stake_at = 0;
            }
            self.total_staked = self.total_staked.saturating_sub(amount);
            self.positions.insert(account, &position);

            self.env().emit_event(Unstaked {
                account,
                amount,
                new_position: position.amount,
            });
            Ok(())
        }

        // =====================================================================
        // YIELD DEPLOYMENT
        // =====================================================================

        /// Pool stake that may still be pushed to the strategy under the
        /// deployment ceiling.  Zero when yield is disabled, the socket is
        /// missing, or the ceiling is already met.
        fn yield_deployment_delta(&self) -> Balance {
            if !self.yield_enabled || self.yield_strategy.is_none() {
                return 0;
            }
            let target = match self
                .total_staked
                .checked_mul(self.max_yield_deployment_bps)
            {
                Some(product) => product / BPS_DENOMINATOR,
                None => return 0,
            };
            target.saturating_sub(self.yield_deployed)
        }

        /// Push the deployable surplus to the strategy.  A failed push
        /// leaves the funds liquid; the next stake retries.
        fn deploy_surplus_to_yield(&mut self, token: AccountId) {
            let delta = self.yield_deployment_delta();
            if delta == 0 {
                return;
            }
            let strategy = match self.yield_strategy {
                Some(strategy) => strategy,
                None => return,
            };

            self.yield_deployed = self.yield_deployed.saturating_add(delta);
            if self.push_stake_to_strategy(token, strategy, delta).is_err() {
                self.yield_deployed = self.yield_deployed.saturating_sub(delta);
                self.env().emit_event(YieldDeploymentSkipped { amount: delta });
            } else {
                self.env().emit_event(YieldDeployed {
                    amount: delta,
                    total_deployed: self.yield_deployed,
                });
            }
        }

        // =====================================================================
        // ORACLE ADAPTER
        // =====================================================================

        /// Push a price into the feed slot the caller is registered for.
        #[ink(message)]
        pub fn submit_price(&mut self, price: Balance) -> Result<(), Error> {
            if price == 0 {
                return Err(Error::InvalidPrice);
            }
            let caller = self.env().caller();
            let now = self.env().block_timestamp();

            let feed = if self.primary_oracle == Some(caller) {
                self.primary_price = price;
                self.primary_updated_at = now;
                FeedKind::Primary
            } else if self.backup_oracle == Some(caller) {
                self.backup_price = price;
                self.backup_updated_at = now;
                FeedKind::Backup
            } else {
                return Err(Error::NotOracle);
            };

            self.env().emit_event(PriceSubmitted { feed, price, at: now });
            Ok(())
        }

        /// Current USD price per whole token and a staleness flag.
        ///
        /// The primary feed is tried first, then the backup; the first
        /// fresh feed wins.  With no fresh feed the freshest reported
        /// value is returned with `is_stale = true`.  Fails only when no
        /// feed has ever reported.
        #[ink(message)]
        pub fn get_price(&self) -> Result<(Balance, bool), Error> {
            let now = self.env().block_timestamp();

            if self.primary_oracle.is_some() && self.primary_price > 0 {
                if !self.is_stale(self.primary_updated_at, now) {
                    return Ok((self.primary_price, false));
                }
            }
            if self.backup_oracle.is_some() && self.backup_price > 0 {
                if !self.is_stale(self.backup_updated_at, now) {
                    return Ok((self.backup_price, false));
                }
            }

            // No fresh feed: serve the freshest stale observation, flagged.
            let primary_reported = self.primary_oracle.is_some() && self.primary_price > 0;
            let backup_reported = self.backup_oracle.is_some() && self.backup_price > 0;
            match (primary_reported, backup_reported) {
                (true, true) => {
                    if self.primary_updated_at >= self.backup_updated_at {
                        Ok((self.primary_price, true))
                    } else {
                        Ok((self.backup_price, true))
                    }
                }
                (true, false) => Ok((self.primary_price, true)),
                (false, true) => Ok((self.backup_price, true)),
                (false, false) => Err(Error::OracleUnavailable),
            }
        }

        fn is_stale(&self, updated_at: Timestamp, now: Timestamp) -> bool {
            now.saturating_sub(updated_at) > self.max_price_age
        }

        /// A price usable for tier computation: fresh, or nothing.
        fn usable_price(&self) -> Result<Balance, Error> {
            match self.get_price()? {
                (price, false) => Ok(price),
                (_, true) => Err(Error::OracleUnavailable),
            }
        }

        // =====================================================================
        // TIER MODEL
        // =====================================================================

        /// Highest tier index whose threshold is ≤ `usd_value`, if any.
        #[ink(message)]
        pub fn tier_of(&self, usd_value: Balance) -> Option<u32> {
            let mut tier = None;
            for (index, threshold) in self.tier_thresholds.iter().enumerate() {
                if usd_value >= *threshold {
                    tier = Some(index as u32);
                }
            }
            tier
        }

        fn usd_value(&self, amount: Balance, price: Balance) -> Result<Balance, Error> {
            amount
                .checked_mul(price)
                .ok_or(Error::Overflow)
                .map(|product| product / ONE_TOKEN)
        }

        // =====================================================================
        // VIEW FUNCTIONS
        // =====================================================================

        /// `(staked, usd_value, has_access, can_unstake)` for `account`.
        ///
        /// A zero position short-circuits to all-zero sentinels without
        /// touching the feeds; a nonzero position with no fresh price is
        /// refused rather than guessed at.
        #[ink(message)]
        pub fn get_user_staking_info(&self, account: AccountId) -> Result<(Balance, Balance, bool, bool), Error> {
            let position = self.positions.get(account).unwrap_or_default();
            if position.amount == 0 {
                return Ok((0, 0, false, false));
            }

            let price = self.usable_price()?;
            let usd_value = self.usd_value(position.amount, price)?;
            let has_access = self.tier_of(usd_value).is_some();
            let now = self.env().block_timestamp();
            let can_unstake = self.duration_elapsed(position.first_stake_at, now);

            Ok((position.amount, usd_value, has_access, can_unstake))
        }

        /// `(paused, token_set, primary_oracle_set, backup_oracle_set,
        /// tier_count)` — pre-flight introspection for callers.
        #[ink(message)]
        pub fn get_contract_status(&self) -> (bool, bool, bool, bool, u32) {
            (
                self.paused,
                self.staking_token.is_some(),
                self.primary_oracle.is_some(),
                self.backup_oracle.is_some(),
                self.tier_thresholds.len() as u32,
            )
        }

        #[ink(message)]
        pub fn get_stake_position(&self, account: AccountId) -> StakePosition {
            self.positions.get(account).unwrap_or_default()
        }

        #[ink(message)]
        pub fn get_tier_thresholds(&self) -> Vec<Balance> {
            self.tier_thresholds.clone()
        }

        #[ink(message)]
        pub fn get_tier_count(&self) -> u32 { self.tier_thresholds.len() as u32 }

        #[ink(message)]
        pub fn get_total_staked(&self) -> Balance { self.total_staked }

        #[ink(message)]
        pub fn get_yield_deployed(&self) -> Balance { self.yield_deployed }

        #[ink(message)]
        pub fn is_yield_enabled(&self) -> bool { self.yield_enabled }

        #[ink(message)]
        pub fn get_max_yield_deployment_bps(&self) -> u128 { self.max_yield_deployment_bps }

        /// Effective minimum staking duration, accounting for an override.
        #[ink(message)]
        pub fn effective_min_staking_duration(&self) -> Timestamp {
            if self.min_staking_duration_override_enabled {
                self.min_staking_duration_override
            } else {
                self.min_staking_duration
            }
        }

        #[ink(message)]
        pub fn get_staking_token(&self) -> Option<AccountId> { self.staking_token }

        #[ink(message)]
        pub fn get_yield_strategy(&self) -> Option<AccountId> { self.yield_strategy }

        #[ink(message)]
        pub fn get_owner(&self) -> AccountId { self.owner }

        #[ink(message)]
        pub fn is_paused(&self) -> bool { self.paused }

        // =====================================================================
        // ADMIN
        // =====================================================================

        #[ink(message)]
        pub fn set_staking_token(&mut self, token: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            self.staking_token = Some(token);
            Ok(())
        }

        #[ink(message)]
        pub fn set_primary_price_oracle(&mut self, reporter: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            self.primary_oracle = Some(reporter);
            Ok(())
        }

        #[ink(message)]
        pub fn set_backup_price_oracle(&mut self, reporter: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            self.backup_oracle = Some(reporter);
            Ok(())
        }

        #[ink(message)]
        pub fn set_max_price_age(&mut self, max_age: Timestamp) -> Result<(), Error> {
            self.only_owner()?;
            self.max_price_age = max_age;
            Ok(())
        }

        #[ink(message)]
        pub fn set_yield_strategy(&mut self, strategy: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            self.yield_strategy = Some(strategy);
            Ok(())
        }

        #[ink(message)]
        pub fn set_yield_enabled(&mut self, enabled: bool) -> Result<(), Error> {
            self.only_owner()?;
            self.yield_enabled = enabled;
            Ok(())
        }

        #[ink(message)]
        pub fn set_max_yield_deployment_bps(&mut self, bps: u128) -> Result<(), Error> {
            self.only_owner()?;
            if bps > BPS_DENOMINATOR {
                return Err(Error::InvalidBps);
            }
            self.max_yield_deployment_bps = bps;
            Ok(())
        }

        #[ink(message)]
        pub fn set_min_staking_duration(&mut self, duration: Timestamp) -> Result<(), Error> {
            self.only_owner()?;
            self.min_staking_duration = duration;
            Ok(())
        }

        /// Enable or disable the duration override.  An enabled override of
        /// zero unlocks every position immediately.
        #[ink(message)]
        pub fn set_min_staking_duration_override(&mut self, enabled: bool, duration: Timestamp) -> Result<(), Error> {
            self.only_owner()?;
            self.min_staking_duration_override_enabled = enabled;
            self.min_staking_duration_override = duration;
            Ok(())
        }

        /// Replace the tier table.  Thresholds must be non-empty and
        /// strictly increasing by index.
        #[ink(message)]
        pub fn set_tiers(&mut self, thresholds: Vec<Balance>) -> Result<(), Error> {
            self.only_owner()?;
            if thresholds.is_empty() {
                return Err(Error::InvalidTiers);
            }
            for window in thresholds.windows(2) {
                if window[1] <= window[0] {
                    return Err(Error::InvalidTiers);
                }
            }
            self.tier_thresholds = thresholds;
            self.env().emit_event(TiersUpdated {
                tier_count: self.tier_thresholds.len() as u32,
            });
            Ok(())
        }

        #[ink(message)]
        pub fn set_paused(&mut self, paused: bool) -> Result<(), Error> {
            self.only_owner()?;
            self.paused = paused;
            Ok(())
        }

        #[ink(message)]
        pub fn transfer_ownership(&mut self, new_owner: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            let previous = self.owner;
            self.owner = new_owner;
            self.env().emit_event(OwnershipTransferred {
                previous,
                new: new_owner,
            });
            Ok(())
        }

        // =====================================================================
        // INTERNAL HELPERS
        // =====================================================================

        fn duration_elapsed(&self, first_stake_at: Timestamp, now: Timestamp) -> bool {
            let required = self.effective_min_staking_duration();
            now >= first_stake_at.saturating_add(required)
        }

        fn only_owner(&self) -> Result<(), Error> {
            if self.env().caller() != self.owner {
                return Err(Error::NotOwner);
            }
            Ok(())
        }

        fn assert_not_paused(&self) -> Result<(), Error> {
            if self.paused {
                return Err(Error::ContractPaused);
            }
            Ok(())
        }

        // =====================================================================
        // CROSS-CONTRACT CALLS
        // =====================================================================

        /// Pull `amount` staking tokens from `from` into custody.
        fn collect_stake(&self, token: AccountId, from: AccountId, amount: Balance) -> Result<(), Error> {
            let contract = self.env().account_id();
            let result = build_call::<ink::env::DefaultEnvironment>()
                .call(token)
                .exec_input(
                    ExecutionInput::new(Selector::new(ink::selector_bytes!("transfer_from")))
                        .push_arg(&from)
                        .push_arg(&contract)
                        .push_arg(&amount),
                )
                .returns::<core::result::Result<(), Error>>()
                .try_invoke();

            match result {
                Ok(Ok(Ok(()))) => Ok(()),
                _ => Err(Error::TransferFailed),
            }
        }

        /// Pay `amount` staking tokens out of custody to `to`.
        fn payout_stake(&self, token: AccountId, to: AccountId, amount: Balance) -> Result<(), Error> {
            let result = build_call::<ink::env::DefaultEnvironment>()
                .call(token)
                .exec_input(
                    ExecutionInput::new(Selector::new(ink::selector_bytes!("transfer")))
                        .push_arg(&to)
                        .push_arg(&amount),
                )
                .returns::<core::result::Result<(), Error>>()
                .try_invoke();

            match result {
                Ok(Ok(Ok(()))) => Ok(()),
                _ => Err(Error::TransferFailed),
            }
        }

        /// Move `amount` pool tokens to the strategy and notify it so its
        /// deployed-stake ledger stays in sync with ours.
        fn push_stake_to_strategy(&self, token: AccountId, strategy: AccountId, amount: Balance) -> Result<(), Error> {
            self.payout_stake(token, strategy, amount)?;

            let result = build_call::<ink::env::DefaultEnvironment>()
                .call(strategy)
                .exec_input(
                    ExecutionInput::new(Selector::new(ink::selector_bytes!("notify_stake_deployed")))
                        .push_arg(&amount),
                )
                .returns::<core::result::Result<(), Error>>()
                .try_invoke();

            match result {
                Ok(Ok(Ok(()))) => Ok(()),
                _ => Err(Error::TransferFailed),
            }
        }

        /// Ask the strategy to return `amount` staking tokens to custody.
        fn recall_stake_from_strategy(&self, amount: Balance) -> Result<(), Error> {
            let strategy = match self.yield_strategy {
                Some(strategy) => strategy,
                None => return Err(Error::YieldRecallFailed),
            };
            let result = build_call::<ink::env::DefaultEnvironment>()
                .call(strategy)
                .exec_input(
                    ExecutionInput::new(Selector::new(ink::selector_bytes!("release_stake")))
                        .push_arg(&amount),
                )
                .returns::<core::result::Result<(), Error>>()
                .try_invoke();

            match result {
                Ok(Ok(Ok(()))) => Ok(()),
                _ => Err(Error::YieldRecallFailed),
            }
        }
    }

    // =========================================================================
    // UNIT TESTS
    // =========================================================================
    //
    // The custody pulls are cross-contract calls, which the off-chain test
    // environment cannot execute; ledger effects are exercised through the
    // internal apply functions the messages delegate to.

    #[cfg(test)]
    mod tests {
        use super::*;
        use ink::env::{test, DefaultEnvironment};

        type Env = DefaultEnvironment;

        fn accounts() -> test::DefaultAccounts<Env> { test::default_accounts::<Env>() }
        fn set_caller(a: AccountId) { test::set_caller::<Env>(a); }
        fn set_time(t: Timestamp) { test::set_block_timestamp::<Env>(t); }

        const ONE_DAY_MS: u64 = 86_400_000;

        /// $0.05 per token, 8-decimal.
        const PRICE_5_CENTS: Balance = 5_000_000;

        fn deploy() -> BirdyStaking {
            let accs = accounts();
            set_caller(accs.alice);
            set_time(0);
            BirdyStaking::new()
        }

        /// Ledger with a token socket and a fresh $0.05 primary price,
        /// reported by django.
        fn deploy_configured() -> BirdyStaking {
            let accs = accounts();
            let mut ledger = deploy();
            ledger.set_staking_token(accs.eve).unwrap();
            ledger.set_primary_price_oracle(accs.django).unwrap();
            set_caller(accs.django);
            ledger.submit_price(PRICE_5_CENTS).unwrap();
            set_caller(accs.alice);
            ledger
        }

        // ── Tier model ────────────────────────────────────────────────────

        #[ink::test]
        fn tier_below_first_threshold_is_none() {
            let ledger = deploy();
            assert_eq!(ledger.tier_of(24 * PRICE_PRECISION), None);
            assert_eq!(ledger.tier_of(0), None);
        }

        #[ink::test]
        fn tier_assignment_is_highest_satisfied_threshold() {
            let ledger = deploy();
            assert_eq!(ledger.tier_of(25 * PRICE_PRECISION), Some(0));
            assert_eq!(ledger.tier_of(49 * PRICE_PRECISION), Some(0));
            assert_eq!(ledger.tier_of(50 * PRICE_PRECISION), Some(1));
            assert_eq!(ledger.tier_of(99 * PRICE_PRECISION), Some(1));
            assert_eq!(ledger.tier_of(100 * PRICE_PRECISION), Some(2));
            assert_eq!(ledger.tier_of(1_000 * PRICE_PRECISION), Some(2));
        }

        #[ink::test]
        fn tier_is_monotone_in_usd_value() {
            let ledger = deploy();
            let mut previous = None;
            for usd in (0..200).map(|d| d * PRICE_PRECISION) {
                let tier = ledger.tier_of(usd);
                assert!(tier >= previous, "tier must not decrease as value grows");
                previous = tier;
            }
        }

        #[ink::test]
        fn set_tiers_rejects_unordered_thresholds() {
            let mut ledger = deploy();
            assert_eq!(ledger.set_tiers(Vec::new()), Err(Error::InvalidTiers));
            assert_eq!(
                ledger.set_tiers([10, 10].to_vec()),
                Err(Error::InvalidTiers)
            );
            assert_eq!(
                ledger.set_tiers([20, 10].to_vec()),
                Err(Error::InvalidTiers)
            );
            ledger.set_tiers([10, 20, 30].to_vec()).unwrap();
            assert_eq!(ledger.get_tier_count(), 3);
        }

        // ── Oracle adapter ────────────────────────────────────────────────

        #[ink::test]
        fn price_unavailable_before_any_report() {
            let ledger = deploy();
            assert_eq!(ledger.get_price(), Err(Error::OracleUnavailable));
        }

        #[ink::test]
        fn fresh_primary_price_is_served() {
            let ledger = deploy_configured();
            assert_eq!(ledger.get_price(), Ok((PRICE_5_CENTS, false)));
        }

        #[ink::test]
        fn stale_primary_falls_back_to_fresh_backup() {
            let accs = accounts();
            let mut ledger = deploy_configured();
            ledger.set_backup_price_oracle(accs.frank).unwrap();

            // Primary reported at t=0; backup reports much later.
            set_time(10 * ONE_DAY_MS);
            set_caller(accs.frank);
            ledger.submit_price(2 * PRICE_5_CENTS).unwrap();

            assert_eq!(ledger.get_price(), Ok((2 * PRICE_5_CENTS, false)));
        }

        #[ink::test]
        fn both_feeds_stale_serves_freshest_flagged() {
            let accs = accounts();
            let mut ledger = deploy_configured();
            ledger.set_backup_price_oracle(accs.frank).unwrap();

            set_time(1_000);
            set_caller(accs.frank);
            ledger.submit_price(3 * PRICE_5_CENTS).unwrap();

            // Move past the max age of both observations.
            set_time(10 * ONE_DAY_MS);
            assert_eq!(ledger.get_price(), Ok((3 * PRICE_5_CENTS, true)));
        }

        #[ink::test]
        fn zero_price_submission_rejected() {
            let accs = accounts();
            let mut ledger = deploy_configured();
            set_caller(accs.django);
            assert_eq!(ledger.submit_price(0), Err(Error::InvalidPrice));
        }

        #[ink::test]
        fn unregistered_reporter_rejected() {
            let accs = accounts();
            let mut ledger = deploy_configured();
            set_caller(accs.bob);
            assert_eq!(ledger.submit_price(1), Err(Error::NotOracle));
        }

        // ── Ledger effects & conservation ─────────────────────────────────

        #[ink::test]
        fn positions_sum_to_total_staked() {
            let accs = accounts();
            let mut ledger = deploy_configured();

            ledger.apply_stake(accs.bob, 1_000 * ONE_TOKEN, 0).unwrap();
            ledger.apply_stake(accs.charlie, 250 * ONE_TOKEN, 0).unwrap();
            ledger.apply_stake(accs.bob, 500 * ONE_TOKEN, 0).unwrap();

            set_time(2 * ONE_DAY_MS);
            ledger
                .apply_unstake(accs.bob, 300 * ONE_TOKEN, 2 * ONE_DAY_MS)
                .unwrap();

            let bob = ledger.get_stake_position(accs.bob).amount;
            let charlie = ledger.get_stake_position(accs.charlie).amount;
            assert_eq!(bob + charlie, ledger.get_total_staked());
            assert_eq!(ledger.get_total_staked(), 1_450 * ONE_TOKEN);
        }

        #[ink::test]
        fn first_stake_timestamp_set_once_and_cleared_on_full_exit() {
            let accs = accounts();
            let mut ledger = deploy_configured();

            ledger.apply_stake(accs.bob, 100 * ONE_TOKEN, 500).unwrap();
            assert_eq!(ledger.get_stake_position(accs.bob).first_stake_at, 500);

            // Topping up never restarts the clock.
            ledger.apply_stake(accs.bob, 100 * ONE_TOKEN, 9_999).unwrap();
            assert_eq!(ledger.get_stake_position(accs.bob).first_stake_at, 500);

            // Partial exit keeps it; full exit clears it.
            let later = 500 + ONE_DAY_MS;
            ledger.apply_unstake(accs.bob, 50 * ONE_TOKEN, later).unwrap();
            assert_eq!(ledger.get_stake_position(accs.bob).first_stake_at, 500);
            ledger.apply_unstake(accs.bob, 150 * ONE_TOKEN, later).unwrap();
            assert_eq!(ledger.get_stake_position(accs.bob).first_stake_at, 0);
        }

        #[ink::test]
        fn unstake_rejects_excess_amount() {
            let accs = accounts();
            let mut ledger = deploy_configured();
            ledger.apply_stake(accs.bob, 100 * ONE_TOKEN, 0).unwrap();
            let result = ledger.apply_unstake(accs.bob, 101 * ONE_TOKEN, ONE_DAY_MS);
            assert_eq!(result, Err(Error::InsufficientBalance));
        }

        // ── Duration gate ─────────────────────────────────────────────────

        #[ink::test]
        fn unstake_blocked_before_minimum_duration() {
            let accs = accounts();
            let mut ledger = deploy_configured();
            ledger.apply_stake(accs.bob, 1_000 * ONE_TOKEN, 0).unwrap();

            let result = ledger.apply_unstake(accs.bob, 500 * ONE_TOKEN, 3_600_000);
            assert_eq!(result, Err(Error::DurationNotElapsed));
        }

        #[ink::test]
        fn unstake_unlocks_exactly_at_boundary() {
            let accs = accounts();
            let mut ledger = deploy_configured();
            ledger.apply_stake(accs.bob, 1_000 * ONE_TOKEN, 0).unwrap();

            let boundary = ONE_DAY_MS;
            assert_eq!(
                ledger.apply_unstake(accs.bob, 500 * ONE_TOKEN, boundary - 1),
                Err(Error::DurationNotElapsed)
            );
            ledger.apply_unstake(accs.bob, 500 * ONE_TOKEN, boundary).unwrap();
            assert_eq!(ledger.get_stake_position(accs.bob).amount, 500 * ONE_TOKEN);
        }

        #[ink::test]
        fn zero_override_unlocks_immediately() {
            let accs = accounts();
            let mut ledger = deploy_configured();
            ledger.apply_stake(accs.bob, 1_000 * ONE_TOKEN, 0).unwrap();
            ledger.set_min_staking_duration_override(true, 0).unwrap();

            ledger.apply_unstake(accs.bob, 1_000 * ONE_TOKEN, 1).unwrap();
            assert_eq!(ledger.get_total_staked(), 0);
        }

        #[ink::test]
        fn disabling_override_restores_configured_duration() {
            let accs = accounts();
            let mut ledger = deploy_configured();
            ledger.apply_stake(accs.bob, 1_000 * ONE_TOKEN, 0).unwrap();
            ledger.set_min_staking_duration_override(true, 0).unwrap();
            ledger.set_min_staking_duration_override(false, 0).unwrap();

            assert_eq!(
                ledger.apply_unstake(accs.bob, 1_000 * ONE_TOKEN, 1),
                Err(Error::DurationNotElapsed)
            );
        }

        // ── User staking info ─────────────────────────────────────────────

        #[ink::test]
        fn staking_info_matches_tier_table() {
            let accs = accounts();
            let mut ledger = deploy_configured();

            // 1_000 tokens at $0.05 = $50 USD: tier 1, access granted,
            // still inside the duration gate.
            ledger.apply_stake(accs.bob, 1_000 * ONE_TOKEN, 0).unwrap();
            set_time(3_600_000);

            let (staked, usd_value, has_access, can_unstake) =
                ledger.get_user_staking_info(accs.bob).unwrap();
            assert_eq!(staked, 1_000 * ONE_TOKEN);
            assert_eq!(usd_value, 50 * PRICE_PRECISION);
            assert!(has_access);
            assert!(!can_unstake);
            assert_eq!(ledger.tier_of(usd_value), Some(1));
        }

        #[ink::test]
        fn staking_info_gains_unstake_right_after_duration() {
            let accs = accounts();
            let mut ledger = deploy_configured();
            ledger.apply_stake(accs.bob, 1_000 * ONE_TOKEN, 0).unwrap();

            set_time(ONE_DAY_MS);
            // Keep the feed fresh at the new time.
            set_caller(accs.django);
            ledger.submit_price(PRICE_5_CENTS).unwrap();

            let (_, _, _, can_unstake) = ledger.get_user_staking_info(accs.bob).unwrap();
            assert!(can_unstake);
        }

        #[ink::test]
        fn staking_info_small_position_has_no_access() {
            let accs = accounts();
            let mut ledger = deploy_configured();

            // 100 tokens at $0.05 = $5 USD: below the first threshold.
            ledger.apply_stake(accs.bob, 100 * ONE_TOKEN, 0).unwrap();
            let (_, usd_value, has_access, _) = ledger.get_user_staking_info(accs.bob).unwrap();
            assert_eq!(usd_value, 5 * PRICE_PRECISION);
            assert!(!has_access);
        }

        #[ink::test]
        fn staking_info_zero_position_is_sentinel() {
            let accs = accounts();
            let ledger = deploy();
            // No oracle configured at all, but a zero position never needs one.
            assert_eq!(
                ledger.get_user_staking_info(accs.bob),
                Ok((0, 0, false, false))
            );
        }

        #[ink::test]
        fn staking_info_refuses_stale_price() {
            let accs = accounts();
            let mut ledger = deploy_configured();
            ledger.apply_stake(accs.bob, 1_000 * ONE_TOKEN, 0).unwrap();

            set_time(10 * ONE_DAY_MS);
            assert_eq!(
                ledger.get_user_staking_info(accs.bob),
                Err(Error::OracleUnavailable)
            );
        }

        // ── Yield deployment bound ────────────────────────────────────────

        #[ink::test]
        fn deployment_delta_respects_ceiling() {
            let accs = accounts();
            let mut ledger = deploy_configured();
            ledger.set_yield_strategy(accs.frank).unwrap();
            ledger.set_yield_enabled(true).unwrap();

            ledger.apply_stake(accs.bob, 1_000 * ONE_TOKEN, 0).unwrap();
            // 50% ceiling on 1_000 staked.
            assert_eq!(ledger.yield_deployment_delta(), 500 * ONE_TOKEN);
        }

        #[ink::test]
        fn deployment_delta_zero_when_disabled_or_unwired() {
            let accs = accounts();
            let mut ledger = deploy_configured();
            ledger.apply_stake(accs.bob, 1_000 * ONE_TOKEN, 0).unwrap();

            // Disabled.
            assert_eq!(ledger.yield_deployment_delta(), 0);

            // Enabled but no strategy socket.
            ledger.set_yield_enabled(true).unwrap();
            assert_eq!(ledger.yield_deployment_delta(), 0);

            set_caller(accounts().alice);
            ledger.set_yield_strategy(accs.frank).unwrap();
            ledger.set_max_yield_deployment_bps(2_500).unwrap();
            assert_eq!(ledger.yield_deployment_delta(), 250 * ONE_TOKEN);
        }

        #[ink::test]
        fn deployment_bps_validated() {
            let mut ledger = deploy();
            assert_eq!(
                ledger.set_max_yield_deployment_bps(10_001),
                Err(Error::InvalidBps)
            );
        }

        // ── Message guards ────────────────────────────────────────────────

        #[ink::test]
        fn stake_requires_configuration() {
            let accs = accounts();
            let mut ledger = deploy();
            set_caller(accs.bob);

            assert_eq!(ledger.stake(0), Err(Error::ZeroAmount));
            assert_eq!(ledger.stake(ONE_TOKEN), Err(Error::StakingTokenNotSet));

            set_caller(accs.alice);
            ledger.set_staking_token(accs.eve).unwrap();
            set_caller(accs.bob);
            assert_eq!(ledger.stake(ONE_TOKEN), Err(Error::OracleNotSet));
        }

        #[ink::test]
        fn paused_ledger_rejects_stake_and_unstake() {
            let accs = accounts();
            let mut ledger = deploy_configured();
            ledger.set_paused(true).unwrap();

            set_caller(accs.bob);
            assert_eq!(ledger.stake(ONE_TOKEN), Err(Error::ContractPaused));
            assert_eq!(ledger.unstake(ONE_TOKEN), Err(Error::ContractPaused));
        }

        #[ink::test]
        fn contract_status_reflects_wiring() {
            let accs = accounts();
            let mut ledger = deploy();
            assert_eq!(ledger.get_contract_status(), (false, false, false, false, 3));

            ledger.set_staking_token(accs.eve).unwrap();
            ledger.set_primary_price_oracle(accs.django).unwrap();
            ledger.set_backup_price_oracle(accs.frank).unwrap();
            assert_eq!(ledger.get_contract_status(), (false, true, true, true, 3));

            ledger.set_paused(true).unwrap();
            assert_eq!(ledger.get_contract_status(), (true, true, true, true, 3));
        }

        #[ink::test]
        fn non_owner_cannot_configure() {
            let accs = accounts();
            let mut ledger = deploy();
            set_caller(accs.bob);

            assert_eq!(ledger.set_staking_token(accs.eve), Err(Error::NotOwner));
            assert_eq!(ledger.set_yield_enabled(true), Err(Error::NotOwner));
            assert_eq!(ledger.set_tiers([1].to_vec()), Err(Error::NotOwner));
            assert_eq!(
                ledger.set_min_staking_duration_override(true, 0),
                Err(Error::NotOwner)
            );
        }
    }
}
