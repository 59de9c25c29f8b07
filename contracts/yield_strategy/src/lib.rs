#![cfg_attr(not(feature = "std"), no_std, no_main)]

/// # Dr. Birdy Books — Yield Strategy
///
/// **Role:** Reserve vault and autonomous buyback-and-burn engine.
///
/// The vault accumulates the native reserve asset from two sources: its
/// share of the fee token's swap proceeds (`notify_reserve`, preceded by a
/// plain native transfer from the token) and direct payable deposits.  It
/// also custodies the share of pooled stake the Staking Ledger deploys.
///
/// ```text
///   [Fee Token] ──native + notify_reserve──► reserve_balance
///                                                 │  reserve ≥ min?
///                                                 ▼
///                                        execute_buyback()
///                                                 │
///                            router: native ──► $BIRDY ──► burn
/// ```
///
/// Reserve intake must never be blockable: every auto-buyback failure on
/// the intake path is swallowed and the reserve simply keeps accumulating
/// until a keeper calls `execute_buyback` directly.  Below the minimum the
/// buyback is a skip, not an error.
#[ink::contract]
mod birdy_yield_strategy {
    use ink::env::call::{build_call, ExecutionInput, Selector};

    // =========================================================================
    // CONSTANTS
    // =========================================================================

    /// Denominator for all basis-point calculations.
    pub const BPS_DENOMINATOR: u128 = 10_000;

    /// One whole unit of the native reserve asset (18 decimals).
    pub const ONE_NATIVE: u128 = 1_000_000_000_000_000_000;

    /// Default reserve level required before a buyback fires.
    pub const DEFAULT_MIN_BUYBACK_AMOUNT: u128 = ONE_NATIVE;

    /// Default share of the reserve spent per buyback (100%).
    pub const DEFAULT_BUYBACK_FRACTION_BPS: u128 = 10_000;

    // =========================================================================
    // STORAGE
    // =========================================================================

    #[ink(storage)]
    pub struct BirdyYieldStrategy {
        // ── Access control ────────────────────────────────────────────────
        owner: AccountId,

        // ── Sockets ───────────────────────────────────────────────────────
        /// The fee token this strategy buys back and burns.
        fee_token: Option<AccountId>,
        /// Exchange router used to swap native for the fee token.
        exchange_router: Option<AccountId>,
        /// Staking Ledger allowed to deploy and recall pooled stake.
        staking_contract: Option<AccountId>,

        // ── Reserve state ─────────────────────────────────────────────────
        /// Native reserve available for buybacks.
        reserve_balance: Balance,
        /// Reserve level required before a buyback fires.
        min_buyback_amount: Balance,
        /// Share of the reserve spent per buyback.
        buyback_fraction_bps: u128,
        /// Whether reserve intake triggers a buyback automatically.
        auto_buyback_enabled: bool,

        // ── Deployed stake ────────────────────────────────────────────────
        /// Staking-token custody deployed here by the Staking Ledger.
        deployed_stake: Balance,

        // ── Historical totals ─────────────────────────────────────────────
        /// Fee tokens bought back and burned, lifetime.
        total_burned: Balance,
        /// Native reserve received, lifetime.
        lifetime_reserve_received: Balance,
        /// Number of executed buybacks.
        buyback_count: u32,

        // ── Safety ────────────────────────────────────────────────────────
        /// Cleared by `pause`, restored by `unpause`.  An inactive strategy
        /// still accepts reserve deposits but never spends them.
        is_active: bool,
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    #[ink(event)]
    pub struct ReserveReceived {
        #[ink(topic)]
        from: AccountId,
        amount: Balance,
        reserve_after: Balance,
    }

    #[ink(event)]
    pub struct BuybackExecuted {
        #[ink(topic)]
        buyback_id: u32,
        reserve_spent: Balance,
        tokens_burned: Balance,
        total_burned: Balance,
    }

    /// Emitted when a buyback attempt did not run.
    #[ink(event)]
    pub struct BuybackSkipped {
        reason: SkipReason,
        reserve_balance: Balance,
    }

    #[ink(event)]
    pub struct StakeDeployed {
        amount: Balance,
        deployed_after: Balance,
    }

    #[ink(event)]
    pub struct StakeReleased {
        amount: Balance,
        deployed_after: Balance,
    }

    #[ink(event)]
    pub struct ActiveStateChanged {
        is_active: bool,
    }

    #[ink(event)]
    pub struct OwnershipTransferred {
        #[ink(topic)]
        previous: AccountId,
        #[ink(topic)]
        new: AccountId,
    }

    // =========================================================================
    // ENUMS
    // =========================================================================

    #[derive(Debug, PartialEq, Eq, Clone, scale::Encode, scale::Decode)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum SkipReason {
        /// Reserve is below `min_buyback_amount`.
        BelowMinimum,
        /// Strategy is paused.
        NotActive,
        /// Router or token socket missing, or the exchange call failed.
        ExchangeUnavailable,
    }

    // =========================================================================
    // ERRORS
    // =========================================================================

    #[derive(Debug, PartialEq, Eq, scale::Encode, scale::Decode)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        /// Caller is not the contract owner.
        NotOwner,
        /// Caller is not the registered Staking Ledger.
        NotStakingContract,
        /// Caller is not the registered fee token.
        NotFeeToken,
        /// Strategy is paused.
        NotActive,
        /// Router/token socket missing or the exchange call failed; the
        /// reserve is left intact for the next attempt.
        ExchangeUnavailable,
        /// Release amount exceeds the deployed-stake custody.
        InsufficientDeployedStake,
        /// A BPS parameter exceeds the 10_000 denominator.
        InvalidBps,
        /// An arithmetic operation overflowed.
        Overflow,
        /// A token transfer out of custody failed.
        TransferFailed,
    }

    // =========================================================================
    // IMPLEMENTATION
    // =========================================================================

    impl BirdyYieldStrategy {
        // ---------------------------------------------------------------------
        // Constructor
        // ---------------------------------------------------------------------

        #[ink(constructor)]
        pub fn new() -> Self {
            Self {
                owner: Self::env().caller(),
                fee_token: None,
                exchange_router: None,
                staking_contract: None,
                reserve_balance: 0,
                min_buyback_amount: DEFAULT_MIN_BUYBACK_AMOUNT,
                buyback_fraction_bps: DEFAULT_BUYBACK_FRACTION_BPS,
                auto_buyback_enabled: true,
                deployed_stake: 0,
                total_burned: 0,
                lifetime_reserve_received: 0,
                buyback_count: 0,
                is_active: true,
            }
        }

        // =====================================================================
        // RESERVE INTAKE
        // =====================================================================

        /// Deposit native reserve directly.  Open to anyone; the attached
        /// value is the deposit.
        #[ink(message, payable)]
        pub fn deposit_reserve(&mut self) -> Result<(), Error> {
            let amount = self.env().transferred_value();
            let from = self.env().caller();
            self.record_reserve(from, amount)
        }

        /// Reserve notification from the fee token, which pays by plain
        /// native transfer before calling.  Restricted so the reserve
        /// counter cannot be inflated by third parties.
        #[ink(message)]
        pub fn notify_reserve(&mut self, amount: Balance) -> Result<(), Error> {
            let caller = self.env().caller();
            let token = self.fee_token.ok_or(Error::NotFeeToken)?;
            if caller != token {
                return Err(Error::NotFeeToken);
            }
            self.record_reserve(caller, amount)
        }

        /// Credit the reserve and attempt an auto-buyback.  Intake never
        /// fails because of the buyback: every buyback error is reported
        /// as a `BuybackSkipped` event instead.
        fn record_reserve(&mut self, from: AccountId, amount: Balance) -> Result<(), Error> {
            self.reserve_balance = self
                .reserve_balance
                .checked_add(amount)
                .ok_or(Error::Overflow)?;
            self.lifetime_reserve_received =
                self.lifetime_reserve_received.saturating_add(amount);

            self.env().emit_event(ReserveReceived {
                from,
                amount,
                reserve_after: self.reserve_balance,
            });

            if self.auto_buyback_enabled {
                self.try_auto_buyback();
            }
            Ok(())
        }

        fn try_auto_buyback(&mut self) {
            if !self.is_active {
                self.env().emit_event(BuybackSkipped {
                    reason: SkipReason::NotActive,
                    reserve_balance: self.reserve_balance,
                });
                return;
            }
            if self.reserve_balance < self.min_buyback_amount {
                return;
            }
            if self.buyback_internal().is_err() {
                self.env().emit_event(BuybackSkipped {
                    reason: SkipReason::ExchangeUnavailable,
                    reserve_balance: self.reserve_balance,
                });
            }
        }

        // =====================================================================
        // BUYBACK
        // =====================================================================

        /// Keeper entry-point: run a buyback now.
        ///
        /// Returns the burned amount.  A reserve below the minimum is a
        /// no-op `Ok(0)` with a skip event, never an error; an unreachable
        /// exchange aborts atomically with the reserve intact.
        #[ink(message)]
        pub fn execute_buyback(&mut self) -> Result<Balance, Error> {
            if !self.is_active {
                return Err(Error::NotActive);
            }
            if self.reserve_balance < self.min_buyback_amount {
                self.env().emit_event(BuybackSkipped {
                    reason: SkipReason::BelowMinimum,
                    reserve_balance: self.reserve_balance,
                });
                return Ok(0);
            }
            self.buyback_internal()
        }

        /// Spend the configured reserve fraction buying the fee token, then
        /// burn everything acquired.
        fn buyback_internal(&mut self) -> Result<Balance, Error> {
            let token = self.fee_token.ok_or(Error::ExchangeUnavailable)?;
            let router = self.exchange_router.ok_or(Error::ExchangeUnavailable)?;

            let spend = self
                .reserve_balance
                .checked_mul(self.buyback_fraction_bps)
                .ok_or(Error::Overflow)?
                / BPS_DENOMINATOR;
            if spend == 0 {
                return Ok(0);
            }

            // Reserve is consumed before the external call and restored on
            // failure, so the operation is atomic either way.
            self.reserve_balance = self.reserve_balance.saturating_sub(spend);

            let bought = match self.buy_tokens_with_native(router, token, spend) {
                Ok(bought) => bought,
                Err(err) => {
                    self.reserve_balance = self.reserve_balance.saturating_add(spend);
                    return Err(err);
                }
            };

            self.burn_tokens(token, bought)?;

            self.total_burned = self
                .total_burned
                .checked_add(bought)
                .ok_or(Error::Overflow)?;
            self.buyback_count = self.buyback_count.saturating_add(1);

            self.env().emit_event(BuybackExecuted {
                buyback_id: self.buyback_count,
                reserve_spent: spend,
                tokens_burned: bought,
                total_burned: self.total_burned,
            });

            Ok(bought)
        }

        /// Swap `spend` native for the fee token through the router.
        /// Returns the token amount credited to this contract.
        fn buy_tokens_with_native(&self, router: AccountId, token: AccountId, spend: Balance) -> Result<Balance, Error> {
            let result = build_call::<ink::env::DefaultEnvironment>()
                .call(router)
                .transferred_value(spend)
                .exec_input(
                    ExecutionInput::new(Selector::new(ink::selector_bytes!(
                        "swap_native_for_exact_tokens"
                    )))
                    .push_arg(&token),
                )
                .returns::<core::result::Result<Balance, Error>>()
                .try_invoke();

            match result {
                Ok(Ok(Ok(bought))) => Ok(bought),
                _ => Err(Error::ExchangeUnavailable),
            }
        }

        /// Remove bought tokens from circulating supply.
        fn burn_tokens(&self, token: AccountId, amount: Balance) -> Result<(), Error> {
            let result = build_call::<ink::env::DefaultEnvironment>()
                .call(token)
                .exec_input(
                    ExecutionInput::new(Selector::new(ink::selector_bytes!("burn")))
                        .push_arg(&amount),
                )
                .returns::<core::result::Result<(), Error>>()
                .try_invoke();

            match result {
                Ok(Ok(Ok(()))) => Ok(()),
                _ => Err(Error::TransferFailed),
            }
        }

        // =====================================================================
        // DEPLOYED STAKE CUSTODY
        // =====================================================================

        /// Sync notification after the Staking Ledger moved pool stake into
        /// this vault's token balance.
        #[ink(message)]
        pub fn notify_stake_deployed(&mut self, amount: Balance) -> Result<(), Error> {
            self.only_staking_contract()?;
            self.deployed_stake = self
                .deployed_stake
                .checked_add(amount)
                .ok_or(Error::Overflow)?;
            self.env().emit_event(StakeDeployed {
                amount,
                deployed_after: self.deployed_stake,
            });
            Ok(())
        }

        /// Return `amount` of deployed stake to the Staking Ledger so it
        /// can cover an unstake.
        #[ink(message)]
        pub fn release_stake(&mut self, amount: Balance) -> Result<(), Error> {
            let staking = self.only_staking_contract()?;
            if amount > self.deployed_stake {
                return Err(Error::InsufficientDeployedStake);
            }
            let token = self.fee_token.ok_or(Error::TransferFailed)?;

            self.deployed_stake = self.deployed_stake.saturating_sub(amount);

            self.transfer_tokens(token, staking, amount)?;

            self.env().emit_event(StakeReleased {
                amount,
                deployed_after: self.deployed_stake,
            });
            Ok(())
        }

        fn transfer_tokens(&self, token: AccountId, to: AccountId, amount: Balance) -> Result<(), Error> {
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

        // =====================================================================
        // VIEW FUNCTIONS
        // =====================================================================

        #[ink(message)]
        pub fn get_reserve_balance(&self) -> Balance { self.reserve_balance }

        #[ink(message)]
        pub fn get_min_buyback_amount(&self) -> Balance { self.min_buyback_amount }

        #[ink(message)]
        pub fn get_buyback_fraction_bps(&self) -> u128 { self.buyback_fraction_bps }

        #[ink(message)]
        pub fn is_auto_buyback_enabled(&self) -> bool { self.auto_buyback_enabled }

        #[ink(message)]
        pub fn is_active(&self) -> bool { self.is_active }

        #[ink(message)]
        pub fn get_total_burned(&self) -> Balance { self.total_burned }

        #[ink(message)]
        pub fn get_lifetime_reserve_received(&self) -> Balance { self.lifetime_reserve_received }

        #[ink(message)]
        pub fn get_buyback_count(&self) -> u32 { self.buyback_count }

        #[ink(message)]
        pub fn get_deployed_stake(&self) -> Balance { self.deployed_stake }

        #[ink(message)]
        pub fn get_staking_contract(&self) -> Option<AccountId> { self.staking_contract }

        #[ink(message)]
        pub fn get_fee_token(&self) -> Option<AccountId> { self.fee_token }

        #[ink(message)]
        pub fn get_exchange_router(&self) -> Option<AccountId> { self.exchange_router }

        #[ink(message)]
        pub fn get_owner(&self) -> AccountId { self.owner }

        // =====================================================================
        // ADMIN
        // =====================================================================

        #[ink(message)]
        pub fn set_staking_contract(&mut self, staking: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            self.staking_contract = Some(staking);
            Ok(())
        }

        #[ink(message)]
        pub fn set_fee_token(&mut self, token: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            self.fee_token = Some(token);
            Ok(())
        }

        #[ink(message)]
        pub fn set_exchange_router(&mut self, router: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            self.exchange_router = Some(router);
            Ok(())
        }

        #[ink(message)]
        pub fn set_auto_buyback_enabled(&mut self, enabled: bool) -> Result<(), Error> {
            self.only_owner()?;
            self.auto_buyback_enabled = enabled;
            Ok(())
        }

        #[ink(message)]
        pub fn set_min_buyback_amount(&mut self, amount: Balance) -> Result<(), Error> {
            self.only_owner()?;
            self.min_buyback_amount = amount;
            Ok(())
        }

        #[ink(message)]
        pub fn set_buyback_fraction_bps(&mut self, bps: u128) -> Result<(), Error> {
            self.only_owner()?;
            if bps > BPS_DENOMINATOR {
                return Err(Error::InvalidBps);
            }
            self.buyback_fraction_bps = bps;
            Ok(())
        }

        #[ink(message)]
        pub fn pause(&mut self) -> Result<(), Error> {
            self.only_owner()?;
            self.is_active = false;
            self.env().emit_event(ActiveStateChanged { is_active: false });
            Ok(())
        }

        #[ink(message)]
        pub fn unpause(&mut self) -> Result<(), Error> {
            self.only_owner()?;
            self.is_active = true;
            self.env().emit_event(ActiveStateChanged { is_active: true });
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
        // ACCESS CONTROL
        // =====================================================================

        fn only_owner(&self) -> Result<(), Error> {
            if self.env().caller() != self.owner {
                return Err(Error::NotOwner);
            }
            Ok(())
        }

        fn only_staking_contract(&self) -> Result<AccountId, Error> {
            let staking = self.staking_contract.ok_or(Error::NotStakingContract)?;
            if self.env().caller() != staking {
                return Err(Error::NotStakingContract);
            }
            Ok(staking)
        }
    }

    // =========================================================================
    // UNIT TESTS
    // =========================================================================

}
