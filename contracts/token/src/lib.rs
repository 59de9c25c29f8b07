#![cfg_attr(not(feature = "std"), no_std, no_main)]

/// # Dr. Birdy Books — Fee Token
///
/// **Role:** Ground-truth ledger and fee engine for the $BIRDY token.
///
/// Every transfer between non-excluded parties pays a flat basis-point fee
/// into the contract's own custodial balance.  Once the accumulated fee
/// balance reaches `swap_threshold`, the transfer that crossed the line
/// triggers a synchronous swap step: the accumulated tokens are sold for
/// the native reserve asset through the exchange router, and the proceeds
/// are split between the Yield Strategy vault and the marketing wallet.
///
/// ```text
/// TRANSFER (fee_bps = 200):
///   sender ──────────────► receiver          98.0%
///       └──► contract custodial balance       2.0%
///
/// SWAP STEP (accumulated ≥ swap_threshold):
///   accumulated $BIRDY ──router──► native proceeds
///       ├── yield_strategy_fee_bps / 10_000 ──► Yield Strategy vault
///       └── remainder ───────────────────────► marketing wallet
/// ```
///
/// The swap step is guarded by `swap_in_progress`: selling through the
/// router moves this very token, so the nested `transfer_from` the router
/// performs re-enters the ledger mid-swap.  The guard lets those nested
/// transfers succeed while preventing a second swap from firing before the
/// first completes.  A failed swap leaves the fee balance accumulated for
/// the next attempt; the carrying transfer itself never fails because of
/// the swap.
#[ink::contract]
mod birdy_token {
    use ink::prelude::string::String;
    use ink::storage::Mapping;
    use ink::env::call::{build_call, ExecutionInput, Selector};

    // =========================================================================
    // CONSTANTS
    // =========================================================================

    /// Denominator for all basis-point calculations.
    pub const BPS_DENOMINATOR: u128 = 10_000;

    /// Transfer fee in BPS (2.00%).
    pub const DEFAULT_FEE_BPS: u128 = 200;

    /// Hard ceiling on the configurable transfer fee (10.00%).
    pub const MAX_FEE_BPS: u128 = 1_000;

    /// One whole $BIRDY in base units (18 decimals).
    pub const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

    /// Default accumulated-fee level that triggers the swap step.
    pub const DEFAULT_SWAP_THRESHOLD: u128 = 10_000 * ONE_TOKEN;

    /// Default share of swap proceeds routed to the Yield Strategy (50%).
    pub const DEFAULT_YIELD_STRATEGY_FEE_BPS: u128 = 5_000;

    // =========================================================================
    // STORAGE
    // =========================================================================

    #[ink(storage)]
    pub struct DrBirdyBooks {
        // ── Token metadata ────────────────────────────────────────────────
        name: String,
        symbol: String,
        decimals: u8,
        total_supply: Balance,

        // ── Ledger ────────────────────────────────────────────────────────
        balances: Mapping<AccountId, Balance>,
        allowances: Mapping<(AccountId, AccountId), Balance>,

        // ── Access control ────────────────────────────────────────────────
        owner: AccountId,

        // ── Fee engine ────────────────────────────────────────────────────
        /// Transfer fee in BPS applied between non-excluded parties.
        fee_bps: u128,
        /// Accounts that move tokens without fee extraction.
        /// The contract itself must always be a member, or the swap step's
        /// own token movements would be taxed again.
        fee_excluded: Mapping<AccountId, bool>,
        /// Fee tokens held by the contract awaiting the swap step.
        accumulated_fee_balance: Balance,
        /// Accumulated-fee level that triggers the swap step.
        swap_threshold: Balance,
        /// Reentrancy guard for the swap step.
        swap_in_progress: bool,
        /// Share of swap proceeds routed to the Yield Strategy (0..=10_000).
        yield_strategy_fee_bps: u128,

        // ── Trading gate ──────────────────────────────────────────────────
        /// Until trading is enabled, only pre-launch authorized parties may
        /// move tokens (deployer funding the vesting pool, seeding the DEX).
        trading_enabled: bool,
        pre_launch_authorized: Mapping<AccountId, bool>,

        // ── Sockets ───────────────────────────────────────────────────────
        /// Exchange router used to sell accumulated fees for native.
        exchange_router: Option<AccountId>,
        /// Yield Strategy vault receiving its share of swap proceeds.
        yield_strategy: Option<AccountId>,
        /// Treasury wallet receiving the remainder of swap proceeds.
        marketing_wallet: AccountId,

        // ── Historical totals ─────────────────────────────────────────────
        /// Tokens permanently removed from supply via `burn`.
        total_burned: Balance,
        /// Cumulative native proceeds routed by the swap step, lifetime.
        lifetime_fees_routed: Balance,

        // ── Safety ────────────────────────────────────────────────────────
        paused: bool,
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    #[ink(event)]
    pub struct Transfer {
        #[ink(topic)]
        from: Option<AccountId>,
        #[ink(topic)]
        to: Option<AccountId>,
        value: Balance,
    }

    #[ink(event)]
    pub struct Approval {
        #[ink(topic)]
        owner: AccountId,
        #[ink(topic)]
        spender: AccountId,
        value: Balance,
    }

    /// Emitted for every fee extraction on a taxed transfer.
    #[ink(event)]
    pub struct FeeCollected {
        #[ink(topic)]
        from: AccountId,
        fee: Balance,
        accumulated: Balance,
    }

    /// Emitted when the swap step converts accumulated fees and routes the
    /// native proceeds.
    #[ink(event)]
    pub struct FeesRouted {
        tokens_swapped: Balance,
        to_yield_strategy: Balance,
        to_marketing: Balance,
    }

    /// Emitted when a threshold crossing could not run the swap step.
    #[ink(event)]
    pub struct SwapSkipped {
        reason: SwapSkipReason,
        accumulated: Balance,
    }

    #[ink(event)]
    pub struct TradingEnabled {
        block: u32,
    }

    #[ink(event)]
    pub struct FeeExclusionUpdated {
        #[ink(topic)]
        account: AccountId,
        excluded: bool,
    }

    #[ink(event)]
    pub struct YieldStrategyUpdated {
        #[ink(topic)]
        strategy: AccountId,
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
    pub enum SwapSkipReason {
        SwapInProgress,
        RouterNotConfigured,
        ExchangeCallFailed,
    }

    // =========================================================================
    // ERRORS
    // =========================================================================

    #[derive(Debug, PartialEq, Eq, scale::Encode, scale::Decode)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        /// Caller is not the contract owner.
        NotOwner,
        /// Trading has not been enabled and neither party is pre-launch
        /// authorized.
        TradingDisabled,
        /// Sender's balance is insufficient.
        InsufficientBalance,
        /// Spender's allowance is insufficient.
        InsufficientAllowance,
        /// An arithmetic operation overflowed.
        Overflow,
        /// Requested fee exceeds `MAX_FEE_BPS`.
        FeeTooHigh,
        /// A BPS parameter exceeds the 10_000 denominator.
        InvalidBps,
        /// The swap step is already running.
        SwapInProgress,
        /// Accumulated fees are below the swap threshold.
        BelowSwapThreshold,
        /// No exchange router is configured, or the router call failed.
        /// The fee balance remains accumulated for the next attempt.
        ExchangeUnavailable,
        /// A native value transfer failed.
        TransferFailed,
        /// Contract is paused.
        ContractPaused,
    }

    // =========================================================================
    // IMPLEMENTATION
    // =========================================================================

    impl DrBirdyBooks {
        // ---------------------------------------------------------------------
        // Constructor
        // ---------------------------------------------------------------------

        /// Deploy the fee token.
        ///
        /// Mints `initial_supply` entirely to the deployer.  The deployer,
        /// the marketing wallet, and the contract itself start fee-excluded;
        /// the deployer and the contract start pre-launch authorized so the
        /// vesting pool and the DEX can be funded before trading opens.
        #[ink(constructor)]
        pub fn new(initial_supply: Balance, name: String, symbol: String, marketing_wallet: AccountId) -> Self {
            let caller = Self::env().caller();
            let contract = Self::env().account_id();

            let mut balances = Mapping::default();
            balances.insert(caller, &initial_supply);

            let mut fee_excluded = Mapping::default();
            fee_excluded.insert(caller, &true);
            fee_excluded.insert(contract, &true);
            fee_excluded.insert(marketing_wallet, &true);

            let mut pre_launch_authorized = Mapping::default();
            pre_launch_authorized.insert(caller, &true);
            pre_launch_authorized.insert(contract, &true);

            Self::env().emit_event(Transfer {
                from: None,
                to: Some(caller),
                value: initial_supply,
            });

            Self {
                name,
                symbol,
                decimals: 18,
                total_supply: initial_supply,
                balances,
                allowances: Mapping::default(),
                owner: caller,
                fee_bps: DEFAULT_FEE_BPS,
                fee_excluded,
                accumulated_fee_balance: 0,
                swap_threshold: DEFAULT_SWAP_THRESHOLD,
                swap_in_progress: false,
                yield_strategy_fee_bps: DEFAULT_YIELD_STRATEGY_FEE_BPS,
                trading_enabled: false,
                pre_launch_authorized,
                exchange_router: None,
                yield_strategy: None,
                marketing_wallet,
                total_burned: 0,
                lifetime_fees_routed: 0,
                paused: false,
            }
        }

        // =====================================================================
        // TOKEN INTERFACE
        // =====================================================================

        #[ink(message)]
        pub fn total_supply(&self) -> Balance { self.total_supply }

        #[ink(message)]
        pub fn balance_of(&self, account: AccountId) -> Balance {
            self.balances.get(account).unwrap_or(0)
        }

        #[ink(message)]
        pub fn allowance(&self, owner: AccountId, spender: AccountId) -> Balance {
            self.allowances.get((owner, spender)).unwrap_or(0)
        }

        #[ink(message)]
        pub fn transfer(&mut self, to: AccountId, value: Balance) -> Result<(), Error> {
            let from = self.env().caller();
            self.transfer_impl(from, to, value)
        }

        #[ink(message)]
        pub fn approve(&mut self, spender: AccountId, value: Balance) -> Result<(), Error> {
            let owner = self.env().caller();
            self.allowances.insert((owner, spender), &value);
            self.env().emit_event(Approval { owner, spender, value });
            Ok(())
        }

        #[ink(message)]
        pub fn transfer_from(&mut self, from: AccountId, to: AccountId, value: Balance) -> Result<(), Error> {
            let caller = self.env().caller();
            let current_allowance = self.allowance(from, caller);
            if current_allowance < value {
                return Err(Error::InsufficientAllowance);
            }
            self.allowances
                .insert((from, caller), &current_allowance.saturating_sub(value));
            self.transfer_impl(from, to, value)
        }

        /// Permanently remove `value` tokens from the caller's balance and
        /// from circulating supply.  The Yield Strategy finalizes every
        /// buyback through this message.
        #[ink(message)]
        pub fn burn(&mut self, value: Balance) -> Result<(), Error> {
            let caller = self.env().caller();
            self.debit_balance(caller, value)?;
            self.total_supply = self.total_supply.saturating_sub(value);
            self.total_burned = self
                .total_burned
                .checked_add(value)
                .ok_or(Error::Overflow)?;
            self.env().emit_event(Transfer {
                from: Some(caller),
                to: None,
                value,
            });
            Ok(())
        }

        // =====================================================================
        // FEE ENGINE
        // =====================================================================

        /// Shared transfer path for `transfer` and `transfer_from`.
        ///
        /// Fee routing:
        /// - either party fee-excluded: the full `value` moves unmodified;
        /// - otherwise `fee = value × fee_bps / 10_000` is credited to the
        ///   contract's custodial balance and `value − fee` to the receiver.
        ///
        /// After crediting, a threshold crossing triggers the swap step.
        /// Swap failures are recorded as a `SwapSkipped` event and never
        /// propagate into the transfer result.
        fn transfer_impl(&mut self, from: AccountId, to: AccountId, value: Balance) -> Result<(), Error> {
            self.assert_not_paused()?;
            self.assert_trading_open(from, to)?;

            if self.is_fee_excluded(from) || self.is_fee_excluded(to) {
                self.debit_balance(from, value)?;
                self.credit_balance(to, value)?;
                self.env().emit_event(Transfer {
                    from: Some(from),
                    to: Some(to),
                    value,
                });
                return Ok(());
            }

            let fee = value
                .checked_mul(self.fee_bps)
                .ok_or(Error::Overflow)?
                .checked_div(BPS_DENOMINATOR)
                .ok_or(Error::Overflow)?;
            let net_amount = value.saturating_sub(fee);

            self.debit_balance(from, value)?;

            let contract = self.env().account_id();
            self.credit_balance(contract, fee)?;
            self.accumulated_fee_balance = self
                .accumulated_fee_balance
                .checked_add(fee)
                .ok_or(Error::Overflow)?;

            self.credit_balance(to, net_amount)?;

            self.env().emit_event(Transfer {
                from: Some(from),
                to: Some(to),
                value: net_amount,
            });
            self.env().emit_event(FeeCollected {
                from,
                fee,
                accumulated: self.accumulated_fee_balance,
            });

            self.maybe_swap_accumulated_fees();
            Ok(())
        }

        /// Run the swap step if the threshold is crossed and no swap is
        /// already in flight.  Called at the tail of every taxed transfer.
        fn maybe_swap_accumulated_fees(&mut self) {
            if self.accumulated_fee_balance < self.swap_threshold {
                return;
            }
            if self.swap_in_progress {
                self.env().emit_event(SwapSkipped {
                    reason: SwapSkipReason::SwapInProgress,
                    accumulated: self.accumulated_fee_balance,
                });
                return;
            }
            if self.swap_and_liquify().is_err() {
                let reason = if self.exchange_router.is_none() {
                    SwapSkipReason::RouterNotConfigured
                } else {
                    SwapSkipReason::ExchangeCallFailed
                };
                self.env().emit_event(SwapSkipped {
                    reason,
                    accumulated: self.accumulated_fee_balance,
                });
            }
        }

        /// Keeper entry-point: run the swap step explicitly, surfacing the
        /// failure reasons that `transfer` deliberately swallows.
        #[ink(message)]
        pub fn trigger_swap(&mut self) -> Result<Balance, Error> {
            self.assert_not_paused()?;
            if self.accumulated_fee_balance < self.swap_threshold {
                return Err(Error::BelowSwapThreshold);
            }
            self.swap_and_liquify()
        }

        /// Sell the accumulated fee balance for native and split the
        /// proceeds between the Yield Strategy and the marketing wallet.
        ///
        /// Reentrancy: the router's sell pulls this token via
        /// `transfer_from`, re-entering the ledger while `swap_in_progress`
        /// is set; nested transfers succeed but cannot trigger a second
        /// swap.  On any failure the fee balance is left untouched.
        fn swap_and_liquify(&mut self) -> Result<Balance, Error> {
            if self.swap_in_progress {
                return Err(Error::SwapInProgress);
            }
            let router = self.exchange_router.ok_or(Error::ExchangeUnavailable)?;
            let amount = self.accumulated_fee_balance;

            self.swap_in_progress = true;
            let sold = self.sell_tokens_for_native(router, amount);
            self.swap_in_progress = false;

            let proceeds = match sold {
                Ok(proceeds) => proceeds,
                Err(err) => return Err(err),
            };

            // Fee balance is consumed only once the sell has succeeded.
            self.accumulated_fee_balance = 0;

            let to_yield = match self.yield_strategy {
                Some(_) => proceeds
                    .checked_mul(self.yield_strategy_fee_bps)
                    .ok_or(Error::Overflow)?
                    .checked_div(BPS_DENOMINATOR)
                    .ok_or(Error::Overflow)?,
                None => 0,
            };
            let to_marketing = proceeds.saturating_sub(to_yield);

            if let Some(strategy) = self.yield_strategy {
                if to_yield > 0 {
                    self.env()
                        .transfer(strategy, to_yield)
                        .map_err(|_| Error::TransferFailed)?;
                    self.notify_yield_strategy(strategy, to_yield);
                }
            }
            if to_marketing > 0 {
                self.env()
                    .transfer(self.marketing_wallet, to_marketing)
                    .map_err(|_| Error::TransferFailed)?;
            }

            self.lifetime_fees_routed = self.lifetime_fees_routed.saturating_add(proceeds);

            self.env().emit_event(FeesRouted {
                tokens_swapped: amount,
                to_yield_strategy: to_yield,
                to_marketing,
            });

            Ok(proceeds)
        }

        /// Approve and call the router to sell `amount` fee tokens for
        /// native.  Returns the native proceeds credited to this contract.
        fn sell_tokens_for_native(&mut self, router: AccountId, amount: Balance) -> Result<Balance, Error> {
            let contract = self.env().account_id();
            self.allowances.insert((contract, router), &amount);

            let result = build_call::<ink::env::DefaultEnvironment>()
                .call(router)
                .exec_input(
                    ExecutionInput::new(Selector::new(ink::selector_bytes!(
                        "swap_exact_tokens_for_native"
                    )))
                    .push_arg(&contract)
                    .push_arg(&amount),
                )
                .returns::<core::result::Result<Balance, Error>>()
                .try_invoke();

            match result {
                Ok(Ok(Ok(proceeds))) => Ok(proceeds),
                _ => {
                    // Withdraw the approval so an aborted swap leaves no
                    // standing allowance on the router.
                    self.allowances.insert((contract, router), &0);
                    Err(Error::ExchangeUnavailable)
                }
            }
        }

        /// Best-effort reserve notification; the strategy's intake must
        /// never be able to block fee routing.
        fn notify_yield_strategy(&self, strategy: AccountId, amount: Balance) {
            let _ = build_call::<ink::env::DefaultEnvironment>()
                .call(strategy)
                .exec_input(
                    ExecutionInput::new(Selector::new(ink::selector_bytes!("notify_reserve")))
                        .push_arg(&amount),
                )
                .returns::<core::result::Result<(), Error>>()
                .try_invoke();
        }

        // =====================================================================
        // VIEW FUNCTIONS
        // =====================================================================

        #[ink(message)]
        pub fn name(&self) -> String { self.name.clone() }

        #[ink(message)]
        pub fn symbol(&self) -> String { self.symbol.clone() }

        #[ink(message)]
        pub fn decimals(&self) -> u8 { self.decimals }

        #[ink(message)]
        pub fn get_fee_bps(&self) -> u128 { self.fee_bps }

        #[ink(message)]
        pub fn is_fee_excluded(&self, account: AccountId) -> bool {
            self.fee_excluded.get(account).unwrap_or(false)
        }

        #[ink(message)]
        pub fn get_accumulated_fee_balance(&self) -> Balance { self.accumulated_fee_balance }

        #[ink(message)]
        pub fn get_swap_threshold(&self) -> Balance { self.swap_threshold }

        #[ink(message)]
        pub fn is_swap_in_progress(&self) -> bool { self.swap_in_progress }

        #[ink(message)]
        pub fn get_yield_strategy_fee_bps(&self) -> u128 { self.yield_strategy_fee_bps }

        #[ink(message)]
        pub fn is_trading_enabled(&self) -> bool { self.trading_enabled }

        #[ink(message)]
        pub fn is_pre_launch_authorized(&self, account: AccountId) -> bool {
            self.pre_launch_authorized.get(account).unwrap_or(false)
        }

        #[ink(message)]
        pub fn get_exchange_router(&self) -> Option<AccountId> { self.exchange_router }

        #[ink(message)]
        pub fn get_yield_strategy(&self) -> Option<AccountId> { self.yield_strategy }

        #[ink(message)]
        pub fn get_marketing_wallet(&self) -> AccountId { self.marketing_wallet }

        #[ink(message)]
        pub fn get_total_burned(&self) -> Balance { self.total_burned }

        #[ink(message)]
        pub fn get_lifetime_fees_routed(&self) -> Balance { self.lifetime_fees_routed }

        #[ink(message)]
        pub fn get_owner(&self) -> AccountId { self.owner }

        #[ink(message)]
        pub fn is_paused(&self) -> bool { self.paused }

        // =====================================================================
        // ADMIN
        // =====================================================================

        #[ink(message)]
        pub fn set_fee_bps(&mut self, fee_bps: u128) -> Result<(), Error> {
            self.only_owner()?;
            if fee_bps > MAX_FEE_BPS {
                return Err(Error::FeeTooHigh);
            }
            self.fee_bps = fee_bps;
            Ok(())
        }

        #[ink(message)]
        pub fn set_swap_threshold(&mut self, threshold: Balance) -> Result<(), Error> {
            self.only_owner()?;
            self.swap_threshold = threshold;
            Ok(())
        }

        #[ink(message)]
        pub fn set_yield_strategy_fee_bps(&mut self, bps: u128) -> Result<(), Error> {
            self.only_owner()?;
            if bps > BPS_DENOMINATOR {
                return Err(Error::InvalidBps);
            }
            self.yield_strategy_fee_bps = bps;
            Ok(())
        }

        #[ink(message)]
        pub fn set_fee_excluded(&mut self, account: AccountId, excluded: bool) -> Result<(), Error> {
            self.only_owner()?;
            self.fee_excluded.insert(account, &excluded);
            self.env().emit_event(FeeExclusionUpdated { account, excluded });
            Ok(())
        }

        /// Register the Yield Strategy vault.  The strategy is fee-excluded
        /// at the same time: routing fees through a taxed address would
        /// extract fee-on-fee.
        #[ink(message)]
        pub fn set_yield_strategy(&mut self, strategy: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            self.yield_strategy = Some(strategy);
            self.fee_excluded.insert(strategy, &true);
            self.env().emit_event(YieldStrategyUpdated { strategy });
            Ok(())
        }

        #[ink(message)]
        pub fn set_exchange_router(&mut self, router: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            self.exchange_router = Some(router);
            Ok(())
        }

        #[ink(message)]
        pub fn set_marketing_wallet(&mut self, wallet: AccountId) -> Result<(), Error> {
            self.only_owner()?;
            self.marketing_wallet = wallet;
            self.fee_excluded.insert(wallet, &true);
            Ok(())
        }

        /// One-way switch: trading cannot be disabled again once opened.
        #[ink(message)]
        pub fn enable_trading(&mut self) -> Result<(), Error> {
            self.only_owner()?;
            self.trading_enabled = true;
            self.env().emit_event(TradingEnabled {
                block: self.env().block_number(),
            });
            Ok(())
        }

        #[ink(message)]
        pub fn set_pre_launch_authorized(&mut self, account: AccountId, authorized: bool) -> Result<(), Error> {
            self.only_owner()?;
            self.pre_launch_authorized.insert(account, &authorized);
            Ok(())
        }

        #[ink(message)]
        pub fn set_paused(&mut self, paused: bool) -> Result<(), Error> {
            self.only_owner()?;
            self.paused = paused;
            Ok(())
        }

        /// Hand the owner role to a new account.  Run post-deployment wiring
        /// first, then rotate ownership to the timelock governor so every
        /// further setter call must pass the delay gate.
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

        fn assert_trading_open(&self, from: AccountId, to: AccountId) -> Result<(), Error> {
            if self.trading_enabled {
                return Ok(());
            }
            let from_authorized = self.pre_launch_authorized.get(from).unwrap_or(false);
            let to_authorized = self.pre_launch_authorized.get(to).unwrap_or(false);
            if from_authorized || to_authorized {
                Ok(())
            } else {
                Err(Error::TradingDisabled)
            }
        }

        fn debit_balance(&mut self, account: AccountId, amount: Balance) -> Result<(), Error> {
            let balance = self.balances.get(account).unwrap_or(0);
            if balance < amount {
                return Err(Error::InsufficientBalance);
            }
            self.balances.insert(account, &balance.saturating_sub(amount));
            Ok(())
        }

        fn credit_balance(&mut self, account: AccountId, amount: Balance) -> Result<(), Error> {
            let balance = self.balances.get(account).unwrap_or(0);
            let new_balance = balance.checked_add(amount).ok_or(Error::Overflow)?;
            self.balances.insert(account, &new_balance);
            Ok(())
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
    }

    // =========================================================================
    // UNIT TESTS
    // =========================================================================

    #[cfg(test)]
    mod tests {
        use super::*;
        use ink::env::{test, DefaultEnvironment};

        type Env = DefaultEnvironment;

        fn accounts() -> test::DefaultAccounts<Env> { test::default_accounts::<Env>() }
        fn set_caller(a: AccountId) { test::set_caller::<Env>(a); }

        const SUPPLY: Balance = 1_000_000 * ONE_TOKEN;

        fn deploy() -> DrBirdyBooks {
            let accs = accounts();
            set_caller(accs.alice);
            DrBirdyBooks::new(SUPPLY, "Dr. Birdy Books".into(), "BIRDY".into(), accs.frank)
        }

        /// Deploy, open trading, and hand bob a working balance so taxed
        /// transfers between non-excluded parties can be exercised.
        fn deploy_and_launch() -> DrBirdyBooks {
            let accs = accounts();
            let mut token = deploy();
            token.enable_trading().unwrap();
            // alice is fee-excluded, so funding bob is untaxed.
            token.transfer(accs.bob, 100_000 * ONE_TOKEN).unwrap();
            token
        }

        fn contract_id() -> AccountId {
            ink::env::test::callee::<Env>()
        }

        // ── Fee extraction ────────────────────────────────────────────────

        #[ink::test]
        fn taxed_transfer_extracts_two_percent() {
            let accs = accounts();
            let mut token = deploy_and_launch();

            set_caller(accs.bob);
            token.transfer(accs.charlie, 1_000 * ONE_TOKEN).unwrap();

            // fee_bps = 200: receiver gets 980, contract accrues 20.
            assert_eq!(token.balance_of(accs.charlie), 980 * ONE_TOKEN);
            assert_eq!(token.get_accumulated_fee_balance(), 20 * ONE_TOKEN);
            assert_eq!(token.balance_of(contract_id()), 20 * ONE_TOKEN);
        }

        #[ink::test]
        fn taxed_transfer_conserves_supply() {
            let accs = accounts();
            let mut token = deploy_and_launch();

            set_caller(accs.bob);
            token.transfer(accs.charlie, 12_345 * ONE_TOKEN).unwrap();

            let sum = token.balance_of(accs.alice)
                + token.balance_of(accs.bob)
                + token.balance_of(accs.charlie)
                + token.balance_of(contract_id());
            assert_eq!(sum, SUPPLY);
        }

        #[ink::test]
        fn excluded_sender_pays_no_fee() {
            let accs = accounts();
            let mut token = deploy_and_launch();

            // alice was excluded at construction.
            set_caller(accs.alice);
            token.transfer(accs.charlie, 1_000 * ONE_TOKEN).unwrap();
            assert_eq!(token.balance_of(accs.charlie), 1_000 * ONE_TOKEN);
            assert_eq!(token.get_accumulated_fee_balance(), 0);
        }

        #[ink::test]
        fn excluded_receiver_pays_no_fee() {
            let accs = accounts();
            let mut token = deploy_and_launch();
            set_caller(accs.alice);
            token.set_fee_excluded(accs.django, true).unwrap();

            set_caller(accs.bob);
            token.transfer(accs.django, 500 * ONE_TOKEN).unwrap();
            assert_eq!(token.balance_of(accs.django), 500 * ONE_TOKEN);
            assert_eq!(token.get_accumulated_fee_balance(), 0);
        }

        // ── Swap threshold ────────────────────────────────────────────────

        #[ink::test]
        fn threshold_crossing_without_router_leaves_fees_accumulated() {
            let accs = accounts();
            let mut token = deploy_and_launch();
            set_caller(accs.alice);
            // Lower the threshold so a single taxed transfer crosses it.
            token.set_swap_threshold(10 * ONE_TOKEN).unwrap();

            set_caller(accs.bob);
            token.transfer(accs.charlie, 1_000 * ONE_TOKEN).unwrap();

            // No router socket: the swap is skipped, the transfer succeeds,
            // and the 20-token fee stays accumulated for the next attempt.
            assert_eq!(token.get_accumulated_fee_balance(), 20 * ONE_TOKEN);
            assert!(!token.is_swap_in_progress());
            assert_eq!(token.balance_of(accs.charlie), 980 * ONE_TOKEN);
        }

        #[ink::test]
        fn trigger_swap_below_threshold_is_rejected() {
            let accs = accounts();
            let mut token = deploy_and_launch();
            set_caller(accs.bob);
            token.transfer(accs.charlie, 1_000 * ONE_TOKEN).unwrap();
            assert_eq!(token.trigger_swap(), Err(Error::BelowSwapThreshold));
        }

        #[ink::test]
        fn trigger_swap_without_router_reports_exchange_unavailable() {
            let accs = accounts();
            let mut token = deploy_and_launch();
            set_caller(accs.alice);
            token.set_swap_threshold(10 * ONE_TOKEN).unwrap();
            set_caller(accs.bob);
            token.transfer(accs.charlie, 1_000 * ONE_TOKEN).unwrap();

            assert_eq!(token.trigger_swap(), Err(Error::ExchangeUnavailable));
            assert_eq!(token.get_accumulated_fee_balance(), 20 * ONE_TOKEN);
        }

        // ── Trading gate ──────────────────────────────────────────────────

        #[ink::test]
        fn transfers_blocked_before_launch() {
            let accs = accounts();
            let mut token = deploy();
            // Fund bob through the authorized deployer first.
            token.transfer(accs.bob, 1_000 * ONE_TOKEN).unwrap();

            set_caller(accs.bob);
            let result = token.transfer(accs.charlie, 100 * ONE_TOKEN);
            assert_eq!(result, Err(Error::TradingDisabled));
        }

        #[ink::test]
        fn authorized_party_can_transfer_before_launch() {
            let accs = accounts();
            let mut token = deploy();
            token.set_pre_launch_authorized(accs.bob, true).unwrap();
            token.transfer(accs.bob, 1_000 * ONE_TOKEN).unwrap();

            set_caller(accs.bob);
            token.transfer(accs.charlie, 100 * ONE_TOKEN).unwrap();
            assert_eq!(token.balance_of(accs.charlie), 98 * ONE_TOKEN);
        }

        // ── Allowances ────────────────────────────────────────────────────

        #[ink::test]
        fn transfer_from_respects_allowance() {
            let accs = accounts();
            let mut token = deploy_and_launch();

            set_caller(accs.bob);
            token.approve(accs.charlie, 50 * ONE_TOKEN).unwrap();

            set_caller(accs.charlie);
            let result = token.transfer_from(accs.bob, accs.django, 60 * ONE_TOKEN);
            assert_eq!(result, Err(Error::InsufficientAllowance));

            token.transfer_from(accs.bob, accs.django, 50 * ONE_TOKEN).unwrap();
            assert_eq!(token.allowance(accs.bob, accs.charlie), 0);
            assert_eq!(token.balance_of(accs.django), 49 * ONE_TOKEN);
        }

        // ── Burn ──────────────────────────────────────────────────────────

        #[ink::test]
        fn burn_reduces_supply_and_tracks_total() {
            let accs = accounts();
            let mut token = deploy_and_launch();

            set_caller(accs.bob);
            token.burn(1_000 * ONE_TOKEN).unwrap();

            assert_eq!(token.total_supply(), SUPPLY - 1_000 * ONE_TOKEN);
            assert_eq!(token.get_total_burned(), 1_000 * ONE_TOKEN);
            assert_eq!(token.balance_of(accs.bob), 99_000 * ONE_TOKEN);
        }

        #[ink::test]
        fn burn_rejects_excess() {
            let accs = accounts();
            let mut token = deploy_and_launch();
            set_caller(accs.charlie);
            assert_eq!(token.burn(1), Err(Error::InsufficientBalance));
        }

        // ── Guards & admin ────────────────────────────────────────────────

        #[ink::test]
        fn paused_token_rejects_transfers() {
            let accs = accounts();
            let mut token = deploy_and_launch();
            set_caller(accs.alice);
            token.set_paused(true).unwrap();

            set_caller(accs.bob);
            let result = token.transfer(accs.charlie, ONE_TOKEN);
            assert_eq!(result, Err(Error::ContractPaused));
        }

        #[ink::test]
        fn insufficient_balance_rejected() {
            let accs = accounts();
            let mut token = deploy_and_launch();
            set_caller(accs.charlie);
            let result = token.transfer(accs.bob, ONE_TOKEN);
            assert_eq!(result, Err(Error::InsufficientBalance));
        }

        #[ink::test]
        fn fee_bps_capped() {
            let mut token = deploy();
            assert_eq!(token.set_fee_bps(MAX_FEE_BPS + 1), Err(Error::FeeTooHigh));
            token.set_fee_bps(MAX_FEE_BPS).unwrap();
            assert_eq!(token.get_fee_bps(), MAX_FEE_BPS);
        }

        #[ink::test]
        fn yield_split_bps_validated() {
            let mut token = deploy();
            assert_eq!(
                token.set_yield_strategy_fee_bps(10_001),
                Err(Error::InvalidBps)
            );
            token.set_yield_strategy_fee_bps(2_500).unwrap();
            assert_eq!(token.get_yield_strategy_fee_bps(), 2_500);
        }

        #[ink::test]
        fn non_owner_cannot_configure() {
            let accs = accounts();
            let mut token = deploy();
            set_caller(accs.bob);
            assert_eq!(token.set_fee_bps(100), Err(Error::NotOwner));
            assert_eq!(token.set_swap_threshold(1), Err(Error::NotOwner));
            assert_eq!(token.enable_trading(), Err(Error::NotOwner));
            assert_eq!(token.set_paused(true), Err(Error::NotOwner));
        }

        #[ink::test]
        fn set_yield_strategy_excludes_it_from_fees() {
            let accs = accounts();
            let mut token = deploy();
            token.set_yield_strategy(accs.eve).unwrap();
            assert!(token.is_fee_excluded(accs.eve));
            assert_eq!(token.get_yield_strategy(), Some(accs.eve));
        }

        #[ink::test]
        fn ownership_transfer_moves_admin_rights() {
            let accs = accounts();
            let mut token = deploy();
            token.transfer_ownership(accs.bob).unwrap();

            // Previous owner is locked out.
            assert_eq!(token.set_fee_bps(100), Err(Error::NotOwner));

            set_caller(accs.bob);
            token.set_fee_bps(100).unwrap();
        }
    }
}
