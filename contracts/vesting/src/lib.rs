#![cfg_attr(not(feature = "std"), no_std, no_main)]

/// # Dr. Birdy Books — Vesting Distributor
///
/// Holds a funded $BIRDY pool and releases it to named beneficiaries
/// under a cliff + linear schedule.
///
/// Accrual is linear from `start_time` over `vesting_duration`; the cliff
/// only gates claimability.  Everything accrued during the cliff becomes
/// claimable in full the instant the cliff ends:
///
/// ```text
///   claimable(t) = 0                                      t <  start + cliff
///   claimable(t) = total × min(t − start, dur) / dur − claimed   otherwise
/// ```
///
/// Schedules are created once by `initialize_vesting` and never deleted;
/// deactivation stops further claims while keeping `claimed` auditable.
#[ink::contract]
mod birdy_vesting {
    use ink::prelude::vec::Vec;
    use ink::storage::Mapping;
    use ink::env::call::{build_call, ExecutionInput, Selector};

    // =========================================================================
    // TYPES
    // =========================================================================

    /// Per-beneficiary schedule.  `claimed` is monotonically non-decreasing
    /// and never exceeds `total_amount`.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
    #[cfg_attr(
        feature = "std",
        derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
    )]
    pub struct VestingSchedule {
        pub total_amount: Balance,
        pub claimed: Balance,
        pub start_time: Timestamp,
        pub cliff_duration: Timestamp,
        pub vesting_duration: Timestamp,
        pub is_active: bool,
    }

    /// `(beneficiary, total_amount, cliff_duration, vesting_duration)`
    /// as accepted by `initialize_vesting`.
    pub type Allocation = (AccountId, Balance, Timestamp, Timestamp);

    // =========================================================================
    // STORAGE
    // =========================================================================

    #[ink(storage)]
    pub struct BirdyVesting {
        owner: AccountId,
        /// The $BIRDY token held by this pool.
        token: AccountId,
        initialized: bool,
        schedules: Mapping<AccountId, VestingSchedule>,
        /// Every beneficiary ever scheduled, for auditability.
        beneficiaries: Vec<AccountId>,
        total_allocated: Balance,
        total_claimed: Balance,
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    #[ink(event)]
    pub struct VestingInitialized {
        beneficiary_count: u32,
        total_allocated: Balance,
        start_time: Timestamp,
    }

    #[ink(event)]
    pub struct TokensClaimed {
        #[ink(topic)]
        beneficiary: AccountId,
        amount: Balance,
        total_claimed: Balance,
    }

    #[ink(event)]
    pub struct ScheduleActiveChanged {
        #[ink(topic)]
        beneficiary: AccountId,
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
    // ERRORS
    // =========================================================================

    #[derive(Debug, PartialEq, Eq, scale::Encode, scale::Decode)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        /// Caller is not the contract owner.
        NotOwner,
        /// `initialize_vesting` has not run yet.
        NotInitialized,
        /// `initialize_vesting` may only run once.
        AlreadyInitialized,
        /// Empty allocation list, zero amount, zero duration, a cliff
        /// longer than the vesting duration, or a duplicate beneficiary.
        InvalidAllocation,
        /// Pool balance is below the sum of all allocations.
        PoolUnderfunded,
        /// The caller's schedule has been deactivated.
        ScheduleInactive,
        /// Could not read the pool balance from the token.
        TokenCallFailed,
        /// An arithmetic operation overflowed.
        Overflow,
        /// The claim transfer failed.
        TransferFailed,
    }

    // =========================================================================
    // IMPLEMENTATION
    // =========================================================================

    impl BirdyVesting {
        #[ink(constructor)]
        pub fn new(token: AccountId) -> Self {
            Self {
                owner: Self::env().caller(),
                token,
                initialized: false,
                schedules: Mapping::default(),
                beneficiaries: Vec::new(),
                total_allocated: 0,
                total_claimed: 0,
            }
        }

        // =====================================================================
        // INITIALIZATION
        // =====================================================================

        /// Create the schedule cohort.  One-time; the pool must already
        /// hold at least the sum of all allocations.  `start_time` is the
        /// current block time for every schedule.
        #[ink(message)]
        pub fn initialize_vesting(&mut self, allocations: Vec<Allocation>) -> Result<(), Error> {
            self.only_owner()?;
            if self.initialized {
                return Err(Error::AlreadyInitialized);
            }

            let now = self.env().block_timestamp();
            let total = self.validate_allocations(&allocations)?;

            let pool_balance = self.pool_balance()?;
            if pool_balance < total {
                return Err(Error::PoolUnderfunded);
            }

            self.create_schedules(&allocations, now)?;

            self.env().emit_event(VestingInitialized {
                beneficiary_count: self.beneficiaries.len() as u32,
                total_allocated: self.total_allocated,
                start_time: now,
            });
            Ok(())
        }

        /// Reject malformed cohorts before any state is written.
        /// Returns the allocation sum.
        fn validate_allocations(&self, allocations: &[Allocation]) -> Result<Balance, Error> {
            if allocations.is_empty() {
                return Err(Error::InvalidAllocation);
            }
            let mut total: Balance = 0;
            for (index, (beneficiary, amount, cliff, duration)) in allocations.iter().enumerate() {
                if *amount == 0 || *duration == 0 || cliff > duration {
                    return Err(Error::InvalidAllocation);
                }
                for (other, _, _, _) in allocations.iter().take(index) {
                    if other == beneficiary {
                        return Err(Error::InvalidAllocation);
                    }
                }
                total = total.checked_add(*amount).ok_or(Error::Overflow)?;
            }
            Ok(total)
        }

        /// Write the cohort.  Only called after validation, so the
        /// arithmetic here cannot fail.
        fn create_schedules(&mut self, allocations: &[Allocation], now: Timestamp) -> Result<(), Error> {
            for (beneficiary, amount, cliff, duration) in allocations {
                let schedule = VestingSchedule {
                    total_amount: *amount,
                    claimed: 0,
                    start_time: now,
                    cliff_duration: *cliff,
                    vesting_duration: *duration,
                    is_active: true,
                };
                self.schedules.insert(beneficiary, &schedule);
                self.beneficiaries.push(*beneficiary);
                self.total_allocated = self
                    .total_allocated
                    .checked_add(*amount)
                    .ok_or(Error::Overflow)?;
            }
            self.initialized = true;
            Ok(())
        }

        // =====================================================================
        // CLAIMS
        // =====================================================================

        /// Transfer everything currently claimable to the caller.
        ///
        /// Returns the transferred amount; `Ok(0)` when nothing is
        /// claimable yet (also for callers with no schedule).  Repeating
        /// the call immediately is a no-op, and `claimed` can never pass
        /// `total_amount`.
        #[ink(message)]
        pub fn claim_tokens(&mut self) -> Result<Balance, Error> {
            if !self.initialized {
                return Err(Error::NotInitialized);
            }
            let caller = self.env().caller();

            let mut schedule = match self.schedules.get(caller) {
                Some(schedule) => schedule,
                None => return Ok(0),
            };
            if !schedule.is_active {
                return Err(Error::ScheduleInactive);
            }

            let now = self.env().block_timestamp();
            let claimable = Self::claimable_at(&schedule, now)?;
            if claimable == 0 {
                return Ok(0);
            }

            schedule.claimed = schedule
                .claimed
                .checked_add(claimable)
                .ok_or(Error::Overflow)?;
            if schedule.claimed > schedule.total_amount {
                return Err(Error::Overflow);
            }
            self.schedules.insert(caller, &schedule);
            self.total_claimed = self
                .total_claimed
                .checked_add(claimable)
                .ok_or(Error::Overflow)?;

            self.transfer_tokens(caller, claimable)?;

            self.env().emit_event(TokensClaimed {
                beneficiary: caller,
                amount: claimable,
                total_claimed: schedule.claimed,
            });
            Ok(claimable)
        }

        /// Amount `beneficiary` could claim right now.  Sentinel zero for
        /// unknown or deactivated beneficiaries; views never fail.
        #[ink(message)]
        pub fn get_claimable_amount(&self, beneficiary: AccountId) -> Balance {
            if !self.initialized {
                return 0;
            }
            let schedule = match self.schedules.get(beneficiary) {
                Some(schedule) if schedule.is_active => schedule,
                _ => return 0,
            };
            let now = self.env().block_timestamp();
            Self::claimable_at(&schedule, now).unwrap_or(0)
        }

        /// Cliff + linear claimable maths at time `now`.
        ///
        /// Accrual runs from `start_time` regardless of the cliff; the
        /// cliff only withholds claimability, so the first post-cliff
        /// claim releases the full backlog at once.
        fn claimable_at(schedule: &VestingSchedule, now: Timestamp) -> Result<Balance, Error> {
            let cliff_end = schedule
                .start_time
                .saturating_add(schedule.cliff_duration);
            if now < cliff_end {
                return Ok(0);
            }

            let elapsed = now.saturating_sub(schedule.start_time);
            let vested = if elapsed >= schedule.vesting_duration {
                schedule.total_amount
            } else {
                schedule
                    .total_amount
                    .checked_mul(elapsed as u128)
                    .ok_or(Error::Overflow)?
                    / schedule.vesting_duration as u128
            };

            Ok(vested.saturating_sub(schedule.claimed))
        }

        fn transfer_tokens(&self, to: AccountId, amount: Balance) -> Result<(), Error> {
            let result = build_call::<ink::env::DefaultEnvironment>()
                .call(self.token)
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

        fn pool_balance(&self) -> Result<Balance, Error> {
            let contract = self.env().account_id();
            let result = build_call::<ink::env::DefaultEnvironment>()
                .call(self.token)
                .exec_input(
                    ExecutionInput::new(Selector::new(ink::selector_bytes!("balance_of")))
                        .push_arg(&contract),
                )
                .returns::<Balance>()
                .try_invoke();

            match result {
                Ok(Ok(balance)) => Ok(balance),
                _ => Err(Error::TokenCallFailed),
            }
        }

        // =====================================================================
        // VIEW FUNCTIONS
        // =====================================================================

        #[ink(message)]
        pub fn is_initialized(&self) -> bool { self.initialized }

        #[ink(message)]
        pub fn get_schedule(&self, beneficiary: AccountId) -> Option<VestingSchedule> {
            self.schedules.get(beneficiary)
        }

        #[ink(message)]
        pub fn get_beneficiaries(&self) -> Vec<AccountId> {
            self.beneficiaries.clone()
        }

        #[ink(message)]
        pub fn get_total_allocated(&self) -> Balance { self.total_allocated }

        #[ink(message)]
        pub fn get_total_claimed(&self) -> Balance { self.total_claimed }

        #[ink(message)]
        pub fn get_token(&self) -> AccountId { self.token }

        #[ink(message)]
        pub fn get_owner(&self) -> AccountId { self.owner }

        // =====================================================================
        // ADMIN
        // =====================================================================

        /// Deactivate (or reactivate) a schedule.  The record itself is
        /// never deleted; `claimed` stays auditable forever.
        #[ink(message)]
        pub fn set_schedule_active(&mut self, beneficiary: AccountId, is_active: bool) -> Result<(), Error> {
            self.only_owner()?;
            if !self.initialized {
                return Err(Error::NotInitialized);
            }
            let mut schedule = match self.schedules.get(beneficiary) {
                Some(schedule) => schedule,
                None => return Err(Error::InvalidAllocation),
            };
            schedule.is_active = is_active;
            self.schedules.insert(beneficiary, &schedule);
            self.env().emit_event(ScheduleActiveChanged {
                beneficiary,
                is_active,
            });
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

        fn only_owner(&self) -> Result<(), Error> {
            if self.env().caller() != self.owner {
                return Err(Error::NotOwner);
            }
            Ok(())
        }
    }

    // =========================================================================
    // UNIT TESTS
    // =========================================================================
    //
    // `initialize_vesting` reads the pool balance over a cross-contract
    // call, which the off-chain environment cannot execute; the cohort is
    // created through `create_schedules` here, exactly as the message does
    // after its funding check.

}
