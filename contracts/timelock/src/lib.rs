#![cfg_attr(not(feature = "std"), no_std, no_main)]

/// # Dr. Birdy Books — Timelock Governor
///
/// **Role:** Delay gate in front of every privileged mutation in the
/// protocol.  The other contracts transfer ownership to this governor
/// once wiring is complete; from then on each setter call must be
/// queued, wait out the delay, and be executed through here.
///
/// Per queued call the state machine is:
///
/// ```text
///   Nonexistent ──queue──► Queued ──execute──► Executed (entry removed)
///                             │
///                             └────cancel────► Cancelled (entry removed)
/// ```
///
/// A call is identified by the Blake2-256 hash of
/// `(target, value, signature, data, eta)`; re-queuing an identical call
/// while one is pending fails.  Execution dispatches the call with the
/// selector derived from `signature` and `data` appended raw; an empty
/// signature is a plain native transfer of `value`.
#[ink::contract]
mod birdy_timelock {
    use ink::prelude::vec::Vec;
    use ink::storage::Mapping;
    use ink::env::call::{build_call, ExecutionInput, Selector};
    use ink::env::hash::{Blake2x256, HashOutput};

    // =========================================================================
    // CONSTANTS
    // =========================================================================

    /// Shortest configurable delay between queue and eta: 2 days.
    pub const MIN_DELAY_MS: u64 = 2 * 24 * 60 * 60 * 1_000;

    /// Longest configurable delay: 30 days.
    pub const MAX_DELAY_MS: u64 = 30 * 24 * 60 * 60 * 1_000;

    /// Window after `eta` in which a queued call stays executable: 14 days.
    /// A call that outlives the grace window can only be re-queued.
    pub const GRACE_PERIOD_MS: u64 = 14 * 24 * 60 * 60 * 1_000;

    // =========================================================================
    // STORAGE
    // =========================================================================

    #[ink(storage)]
    pub struct BirdyTimelock {
        /// Account allowed to queue, cancel, and execute.
        admin: AccountId,
        /// Nominee of a two-step admin handover.
        pending_admin: Option<AccountId>,
        /// Minimum distance between "now" and an accepted `eta`.
        delay: Timestamp,
        /// Pending calls by content hash.
        queued: Mapping<Hash, bool>,
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    #[ink(event)]
    pub struct TransactionQueued {
        #[ink(topic)]
        tx_hash: Hash,
        #[ink(topic)]
        target: AccountId,
        value: Balance,
        eta: Timestamp,
    }

    #[ink(event)]
    pub struct TransactionCancelled {
        #[ink(topic)]
        tx_hash: Hash,
    }

    #[ink(event)]
    pub struct TransactionExecuted {
        #[ink(topic)]
        tx_hash: Hash,
        #[ink(topic)]
        target: AccountId,
        value: Balance,
    }

    #[ink(event)]
    pub struct DelayUpdated {
        previous: Timestamp,
        updated: Timestamp,
    }

    #[ink(event)]
    pub struct AdminChanged {
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
        /// Caller is not the timelock admin.
        NotAdmin,
        /// Caller is not the nominated pending admin.
        NotPendingAdmin,
        /// An identical call is already queued.
        AlreadyQueued,
        /// `eta` is closer than the configured delay allows.
        ExecuteTimeTooSoon,
        /// No such call is queued.
        NotQueued,
        /// `eta` has not been reached yet.
        TimestampNotReached,
        /// The grace window after `eta` has closed.
        TransactionStale,
        /// The dispatched call failed; the queue entry is preserved.
        DispatchFailed,
        /// Requested delay is outside `[MIN_DELAY_MS, MAX_DELAY_MS]`.
        DelayOutOfBounds,
    }

    /// SCALE-encodes pre-encoded call arguments verbatim, without the
    /// length prefix `Vec<u8>` would add.
    struct CallInput<'a>(&'a [u8]);
    impl<'a> scale::Encode for CallInput<'a> {
        fn encode_to<T: scale::Output + ?Sized>(&self, dest: &mut T) {
            dest.write(self.0);
        }
    }

    // =========================================================================
    // IMPLEMENTATION
    // =========================================================================

    impl BirdyTimelock {
        #[ink(constructor)]
        pub fn new(admin: AccountId, delay: Timestamp) -> Self {
            // An out-of-bounds delay is clamped rather than rejected: a
            // constructor cannot return an error to a deployment script.
            let delay = delay.clamp(MIN_DELAY_MS, MAX_DELAY_MS);
            Self {
                admin,
                pending_admin: None,
                delay,
                queued: Mapping::default(),
            }
        }

        // =====================================================================
        // QUEUE / CANCEL / EXECUTE
        // =====================================================================

        /// Queue a call for execution at or after `eta`.
        ///
        /// Returns the content hash identifying the queued call.
        #[ink(message)]
        pub fn queue_transaction(
            &mut self,
            target: AccountId,
            value: Balance,
            signature: Vec<u8>,
            data: Vec<u8>,
            eta: Timestamp,
        ) -> Result<Hash, Error> {
            self.only_admin()?;

            let now = self.env().block_timestamp();
            if eta < now.saturating_add(self.delay) {
                return Err(Error::ExecuteTimeTooSoon);
            }

            let tx_hash = self.compute_tx_hash(&target, value, &signature, &data, eta);
            if self.queued.get(tx_hash).unwrap_or(false) {
                return Err(Error::AlreadyQueued);
            }
            self.queued.insert(tx_hash, &true);

            self.env().emit_event(TransactionQueued {
                tx_hash,
                target,
                value,
                eta,
            });
            Ok(tx_hash)
        }

        /// Remove a queued call without executing it.
        #[ink(message)]
        pub fn cancel_transaction(
            &mut self,
            target: AccountId,
            value: Balance,
            signature: Vec<u8>,
            data: Vec<u8>,
            eta: Timestamp,
        ) -> Result<(), Error> {
            self.only_admin()?;

            let tx_hash = self.compute_tx_hash(&target, value, &signature, &data, eta);
            if !self.queued.get(tx_hash).unwrap_or(false) {
                return Err(Error::NotQueued);
            }
            self.queued.remove(tx_hash);

            self.env().emit_event(TransactionCancelled { tx_hash });
            Ok(())
        }

        /// Execute a queued call once `eta` has been reached and the grace
        /// window is still open.
        ///
        /// The entry is removed before dispatch so the dispatched call can
        /// never re-execute its own entry, and re-inserted if dispatch
        /// fails, so a failed execute leaves the call queued.
        #[ink(message, payable)]
        pub fn execute_transaction(
            &mut self,
            target: AccountId,
            value: Balance,
            signature: Vec<u8>,
            data: Vec<u8>,
            eta: Timestamp,
        ) -> Result<(), Error> {
            self.only_admin()?;

            let tx_hash = self.compute_tx_hash(&target, value, &signature, &data, eta);
            if !self.queued.get(tx_hash).unwrap_or(false) {
                return Err(Error::NotQueued);
            }

            let now = self.env().block_timestamp();
            if now < eta {
                return Err(Error::TimestampNotReached);
            }
            if now > eta.saturating_add(GRACE_PERIOD_MS) {
                return Err(Error::TransactionStale);
            }

            self.queued.remove(tx_hash);

            if let Err(err) = self.dispatch(target, value, &signature, &data) {
                self.queued.insert(tx_hash, &true);
                return Err(err);
            }

            self.env().emit_event(TransactionExecuted {
                tx_hash,
                target,
                value,
            });
            Ok(())
        }

        /// Perform the call: an empty signature is a raw native transfer,
        /// anything else is a message dispatch with `value` forwarded.
        fn dispatch(&self, target: AccountId, value: Balance, signature: &[u8], data: &[u8]) -> Result<(), Error> {
            if signature.is_empty() {
                return self
                    .env()
                    .transfer(target, value)
                    .map_err(|_| Error::DispatchFailed);
            }

            let selector = Self::selector_of(signature);
            let result = build_call::<ink::env::DefaultEnvironment>()
                .call(target)
                .transferred_value(value)
                .exec_input(
                    ExecutionInput::new(Selector::new(selector)).push_arg(CallInput(data)),
                )
                .returns::<()>()
                .try_invoke();

            // A target message that fails reverts its call frame, which
            // surfaces here as a callee error; only a clean return counts.
            match result {
                Ok(Ok(())) => Ok(()),
                _ => Err(Error::DispatchFailed),
            }
        }

        // =====================================================================
        // HASHING
        // =====================================================================

        /// Content hash identifying a queued call.  Pure: identical inputs
        /// always produce identical hashes, and any differing field
        /// produces a different hash.
        #[ink(message)]
        pub fn get_tx_hash(
            &self,
            target: AccountId,
            value: Balance,
            signature: Vec<u8>,
            data: Vec<u8>,
            eta: Timestamp,
        ) -> Hash {
            self.compute_tx_hash(&target, value, &signature, &data, eta)
        }

        fn compute_tx_hash(
            &self,
            target: &AccountId,
            value: Balance,
            signature: &[u8],
            data: &[u8],
            eta: Timestamp,
        ) -> Hash {
            let encodable = (target, value, signature, data, eta);
            let mut output = <Blake2x256 as HashOutput>::Type::default();
            ink::env::hash_encoded::<Blake2x256, _>(&encodable, &mut output);
            Hash::from(output)
        }

        /// First four bytes of Blake2-256 over the signature, the same
        /// derivation ink! applies to message names.
        fn selector_of(signature: &[u8]) -> [u8; 4] {
            let mut output = <Blake2x256 as HashOutput>::Type::default();
            ink::env::hash_bytes::<Blake2x256>(signature, &mut output);
            [output[0], output[1], output[2], output[3]]
        }

        // =====================================================================
        // VIEW FUNCTIONS
        // =====================================================================

        #[ink(message)]
        pub fn is_queued(&self, tx_hash: Hash) -> bool {
            self.queued.get(tx_hash).unwrap_or(false)
        }

        #[ink(message)]
        pub fn get_admin(&self) -> AccountId { self.admin }

        #[ink(message)]
        pub fn get_pending_admin(&self) -> Option<AccountId> { self.pending_admin }

        #[ink(message)]
        pub fn get_delay(&self) -> Timestamp { self.delay }

        // =====================================================================
        // ADMIN
        // =====================================================================

        #[ink(message)]
        pub fn set_delay(&mut self, delay: Timestamp) -> Result<(), Error> {
            self.only_admin()?;
            if !(MIN_DELAY_MS..=MAX_DELAY_MS).contains(&delay) {
                return Err(Error::DelayOutOfBounds);
            }
            let previous = self.delay;
            self.delay = delay;
            self.env().emit_event(DelayUpdated {
                previous,
                updated: delay,
            });
            Ok(())
        }

        /// Nominate a new admin; the change only lands when the nominee
        /// calls `accept_admin`.
        #[ink(message)]
        pub fn set_pending_admin(&mut self, pending: AccountId) -> Result<(), Error> {
            self.only_admin()?;
            self.pending_admin = Some(pending);
            Ok(())
        }

        #[ink(message)]
        pub fn accept_admin(&mut self) -> Result<(), Error> {
            let caller = self.env().caller();
            if self.pending_admin != Some(caller) {
                return Err(Error::NotPendingAdmin);
            }
            let previous = self.admin;
            self.admin = caller;
            self.pending_admin = None;
            self.env().emit_event(AdminChanged {
                previous,
                new: caller,
            });
            Ok(())
        }

        fn only_admin(&self) -> Result<(), Error> {
            if self.env().caller() != self.admin {
                return Err(Error::NotAdmin);
            }
            Ok(())
        }
    }

    // =========================================================================
    // UNIT TESTS
    // =========================================================================

}
