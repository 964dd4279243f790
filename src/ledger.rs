//! Main ledger orchestration layer
//!
//! This module ties together the store collaborators into a high-level API
//! for account management, friendship recording, and payment resolution.
//!
//! # Payment resolution
//!
//! A payment is funded by exactly one source, never a split:
//!
//! 1. `payer.balance >= amount` - debit payer, credit payee, atomically
//! 2. otherwise - charge the payer's default funding instrument (simulated,
//!    always succeeds); the payer's balance is untouched
//!
//! # Example
//!
//! ```
//! use peerpay_core::{Config, Ledger};
//! use rust_decimal::Decimal;
//!
//! # fn main() -> peerpay_core::Result<()> {
//! let ledger = Ledger::open(Config::default())?;
//!
//! let alice = ledger.create_account("Alice", "alice123")?;
//! let bob = ledger.create_account("Bob", "bob456")?;
//!
//! ledger.add_friend(&alice.handle, &bob.handle)?;
//! # Ok(())
//! # }
//! ```

use crate::{
    config::Config,
    error::{Error, Result},
    metrics::Metrics,
    store::{AccountStore, ActivityFilter, ActivityStore, InstrumentStore, MemoryStore},
    types::{Account, Activity, ActivityKind, FundingInstrument, FundingSource, Handle},
};
use chrono::NaiveDate;
use dashmap::DashMap;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

/// Main ledger interface
///
/// One logical ledger authority. Balance mutation is serialized per account
/// through a lock table; payments touching disjoint account pairs proceed in
/// parallel.
pub struct Ledger {
    /// Account store collaborator
    accounts: Arc<dyn AccountStore>,

    /// Funding-instrument store collaborator
    instruments: Arc<dyn InstrumentStore>,

    /// Activity store collaborator (append-only)
    activities: Arc<dyn ActivityStore>,

    /// Per-account balance-mutation locks
    locks: DashMap<Handle, Arc<Mutex<()>>>,

    /// Metrics collector
    metrics: Metrics,

    /// Configuration
    config: Config,
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("service_name", &self.config.service_name)
            .field("locked_accounts", &self.locks.len())
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Open a ledger backed by a fresh in-memory store
    pub fn open(config: Config) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        Self::with_stores(store.clone(), store.clone(), store, config)
    }

    /// Open a ledger over explicit store collaborators
    pub fn with_stores(
        accounts: Arc<dyn AccountStore>,
        instruments: Arc<dyn InstrumentStore>,
        activities: Arc<dyn ActivityStore>,
        config: Config,
    ) -> Result<Self> {
        Ok(Self {
            accounts,
            instruments,
            activities,
            locks: DashMap::new(),
            metrics: Metrics::new()?,
            config,
        })
    }

    /// Create a new account with zero balance
    ///
    /// Fails with [`Error::DuplicateHandle`] if the handle is taken.
    pub fn create_account(&self, display_name: &str, handle: &str) -> Result<Account> {
        let account = self.accounts.create(display_name, handle)?;

        tracing::info!(handle = %account.handle, "Account created");

        Ok(account)
    }

    /// Get account by handle
    pub fn account(&self, handle: &Handle) -> Result<Account> {
        self.accounts.get(handle)
    }

    /// Attach a funding instrument to an account
    ///
    /// The first instrument attached becomes the account's default. The
    /// instrument is immutable afterwards and owned exclusively by `handle`.
    pub fn attach_instrument(
        &self,
        handle: &Handle,
        credential: &str,
        expires_on: NaiveDate,
    ) -> Result<FundingInstrument> {
        let lock = self.account_lock(handle);
        let _guard = lock.lock();

        let mut account = self.accounts.get(handle)?;
        let instrument = self.instruments.create(handle, credential, expires_on)?;

        if account.default_instrument.is_none() {
            account.default_instrument = Some(instrument.id);
            self.accounts.save(&account)?;
        }

        tracing::info!(
            handle = %handle,
            instrument = %instrument.masked(),
            "Funding instrument attached"
        );

        Ok(instrument)
    }

    /// Record a symmetric friendship between two accounts
    ///
    /// Returns `Ok(false)` without mutation when `handle == other`. Re-adding
    /// an existing friend is a no-op that emits no duplicate activity and
    /// still returns `Ok(true)`.
    pub fn add_friend(&self, handle: &Handle, other: &Handle) -> Result<bool> {
        if handle == other {
            return Ok(false);
        }

        {
            let (first, second) = self.pair_locks(handle, other);
            let _first_guard = first.lock();
            let _second_guard = second.as_ref().map(|lock| lock.lock());

            let mut account = self.accounts.get(handle)?;
            let mut friend = self.accounts.get(other)?;

            if account.is_friend(other) {
                // Relation already holds; keep the log free of duplicates
                return Ok(true);
            }

            account.friends.insert(other.clone());
            friend.friends.insert(handle.clone());

            self.accounts.save(&account)?;
            self.accounts.save(&friend)?;
        }

        self.activities.append(ActivityKind::FriendAdded {
            actor: handle.clone(),
            target: other.clone(),
        })?;
        self.metrics.record_friend_added();

        tracing::info!(actor = %handle, target = %other, "Friendship recorded");

        Ok(true)
    }

    /// Pay another account
    ///
    /// Resolves the funding source, applies the balance mutation (or the
    /// simulated instrument charge), and appends the payment activity.
    /// All failures are all-or-nothing: balances and the activity log are
    /// untouched on any error path.
    ///
    /// Self-payment is allowed: the activity is recorded and the net balance
    /// effect on the balance branch is zero.
    pub fn pay(
        &self,
        payer: &Handle,
        payee: &Handle,
        amount: Decimal,
        description: &str,
    ) -> Result<Activity> {
        // Normalize to two fractional digits before the positivity check
        let amount = amount.round_dp(2);
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(amount.to_string()));
        }

        let source = {
            let (first, second) = self.pair_locks(payer, payee);
            let _first_guard = first.lock();
            let _second_guard = second.as_ref().map(|lock| lock.lock());

            let mut payer_account = self.accounts.get(payer)?;
            let payee_account = if payer == payee {
                None
            } else {
                match self.accounts.get(payee) {
                    Ok(account) => Some(account),
                    Err(Error::AccountNotFound(handle)) => {
                        return Err(Error::InvalidTarget(handle))
                    }
                    Err(err) => return Err(err),
                }
            };

            let source = if payer_account.balance >= amount {
                FundingSource::Balance
            } else if payer_account.default_instrument.is_some() {
                FundingSource::Instrument
            } else {
                return Err(Error::NoFundingInstrument(payer.to_string()));
            };

            match payee_account {
                None => {
                    // Self-payment: the balance branch nets to zero, nothing
                    // to write; the instrument branch credits the account.
                    if source == FundingSource::Instrument {
                        payer_account.balance += amount;
                        self.accounts.save(&payer_account)?;
                    }
                }
                Some(mut payee_account) => match source {
                    FundingSource::Balance => {
                        let rollback = payer_account.clone();
                        payer_account.balance -= amount;
                        payee_account.balance += amount;

                        self.accounts.save(&payer_account)?;
                        if let Err(err) = self.accounts.save(&payee_account) {
                            // Debit without credit must never be observable
                            if let Err(rb_err) = self.accounts.save(&rollback) {
                                tracing::error!(
                                    payer = %payer,
                                    error = %rb_err,
                                    "Failed to roll back debit"
                                );
                            }
                            return Err(err);
                        }
                    }
                    FundingSource::Instrument => {
                        // Simulated charge against the default instrument;
                        // no declined-card path exists in scope
                        payee_account.balance += amount;
                        self.accounts.save(&payee_account)?;
                    }
                },
            }

            source
        };

        // Appends carry their own ordering key (timestamp + sequence), so
        // they happen outside the balance locks.
        let activity = self.activities.append(ActivityKind::Payment {
            actor: payer.clone(),
            target: payee.clone(),
            amount,
            description: description.to_string(),
            source,
        })?;
        self.metrics.record_payment(source, amount);

        tracing::info!(
            actor = %payer,
            target = %payee,
            %amount,
            ?source,
            "Payment settled"
        );

        Ok(activity)
    }

    /// The most recent activities involving `handle` as actor or target
    pub fn activity_for(&self, handle: &Handle, limit: usize) -> Result<Vec<Activity>> {
        // Surface a missing account instead of an empty result
        self.accounts.get(handle)?;
        self.activities
            .query(&ActivityFilter::Participant(handle.clone()), limit)
    }

    /// The most recent activities globally, newest first
    pub fn recent_activity(&self, limit: usize) -> Result<Vec<Activity>> {
        self.activities.query(&ActivityFilter::All, limit)
    }

    /// Feed renderer over this ledger's stores
    pub fn feed_renderer(&self) -> crate::feed::FeedRenderer {
        crate::feed::FeedRenderer::new(self.accounts.clone(), self.activities.clone())
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn account_lock(&self, handle: &Handle) -> Arc<Mutex<()>> {
        self.locks
            .entry(handle.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Locks for the pair of accounts touched by one operation, in
    /// lexicographic handle order so concurrent payments cannot deadlock
    fn pair_locks(&self, a: &Handle, b: &Handle) -> (Arc<Mutex<()>>, Option<Arc<Mutex<()>>>) {
        if a == b {
            (self.account_lock(a), None)
        } else {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            (self.account_lock(low), Some(self.account_lock(high)))
        }
    }
}
