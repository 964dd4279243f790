//! Record-store collaborators
//!
//! The ledger engine consumes accounts, funding instruments, and activities
//! through these narrow traits. `MemoryStore` backs all three with in-memory
//! structures; a durable implementation can replace it without touching the
//! engine.
//!
//! # Contracts
//!
//! - `ActivityStore::append` assigns identifier, timestamp, and insertion
//!   sequence; records are never overwritten or deleted
//! - queries return newest-first, ties broken by insertion sequence

use crate::{
    clock::{ActivityIdSource, Clock, RandomIds, SystemClock},
    error::{Error, Result},
    types::{Account, Activity, ActivityKind, FundingInstrument, Handle, InstrumentId},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Filter for activity queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityFilter {
    /// All activities regardless of participant
    All,
    /// Activities where the account is actor or target
    Participant(Handle),
}

impl ActivityFilter {
    fn matches(&self, activity: &Activity) -> bool {
        match self {
            ActivityFilter::All => true,
            ActivityFilter::Participant(handle) => activity.involves(handle),
        }
    }
}

/// Account store collaborator
pub trait AccountStore: Send + Sync {
    /// Create a fresh account, enforcing handle uniqueness
    fn create(&self, display_name: &str, handle: &str) -> Result<Account>;

    /// Get account by handle
    fn get(&self, handle: &Handle) -> Result<Account>;

    /// Persist a mutated account
    fn save(&self, account: &Account) -> Result<()>;
}

/// Funding-instrument store collaborator
pub trait InstrumentStore: Send + Sync {
    /// Create an instrument owned by `owner`
    fn create(
        &self,
        owner: &Handle,
        credential: &str,
        expires_on: NaiveDate,
    ) -> Result<FundingInstrument>;

    /// Get instrument by ID
    fn get(&self, id: InstrumentId) -> Result<FundingInstrument>;
}

/// Activity store collaborator (append-only)
pub trait ActivityStore: Send + Sync {
    /// Append a new immutable record, assigning id, timestamp, and sequence
    fn append(&self, kind: ActivityKind) -> Result<Activity>;

    /// The `limit` most recent matching activities, newest first
    fn query(&self, filter: &ActivityFilter, limit: usize) -> Result<Vec<Activity>>;
}

/// In-memory implementation of all three store collaborators
pub struct MemoryStore {
    accounts: RwLock<HashMap<Handle, Account>>,
    instruments: RwLock<HashMap<InstrumentId, FundingInstrument>>,
    activities: RwLock<Vec<Activity>>,
    seq: AtomicU64,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn ActivityIdSource>,
}

impl MemoryStore {
    /// Create a store with the system clock and random identifiers
    pub fn new() -> Self {
        Self::with_sources(Arc::new(SystemClock), Arc::new(RandomIds))
    }

    /// Create a store with explicit time and identifier sources
    pub fn with_sources(clock: Arc<dyn Clock>, ids: Arc<dyn ActivityIdSource>) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            instruments: RwLock::new(HashMap::new()),
            activities: RwLock::new(Vec::new()),
            seq: AtomicU64::new(0),
            clock,
            ids,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("accounts", &self.accounts.read().len())
            .field("instruments", &self.instruments.read().len())
            .field("activities", &self.activities.read().len())
            .finish_non_exhaustive()
    }
}

impl AccountStore for MemoryStore {
    fn create(&self, display_name: &str, handle: &str) -> Result<Account> {
        let handle = Handle::new(handle);
        let mut accounts = self.accounts.write();

        if accounts.contains_key(&handle) {
            return Err(Error::DuplicateHandle(handle.to_string()));
        }

        let account = Account::new(handle.clone(), display_name);
        accounts.insert(handle.clone(), account.clone());

        tracing::debug!(handle = %handle, "Account record created");

        Ok(account)
    }

    fn get(&self, handle: &Handle) -> Result<Account> {
        self.accounts
            .read()
            .get(handle)
            .cloned()
            .ok_or_else(|| Error::AccountNotFound(handle.to_string()))
    }

    fn save(&self, account: &Account) -> Result<()> {
        let mut accounts = self.accounts.write();

        if !accounts.contains_key(&account.handle) {
            return Err(Error::AccountNotFound(account.handle.to_string()));
        }

        accounts.insert(account.handle.clone(), account.clone());
        Ok(())
    }
}

impl InstrumentStore for MemoryStore {
    fn create(
        &self,
        owner: &Handle,
        credential: &str,
        expires_on: NaiveDate,
    ) -> Result<FundingInstrument> {
        let instrument = FundingInstrument {
            id: InstrumentId(self.ids.next_id()),
            owner: owner.clone(),
            credential: credential.to_string(),
            expires_on,
        };

        self.instruments
            .write()
            .insert(instrument.id, instrument.clone());

        tracing::debug!(
            instrument_id = %instrument.id,
            owner = %owner,
            "Funding instrument record created"
        );

        Ok(instrument)
    }

    fn get(&self, id: InstrumentId) -> Result<FundingInstrument> {
        self.instruments
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::InstrumentNotFound(id.to_string()))
    }
}

impl ActivityStore for MemoryStore {
    fn append(&self, kind: ActivityKind) -> Result<Activity> {
        let activity = Activity {
            id: self.ids.next_id(),
            recorded_at: self.clock.now(),
            seq: self.seq.fetch_add(1, Ordering::SeqCst),
            kind,
        };

        self.activities.write().push(activity.clone());

        tracing::debug!(
            activity_id = %activity.id,
            seq = activity.seq,
            "Activity appended"
        );

        Ok(activity)
    }

    fn query(&self, filter: &ActivityFilter, limit: usize) -> Result<Vec<Activity>> {
        // Insertion order equals sequence order, so reverse iteration yields
        // newest-first with ties already broken.
        Ok(self
            .activities
            .read()
            .iter()
            .rev()
            .filter(|a| filter.matches(a))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_create_and_get_account() {
        let store = MemoryStore::new();

        let account = AccountStore::create(&store, "Alice", "alice123").unwrap();
        assert_eq!(account.handle.as_str(), "alice123");
        assert_eq!(account.display_name, "Alice");
        assert_eq!(account.balance, Decimal::ZERO);

        let retrieved = AccountStore::get(&store, &Handle::new("alice123")).unwrap();
        assert_eq!(retrieved, account);
    }

    #[test]
    fn test_duplicate_handle_rejected() {
        let store = MemoryStore::new();

        AccountStore::create(&store, "Alice", "alice123").unwrap();
        let result = AccountStore::create(&store, "Another Alice", "alice123");
        assert!(matches!(result, Err(Error::DuplicateHandle(_))));
    }

    #[test]
    fn test_save_unknown_account_rejected() {
        let store = MemoryStore::new();
        let account = Account::new(Handle::new("ghost"), "Ghost");

        let result = store.save(&account);
        assert!(matches!(result, Err(Error::AccountNotFound(_))));
    }

    #[test]
    fn test_save_roundtrip() {
        let store = MemoryStore::new();
        let mut account = AccountStore::create(&store, "Alice", "alice123").unwrap();

        account.balance = Decimal::new(10000, 2); // 100.00
        store.save(&account).unwrap();

        let retrieved = AccountStore::get(&store, &account.handle).unwrap();
        assert_eq!(retrieved.balance, Decimal::new(10000, 2));
    }

    #[test]
    fn test_instrument_create_and_get() {
        let store = MemoryStore::new();
        let owner = Handle::new("alice123");

        let instrument = InstrumentStore::create(
            &store,
            &owner,
            "1234567890123456",
            NaiveDate::from_ymd_opt(2027, 6, 30).unwrap(),
        )
        .unwrap();

        let retrieved = InstrumentStore::get(&store, instrument.id).unwrap();
        assert_eq!(retrieved, instrument);
        assert_eq!(retrieved.owner, owner);
    }

    #[test]
    fn test_append_assigns_increasing_sequence() {
        let store = MemoryStore::new();

        let a = store
            .append(ActivityKind::FriendAdded {
                actor: Handle::new("alice123"),
                target: Handle::new("bob456"),
            })
            .unwrap();
        let b = store
            .append(ActivityKind::FriendAdded {
                actor: Handle::new("bob456"),
                target: Handle::new("carol789"),
            })
            .unwrap();

        assert!(b.seq > a.seq);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_query_newest_first_with_limit() {
        let store = MemoryStore::new();

        for i in 0..5 {
            store
                .append(ActivityKind::Payment {
                    actor: Handle::new("alice123"),
                    target: Handle::new("bob456"),
                    amount: Decimal::new(100 + i, 2),
                    description: format!("payment {}", i),
                    source: crate::types::FundingSource::Balance,
                })
                .unwrap();
        }

        let recent = store.query(&ActivityFilter::All, 3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].seq, 4);
        assert_eq!(recent[1].seq, 3);
        assert_eq!(recent[2].seq, 2);
    }

    #[test]
    fn test_query_participant_filter() {
        let store = MemoryStore::new();
        let alice = Handle::new("alice123");
        let bob = Handle::new("bob456");
        let carol = Handle::new("carol789");

        store
            .append(ActivityKind::FriendAdded {
                actor: alice.clone(),
                target: bob.clone(),
            })
            .unwrap();
        store
            .append(ActivityKind::FriendAdded {
                actor: bob.clone(),
                target: carol.clone(),
            })
            .unwrap();

        let for_alice = store
            .query(&ActivityFilter::Participant(alice.clone()), 10)
            .unwrap();
        assert_eq!(for_alice.len(), 1);
        assert_eq!(for_alice[0].actor(), &alice);

        let for_bob = store.query(&ActivityFilter::Participant(bob), 10).unwrap();
        assert_eq!(for_bob.len(), 2);
    }

    #[test]
    fn test_same_timestamp_ties_broken_by_sequence() {
        use crate::clock::ManualClock;
        use chrono::Utc;

        // Pinned clock: every record carries the same timestamp
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = MemoryStore::with_sources(clock, Arc::new(RandomIds));

        let first = store
            .append(ActivityKind::FriendAdded {
                actor: Handle::new("alice123"),
                target: Handle::new("bob456"),
            })
            .unwrap();
        let second = store
            .append(ActivityKind::FriendAdded {
                actor: Handle::new("alice123"),
                target: Handle::new("carol789"),
            })
            .unwrap();

        assert_eq!(first.recorded_at, second.recorded_at);

        let recent = store.query(&ActivityFilter::All, 2).unwrap();
        assert_eq!(recent[0].id, second.id);
        assert_eq!(recent[1].id, first.id);
    }

    #[test]
    fn test_debug_formatting() {
        let store = MemoryStore::new();
        AccountStore::create(&store, "Alice", "alice123").unwrap();

        let rendered = format!("{:?}", store);
        assert!(rendered.contains("MemoryStore"));
        assert!(rendered.contains("accounts: 1"));
    }

    #[test]
    fn test_query_empty_log() {
        let store = MemoryStore::new();
        let recent = store.query(&ActivityFilter::All, 20).unwrap();
        assert!(recent.is_empty());
    }
}
