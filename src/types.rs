//! Core types for the ledger
//!
//! All types are designed for:
//! - Exact arithmetic (Decimal for money, never binary floats)
//! - Immutability of recorded activities
//! - Identity by handle, not by embedded reference

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Account handle (unique, immutable after creation)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Handle(String);

impl Handle {
    /// Create new handle
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user account holding a stored balance
///
/// Balance and the default-instrument reference are mutated only by the
/// ledger engine and the instrument-attachment operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique handle
    pub handle: Handle,

    /// Display name (used by the feed renderer)
    pub display_name: String,

    /// Stored balance (non-negative, exact decimal)
    pub balance: Decimal,

    /// Default funding instrument, set to the first instrument attached
    pub default_instrument: Option<InstrumentId>,

    /// Friend set (symmetric relation, never contains the own handle)
    pub friends: BTreeSet<Handle>,
}

impl Account {
    /// Create a fresh account with zero balance
    pub fn new(handle: Handle, display_name: impl Into<String>) -> Self {
        Self {
            handle,
            display_name: display_name.into(),
            balance: Decimal::ZERO,
            default_instrument: None,
            friends: BTreeSet::new(),
        }
    }

    /// Check whether `other` is in the friend set
    pub fn is_friend(&self, other: &Handle) -> bool {
        self.friends.contains(other)
    }
}

/// Funding instrument identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstrumentId(pub Uuid);

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tokenized payment credential owned by exactly one account
///
/// Immutable after creation. Charging is simulated; the credential is never
/// sent to a payment network in this scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingInstrument {
    /// Instrument identifier
    pub id: InstrumentId,

    /// Owning account (exclusive, cannot be reattached)
    pub owner: Handle,

    /// Opaque credential token
    pub credential: String,

    /// Expiration date
    pub expires_on: NaiveDate,
}

impl FundingInstrument {
    /// Masked rendition of the credential, safe for display
    pub fn masked(&self) -> String {
        // Character-based so multi-byte credentials cannot split a boundary
        let skip = self.credential.chars().count().saturating_sub(4);
        let last4: String = self.credential.chars().skip(skip).collect();
        format!("**** **** **** {}", last4)
    }
}

impl fmt::Display for FundingInstrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

/// Funding source resolved for a payment
///
/// Stored on the activity record for auditability: a payment is funded by
/// exactly one source, never a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundingSource {
    /// Debited from the payer's stored balance
    Balance,
    /// Charged to the payer's default funding instrument (simulated)
    Instrument,
}

/// Immutable activity record
///
/// Created exactly once per successful payment or friend addition, then never
/// mutated or deleted. `seq` is assigned by the activity store at insertion
/// and breaks ordering ties between same-timestamp records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Unique identifier (random 128-bit token)
    pub id: Uuid,

    /// Creation timestamp
    pub recorded_at: DateTime<Utc>,

    /// Insertion sequence (monotonically increasing)
    pub seq: u64,

    /// Activity variant
    pub kind: ActivityKind,
}

impl Activity {
    /// Account that initiated the activity
    pub fn actor(&self) -> &Handle {
        match &self.kind {
            ActivityKind::Payment { actor, .. } => actor,
            ActivityKind::FriendAdded { actor, .. } => actor,
        }
    }

    /// Account on the receiving side of the activity
    pub fn target(&self) -> &Handle {
        match &self.kind {
            ActivityKind::Payment { target, .. } => target,
            ActivityKind::FriendAdded { target, .. } => target,
        }
    }

    /// Check whether the account participates as actor or target
    pub fn involves(&self, handle: &Handle) -> bool {
        self.actor() == handle || self.target() == handle
    }
}

/// Activity variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActivityKind {
    /// A settled payment
    Payment {
        /// Paying account
        actor: Handle,
        /// Receiving account
        target: Handle,
        /// Positive amount, two fractional digits
        amount: Decimal,
        /// Free-text description
        description: String,
        /// Funding source used
        source: FundingSource,
    },
    /// A recorded friendship
    FriendAdded {
        /// Account that added the friend
        actor: Handle,
        /// Account that was added
        target: Handle,
    },
}
