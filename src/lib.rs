//! PeerPay Core
//!
//! Peer-to-peer balance-transfer ledger: accounts hold a stored balance, can
//! befriend each other, and can pay one another from balance or a fallback
//! funding instrument, producing an append-only activity log that drives a
//! reverse-chronological feed.
//!
//! # Architecture
//!
//! - **Ledger Engine**: resolves each payment's funding source and applies
//!   the paired debit/credit as one atomic unit
//! - **Record stores**: accounts, instruments, and activities live behind
//!   narrow collaborator traits, backed in-memory and swappable for durable
//!   storage
//! - **Append-only log**: activities are immutable, ordered by timestamp
//!   with an insertion sequence breaking ties
//!
//! # Invariants
//!
//! - Conservation: a balance-funded payment debits and credits exactly the
//!   amount, with no rounding drift
//! - Single funding source: a payment draws from balance or the instrument,
//!   never both
//! - Friend symmetry: A befriends B iff B befriends A; never reflexive
//! - Append-only: activities are never modified or deleted

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod clock;
pub mod config;
pub mod error;
pub mod feed;
pub mod ledger;
pub mod metrics;
pub mod store;
pub mod types;

// Re-exports
pub use clock::{ActivityIdSource, Clock, ManualClock, RandomIds, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use feed::FeedRenderer;
pub use ledger::Ledger;
pub use metrics::Metrics;
pub use store::{AccountStore, ActivityFilter, ActivityStore, InstrumentStore, MemoryStore};
pub use types::{
    Account, Activity, ActivityKind, FundingInstrument, FundingSource, Handle, InstrumentId,
};
