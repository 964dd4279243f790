//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `peerpay_payments_total` - Total settled payments
//! - `peerpay_payments_balance_funded_total` - Payments funded from balance
//! - `peerpay_payments_instrument_funded_total` - Payments funded via instrument
//! - `peerpay_friendships_total` - Total friendships recorded
//! - `peerpay_activities_total` - Total activity records appended
//! - `peerpay_payment_amount` - Histogram of payment amounts

use crate::types::FundingSource;
use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Total settled payments
    pub payments_total: IntCounter,

    /// Payments funded from stored balance
    pub balance_funded_total: IntCounter,

    /// Payments funded via the default instrument
    pub instrument_funded_total: IntCounter,

    /// Total friendships recorded
    pub friendships_total: IntCounter,

    /// Total activity records appended
    pub activities_total: IntCounter,

    /// Payment amount histogram
    pub payment_amount: Histogram,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics")
            .field("payments_total", &self.payments_total.get())
            .field("friendships_total", &self.friendships_total.get())
            .field("activities_total", &self.activities_total.get())
            .finish_non_exhaustive()
    }
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let payments_total =
            IntCounter::new("peerpay_payments_total", "Total settled payments")?;
        registry.register(Box::new(payments_total.clone()))?;

        let balance_funded_total = IntCounter::new(
            "peerpay_payments_balance_funded_total",
            "Payments funded from stored balance",
        )?;
        registry.register(Box::new(balance_funded_total.clone()))?;

        let instrument_funded_total = IntCounter::new(
            "peerpay_payments_instrument_funded_total",
            "Payments funded via the default instrument",
        )?;
        registry.register(Box::new(instrument_funded_total.clone()))?;

        let friendships_total =
            IntCounter::new("peerpay_friendships_total", "Total friendships recorded")?;
        registry.register(Box::new(friendships_total.clone()))?;

        let activities_total = IntCounter::new(
            "peerpay_activities_total",
            "Total activity records appended",
        )?;
        registry.register(Box::new(activities_total.clone()))?;

        let payment_amount = Histogram::with_opts(
            HistogramOpts::new("peerpay_payment_amount", "Histogram of payment amounts")
                .buckets(vec![
                    1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 1000.0, 10000.0,
                ]),
        )?;
        registry.register(Box::new(payment_amount.clone()))?;

        Ok(Self {
            payments_total,
            balance_funded_total,
            instrument_funded_total,
            friendships_total,
            activities_total,
            payment_amount,
            registry,
        })
    }

    /// Record a settled payment
    pub fn record_payment(&self, source: FundingSource, amount: Decimal) {
        self.payments_total.inc();
        self.activities_total.inc();
        match source {
            FundingSource::Balance => self.balance_funded_total.inc(),
            FundingSource::Instrument => self.instrument_funded_total.inc(),
        }
        self.payment_amount.observe(amount.to_f64().unwrap_or(0.0));
    }

    /// Record a friendship addition
    pub fn record_friend_added(&self) {
        self.friendships_total.inc();
        self.activities_total.inc();
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
