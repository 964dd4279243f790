//! Feed demo binary
//!
//! Wires an in-memory store into the ledger, runs a small payment scenario,
//! and prints the rendered feed.

use chrono::NaiveDate;
use peerpay_core::{AccountStore, Config, Ledger, MemoryStore};
use rust_decimal::Decimal;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Config::from_env()?;
    let feed_limit = config.feed.limit;

    let store = Arc::new(MemoryStore::new());
    let ledger = Ledger::with_stores(store.clone(), store.clone(), store.clone(), config)?;

    tracing::info!("Ledger opened");

    let alice = ledger.create_account("Alice", "alice123")?.handle;
    let bob = ledger.create_account("Bob", "bob456")?.handle;
    let carol = ledger.create_account("Carol", "carol789")?.handle;

    let expiry = NaiveDate::from_ymd_opt(2027, 6, 30).expect("valid date");
    ledger.attach_instrument(&bob, "9876543210987654", expiry)?;
    ledger.attach_instrument(&carol, "1234123412341234", expiry)?;

    // Seed Alice's stored balance directly through the account store
    let mut account = ledger.account(&alice)?;
    account.balance = Decimal::new(10000, 2); // 100.00
    store.save(&account)?;

    // Balance-funded payment
    ledger.pay(&alice, &bob, Decimal::new(5000, 2), "Dinner")?;

    // Instrument-funded payment (Bob's balance is below the amount)
    ledger.pay(&bob, &alice, Decimal::new(20000, 2), "Rent")?;

    ledger.pay(&carol, &bob, Decimal::from(15), "Lunch")?;
    ledger.add_friend(&bob, &carol)?;

    println!("Feed (latest {}):", feed_limit);
    for line in ledger.feed_renderer().render(feed_limit)? {
        println!("  {}", line);
    }

    for handle in [&alice, &bob, &carol] {
        let account = ledger.account(handle)?;
        println!("{}: ${:.2}", account.display_name, account.balance);
    }

    let activity_limit = ledger.config().activity.default_limit;
    let alice_activity = ledger.activity_for(&alice, activity_limit)?;
    tracing::info!(entries = alice_activity.len(), "Alice activity retrieved");

    Ok(())
}
