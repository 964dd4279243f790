//! Feed renderer
//!
//! Projects the most recent activities into human-readable strings, newest
//! first. Pure projection: no side effects, tolerant of an empty log.

use crate::{
    store::{AccountStore, ActivityFilter, ActivityStore},
    types::{Activity, ActivityKind, Handle},
    Result,
};
use std::fmt;
use std::sync::Arc;

/// Renders the global activity feed
pub struct FeedRenderer {
    accounts: Arc<dyn AccountStore>,
    activities: Arc<dyn ActivityStore>,
}

impl fmt::Debug for FeedRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedRenderer").finish_non_exhaustive()
    }
}

impl FeedRenderer {
    /// Create a renderer over the given stores
    pub fn new(accounts: Arc<dyn AccountStore>, activities: Arc<dyn ActivityStore>) -> Self {
        Self {
            accounts,
            activities,
        }
    }

    /// Render the `limit` most recent activities, newest first
    ///
    /// Payments render as `{actor} paid {target} $X.XX for {description}`,
    /// always with exactly two fractional digits; friend additions render as
    /// `{actor} added {target} as a friend`.
    pub fn render(&self, limit: usize) -> Result<Vec<String>> {
        let recent = self.activities.query(&ActivityFilter::All, limit)?;
        Ok(recent.iter().map(|a| self.render_item(a)).collect())
    }

    fn render_item(&self, activity: &Activity) -> String {
        match &activity.kind {
            ActivityKind::Payment {
                actor,
                target,
                amount,
                description,
                ..
            } => format!(
                "{} paid {} ${:.2} for {}",
                self.display_name(actor),
                self.display_name(target),
                amount,
                description
            ),
            ActivityKind::FriendAdded { actor, target } => format!(
                "{} added {} as a friend",
                self.display_name(actor),
                self.display_name(target)
            ),
        }
    }

    fn display_name(&self, handle: &Handle) -> String {
        match self.accounts.get(handle) {
            Ok(account) => account.display_name,
            // Activities reference accounts by identity; fall back to the
            // handle if the account store cannot resolve it
            Err(_) => handle.to_string(),
        }
    }
}
