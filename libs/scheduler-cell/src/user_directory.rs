use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use shared_models::BookingUser;

/// External member directory consulted while hydrating a batch (spec.md §6:
/// "persistence of user profiles is assumed to be a plain key-value store").
/// The queue already carries a snapshot of the user on each record; this
/// trait lets the scheduler refresh it with current contact details before
/// the form is filled, without the queue itself depending on that store.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns an up-to-date profile for `user`, or `None` to keep the
    /// snapshot already carried on the reservation record.
    async fn refresh(&self, user: &BookingUser) -> Option<BookingUser>;
}

/// Default directory: always defers to the record's own snapshot. Used
/// wherever no live member directory is wired in.
#[derive(Default)]
pub struct PassthroughUserDirectory;

#[async_trait]
impl UserDirectory for PassthroughUserDirectory {
    async fn refresh(&self, _user: &BookingUser) -> Option<BookingUser> {
        None
    }
}

/// In-memory member directory, keyed by user id. Stands in for the
/// profile store spec.md §6 calls "User store (inbound)" until a real one
/// is wired in — fine for local runs and tests, not for production scale.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    profiles: RwLock<HashMap<String, BookingUser>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, user: BookingUser) {
        self.profiles.write().expect("profiles lock poisoned").insert(user.user_id.clone(), user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn refresh(&self, user: &BookingUser) -> Option<BookingUser> {
        self.profiles.read().expect("profiles lock poisoned").get(&user.user_id).cloned()
    }
}
