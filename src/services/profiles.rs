use dashmap::DashMap;

use crate::models::ProfileSnapshot;

/// Source of profile snapshots for the matching engine
///
/// Implementations hand out snapshots by value; lookups are expected to be
/// already resolved (no I/O on the scoring path).
pub trait ProfileProvider: Send + Sync {
    /// Fetch a profile by identity
    fn profile(&self, user_id: &str) -> Option<ProfileSnapshot>;

    /// Fetch the candidate pool for a user
    fn candidate_pool(&self, user_id: &str) -> Vec<ProfileSnapshot>;
}

/// In-memory profile store that stamps revisions on every write
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: DashMap<String, ProfileSnapshot>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_profiles<I>(profiles: I) -> Self
    where
        I: IntoIterator<Item = ProfileSnapshot>,
    {
        let store = Self::new();
        for profile in profiles {
            store.upsert(profile);
        }
        store
    }

    /// Insert or replace a profile, returning its stored revision
    ///
    /// A replacement with different content always receives a revision greater
    /// than the one it replaces, so derived data cached for the old snapshot
    /// goes stale. Identical content keeps the stored revision.
    pub fn upsert(&self, mut profile: ProfileSnapshot) -> u64 {
        let mut entry = self
            .profiles
            .entry(profile.user_id.clone())
            .or_insert_with(|| profile.clone());

        // Content equality ignores the caller's revision
        let requested = profile.revision;
        let previous = entry.revision;
        profile.revision = previous;
        if entry.value() == &profile {
            return previous;
        }

        profile.revision = requested.max(previous + 1);
        *entry = profile;
        tracing::debug!("Profile {} now at revision {}", entry.user_id, entry.revision);

        entry.revision
    }

    pub fn remove(&self, user_id: &str) -> Option<ProfileSnapshot> {
        self.profiles.remove(user_id).map(|(_, profile)| profile)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl ProfileProvider for InMemoryProfileStore {
    fn profile(&self, user_id: &str) -> Option<ProfileSnapshot> {
        self.profiles.get(user_id).map(|entry| entry.value().clone())
    }

    /// Every other stored profile, ordered by identity
    fn candidate_pool(&self, user_id: &str) -> Vec<ProfileSnapshot> {
        let mut pool: Vec<ProfileSnapshot> = self
            .profiles
            .iter()
            .filter(|entry| entry.key() != user_id)
            .map(|entry| entry.value().clone())
            .collect();
        pool.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        pool
    }
}
