//! Per-user profile persistence.

use crate::index::{DeleteSelector, VectorIndex};
use crate::record::ProfileRecord;
use crate::Result;
use ragmind_core::{UserProfile, UserStatus};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Reads and writes [`UserProfile`] records in the profile namespace.
///
/// Profiles are stored as JSON inside the metadata of a placeholder vector
/// keyed by user id.
pub struct ProfileStore {
    index: Arc<dyn VectorIndex>,
    namespace: String,
    dimension: usize,
}

impl ProfileStore {
    /// Create a store over `namespace` of `index`.
    pub fn new(index: Arc<dyn VectorIndex>, namespace: impl Into<String>, dimension: usize) -> Self {
        Self {
            index,
            namespace: namespace.into(),
            dimension,
        }
    }

    /// The namespace profiles live in.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Whether a profile record exists, propagating backend errors.
    pub async fn try_user_status(&self, user_id: &str) -> Result<UserStatus> {
        let fetched = self
            .index
            .fetch(&self.namespace, &[user_id.to_string()])
            .await?;

        let status = if fetched.contains_key(user_id) {
            UserStatus::Old
        } else {
            UserStatus::New
        };
        info!("User {} identified as '{}'", user_id, status);
        Ok(status)
    }

    /// Whether a profile record exists. Backend failures read as `New`.
    pub async fn check_user_status(&self, user_id: &str) -> UserStatus {
        match self.try_user_status(user_id).await {
            Ok(status) => status,
            Err(e) => {
                error!("Error checking user status for {}: {}", user_id, e);
                UserStatus::New
            }
        }
    }

    /// Load the stored profile.
    ///
    /// Returns `Ok(None)` when nothing usable is stored, including a record
    /// whose profile data cannot be decoded. Only backend failures are errors.
    pub async fn try_get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let mut fetched = self
            .index
            .fetch(&self.namespace, &[user_id.to_string()])
            .await?;

        let Some(record) = fetched.remove(user_id) else {
            debug!("No profile stored for {}", user_id);
            return Ok(None);
        };

        match ProfileRecord::from_metadata(user_id, &record.metadata) {
            Ok(decoded) => Ok(Some(decoded.profile)),
            Err(e) => {
                warn!("Ignoring unreadable profile: {}", e);
                Ok(None)
            }
        }
    }

    /// Load the stored profile, falling back to defaults on a miss or failure.
    pub async fn get_profile(&self, user_id: &str) -> UserProfile {
        match self.try_get_profile(user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => UserProfile::new(user_id),
            Err(e) => {
                error!("Fetch profile error for {}: {}", user_id, e);
                UserProfile::new(user_id)
            }
        }
    }

    /// Write the profile unconditionally.
    pub async fn update_profile(&self, profile: &UserProfile) -> Result<()> {
        let record = ProfileRecord::new(profile.clone()).to_record(self.dimension)?;
        self.index.upsert(&self.namespace, vec![record]).await?;
        debug!("Stored profile for {}", profile.user_id);
        Ok(())
    }

    /// Write `current` only if it differs from `old`. Returns whether a write
    /// happened.
    pub async fn sync_if_changed(&self, old: &UserProfile, current: &UserProfile) -> Result<bool> {
        if old == current {
            return Ok(false);
        }
        info!("Syncing profile changes for {}", current.user_id);
        self.update_profile(current).await?;
        Ok(true)
    }

    /// Remove the profile record. Deleting a missing profile succeeds.
    pub async fn delete_profile(&self, user_id: &str) -> Result<()> {
        warn!("Deleting profile for {}", user_id);
        self.index
            .delete(&self.namespace, DeleteSelector::Ids(vec![user_id.to_string()]))
            .await?;
        info!("Profile deleted for {}", user_id);
        Ok(())
    }
}
