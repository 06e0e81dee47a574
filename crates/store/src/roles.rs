//! Admin role assignments at `roles/{uid}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use atelier_core::{AdminRole, UserId};

use crate::document::Store;
use crate::error::StoreError;
use crate::path::paths;

/// Stored role document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleAssignment {
    pub role: AdminRole,
    pub granted_at: DateTime<Utc>,
}

/// The user's admin role, or `None` if they are not an admin.
///
/// # Errors
///
/// Returns the store's error.
pub async fn get_role(store: &Store, uid: &UserId) -> Result<Option<AdminRole>, StoreError> {
    Ok(store
        .get::<RoleAssignment>(&paths::role(uid)?)
        .await?
        .map(|assignment| assignment.role))
}

/// Assign a role, replacing any previous one.
///
/// # Errors
///
/// Returns the store's error.
#[instrument(skip(store))]
pub async fn grant_role(store: &Store, uid: &UserId, role: AdminRole) -> Result<(), StoreError> {
    let assignment = RoleAssignment {
        role,
        granted_at: Utc::now(),
    };
    store.put(&paths::role(uid)?, &assignment).await?;
    tracing::info!(uid = %uid, role = %role, "Admin role granted");
    Ok(())
}

/// Remove a user's role.
///
/// # Errors
///
/// Returns the store's error.
#[instrument(skip(store))]
pub async fn revoke_role(store: &Store, uid: &UserId) -> Result<(), StoreError> {
    store.delete(&paths::role(uid)?).await?;
    tracing::info!(uid = %uid, "Admin role revoked");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    #[tokio::test]
    async fn test_grant_replace_revoke() {
        let store = Store::new(MemoryStore::new());
        let uid = UserId::new("u1");

        assert_eq!(get_role(&store, &uid).await.unwrap(), None);

        grant_role(&store, &uid, AdminRole::Viewer).await.unwrap();
        assert_eq!(get_role(&store, &uid).await.unwrap(), Some(AdminRole::Viewer));

        grant_role(&store, &uid, AdminRole::Admin).await.unwrap();
        assert_eq!(get_role(&store, &uid).await.unwrap(), Some(AdminRole::Admin));

        revoke_role(&store, &uid).await.unwrap();
        assert_eq!(get_role(&store, &uid).await.unwrap(), None);
    }
}
