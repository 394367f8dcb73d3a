use crate::auth::SessionState;
use crate::models::Role;
use crate::repository::ProfileState;

/// RoleResolver
///
/// Derives the caller's authorization level from the ambient session and the
/// profile record behind it. The resolution is read-only and recomputed per
/// call; roles are never cached or persisted.
///
/// Error policy: every failure along the way (no session, unreachable profile
/// store, missing profile, missing role attribute) degrades to `Role::Guest`.
/// The resolver never fails open to admin.
pub struct RoleResolver {
    sessions: SessionState,
    profiles: ProfileState,
}

impl RoleResolver {
    pub fn new(sessions: SessionState, profiles: ProfileState) -> Self {
        Self { sessions, profiles }
    }

    /// resolve
    ///
    /// 1. No live session → `Guest`.
    /// 2. Profile fetch failed or returned nothing → `Guest` (fail-closed).
    /// 3. Profile role `"admin"` → `Admin`; any other present value →
    ///    `Authenticated`; absent value → `Guest`.
    pub async fn resolve(&self) -> Role {
        let Some(user) = self.sessions.current_user().await else {
            return Role::Guest;
        };

        let Some(profile) = self.profiles.get_profile(user.id).await else {
            tracing::debug!(user_id = %user.id, "no readable profile, resolving as guest");
            return Role::Guest;
        };

        match profile.role.as_deref() {
            Some("admin") => Role::Admin,
            Some(_) => Role::Authenticated,
            None => {
                tracing::debug!(user_id = %user.id, "profile has no role, resolving as guest");
                Role::Guest
            }
        }
    }

    /// Convenience check used by the admin-only submission path.
    pub async fn is_admin(&self) -> bool {
        self.resolve().await.is_admin()
    }
}
