// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated caller.

use serde::{Deserialize, Serialize};

use super::roles::Role;

/// The caller on whose behalf a vault operation runs.
///
/// Built by whatever identity layer fronts the vault (token verification is
/// not part of this crate). `user_id` is the canonical owner identifier used
/// for record ownership and key derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    /// Regular user with the default role.
    pub fn user(user_id: impl Into<String>) -> Self {
        Self::new(user_id, Role::User)
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self::new(user_id, Role::Admin)
    }

    pub fn has_role(&self, required: Role) -> bool {
        self.role.has_privilege(required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_constructor_defaults_role() {
        let user = AuthenticatedUser::user("user_123");
        assert_eq!(user.user_id, "user_123");
        assert_eq!(user.role, Role::User);
        assert!(!user.has_role(Role::Admin));
    }

    #[test]
    fn admin_has_every_role() {
        let admin = AuthenticatedUser::admin("admin_1");
        assert_eq!(admin.role, Role::Admin);
        assert!(admin.has_role(Role::User));
        assert!(admin.has_role(Role::Auditor));
    }
}
