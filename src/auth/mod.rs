// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authorization
//!
//! Caller identity and roles. Authentication (token verification) happens
//! in front of the vault; this module only models the result.
//!
//! ## Access Rules
//!
//! - Owners may read and modify their own records
//! - Admins may access any record
//! - Auditors may read the audit log only

pub mod roles;
pub mod user;

pub use roles::Role;
pub use user::AuthenticatedUser;
