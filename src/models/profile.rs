// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Application-owned extension of an identity, stored in `profiles`.
///
/// `id` is always the identity ID; the document ID is the same value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Profile {
    pub id: String,
    pub email: String,
    /// Gates the premium area
    #[serde(default)]
    pub premium_access: bool,
}

impl Profile {
    /// Profile created lazily on first sign-in/sign-up.
    pub fn new_for(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            premium_access: false,
        }
    }
}
