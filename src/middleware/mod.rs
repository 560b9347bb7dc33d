// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (session cookie, route guard, security headers).

pub mod guard;
pub mod security;
pub mod session;

pub use guard::{require_session, GuardDecision, RouteGuard};
pub use session::{attach_session, CurrentSession};
