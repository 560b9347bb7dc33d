// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! FitCoach: fitness assessment and training plan service
//!
//! This crate provides the backend-for-frontend API: sign-up/sign-in against
//! a hosted auth service, the multi-step fitness assessment, and the static
//! 30-day workout and nutrition plan.

pub mod backend;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod time_utils;

use config::Config;
use db::Database;
use session::SessionRegistry;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub sessions: Arc<SessionRegistry>,
}
