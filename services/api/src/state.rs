//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds all shared
//! resources: the session orchestrator, the speech proxies, and the loaded
//! configuration.

use crate::config::Config;
use crate::speech::SpeechProxy;
use celine_core::orchestrator::SessionOrchestrator;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<SessionOrchestrator>,
    pub speech: Arc<SpeechProxy>,
    pub config: Arc<Config>,
}
