//! Tutor Agent Library Crate
//!
//! Everything the agent runtime needs: configuration, identity, the envelope
//! and mailbox transport, the request dispatcher, HTTP handlers and routing.
//! The binaries are thin wrappers around this library.

pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod identity;
pub mod mailbox;
pub mod models;
pub mod router;
pub mod state;

use std::sync::Arc;
use tutor_core::TutorService;

use crate::{dispatch::Dispatcher, identity::AgentIdentity, mailbox::Mailbox, state::AppState};

/// Bounds on the in-memory transport state.
#[derive(Clone, Copy, Debug)]
pub struct StateLimits {
    /// Envelopes kept per recipient address.
    pub mailbox_capacity: usize,
    /// Recipient addresses with a queue at any one time.
    pub mailbox_max_addresses: usize,
    /// Chat sessions tracked as open at any one time.
    pub max_open_sessions: usize,
}

impl Default for StateLimits {
    fn default() -> Self {
        Self {
            mailbox_capacity: 256,
            mailbox_max_addresses: 1024,
            max_open_sessions: 1024,
        }
    }
}

/// Wires the dispatcher and mailbox into a shared state.
pub fn build_state(
    identity: AgentIdentity,
    tutor: TutorService,
    limits: StateLimits,
) -> Arc<AppState> {
    let mailbox = Arc::new(Mailbox::new(limits.mailbox_capacity, limits.mailbox_max_addresses));
    let dispatcher = Arc::new(Dispatcher::new(
        identity,
        tutor,
        mailbox.clone(),
        limits.max_open_sessions,
    ));
    Arc::new(AppState {
        dispatcher,
        mailbox,
    })
}
