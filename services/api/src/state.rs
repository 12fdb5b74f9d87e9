//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the shared,
//! clonable resources handed to every handler.

use crate::{dispatch::Dispatcher, mailbox::Mailbox};
use std::sync::Arc;
use tutor_core::TutorService;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub mailbox: Arc<Mailbox>,
}

impl AppState {
    pub fn tutor(&self) -> &TutorService {
        self.dispatcher.tutor()
    }
}
