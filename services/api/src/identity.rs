//! Agent Identity
//!
//! An agent is known by a stable address derived from its seed phrase, so a
//! restarted agent keeps receiving mail sent to the same address.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

const ADDRESS_PREFIX: &str = "agent1q";

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct AgentIdentity {
    #[schema(example = "Tutor Agent")]
    pub name: String,
    pub address: String,
}

impl AgentIdentity {
    /// Derives the identity for `seed`. The same seed always yields the same address.
    pub fn from_seed(name: impl Into<String>, seed: &str) -> Self {
        let digest = Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes());
        Self {
            name: name.into(),
            address: format!("{ADDRESS_PREFIX}{}", digest.simple()),
        }
    }

    pub fn is_address(candidate: &str) -> bool {
        candidate
            .strip_prefix(ADDRESS_PREFIX)
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric()))
    }
}
