//! Identity types for economic participants.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SystemError};

/// Valid namespaces start with a lowercase letter, may contain letters,
/// digits, underscores and hyphens in between, and end with a lowercase
/// letter, a digit or an underscore.
pub const VALID_NAMESPACE: &str = "^[a-z]([a-zA-Z0-9_-]*[a-z0-9_])?$";

/// Valid identity keys may contain letters, digits, hash signs,
/// forward-slashes, underscores, pluses, equals signs and hyphens.
pub const VALID_IDENTITY_KEY: &str = "^[a-zA-Z0-9#/_+=-]+$";

fn namespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VALID_NAMESPACE).expect("namespace pattern compiles"))
}

fn identity_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VALID_IDENTITY_KEY).expect("identity key pattern compiles"))
}

/// A stable, platform-agnostic identity for an economic actor.
///
/// The namespace describes briefly what type of participant the entity
/// represents (`player`, `account`, `custodian`, ...); the key is a
/// namespace-unique identifier. Host platforms bind their native
/// player/session objects to entity ids through [`Resolvable`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    namespace: String,
    key: String,
}

impl EntityId {
    /// Create an entity id, validating both parts.
    pub fn new(namespace: impl Into<String>, key: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        let key = key.into();
        if !namespace_regex().is_match(&namespace) {
            return Err(SystemError::Validation {
                what: "entity namespace",
                input: namespace,
            });
        }
        if !identity_key_regex().is_match(&key) {
            return Err(SystemError::Validation {
                what: "entity identity key",
                input: key,
            });
        }
        Ok(Self { namespace, key })
    }

    /// Get the namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Get the namespace-unique identity key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get a human-oriented name for this entity.
    ///
    /// Need not be system-unique; defaults to the identity key.
    pub fn friendly_name(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.key)
    }
}

/// Something convertible to a stable entity identity.
///
/// Identity adapters supply a `Resolvable` to every account or balance
/// operation that takes a participant.
pub trait Resolvable: Send + Sync {
    /// Resolve this object to its entity identity.
    fn entity_id(&self) -> EntityId;
}

impl Resolvable for EntityId {
    fn entity_id(&self) -> EntityId {
        self.clone()
    }
}
