//! Asset identities: named kinds of holdable or tradable value.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SystemError};

/// Valid groups start with a lowercase letter; may contain lowercase
/// letters, digits, periods, underscores and hyphens in between; and end
/// with a lowercase letter, a digit or an underscore.
pub const VALID_GROUP: &str = "^[a-z][a-z0-9._-]*[a-z0-9_]$";

/// Valid identifiers may contain letters, digits, hash signs, colons,
/// forward-slashes, periods, underscores, pluses, equals signs and
/// hyphens.
pub const VALID_IDENTIFIER: &str = "^[a-zA-Z0-9#:/._+=-]+$";

/// Built-in group for currency assets.
pub const CURRENCY_GROUP: &str = "currency";

/// Built-in group for item assets.
pub const ITEM_GROUP: &str = "item";

fn group_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VALID_GROUP).expect("group pattern compiles"))
}

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VALID_IDENTIFIER).expect("identifier pattern compiles"))
}

/// A thing of value, identified by a group and a group-unique identifier.
///
/// Assets are immutable, structurally compared and safe to use as map
/// keys. Additional properties (display names, item metadata) belong to
/// the systems that mint assets, keyed by the asset itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Asset {
    group: String,
    identifier: String,
}

impl Asset {
    /// Get an asset with the given group and identifier.
    ///
    /// Both parts are validated against [`VALID_GROUP`] and
    /// [`VALID_IDENTIFIER`].
    pub fn of(group: impl Into<String>, identifier: impl Into<String>) -> Result<Self> {
        let group = group.into();
        let identifier = identifier.into();
        if !group_regex().is_match(&group) {
            return Err(SystemError::Validation {
                what: "asset group",
                input: group,
            });
        }
        if !identifier_regex().is_match(&identifier) {
            return Err(SystemError::Validation {
                what: "asset identifier",
                input: identifier,
            });
        }
        Ok(Self { group, identifier })
    }

    /// Get a currency asset with the given identifier.
    pub fn currency(identifier: impl Into<String>) -> Result<Self> {
        Self::of(CURRENCY_GROUP, identifier)
    }

    /// Get an item asset with the given identifier.
    pub fn item(identifier: impl Into<String>) -> Result<Self> {
        Self::of(ITEM_GROUP, identifier)
    }

    /// Get the asset's group.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Get the group-unique identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.group, self.identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_valid_assets() {
        assert!(Asset::of("currency", "gold").is_ok());
        assert!(Asset::of("item", "minecraft:diamond").is_ok());
        assert!(Asset::of("my-plugin.shares", "ACME+B").is_ok());
    }

    #[test]
    fn test_invalid_group() {
        assert!(Asset::of("", "gold").is_err());
        assert!(Asset::of("Currency", "gold").is_err());
        assert!(Asset::of("c", "gold").is_err());
        assert!(Asset::of("currency-", "gold").is_err());
        assert!(Asset::of("9currency", "gold").is_err());
    }

    #[test]
    fn test_invalid_identifier() {
        assert!(Asset::of("currency", "").is_err());
        assert!(Asset::of("currency", "gold coin").is_err());
        assert!(Asset::of("currency", "gold!").is_err());
    }

    #[test]
    fn test_structural_equality() {
        let a = Asset::of("currency", "gold").unwrap();
        let b = Asset::of("currency", "gold").unwrap();
        let c = Asset::of("item", "gold").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_built_in_groups() {
        assert_eq!(Asset::currency("gold").unwrap().group(), CURRENCY_GROUP);
        assert_eq!(Asset::item("stone").unwrap().group(), ITEM_GROUP);
    }

    #[test]
    fn test_display() {
        let asset = Asset::of("item", "minecraft:dirt").unwrap();
        assert_eq!(asset.to_string(), "item#minecraft:dirt");
    }

    proptest! {
        #[test]
        fn prop_conforming_strings_construct(
            group in "[a-z][a-z0-9._-]{0,16}[a-z0-9_]",
            identifier in "[a-zA-Z0-9#:/._+=-]{1,24}",
        ) {
            let asset = Asset::of(&group, &identifier).unwrap();
            prop_assert_eq!(asset.clone(), Asset::of(&group, &identifier).unwrap());
            prop_assert_eq!(asset.group(), group.as_str());
            prop_assert_eq!(asset.identifier(), identifier.as_str());
        }

        #[test]
        fn prop_nonconforming_groups_rejected(group in "[A-Z !?][a-zA-Z ]{0,8}") {
            prop_assert!(Asset::of(&group, "gold").is_err());
        }
    }
}
