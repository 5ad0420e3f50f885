//! # Role Registry
//!
//! The closed set of archetype roles a user can hold.
//!
//! | Role | Stored name |
//! |------|-------------|
//! | Base member | `base-member` |
//! | Content creator | `content-creator` |
//! | Community moderator | `community-moderator` |
//! | Administrator | `administrator` |
//!
//! Capabilities are never derived from declaration order; see
//! [`crate::capability`].

use serde::{Deserialize, Serialize};

/// An archetype role. Exactly one per user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Default role at account creation.
    #[default]
    BaseMember,
    /// Authors courses and lessons.
    ContentCreator,
    /// Curates community discussion.
    CommunityModerator,
    /// Manages accounts and platform configuration.
    Administrator,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 4] = [
        Role::BaseMember,
        Role::ContentCreator,
        Role::CommunityModerator,
        Role::Administrator,
    ];

    /// Stable stored name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Role::BaseMember => "base-member",
            Role::ContentCreator => "content-creator",
            Role::CommunityModerator => "community-moderator",
            Role::Administrator => "administrator",
        }
    }

    /// Resolve a stored role name.
    ///
    /// Unknown names resolve to `None` (no role), which evaluates to the
    /// all-false capability set.
    #[must_use]
    pub fn parse(name: &str) -> Option<Role> {
        match name {
            "base-member" => Some(Role::BaseMember),
            "content-creator" => Some(Role::ContentCreator),
            "community-moderator" => Some(Role::CommunityModerator),
            "administrator" => Some(Role::Administrator),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_name() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.name()), Some(role));
        }
    }

    #[test]
    fn unknown_names_resolve_to_no_role() {
        assert_eq!(Role::parse(""), None);
        assert_eq!(Role::parse("Administrator"), None);
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse(" administrator"), None);
    }

    #[test]
    fn default_is_base_member() {
        assert_eq!(Role::default(), Role::BaseMember);
    }

    #[test]
    fn display_uses_stored_name() {
        assert_eq!(Role::CommunityModerator.to_string(), "community-moderator");
    }
}
