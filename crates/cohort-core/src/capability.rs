//! # Permission Evaluator
//!
//! Pure mapping from a role to named boolean capabilities.
//!
//! ## Capability Table
//!
//! | Capability | Granted to |
//! |------------|------------|
//! | `create-content` | content-creator, administrator |
//! | `enroll` | every role |
//! | `manage-accounts` | administrator |
//! | `publish-announcement` | administrator |
//! | `highlight-discussion` | community-moderator, administrator |
//! | `manage-taxonomy` | administrator |
//! | `view-analytics` | content-creator, community-moderator, administrator |
//! | `nominate-moderator` | content-creator, administrator |
//! | `access-admin-surface` | administrator |
//!
//! ## Default Deny
//!
//! Each capability is an explicit list of roles. A new [`Role`] variant
//! receives nothing until it is named in a predicate, and `None` (no
//! resolvable role) receives nothing at all.

use crate::role::Role;
use crate::types::CohortError;
use serde::{Deserialize, Serialize};

// =============================================================================
// CAPABILITY
// =============================================================================

/// A single named permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    CreateContent,
    Enroll,
    ManageAccounts,
    PublishAnnouncement,
    HighlightDiscussion,
    ManageTaxonomy,
    ViewAnalytics,
    NominateModerator,
    AccessAdminSurface,
}

impl Capability {
    /// Every capability, in table order.
    pub const ALL: [Capability; 9] = [
        Capability::CreateContent,
        Capability::Enroll,
        Capability::ManageAccounts,
        Capability::PublishAnnouncement,
        Capability::HighlightDiscussion,
        Capability::ManageTaxonomy,
        Capability::ViewAnalytics,
        Capability::NominateModerator,
        Capability::AccessAdminSurface,
    ];

    /// Stable kebab-case name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Capability::CreateContent => "create-content",
            Capability::Enroll => "enroll",
            Capability::ManageAccounts => "manage-accounts",
            Capability::PublishAnnouncement => "publish-announcement",
            Capability::HighlightDiscussion => "highlight-discussion",
            Capability::ManageTaxonomy => "manage-taxonomy",
            Capability::ViewAnalytics => "view-analytics",
            Capability::NominateModerator => "nominate-moderator",
            Capability::AccessAdminSurface => "access-admin-surface",
        }
    }

    /// Whether `role` holds this capability.
    #[must_use]
    pub fn granted_to(&self, role: Role) -> bool {
        match self {
            Capability::CreateContent => {
                matches!(role, Role::ContentCreator | Role::Administrator)
            }
            Capability::Enroll => matches!(
                role,
                Role::BaseMember
                    | Role::ContentCreator
                    | Role::CommunityModerator
                    | Role::Administrator
            ),
            Capability::ManageAccounts
            | Capability::PublishAnnouncement
            | Capability::ManageTaxonomy
            | Capability::AccessAdminSurface => matches!(role, Role::Administrator),
            Capability::HighlightDiscussion => {
                matches!(role, Role::CommunityModerator | Role::Administrator)
            }
            Capability::ViewAnalytics => matches!(
                role,
                Role::ContentCreator | Role::CommunityModerator | Role::Administrator
            ),
            Capability::NominateModerator => {
                matches!(role, Role::ContentCreator | Role::Administrator)
            }
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// CAPABILITY SET
// =============================================================================

/// The full capability set of one role. Recomputed on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct CapabilitySet {
    pub create_content: bool,
    pub enroll: bool,
    pub manage_accounts: bool,
    pub publish_announcement: bool,
    pub highlight_discussion: bool,
    pub manage_taxonomy: bool,
    pub view_analytics: bool,
    pub nominate_moderator: bool,
    pub access_admin_surface: bool,
}

impl CapabilitySet {
    /// The all-false set.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Look up a single capability.
    #[must_use]
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::CreateContent => self.create_content,
            Capability::Enroll => self.enroll,
            Capability::ManageAccounts => self.manage_accounts,
            Capability::PublishAnnouncement => self.publish_announcement,
            Capability::HighlightDiscussion => self.highlight_discussion,
            Capability::ManageTaxonomy => self.manage_taxonomy,
            Capability::ViewAnalytics => self.view_analytics,
            Capability::NominateModerator => self.nominate_moderator,
            Capability::AccessAdminSurface => self.access_admin_surface,
        }
    }

    /// Granted capabilities in table order.
    #[must_use]
    pub fn granted(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| self.allows(*c))
            .collect()
    }
}

/// Evaluate the capability set for a role.
///
/// `None` means the user has no resolvable profile and gets nothing.
#[must_use]
pub fn capabilities_for(role: Option<Role>) -> CapabilitySet {
    let Some(role) = role else {
        return CapabilitySet::none();
    };

    CapabilitySet {
        create_content: Capability::CreateContent.granted_to(role),
        enroll: Capability::Enroll.granted_to(role),
        manage_accounts: Capability::ManageAccounts.granted_to(role),
        publish_announcement: Capability::PublishAnnouncement.granted_to(role),
        highlight_discussion: Capability::HighlightDiscussion.granted_to(role),
        manage_taxonomy: Capability::ManageTaxonomy.granted_to(role),
        view_analytics: Capability::ViewAnalytics.granted_to(role),
        nominate_moderator: Capability::NominateModerator.granted_to(role),
        access_admin_surface: Capability::AccessAdminSurface.granted_to(role),
    }
}

/// Gate an action on a capability.
pub fn require(role: Option<Role>, capability: Capability) -> Result<(), CohortError> {
    if capabilities_for(role).allows(capability) {
        Ok(())
    } else {
        Err(CohortError::PermissionDenied {
            capability: capability.name(),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
