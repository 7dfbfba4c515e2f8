use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A privileged judging action.
///
/// Persisted as one boolean column per variant on `evaluator_permission` and
/// carried in tokens by its snake_case name.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    JudgeEntries,
    AssignEntryGroups,
    AssignEvaluatorGroups,
    ManageJudgingGroups,
    EditEntries,
    ViewAllEvaluations,
    EditAllEvaluations,
    ViewAdminStats,
    ManageWinners,
}

impl Permission {
    pub const ALL: &'static [Permission] = &[
        Self::JudgeEntries,
        Self::AssignEntryGroups,
        Self::AssignEvaluatorGroups,
        Self::ManageJudgingGroups,
        Self::EditEntries,
        Self::ViewAllEvaluations,
        Self::EditAllEvaluations,
        Self::ViewAdminStats,
        Self::ManageWinners,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JudgeEntries => "judge_entries",
            Self::AssignEntryGroups => "assign_entry_groups",
            Self::AssignEvaluatorGroups => "assign_evaluator_groups",
            Self::ManageJudgingGroups => "manage_judging_groups",
            Self::EditEntries => "edit_entries",
            Self::ViewAllEvaluations => "view_all_evaluations",
            Self::EditAllEvaluations => "edit_all_evaluations",
            Self::ViewAdminStats => "view_admin_stats",
            Self::ManageWinners => "manage_winners",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an unknown permission name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission '{0}'")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

/// The set of permissions granted to an account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0.contains(&permission)
    }

    pub fn insert(&mut self, permission: Permission) -> bool {
        self.0.insert(permission)
    }

    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build a set from permission names, skipping names this build does not know.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|name| name.as_ref().parse().ok())
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.iter().map(|p| p.as_str().to_string()).collect()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The authenticated caller of a judging operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Actor {
    pub id: i32,
    pub username: String,
    pub is_admin: bool,
    pub account_locked: bool,
    pub permissions: PermissionSet,
}

impl Actor {
    pub fn can(&self, permission: Permission) -> bool {
        has_permission(Some(self), permission)
    }

    /// Admin flag on an unlocked account.
    pub fn is_effective_admin(&self) -> bool {
        self.is_admin && !self.account_locked
    }
}

/// Whether `actor` may perform `permission`.
///
/// Unauthenticated callers and locked accounts have no permissions; admins have all of them.
pub fn has_permission(actor: Option<&Actor>, permission: Permission) -> bool {
    match actor {
        None => false,
        Some(actor) if actor.account_locked => false,
        Some(actor) if actor.is_admin => true,
        Some(actor) => actor.permissions.contains(permission),
    }
}
