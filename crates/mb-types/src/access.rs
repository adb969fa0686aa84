use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Roles a principal may hold on the ledger. Non-exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// May grant and revoke roles and toggle the pause switch.
    Admin,
    /// May store daily evidence snapshots.
    SnapshotSubmitter,
    /// May file and amend monthly settlements.
    SettlementSubmitter,
}

impl Role {
    pub const ALL: [Role; 3] = [
        Role::Admin,
        Role::SnapshotSubmitter,
        Role::SettlementSubmitter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::SnapshotSubmitter => "snapshot-submitter",
            Role::SettlementSubmitter => "settlement-submitter",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "snapshot-submitter" => Ok(Role::SnapshotSubmitter),
            "settlement-submitter" => Ok(Role::SettlementSubmitter),
            other => Err(TypeError::UnknownRole(other.to_string())),
        }
    }
}

/// Global availability switch. Mutations require `Active`; reads never
/// consult this.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PauseState {
    #[default]
    Active,
    Paused,
}

impl PauseState {
    pub fn is_paused(&self) -> bool {
        matches!(self, PauseState::Paused)
    }
}

impl fmt::Display for PauseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PauseState::Active => write!(f, "active"),
            PauseState::Paused => write!(f, "paused"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_string_roundtrip() {
        for role in Role::ALL {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(matches!(
            Role::from_str("minter"),
            Err(TypeError::UnknownRole(_))
        ));
    }

    #[test]
    fn role_serde_uses_kebab_case() {
        let json = serde_json::to_string(&Role::SnapshotSubmitter).unwrap();
        assert_eq!(json, "\"snapshot-submitter\"");
        let parsed: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Role::SnapshotSubmitter);
    }

    #[test]
    fn default_pause_state_is_active() {
        let state = PauseState::default();
        assert_eq!(state, PauseState::Active);
        assert!(!state.is_paused());
    }
}
