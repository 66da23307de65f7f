use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account lifecycle status, stored as TEXT in each account table.
///
/// TERMINATED is terminal: once an account reaches it, no further status
/// mutation is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
    Terminated,
}

/// Account role kind. Each variant routes to its own table, so an
/// unrecognized label is rejected at parse time rather than falling through
/// a string switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Employee,
    Agent,
    Hr,
}

impl Role {
    /// Parse a request role label. Matching is case-insensitive.
    pub fn from_label(label: &str) -> Option<Role> {
        match label.to_uppercase().as_str() {
            "EMPLOYEE" => Some(Role::Employee),
            "AGENT" => Some(Role::Agent),
            "HR" => Some(Role::Hr),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "Employee",
            Role::Agent => "Agent",
            Role::Hr => "HR",
        }
    }

    /// Table holding this role's accounts
    pub fn table(&self) -> &'static str {
        match self {
            Role::Employee => "employees",
            Role::Agent => "agents",
            Role::Hr => "hr_users",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One account record. Employees, agents and HR users are structurally
/// identical for lifecycle purposes; the role is carried by which table the
/// record lives in.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
}
