use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Admin role as stored in the `role` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminRole {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "superadmin")]
    SuperAdmin,
    #[serde(rename = "branch-admin")]
    BranchAdmin,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::Admin => "admin",
            AdminRole::SuperAdmin => "superadmin",
            AdminRole::BranchAdmin => "branch-admin",
        }
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(AdminRole::Admin),
            "superadmin" => Ok(AdminRole::SuperAdmin),
            "branch-admin" => Ok(AdminRole::BranchAdmin),
            other => Err(anyhow::anyhow!("Unknown admin role: {}", other)),
        }
    }
}

/// Admin credential record (`adminusers` collection)
///
/// Field names are camelCase so documents written by the existing admin
/// tooling deserialize as-is. The bcrypt hash lives under `password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: AdminRole,
    #[serde(default)]
    pub managed_branches: Vec<ObjectId>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime>,
}

fn default_active() -> bool {
    true
}

impl AdminUser {
    /// Build an active user with a fresh id from an already hashed password
    pub fn new(username: String, password_hash: String, role: AdminRole) -> Self {
        Self {
            id: Some(ObjectId::new()),
            username,
            password_hash,
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            role,
            managed_branches: Vec::new(),
            is_active: true,
            last_login: None,
        }
    }

    pub fn with_profile(mut self, email: &str, first_name: &str, last_name: &str) -> Self {
        self.email = email.to_string();
        self.first_name = first_name.to_string();
        self.last_name = last_name.to_string();
        self
    }

    pub fn with_managed_branches(mut self, branches: Vec<ObjectId>) -> Self {
        self.managed_branches = branches;
        self
    }
}
