//! Response shapes returned by the tsuru API.
//!
//! The client keeps no durable copy of these; commands render them and drop them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Team {
    pub name: String,
}

/// Body of `GET /teams/{team}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamMembers {
    #[serde(rename = "Users", default)]
    pub users: Vec<String>,
}

impl TeamMembers {
    /// Member emails in ascending order
    pub fn sorted_users(mut self) -> Vec<String> {
        self.users.sort();
        self.users
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct NewUser<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewTeam<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct PasswordChange<'a> {
    pub old: &'a str,
    pub new: &'a str,
}
