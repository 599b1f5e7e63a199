//! User domain model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::field::clean;
use crate::domain::result::Result;

/// The details a patron identifies with; unique across users
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, phone: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
        }
    }

    /// Trimmed identity; the name is mandatory, phone and email may be blank
    pub fn normalized(&self) -> Result<Self> {
        Ok(Self {
            name: clean("name", &self.name, true)?,
            phone: clean("phone", &self.phone, false)?,
            email: clean("email", &self.email, false)?,
        })
    }
}

/// A registered library patron
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl User {
    /// Create a user with a freshly generated id
    pub fn register(identity: Identity) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: identity.name,
            phone: identity.phone,
            email: identity.email,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity::new(&self.name, &self.phone, &self.email)
    }

    pub fn matches(&self, identity: &Identity) -> bool {
        self.name == identity.name && self.phone == identity.phone && self.email == identity.email
    }

    pub fn has_email(&self) -> bool {
        !self.email.is_empty()
    }
}
