//! Member service - patron registration and lookup

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::adapters::repository::LibraryRepository;
use crate::domain::result::{Committed, Error, Result};
use crate::domain::{Identity, User};

/// Result of the welcome flow: an existing account or a fresh one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Login {
    pub user: User,
    pub created: bool,
}

/// Member service for patron accounts
pub struct MemberService {
    repository: Arc<LibraryRepository>,
}

impl MemberService {
    pub fn new(repository: Arc<LibraryRepository>) -> Self {
        Self { repository }
    }

    /// Register a new patron; the (name, phone, email) triple must be unused
    pub fn register(&self, identity: &Identity) -> Result<Committed<User>> {
        let identity = identity.normalized()?;
        self.repository.update_users(|users| {
            if users.iter().any(|u| u.matches(&identity)) {
                debug!("User with these details already exists");
                return Err(Error::DuplicateEntry(format!(
                    "a user named '{}' with the same phone and email is already registered",
                    identity.name
                )));
            }
            let user = User::register(identity);
            users.push(user.clone());
            debug!("User {} registered", user.id);
            Ok(user)
        })
    }

    /// Exact match on the identity triple
    ///
    /// An identity that could never be stored (blank name, delimiter inside a
    /// field) matches nobody, so it is reported as not found.
    pub fn find_by_identity(&self, identity: &Identity) -> Result<User> {
        let Ok(identity) = identity.normalized() else {
            debug!("Lookup with an unstorable identity");
            return Err(Error::not_found("user with the given details"));
        };
        self.repository
            .read(|_, users| users.iter().find(|u| u.matches(&identity)).cloned())
            .ok_or_else(|| {
                debug!("No user found with the given details");
                Error::not_found(format!("user '{}' with the given phone and email", identity.name))
            })
    }

    pub fn find_by_id(&self, user_id: &str) -> Result<User> {
        let user_id = user_id.trim();
        self.repository
            .find_user(user_id)
            .ok_or_else(|| Error::not_found(format!("user {}", user_id)))
    }

    /// Find the patron with this identity, registering them if unknown
    pub fn login_or_register(&self, identity: &Identity) -> Result<Committed<Login>> {
        match self.find_by_identity(identity) {
            Ok(user) => Ok(Committed::new(
                Login {
                    user,
                    created: false,
                },
                None,
            )),
            Err(Error::NotFound(_)) => {
                let Committed { value, warning } = self.register(identity)?;
                Ok(Committed::new(
                    Login {
                        user: value,
                        created: true,
                    },
                    warning,
                ))
            }
            Err(e) => Err(e),
        }
    }

    pub fn list(&self) -> Vec<User> {
        self.repository.users()
    }
}
