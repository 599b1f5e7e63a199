//! Auth service - the shared librarian password

use crate::domain::result::{Error, Result};

pub struct AuthService {
    librarian_password: String,
}

impl AuthService {
    pub fn new(librarian_password: impl Into<String>) -> Self {
        Self {
            librarian_password: librarian_password.into(),
        }
    }

    pub fn verify_librarian(&self, password: &str) -> bool {
        !self.librarian_password.is_empty() && password == self.librarian_password
    }

    /// Gate for librarian-only operations
    pub fn require_librarian(&self, password: &str) -> Result<()> {
        if self.verify_librarian(password) {
            Ok(())
        } else {
            Err(Error::AccessDenied("incorrect librarian password".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_check() {
        let auth = AuthService::new("admin123");
        assert!(auth.verify_librarian("admin123"));
        assert!(!auth.verify_librarian("admin"));
        assert!(matches!(auth.require_librarian(""), Err(Error::AccessDenied(_))));
    }

    #[test]
    fn test_empty_password_locks_everyone_out() {
        let auth = AuthService::new("");
        assert!(!auth.verify_librarian(""));
    }
}
