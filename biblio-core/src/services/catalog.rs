//! Catalog service - adding, removing and listing book copies

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::adapters::repository::LibraryRepository;
use crate::domain::result::{Committed, Error, Result};
use crate::domain::{BookCopy, BookTemplate, CopyStatus};

/// Criteria for listing copies; unset fields match everything
#[derive(Debug, Clone, Default)]
pub struct CopyFilter {
    pub isbn: Option<String>,
    pub status: Option<CopyStatus>,
    /// Only copies still out after their due date as of this day
    pub overdue_as_of: Option<NaiveDate>,
}

impl CopyFilter {
    fn matches(&self, copy: &BookCopy) -> bool {
        if let Some(isbn) = &self.isbn {
            if copy.isbn != *isbn {
                return false;
            }
        }
        if let Some(status) = self.status {
            if copy.status() != status {
                return false;
            }
        }
        if let Some(as_of) = self.overdue_as_of {
            if !copy.is_overdue(as_of) {
                return false;
            }
        }
        true
    }
}

/// Catalog service for physical copies
pub struct CatalogService {
    repository: Arc<LibraryRepository>,
}

impl CatalogService {
    pub fn new(repository: Arc<LibraryRepository>) -> Self {
        Self { repository }
    }

    /// Add `count` new available copies of the given edition
    ///
    /// Every copy gets its own id. Returns the created copies.
    pub fn add_copies(&self, template: &BookTemplate, count: usize) -> Result<Committed<Vec<BookCopy>>> {
        if count == 0 {
            debug!("Refusing to add zero copies");
            return Err(Error::validation("number of copies must be at least 1"));
        }
        let template = template.normalized()?;

        self.repository.update_books(|books, _| {
            let created: Vec<BookCopy> = (0..count).map(|_| BookCopy::from_template(&template)).collect();
            books.extend(created.iter().cloned());
            debug!(
                "Added {} copies of '{}' (ISBN {})",
                count, template.title, template.isbn
            );
            Ok(created)
        })
    }

    /// Delete one copy; only available copies can be removed
    pub fn remove_copy(&self, copy_id: &str) -> Result<Committed<BookCopy>> {
        let copy_id = copy_id.trim();
        self.repository.update_books(|books, _| {
            let Some(idx) = books.iter().position(|b| b.id == copy_id) else {
                debug!("Copy {} not found for removal", copy_id);
                return Err(Error::not_found(format!("copy {}", copy_id)));
            };
            if !books[idx].is_available() {
                debug!(
                    "Cannot remove copy {}: it is currently {}",
                    copy_id,
                    books[idx].status()
                );
                return Err(Error::invalid_state(format!(
                    "copy {} is {} and cannot be removed",
                    copy_id,
                    books[idx].status().to_string().to_lowercase()
                )));
            }
            let removed = books.remove(idx);
            debug!("Copy {} removed", copy_id);
            Ok(removed)
        })
    }

    pub fn get(&self, copy_id: &str) -> Result<BookCopy> {
        self.repository
            .find_book(copy_id.trim())
            .ok_or_else(|| Error::not_found(format!("copy {}", copy_id.trim())))
    }

    /// All copies matching `filter`, in catalog order
    pub fn list(&self, filter: &CopyFilter) -> Vec<BookCopy> {
        self.repository.read(|books, _| {
            books.iter().filter(|b| filter.matches(b)).cloned().collect()
        })
    }
}
