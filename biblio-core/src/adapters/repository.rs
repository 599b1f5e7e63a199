//! Library repository - sole owner of the in-memory collections

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::adapters::flatfile::FlatFileStore;
use crate::codec::Record;
use crate::domain::result::{Committed, Result};
use crate::domain::{BookCopy, User};
use crate::ports::RecordStore;

struct Collections {
    books: Vec<BookCopy>,
    users: Vec<User>,
}

/// Owns both collections and their backing stores
///
/// Every mutation runs under one lock and is followed by a full rewrite of the
/// affected collection before the lock is released. Records never leave the
/// repository by reference; readers get clones or borrow inside a closure.
pub struct LibraryRepository {
    state: Mutex<Collections>,
    book_store: Box<dyn RecordStore<BookCopy>>,
    user_store: Box<dyn RecordStore<User>>,
    load_warnings: Vec<String>,
}

impl LibraryRepository {
    /// Load both collections from the given stores
    pub fn open(
        book_store: Box<dyn RecordStore<BookCopy>>,
        user_store: Box<dyn RecordStore<User>>,
    ) -> Self {
        let books = book_store.load();
        let users = user_store.load();

        let mut load_warnings = books.warnings;
        load_warnings.extend(users.warnings);

        Self {
            state: Mutex::new(Collections {
                books: books.records,
                users: users.records,
            }),
            book_store,
            user_store,
            load_warnings,
        }
    }

    /// Open a repository backed by the two flat text files
    pub fn flat_files(books_path: &Path, users_path: &Path) -> Self {
        Self::open(
            Box::new(FlatFileStore::<BookCopy>::new(books_path)),
            Box::new(FlatFileStore::<User>::new(users_path)),
        )
    }

    /// Problems met while loading (missing files, skipped lines)
    pub fn load_warnings(&self) -> &[String] {
        &self.load_warnings
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // === Reads ===

    pub fn books(&self) -> Vec<BookCopy> {
        self.lock().books.clone()
    }

    pub fn users(&self) -> Vec<User> {
        self.lock().users.clone()
    }

    pub fn find_book(&self, id: &str) -> Option<BookCopy> {
        self.lock().books.iter().find(|b| b.id == id).cloned()
    }

    pub fn find_user(&self, id: &str) -> Option<User> {
        self.lock().users.iter().find(|u| u.id == id).cloned()
    }

    /// Borrow both collections for a read-only pass
    pub fn read<T>(&self, f: impl FnOnce(&[BookCopy], &[User]) -> T) -> T {
        let state = self.lock();
        f(&state.books, &state.users)
    }

    // === Mutations ===

    /// Apply `f` to the book collection and persist it if `f` succeeds
    ///
    /// The user collection is passed read-only so checks against it happen
    /// under the same lock.
    pub fn update_books<T>(
        &self,
        f: impl FnOnce(&mut Vec<BookCopy>, &[User]) -> Result<T>,
    ) -> Result<Committed<T>> {
        let mut guard = self.lock();
        let state = &mut *guard;
        let value = f(&mut state.books, &state.users)?;
        let warning = persist(self.book_store.as_ref(), &state.books);
        Ok(Committed::new(value, warning))
    }

    /// Apply `f` to the user collection and persist it if `f` succeeds
    pub fn update_users<T>(
        &self,
        f: impl FnOnce(&mut Vec<User>) -> Result<T>,
    ) -> Result<Committed<T>> {
        let mut state = self.lock();
        let value = f(&mut state.users)?;
        let warning = persist(self.user_store.as_ref(), &state.users);
        Ok(Committed::new(value, warning))
    }
}

/// Save a collection, turning a failure into a warning message
fn persist<R: Record>(store: &dyn RecordStore<R>, records: &[R]) -> Option<String> {
    match store.save(records) {
        Ok(()) => None,
        Err(e) => {
            let msg = format!(
                "Could not save {} records to {}: {}. Changes are kept in memory only.",
                R::KIND,
                store.location(),
                e
            );
            warn!("{}", msg);
            Some(msg)
        }
    }
}
