//! Biblio Core - circulation logic for a small lending library
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (BookCopy, Loan, User) and error types
//! - **codec**: Pipe-delimited line format for stored records
//! - **ports**: Trait definitions for external dependencies (RecordStore, Notifier)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (flat files, directory lock, log notifier)

pub mod adapters;
pub mod codec;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use adapters::lock::DirectoryLock;
use adapters::notifier::LogNotifier;
use adapters::repository::LibraryRepository;
use config::Config;
use ports::Notifier;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Committed, DecodeError, Error, OperationResult};
pub use domain::{BookCopy, BookTemplate, CopyState, CopyStatus, Identity, Loan, User};
pub use services::logging::{EntryPoint, LogEvent, LoggingService};

/// Main context for library operations
///
/// This is the primary entry point for all business logic. It holds the
/// configuration, the repository and all services. The data directory stays
/// locked for as long as the context lives.
pub struct LibraryContext {
    pub config: Config,
    pub data_dir: PathBuf,
    pub repository: Arc<LibraryRepository>,
    pub catalog_service: CatalogService,
    pub circulation_service: CirculationService,
    pub member_service: MemberService,
    pub notify_service: NotifyService,
    pub status_service: StatusService,
    pub doctor_service: DoctorService,
    pub auth_service: AuthService,
    _lock: DirectoryLock,
}

impl LibraryContext {
    /// Open the library stored in `data_dir` using its settings.json
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        Self::with_config(data_dir, config, Arc::new(LogNotifier))
    }

    /// Open the library with an explicit config and notifier
    pub fn with_config(data_dir: &Path, config: Config, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let lock = DirectoryLock::acquire(data_dir)?;

        let repository = Arc::new(LibraryRepository::flat_files(
            &config.books_path(data_dir),
            &config.users_path(data_dir),
        ));

        let catalog_service = CatalogService::new(Arc::clone(&repository));
        let circulation_service =
            CirculationService::new(Arc::clone(&repository), config.require_registered_users);
        let member_service = MemberService::new(Arc::clone(&repository));
        let notify_service = NotifyService::new(Arc::clone(&repository), notifier);
        let status_service = StatusService::new(Arc::clone(&repository));
        let doctor_service = DoctorService::new(Arc::clone(&repository));
        let auth_service = AuthService::new(config.librarian_password.clone());

        Ok(Self {
            config,
            data_dir: data_dir.to_path_buf(),
            repository,
            catalog_service,
            circulation_service,
            member_service,
            notify_service,
            status_service,
            doctor_service,
            auth_service,
            _lock: lock,
        })
    }

    /// Problems met while loading the data files
    pub fn load_warnings(&self) -> &[String] {
        self.repository.load_warnings()
    }
}
