//! Application state
//!
//! The accessors the commands work through: who is signed in, the selected
//! month's expenses and the category list. They hold in-memory copies and
//! turn failures into logged `false`/`None` results.

pub mod categories;
pub mod expenses;
pub mod screen;
pub mod session;

pub use categories::CategoryList;
pub use expenses::ExpenseBook;
pub use screen::{Screen, Section};
pub use session::SessionState;

use crate::auth::Identity;
use crate::config::{CifraPaths, Settings};
use crate::error::{CifraError, CifraResult};
use crate::storage::Storage;

/// Everything a command needs, built once in `main`
pub struct AppContext {
    pub paths: CifraPaths,
    pub settings: Settings,
    pub storage: Storage,
}

impl AppContext {
    /// Load settings and every table under `paths`
    pub fn load(paths: CifraPaths) -> CifraResult<Self> {
        let settings = Settings::load_or_create(&paths)?;
        let storage = Storage::new(paths.clone())?;
        storage.load_all()?;

        Ok(Self {
            paths,
            settings,
            storage,
        })
    }

    /// The session restored from the local cache
    pub fn session(&self) -> SessionState<'_> {
        SessionState::restore(&self.storage)
    }

    /// The signed-in identity, or `Unauthenticated`
    pub fn require_user<'s>(&self, session: &'s SessionState<'_>) -> CifraResult<&'s Identity> {
        session.user().ok_or(CifraError::Unauthenticated)
    }

    /// Which screen a bare `cifra` shows
    pub fn screen(&self, session: &SessionState<'_>) -> Screen {
        Screen::resolve(session.is_authenticated(), session.is_configured())
    }
}
