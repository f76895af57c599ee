pub mod database;
pub mod flash;
pub mod session;
pub mod snippet;
pub mod user;

use tera::Tera;
use tokio::sync::Mutex;

pub use database::Database;
pub use flash::{Flash, FlashKind};
pub use session::Session;
pub use snippet::{Snippet, SnippetRepository};
pub use user::User;

/// Shared by every request.
pub struct AppState {
    pub database: Mutex<Database>,
    pub templates: Tera,
}

impl AppState {
    pub fn new(database: Database, templates: Tera) -> AppState {
        AppState {
            database: Mutex::new(database),
            templates,
        }
    }
}
