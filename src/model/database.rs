use std::path::Path;

use super::{
    session::{self, Token},
    snippet::{self, NewSnippet},
    user, Flash, FlashKind, Session, Snippet, SnippetRepository, User,
};
use log::{debug, info, trace};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Result as SqlResult, Row};

type Result<T> = SqlResult<Option<T>>;

pub struct Database {
    conn: Connection,
}

/// Build the database.
impl Database {
    pub fn open(path: &Path) -> SqlResult<Database> {
        let conn = Connection::open(path)?;
        trace!("Opened database connection to {}", path.display());
        Database::init_db(conn)
    }

    /// A private database that disappears with the connection.
    pub fn in_memory() -> SqlResult<Database> {
        let conn = Connection::open_in_memory()?;
        trace!("Opened in-memory database connection.");
        Database::init_db(conn)
    }

    fn init_db(conn: Connection) -> SqlResult<Database> {
        trace!("Initializing database...");

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id       INTEGER PRIMARY KEY,
                name     TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
            )",
            (),
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS sessions (
                id    INTEGER PRIMARY KEY,
                token INTEGER NOT NULL UNIQUE,
                user  INTEGER NOT NULL,
                FOREIGN KEY(user) REFERENCES users(id)
            )",
            (),
        )?;

        // `owner` is a copy of the user name, deliberately not a foreign key
        conn.execute(
            "CREATE TABLE IF NOT EXISTS snippets (
                id    INTEGER PRIMARY KEY,
                code  TEXT NOT NULL,
                owner TEXT NOT NULL
            )",
            (),
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS flashes (
                token INTEGER PRIMARY KEY,
                kind  TEXT NOT NULL,
                text  TEXT NOT NULL
            )",
            (),
        )?;

        info!("Finished initializing database");

        Ok(Database { conn })
    }
}

/// User stuff
impl Database {
    /// Add a user, returning its id.
    ///
    /// `password` must already be hashed.
    pub fn add_user(&self, name: &str, password: &str) -> SqlResult<user::Id> {
        debug!("Adding user {} to database", name);
        self.conn.execute(
            "INSERT INTO users (name, password) VALUES (?1, ?2)",
            (name, password),
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_user_by_name(&self, name: &str) -> Result<User> {
        debug!("Getting user (name: {})", name);
        self.conn
            .query_row(
                "SELECT id, name, password FROM users WHERE name=?1",
                (name,),
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        password: row.get(2)?,
                    })
                },
            )
            .optional()
    }
}

/// Session stuff
impl Database {
    pub fn add_session(&self, token: Token, user_id: user::Id) -> SqlResult<session::Id> {
        debug!("Adding session for user {}", user_id);
        self.conn.execute(
            "INSERT INTO sessions (token, user) VALUES (?1, ?2)",
            (token, user_id),
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_session_from_token(&self, token: &Token) -> Result<Session> {
        trace!("Getting session from token");
        self.conn
            .query_row(
                "SELECT sessions.id, sessions.token, sessions.user, users.name
                FROM sessions JOIN users ON users.id = sessions.user
                WHERE sessions.token=?1",
                (token,),
                |row| {
                    Ok(Session::new(
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                    ))
                },
            )
            .optional()
    }

    pub fn delete_session(&self, id: &session::Id) -> SqlResult<()> {
        debug!("Deleting session {}", id);
        self.conn
            .execute("DELETE FROM sessions WHERE id=?1", (id,))?;
        Ok(())
    }
}

/// Flash stuff
impl Database {
    pub fn add_flash(&self, token: Token, flash: &Flash) -> SqlResult<()> {
        trace!("Storing {} flash", flash.kind);
        self.conn.execute(
            "INSERT OR REPLACE INTO flashes (token, kind, text) VALUES (?1, ?2, ?3)",
            (token, flash.kind.as_str(), flash.text.as_str()),
        )?;
        Ok(())
    }

    /// Read a flash and forget it, so it is only ever shown once.
    pub fn take_flash(&self, token: Token) -> Result<Flash> {
        let flash = self
            .conn
            .query_row(
                "SELECT kind, text FROM flashes WHERE token=?1",
                (token,),
                |row| {
                    let kind: String = row.get(0)?;
                    Ok(Flash {
                        kind: FlashKind::parse(&kind),
                        text: row.get(1)?,
                    })
                },
            )
            .optional()?;

        if flash.is_some() {
            self.conn
                .execute("DELETE FROM flashes WHERE token=?1", (token,))?;
        }

        Ok(flash)
    }
}

/// Snippet stuff
impl SnippetRepository for Database {
    fn find_all(&self) -> SqlResult<Vec<Snippet>> {
        trace!("Getting all snippets");

        let mut stmt = self
            .conn
            .prepare("SELECT id, code, owner FROM snippets ORDER BY id")?;
        let snippets = stmt
            .query_map((), map_snippet)?
            .collect::<SqlResult<Vec<_>>>();

        snippets
    }

    fn find_by_id(&self, id: snippet::Id) -> SqlResult<Option<Snippet>> {
        debug!("Getting snippet {}", id);
        self.conn
            .query_row(
                "SELECT id, code, owner FROM snippets WHERE id=?1",
                (id,),
                map_snippet,
            )
            .optional()
    }

    fn insert(&self, snippet: NewSnippet) -> SqlResult<Snippet> {
        debug!("Adding snippet by {} to database", snippet.owner);

        self.conn.execute(
            "INSERT INTO snippets (code, owner) VALUES (?1, ?2)",
            (snippet.code.as_str(), snippet.owner.as_str()),
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Added snippet {} to database", id);

        Ok(Snippet {
            id,
            code: snippet.code,
            owner: snippet.owner,
        })
    }

    fn update_code(&self, id: snippet::Id, code: &str) -> SqlResult<usize> {
        debug!("Updating code of snippet {}", id);
        self.conn
            .execute("UPDATE snippets SET code=?1 WHERE id=?2", (code, id))
    }

    fn delete(&self, id: snippet::Id) -> SqlResult<usize> {
        debug!("Deleting snippet {}", id);
        self.conn.execute("DELETE FROM snippets WHERE id=?1", (id,))
    }
}

fn map_snippet(row: &Row) -> SqlResult<Snippet> {
    Ok(Snippet {
        id: row.get(0)?,
        code: row.get(1)?,
        owner: row.get(2)?,
    })
}

/// Whether an error was caused by a `UNIQUE` (or other) constraint.
pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _) if inner.code == ErrorCode::ConstraintViolation
    )
}
