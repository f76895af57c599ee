use rusqlite::Result as SqlResult;

pub type Id = i64;

/// A stored piece of code and the name of the user who created it.
///
/// `owner` is a copy of the creator's user name, not a reference to the
/// user row. It never changes after creation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Snippet {
    pub id: Id,
    pub code: String,
    pub owner: String,
}

/// A snippet that hasn't been given an id by the store yet.
#[derive(Clone, Debug)]
pub struct NewSnippet {
    pub code: String,
    pub owner: String,
}

/// The storage operations the snippet handler needs.
///
/// Every method is a single call against the store; there are no
/// multi-step transactions.
pub trait SnippetRepository {
    fn find_all(&self) -> SqlResult<Vec<Snippet>>;

    fn find_by_id(&self, id: Id) -> SqlResult<Option<Snippet>>;

    /// Insert a snippet, returning it with its store assigned id.
    fn insert(&self, snippet: NewSnippet) -> SqlResult<Snippet>;

    /// Replace the code of a snippet. Returns the number of rows modified.
    fn update_code(&self, id: Id, code: &str) -> SqlResult<usize>;

    /// Returns the number of rows deleted, `0` if the id doesn't exist.
    fn delete(&self, id: Id) -> SqlResult<usize>;
}
