use crate::model::{snippet, Flash, Snippet};

/// The single result of a handler operation.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Render(View),
    Redirect { to: Target, flash: Flash },
    /// Bare `403`, no body and no flash.
    Forbidden,
}

#[derive(Debug, PartialEq, Eq)]
pub enum View {
    List(Vec<Snippet>),
    CreateForm { code: String, errors: Vec<String> },
    EditForm { snippet: SnippetForm, errors: Vec<String> },
    DeleteForm(SnippetForm),
}

/// Where a redirect goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// `/code`
    Listing,
    /// The referring page, or the listing without one.
    Back,
    /// `/`
    Root,
}

/// What the edit and delete pages show.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SnippetForm {
    pub id: snippet::Id,
    pub code: String,
    pub author: String,
}

impl From<Snippet> for SnippetForm {
    fn from(snippet: Snippet) -> Self {
        SnippetForm {
            id: snippet.id,
            code: snippet.code,
            author: snippet.owner,
        }
    }
}

impl Outcome {
    pub(super) fn redirect(to: Target, flash: Flash) -> Outcome {
        Outcome::Redirect { to, flash }
    }
}
