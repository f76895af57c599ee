use log::{debug, error, info, warn};
use rusqlite::Result as SqlResult;

use super::{
    gate::{can_act_as, is_logged_in},
    Outcome, SnippetForm, Target, View,
};
use crate::{
    auth::RequestContext,
    model::{
        snippet::{self, NewSnippet},
        Flash, Snippet, SnippetRepository,
    },
};

pub const CREATED: &str = "The code snippet was successfully created.";
pub const UPDATED: &str = "The code snippet was updated successfully!";
pub const UNCHANGED: &str = "The code snippet was already up to date.";
pub const UPDATE_FAILED: &str = "The code snippet failed to update";
pub const DELETED: &str = "Code snippet was deleted.";
pub const NOT_OWNER_EDIT: &str = "You must be logged in as this user to edit!";
pub const NOT_OWNER_DELETE: &str = "You must be logged in as this user to delete snippets!";
pub const CODE_REQUIRED: &str = "Code is required.";

fn not_found(id: snippet::Id) -> String {
    format!("Code snippet {} was not found.", id)
}

/// All snippets, for the listing. Store errors are the caller's problem.
pub fn list(store: &impl SnippetRepository) -> SqlResult<Outcome> {
    let snippets = store.find_all()?;
    debug!("Listing {} snippets", snippets.len());
    Ok(Outcome::Render(View::List(snippets)))
}

pub fn request_create_form(context: &RequestContext) -> Outcome {
    if !is_logged_in(context) {
        debug!("Anonymous request for the create form");
        return Outcome::Forbidden;
    }

    Outcome::Render(View::CreateForm {
        code: String::new(),
        errors: Vec::new(),
    })
}

pub fn create(store: &impl SnippetRepository, context: &RequestContext, code: String) -> Outcome {
    let Some(owner) = context.identity() else {
        warn!("Anonymous attempt to create a snippet");
        return Outcome::Forbidden;
    };

    if code.is_empty() {
        return Outcome::Render(View::CreateForm {
            code,
            errors: vec![CODE_REQUIRED.to_string()],
        });
    }

    let snippet = NewSnippet {
        code: code.clone(),
        owner: owner.to_string(),
    };

    match store.insert(snippet) {
        Ok(snippet) => {
            info!("{} created snippet {}", snippet.owner, snippet.id);
            Outcome::redirect(Target::Listing, Flash::success(CREATED))
        }
        Err(err) => {
            error!("Failed to add snippet to database: {}", err);
            Outcome::Render(View::CreateForm {
                code,
                errors: vec![err.to_string()],
            })
        }
    }
}

pub fn request_edit_form(
    store: &impl SnippetRepository,
    context: &RequestContext,
    id: snippet::Id,
) -> Outcome {
    let snippet = match fetch(store, id) {
        Ok(snippet) => snippet,
        Err(outcome) => return outcome,
    };

    if !can_act_as(context, &snippet.owner) {
        debug!("Refusing edit form of snippet {} to {:?}", id, context.identity());
        return Outcome::redirect(Target::Listing, Flash::fail(NOT_OWNER_EDIT));
    }

    Outcome::Render(View::EditForm {
        snippet: snippet.into(),
        errors: Vec::new(),
    })
}

pub fn update(
    store: &impl SnippetRepository,
    context: &RequestContext,
    id: snippet::Id,
    code: String,
) -> Outcome {
    if !is_logged_in(context) {
        warn!("Anonymous attempt to update snippet {}", id);
        return Outcome::Forbidden;
    }

    let snippet = match store.find_by_id(id) {
        Ok(Some(snippet)) => snippet,
        Ok(None) => {
            debug!("Snippet {} to update doesn't exist", id);
            return Outcome::redirect(Target::Listing, Flash::fail(UPDATE_FAILED));
        }
        Err(err) => {
            error!("Failed to get snippet {} from database: {}", id, err);
            return Outcome::redirect(Target::Root, Flash::fail(err.to_string()));
        }
    };

    if !can_act_as(context, &snippet.owner) {
        warn!(
            "{:?} attempted to update snippet {} owned by {}",
            context.identity(),
            id,
            snippet.owner
        );
        return Outcome::Forbidden;
    }

    if code.is_empty() {
        return Outcome::Render(View::EditForm {
            snippet: SnippetForm {
                code,
                ..SnippetForm::from(snippet)
            },
            errors: vec![CODE_REQUIRED.to_string()],
        });
    }

    // Nothing to write, but the snippet is exactly what was asked for
    if code == snippet.code {
        return Outcome::redirect(Target::Listing, Flash::success(UNCHANGED));
    }

    match store.update_code(id, &code) {
        Ok(1) => {
            info!("{} updated snippet {}", snippet.owner, id);
            Outcome::redirect(Target::Listing, Flash::success(UPDATED))
        }
        Ok(modified) => {
            // Deleted since it was fetched
            debug!("Updating snippet {} modified {} rows", id, modified);
            Outcome::redirect(Target::Listing, Flash::fail(UPDATE_FAILED))
        }
        Err(err) => {
            error!("Failed to update snippet {}: {}", id, err);
            Outcome::redirect(Target::Root, Flash::fail(err.to_string()))
        }
    }
}

pub fn request_delete_form(
    store: &impl SnippetRepository,
    context: &RequestContext,
    id: snippet::Id,
) -> Outcome {
    let snippet = match fetch(store, id) {
        Ok(snippet) => snippet,
        Err(outcome) => return outcome,
    };

    if !can_act_as(context, &snippet.owner) {
        debug!("Refusing delete form of snippet {} to {:?}", id, context.identity());
        return Outcome::redirect(Target::Listing, Flash::fail(NOT_OWNER_DELETE));
    }

    Outcome::Render(View::DeleteForm(snippet.into()))
}

pub fn delete(
    store: &impl SnippetRepository,
    context: &RequestContext,
    id: snippet::Id,
) -> Outcome {
    if !is_logged_in(context) {
        warn!("Anonymous attempt to delete snippet {}", id);
        return Outcome::Forbidden;
    }

    let snippet = match fetch(store, id) {
        Ok(snippet) => snippet,
        Err(outcome) => return outcome,
    };

    if !can_act_as(context, &snippet.owner) {
        warn!(
            "{:?} attempted to delete snippet {} owned by {}",
            context.identity(),
            id,
            snippet.owner
        );
        return Outcome::Forbidden;
    }

    match store.delete(id) {
        Ok(0) => {
            debug!("Snippet {} was already gone", id);
            Outcome::redirect(Target::Back, Flash::fail(not_found(id)))
        }
        Ok(_) => {
            info!("{} deleted snippet {}", snippet.owner, id);
            Outcome::redirect(Target::Listing, Flash::success(DELETED))
        }
        Err(err) => {
            error!("Failed to delete snippet {}: {}", id, err);
            Outcome::redirect(Target::Back, Flash::fail(err.to_string()))
        }
    }
}

/// Fetch a snippet for one of the forms, turning a missing snippet or a
/// store error into a redirect back with a failure flash.
fn fetch(store: &impl SnippetRepository, id: snippet::Id) -> Result<Snippet, Outcome> {
    match store.find_by_id(id) {
        Ok(Some(snippet)) => Ok(snippet),
        Ok(None) => {
            debug!("Snippet {} not found", id);
            Err(Outcome::redirect(Target::Back, Flash::fail(not_found(id))))
        }
        Err(err) => {
            error!("Failed to get snippet {} from database: {}", id, err);
            Err(Outcome::redirect(Target::Back, Flash::fail(err.to_string())))
        }
    }
}
