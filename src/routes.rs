pub mod cookie;
mod error;
mod snippets;
mod users;

use std::{path::Path, sync::Arc};

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderName, StatusCode},
    middleware,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    routing::get,
    Extension, Router,
};
use axum_macros::debug_handler;
use tera::Context;
use tower_http::services::ServeDir;

pub use error::Error;

use crate::{
    auth::{self, token::generate_token, RequestContext},
    model::{AppState, Flash},
    snippets::{Outcome, Target, View},
    templates,
};

pub const LISTING: &str = "/code";

pub fn router(state: Arc<AppState>, public: &Path) -> Router {
    Router::new()
        .route("/", get(index))
        .nest("/code", snippets::router())
        .nest("/user", users::router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::context::resolve,
        ))
        .nest_service("/static", ServeDir::new(public))
        .with_state(state)
}

#[debug_handler]
async fn index(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<RequestContext>,
) -> Result<Response, Error> {
    templates::render(&state, &context, "home.html", Context::new()).await
}

/// Turn the outcome of a snippet operation into the one response it stands
/// for.
pub(crate) async fn respond(
    state: &AppState,
    context: &RequestContext,
    outcome: Outcome,
) -> Result<Response, Error> {
    match outcome {
        Outcome::Forbidden => Ok(StatusCode::FORBIDDEN.into_response()),
        Outcome::Redirect { to, flash } => {
            let path = match to {
                Target::Listing => LISTING,
                Target::Back => context.back.as_deref().unwrap_or(LISTING),
                Target::Root => "/",
            };
            redirect(state, context, path, flash, Vec::new()).await
        }
        Outcome::Render(view) => {
            let mut page = Context::new();
            let name = match view {
                View::List(snippets) => {
                    page.insert("snippets", &snippets);
                    "code/index.html"
                }
                View::CreateForm { code, errors } => {
                    page.insert("code", &code);
                    page.insert("errors", &errors);
                    "code/new.html"
                }
                View::EditForm { snippet, errors } => {
                    page.insert("snippet", &snippet);
                    page.insert("errors", &errors);
                    "code/edit.html"
                }
                View::DeleteForm(snippet) => {
                    page.insert("snippet", &snippet);
                    "code/delete.html"
                }
            };
            templates::render(state, context, name, page).await
        }
    }
}

/// Redirect, leaving a flash for the next page that gets rendered.
///
/// A flash still pending from an earlier redirect is replaced under the same
/// token, so only the newest one is kept. `cookies` are extra `Set-Cookie`
/// values sent along.
pub(crate) async fn redirect(
    state: &AppState,
    context: &RequestContext,
    path: &str,
    flash: Flash,
    mut cookies: Vec<String>,
) -> Result<Response, Error> {
    let token = context.flash.unwrap_or_else(generate_token);
    state.database.lock().await.add_flash(token, &flash)?;
    cookies.push(cookie::make_cookie(cookie::FLASH, token));

    let headers: Vec<(HeaderName, String)> = cookies
        .into_iter()
        .map(|cookie| (SET_COOKIE, cookie))
        .collect();

    Ok((AppendHeaders(headers), Redirect::to(path)).into_response())
}
