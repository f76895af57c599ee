use std::sync::Arc;

use axum::{
    extract::{Form, Path, State},
    response::Response,
    routing::{get, post},
    Extension, Router,
};
use axum_macros::debug_handler;

use super::{respond, Error};
use crate::{
    auth::RequestContext,
    model::{snippet, AppState},
    snippets::handler,
};

pub fn router() -> Router<Arc<AppState>> {
    Router::<Arc<AppState>>::new()
        .route("/", get(list))
        .route("/new", get(new))
        .route("/create", post(create))
        .route("/:id/edit", get(edit))
        .route("/:id/update", post(update))
        .route("/:id/delete", get(remove).post(delete))
}

/// The body of the create and update forms.
#[derive(Debug, serde::Deserialize)]
pub struct CodeForm {
    #[serde(default)]
    pub code: String,
}

#[debug_handler]
async fn list(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<RequestContext>,
) -> Result<Response, Error> {
    let outcome = handler::list(&*state.database.lock().await)?;
    respond(&state, &context, outcome).await
}

#[debug_handler]
async fn new(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<RequestContext>,
) -> Result<Response, Error> {
    let outcome = handler::request_create_form(&context);
    respond(&state, &context, outcome).await
}

#[debug_handler]
async fn create(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<RequestContext>,
    Form(form): Form<CodeForm>,
) -> Result<Response, Error> {
    let outcome = handler::create(&*state.database.lock().await, &context, form.code);
    respond(&state, &context, outcome).await
}

#[debug_handler]
async fn edit(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<RequestContext>,
    Path(id): Path<snippet::Id>,
) -> Result<Response, Error> {
    let outcome = handler::request_edit_form(&*state.database.lock().await, &context, id);
    respond(&state, &context, outcome).await
}

#[debug_handler]
async fn update(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<RequestContext>,
    Path(id): Path<snippet::Id>,
    Form(form): Form<CodeForm>,
) -> Result<Response, Error> {
    let outcome = handler::update(&*state.database.lock().await, &context, id, form.code);
    respond(&state, &context, outcome).await
}

#[debug_handler]
async fn remove(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<RequestContext>,
    Path(id): Path<snippet::Id>,
) -> Result<Response, Error> {
    let outcome = handler::request_delete_form(&*state.database.lock().await, &context, id);
    respond(&state, &context, outcome).await
}

#[debug_handler]
async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<RequestContext>,
    Path(id): Path<snippet::Id>,
) -> Result<Response, Error> {
    let outcome = handler::delete(&*state.database.lock().await, &context, id);
    respond(&state, &context, outcome).await
}
