use axum::{
    http::header::SET_COOKIE,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use log::{debug, trace};
use tera::{Context, Tera};

use crate::{
    auth::RequestContext,
    model::AppState,
    routes::{cookie, Error},
};

pub fn load(glob: &str) -> tera::Result<Tera> {
    let templates = Tera::new(glob)?;
    debug!(
        "Loaded templates: {:?}",
        templates.get_template_names().collect::<Vec<_>>()
    );
    Ok(templates)
}

/// Render a page for the given request.
///
/// Adds the logged in user and the pending flash, if any, to the context.
/// A shown flash is removed from the store and its cookie cleared.
pub async fn render(
    state: &AppState,
    request: &RequestContext,
    name: &str,
    mut context: Context,
) -> Result<Response, Error> {
    let mut cookies = Vec::new();

    if let Some(token) = request.flash {
        let flash = state.database.lock().await.take_flash(token)?;
        trace!("Showing flash {:?}", flash);
        context.insert("flash", &flash);
        cookies.push((SET_COOKIE, cookie::clear_cookie(cookie::FLASH)));
    }

    context.insert("identity", &request.identity());

    let rendered = state.templates.render(name, &context)?;
    Ok((AppendHeaders(cookies), Html(rendered)).into_response())
}
