use std::sync::Arc;

use axum::{
    extract::{State, TypedHeader},
    headers::Cookie,
    http::{header::REFERER, HeaderMap, Request, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::trace;

use super::{token::parse_token, verify_session};
use crate::{
    model::{session::Token, AppState, Session},
    routes::cookie,
};

/// Everything a handler needs to know about who is asking.
///
/// Built once per request by [`resolve`] and never changed afterwards.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
    pub session: Option<Session>,
    /// Token of a flash waiting to be shown, from the `flash` cookie.
    pub flash: Option<Token>,
    /// Path of the referring page, if it sent one and it isn't the page
    /// being requested.
    pub back: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> RequestContext {
        RequestContext::default()
    }

    pub fn with_session(session: Session) -> RequestContext {
        RequestContext {
            session: Some(session),
            ..RequestContext::default()
        }
    }

    /// The name of the logged in user, if any.
    pub fn identity(&self) -> Option<&str> {
        self.session
            .as_ref()
            .map(|session| session.user_name.as_str())
            .filter(|name| !name.is_empty())
    }
}

/// Resolve the cookies of a request into a [`RequestContext`].
///
/// Unknown or malformed session tokens leave the request anonymous.
pub async fn resolve<B>(
    State(state): State<Arc<AppState>>,
    cookies: Option<TypedHeader<Cookie>>,
    mut request: Request<B>,
    next: Next<B>,
) -> Response {
    let back = back_path(request.headers(), request.uri());

    let (token, flash) = match &cookies {
        Some(TypedHeader(cookies)) => (
            cookies.get(cookie::TOKEN).and_then(parse_token),
            cookies.get(cookie::FLASH).and_then(parse_token),
        ),
        None => (None, None),
    };

    let session = match token {
        Some(token) => {
            let database = state.database.lock().await;
            match verify_session(token, &database) {
                Ok(session) => Some(session),
                Err(verify_session::Error::SessionNotFound) => None,
                Err(verify_session::Error::DatabaseError) => {
                    return StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            }
        }
        None => None,
    };

    match &session {
        Some(session) => trace!("Request made as {}", session.user_name),
        None => trace!("Request made anonymously"),
    }

    request.extensions_mut().insert(RequestContext {
        session,
        flash,
        back,
    });

    next.run(request).await
}

/// Where "back" leads for this request.
///
/// A referrer naming the requested page itself is dropped, otherwise a
/// failing page would keep redirecting to itself.
fn back_path(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let back = referer_path(headers)?;
    let back_page = back.split('?').next().unwrap_or_default();
    (back_page != uri.path()).then_some(back)
}

/// The path and query of the `Referer` header, dropping scheme and host so
/// redirects never leave the site.
fn referer_path(headers: &HeaderMap) -> Option<String> {
    let referer = headers.get(REFERER)?.to_str().ok()?;
    let uri = referer.parse::<Uri>().ok()?;
    uri.path_and_query()
        .map(|path| path.as_str().to_owned())
        .filter(|path| path.starts_with('/'))
}
