use std::sync::Arc;

use axum::{
    extract::{Form, State},
    response::Response,
    routing::{get, post},
    Extension, Router,
};
use axum_macros::debug_handler;
use log::{debug, error, info};
use tera::Context;

use super::{cookie, redirect, Error, LISTING};
use crate::{
    auth::{self, RequestContext},
    model::{database::is_constraint_violation, AppState, Flash},
    templates,
};

pub const MIN_PASSWORD_LENGTH: usize = 10;

const LOGIN: &str = "/user/login";

pub fn router() -> Router<Arc<AppState>> {
    Router::<Arc<AppState>>::new()
        .route("/register", get(register))
        .route("/create", post(create))
        .route("/login", get(login).post(login_post))
        .route("/logout", get(logout))
}

#[derive(serde::Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    /// The (**unhashed**) password
    #[serde(default)]
    pub password: String,
}

impl core::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Don't print the password
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish()
    }
}

/// Why a registration was turned down, if it was.
fn validate(credentials: &Credentials) -> Vec<String> {
    let mut errors = Vec::new();
    if credentials.username.is_empty() {
        errors.push("A username is required.".to_string());
    }
    if credentials.password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "Your password needs to be at least {} characters long.",
            MIN_PASSWORD_LENGTH
        ));
    }
    errors
}

async fn render_register(
    state: &AppState,
    context: &RequestContext,
    username: &str,
    errors: Vec<String>,
) -> Result<Response, Error> {
    let mut page = Context::new();
    page.insert("value", username);
    page.insert("errors", &errors);
    templates::render(state, context, "user/register.html", page).await
}

#[debug_handler]
async fn register(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<RequestContext>,
) -> Result<Response, Error> {
    render_register(&state, &context, "", Vec::new()).await
}

#[debug_handler]
async fn create(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<RequestContext>,
    Form(credentials): Form<Credentials>,
) -> Result<Response, Error> {
    debug!("Got register request: {:?}", credentials);

    let errors = validate(&credentials);
    if !errors.is_empty() {
        return render_register(&state, &context, &credentials.username, errors).await;
    }

    let password = auth::hash::hash_password(&credentials.password)
        .map_err(|err| Error::Hash(err.to_string()))?;

    let added = state
        .database
        .lock()
        .await
        .add_user(&credentials.username, &password);

    match added {
        Ok(id) => {
            info!("Registered user {} ({})", credentials.username, id);
            redirect(
                &state,
                &context,
                LOGIN,
                Flash::success("Your account was created, please log in."),
                Vec::new(),
            )
            .await
        }
        Err(err) if is_constraint_violation(&err) => {
            debug!("Username {} is taken", credentials.username);
            let errors = vec!["That username is already taken.".to_string()];
            render_register(&state, &context, &credentials.username, errors).await
        }
        Err(err) => Err(err.into()),
    }
}

#[debug_handler]
async fn login(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<RequestContext>,
) -> Result<Response, Error> {
    templates::render(&state, &context, "user/login.html", Context::new()).await
}

#[debug_handler]
async fn login_post(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<RequestContext>,
    Form(credentials): Form<Credentials>,
) -> Result<Response, Error> {
    debug!("Got login request for user: {}", credentials.username);

    let user = state
        .database
        .lock()
        .await
        .get_user_by_name(&credentials.username)?;

    // Check password
    let user = match user {
        Some(user) if auth::hash::check_passwords(&credentials.password, &user.password) => user,
        Some(_) | None => {
            debug!("Failed login for user: {}", credentials.username);
            let flash = Flash::fail("Wrong username or password.");
            return redirect(&state, &context, LOGIN, flash, Vec::new()).await;
        }
    };

    // Generate token
    let token = auth::token::generate_token();
    let session = state.database.lock().await.add_session(token, user.id)?;
    info!("Logged in {} with session {}", user.name, session);

    let flash = Flash::success(format!("Welcome, {}!", user.name));
    let cookies = vec![cookie::make_cookie(cookie::TOKEN, token)];
    redirect(&state, &context, LISTING, flash, cookies).await
}

#[debug_handler]
async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(context): Extension<RequestContext>,
) -> Result<Response, Error> {
    let Some(session) = &context.session else {
        let flash = Flash::fail("You are not logged in.");
        return redirect(&state, &context, "/", flash, Vec::new()).await;
    };

    debug!("Logging out session: {}", session.id);

    if let Err(err) = state.database.lock().await.delete_session(&session.id) {
        error!("Failed to delete session from database: {}", err);
        return Err(err.into());
    }

    let cookies = vec![cookie::clear_cookie(cookie::TOKEN)];
    let flash = Flash::success("You are now logged out.");
    redirect(&state, &context, "/", flash, cookies).await
}
