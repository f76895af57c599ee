use std::{path::Path, sync::Arc};

use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, REFERER, SET_COOKIE},
        Request, StatusCode,
    },
    response::Response,
    Router,
};
use codebin::{
    model::{snippet::NewSnippet, AppState, Database, Snippet, SnippetRepository},
    routes, templates,
};
use tower::ServiceExt;

fn state() -> Arc<AppState> {
    let templates = templates::load(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*")).unwrap();
    Arc::new(AppState::new(Database::in_memory().unwrap(), templates))
}

fn app(state: &Arc<AppState>) -> Router {
    let public = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/public"));
    routes::router(state.clone(), public)
}

/// Log in without going through argon2, returning the cookie to send.
async fn login_as(state: &AppState, name: &str) -> String {
    let database = state.database.lock().await;
    let user = database.add_user(name, "unused").unwrap();
    let token = 1000 + user;
    database.add_session(token, user).unwrap();
    format!("token={}", token)
}

async fn add_snippet(state: &AppState, owner: &str, code: &str) -> Snippet {
    state
        .database
        .lock()
        .await
        .insert(NewSnippet {
            code: code.to_string(),
            owner: owner.to_string(),
        })
        .unwrap()
}

async fn stored(state: &AppState) -> Vec<Snippet> {
    state.database.lock().await.find_all().unwrap()
}

async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
    let mut request = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post(app: &Router, uri: &str, cookie: Option<&str>, body: &str) -> Response {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

async fn body(response: Response) -> String {
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers()[LOCATION].to_str().unwrap()
}

/// The `name=value` part of a cookie set by the response.
fn set_cookie(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with(&format!("{}=", name)))
        .map(str::to_owned)
}

/// Apply the response's `Set-Cookie` headers to a list of `name=value` pairs.
fn store_cookies(jar: &mut Vec<String>, response: &Response) {
    let pairs = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next());
    for pair in pairs {
        let name = pair.split('=').next().unwrap_or_default();
        jar.retain(|kept| !kept.starts_with(&format!("{}=", name)));
        if !pair.ends_with('=') {
            jar.push(pair.to_owned());
        }
    }
}

/// Follow redirects like a browser, keeping cookies and the original
/// `Referer`, until something other than a redirect comes back.
async fn follow(app: &Router, mut response: Response, jar: &mut Vec<String>, referer: &str) -> Response {
    for _ in 0..5 {
        store_cookies(jar, &response);
        if response.status() != StatusCode::SEE_OTHER {
            return response;
        }
        let to = location(&response).to_owned();
        let mut request = Request::builder()
            .method("GET")
            .uri(to)
            .header(REFERER, referer);
        if !jar.is_empty() {
            request = request.header(COOKIE, jar.join("; "));
        }
        response = app
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
    }
    panic!("still redirecting after 5 hops");
}

#[tokio::test]
async fn anonymous_visitors_see_the_listing() {
    let state = state();
    let app = app(&state);
    add_snippet(&state, "alice", "print(1)").await;

    let response = get(&app, "/code", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = body(response).await;
    assert!(page.contains("print(1)"));
    assert!(page.contains("alice"));
    assert!(!page.contains("/edit"));
}

#[tokio::test]
async fn anonymous_create_is_forbidden() {
    let state = state();
    let app = app(&state);

    assert_eq!(get(&app, "/code/new", None).await.status(), StatusCode::FORBIDDEN);

    let response = post(&app, "/code/create", None, "code=print%281%29").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(body(response).await.is_empty());
    assert!(stored(&state).await.is_empty());
}

#[tokio::test]
async fn unknown_session_token_is_anonymous() {
    let state = state();
    let app = app(&state);

    let response = get(&app, "/code/new", Some("token=12345")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn created_snippet_is_listed_and_flash_shown_once() {
    let state = state();
    let app = app(&state);
    let alice = login_as(&state, "alice").await;

    let response = post(&app, "/code/create", Some(&alice), "code=print%281%29").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/code");
    let flash = set_cookie(&response, "flash").unwrap();

    let snippets = stored(&state).await;
    assert_eq!(snippets.len(), 1);
    assert_eq!(snippets[0].code, "print(1)");
    assert_eq!(snippets[0].owner, "alice");

    let cookies = format!("{}; {}", alice, flash);
    let response = get(&app, "/code", Some(&cookies)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(set_cookie(&response, "flash").as_deref(), Some("flash="));
    let page = body(response).await;
    assert!(page.contains("print(1)"));
    assert!(page.contains("The code snippet was successfully created."));

    // Same cookie again, the flash is gone
    let page = body(get(&app, "/code", Some(&cookies)).await).await;
    assert!(!page.contains("successfully created"));
}

#[tokio::test]
async fn empty_code_rerenders_the_form() {
    let state = state();
    let app = app(&state);
    let alice = login_as(&state, "alice").await;

    let response = post(&app, "/code/create", Some(&alice), "code=").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body(response).await.contains("Code is required."));
    assert!(stored(&state).await.is_empty());
}

#[tokio::test]
async fn owner_can_update() {
    let state = state();
    let app = app(&state);
    let alice = login_as(&state, "alice").await;
    let snippet = add_snippet(&state, "alice", "print(1)").await;

    let edit = get(&app, &format!("/code/{}/edit", snippet.id), Some(&alice)).await;
    assert_eq!(edit.status(), StatusCode::OK);
    assert!(body(edit).await.contains("print(1)"));

    let uri = format!("/code/{}/update", snippet.id);
    let response = post(&app, &uri, Some(&alice), "code=print%282%29").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/code");

    assert_eq!(
        stored(&state).await,
        vec![Snippet {
            id: snippet.id,
            code: "print(2)".to_string(),
            owner: "alice".to_string(),
        }]
    );
}

#[tokio::test]
async fn claimed_author_does_not_grant_access() {
    let state = state();
    let app = app(&state);
    let bob = login_as(&state, "bob").await;
    let snippet = add_snippet(&state, "alice", "print(1)").await;

    let update = format!("/code/{}/update", snippet.id);
    let response = post(&app, &update, Some(&bob), "code=oops&author=alice").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let delete = format!("/code/{}/delete", snippet.id);
    let response = post(&app, &delete, Some(&bob), "author=alice").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let edit = get(&app, &format!("/code/{}/edit?user=alice", snippet.id), Some(&bob)).await;
    assert_eq!(edit.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&edit), "/code");

    assert_eq!(stored(&state).await, vec![snippet]);
}

#[tokio::test]
async fn second_delete_lands_on_a_page_with_failure() {
    let state = state();
    let app = app(&state);
    let alice = login_as(&state, "alice").await;
    let snippet = add_snippet(&state, "alice", "print(1)").await;
    let uri = format!("/code/{}/delete", snippet.id);
    let referer = format!("http://localhost{}", uri);

    let confirm = get(&app, &uri, Some(&alice)).await;
    assert_eq!(confirm.status(), StatusCode::OK);

    let first = post(&app, &uri, Some(&alice), "").await;
    assert_eq!(first.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&first), "/code");
    assert!(stored(&state).await.is_empty());

    // Resubmitted from the confirmation page, which is the page posted to
    let request = Request::builder()
        .method("POST")
        .uri(&uri)
        .header(COOKIE, &alice)
        .header(REFERER, &referer)
        .body(Body::empty())
        .unwrap();
    let second = app.clone().oneshot(request).await.unwrap();
    assert_eq!(second.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&second), "/code");

    let mut jar = vec![alice];
    let page = follow(&app, second, &mut jar, &referer).await;
    assert_eq!(page.status(), StatusCode::OK);
    assert!(body(page)
        .await
        .contains(&format!("Code snippet {} was not found.", snippet.id)));
}

#[tokio::test]
async fn missing_snippet_form_reloaded_in_place_reaches_a_page() {
    let state = state();
    let app = app(&state);
    let alice = login_as(&state, "alice").await;

    for uri in ["/code/999/edit", "/code/999/delete"] {
        let referer = format!("http://localhost{}", uri);
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header(COOKIE, &alice)
            .header(REFERER, &referer)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_ne!(location(&response), uri);

        let mut jar = vec![alice.clone()];
        let page = follow(&app, response, &mut jar, &referer).await;
        assert_eq!(page.status(), StatusCode::OK);
        assert!(body(page).await.contains("Code snippet 999 was not found."));
    }
}

#[tokio::test]
async fn back_goes_to_a_different_referring_page() {
    let state = state();
    let app = app(&state);
    let alice = login_as(&state, "alice").await;

    let request = Request::builder()
        .method("GET")
        .uri("/code/999/edit")
        .header(COOKIE, &alice)
        .header(REFERER, "http://localhost/code?page=2")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/code?page=2");
}

#[tokio::test]
async fn pending_flash_is_replaced_not_duplicated() {
    let state = state();
    let app = app(&state);

    let wrong = post(&app, "/user/login", None, "username=nobody&password=0123456789").await;
    assert_eq!(wrong.status(), StatusCode::SEE_OTHER);
    let flash = set_cookie(&wrong, "flash").unwrap();

    // Not followed; the next redirect reuses the same flash cookie
    let logout = get(&app, "/user/logout", Some(&flash)).await;
    assert_eq!(logout.status(), StatusCode::SEE_OTHER);
    assert_eq!(set_cookie(&logout, "flash"), Some(flash.clone()));

    let page = body(get(&app, "/", Some(&flash)).await).await;
    assert!(page.contains("You are not logged in."));
    assert!(!page.contains("Wrong username or password."));

    let token = flash.trim_start_matches("flash=").parse().unwrap();
    assert_eq!(state.database.lock().await.take_flash(token).unwrap(), None);
}

#[tokio::test]
async fn register_log_in_and_out() {
    let state = state();
    let app = app(&state);

    let short = post(&app, "/user/create", None, "username=carol&password=short").await;
    assert_eq!(short.status(), StatusCode::OK);
    assert!(body(short).await.contains("at least 10 characters"));

    let created = post(&app, "/user/create", None, "username=carol&password=0123456789").await;
    assert_eq!(created.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&created), "/user/login");

    let taken = post(&app, "/user/create", None, "username=carol&password=9876543210").await;
    assert_eq!(taken.status(), StatusCode::OK);
    assert!(body(taken).await.contains("already taken"));

    let wrong = post(&app, "/user/login", None, "username=carol&password=9876543210").await;
    assert_eq!(wrong.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&wrong), "/user/login");
    assert_eq!(set_cookie(&wrong, "token"), None);

    let login = post(&app, "/user/login", None, "username=carol&password=0123456789").await;
    assert_eq!(login.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&login), "/code");
    let token = set_cookie(&login, "token").unwrap();

    assert_eq!(get(&app, "/code/new", Some(&token)).await.status(), StatusCode::OK);

    let logout = get(&app, "/user/logout", Some(&token)).await;
    assert_eq!(logout.status(), StatusCode::SEE_OTHER);
    assert_eq!(set_cookie(&logout, "token").as_deref(), Some("token="));

    assert_eq!(
        get(&app, "/code/new", Some(&token)).await.status(),
        StatusCode::FORBIDDEN
    );
}
