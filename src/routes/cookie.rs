use crate::model::session::Token;

/// Holds the session token.
pub const TOKEN: &str = "token";
/// Holds the token of a pending flash.
pub const FLASH: &str = "flash";

pub fn make_cookie(name: &str, token: Token) -> String {
    format!(
        // In production, the secure flag should be present
        "{}={}; HttpOnly; SameSite=Lax; Path=/;",
        name, token,
    )
}

pub fn clear_cookie(name: &str) -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", name)
}
