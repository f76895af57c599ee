use rand::RngCore;
use rand_core::OsRng;

use crate::model::session::Token;

/// Fresh value for a `token` or `flash` cookie, straight from the OS.
pub fn generate_token() -> Token {
    let mut bytes = [0u8; 8];
    OsRng.fill_bytes(&mut bytes);
    Token::from_le_bytes(bytes)
}

/// Cookie value back into a token. Anything else is no token at all.
pub fn parse_token(value: &str) -> Option<Token> {
    value.parse().ok()
}
