use log::{debug, error};

use crate::model::{session::Token, Database, Session};

#[derive(Debug)]
pub enum Error {
    SessionNotFound,
    DatabaseError,
}

pub fn verify_session(token: Token, database: &Database) -> Result<Session, Error> {
    // Get and verify session
    match database.get_session_from_token(&token) {
        Ok(Some(session)) => Ok(session),
        Ok(None) => {
            debug!("Session for token not found in database");
            Err(Error::SessionNotFound)
        }
        Err(err) => {
            error!("Failed to get session from database: {}", err);
            Err(Error::DatabaseError)
        }
    }
}
