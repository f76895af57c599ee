pub type Id = i64;
pub type Token = i64;

#[derive(Clone, Debug, serde::Serialize)]
pub struct Session {
    pub id: Id,
    #[serde(skip)] // Don't expose token to client
    pub token: Token,
    pub user_id: super::user::Id,
    /// The identity requests made with this session act as.
    pub user_name: String,
}

impl Session {
    pub fn new(id: Id, token: Token, user_id: super::user::Id, user_name: String) -> Session {
        Session {
            id,
            token,
            user_id,
            user_name,
        }
    }
}
