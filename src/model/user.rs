pub type Id = i64;

#[derive(Debug, Clone)]
pub struct User {
    pub id: Id,
    pub name: String,
    /// PHC string of the argon2 hash, never the plain password
    pub password: String,
}
