use serde::{Deserialize, Serialize};

/// A stored user record.
///
/// `id` is assigned by the backend on creation and is zero on records that
/// have not been persisted yet. The password is kept and returned in plain
/// text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl User {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Copy of this record carrying the given id
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }
}
