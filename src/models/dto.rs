// Request and response bodies, one pair per user operation
//
// Request fields default when absent so a body like `{"name":"x"}` decodes
// with empty strings for the rest; only malformed JSON is rejected.

use crate::models::user::User;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CreateUserResponse {
    pub id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct GetUserRequest {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GetUserResponse {
    pub user: User,
}

/// Update payload. The `id` from the request path replaces whatever the body carried.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct UpdateUserRequest {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UpdateUserResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct DeleteUserRequest {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DeleteUserResponse {
    pub success: bool,
}

impl From<CreateUserRequest> for User {
    fn from(req: CreateUserRequest) -> Self {
        User::new(0, req.name, req.email, req.password)
    }
}

impl From<UpdateUserRequest> for User {
    fn from(req: UpdateUserRequest) -> Self {
        User::new(req.id, req.name, req.email, req.password)
    }
}
