// Wire messages of the `user.UserService` gRPC API (see proto/user.proto)

use crate::models::user::User as UserModel;

#[derive(Clone, PartialEq, prost::Message)]
pub struct User {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub email: String,
    #[prost(string, tag = "4")]
    pub password: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UserRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub email: String,
    #[prost(string, tag = "3")]
    pub password: String,
}

/// `UserID` on the wire
#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct UserId {
    #[prost(int64, tag = "1")]
    pub id: i64,
}

/// Shared response shape; `user` is unset for delete
#[derive(Clone, PartialEq, prost::Message)]
pub struct UserResponse {
    #[prost(message, optional, tag = "1")]
    pub user: Option<User>,
}

include!(concat!(env!("OUT_DIR"), "/user.UserService.rs"));

impl From<UserModel> for User {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            password: user.password,
        }
    }
}

impl From<User> for UserModel {
    fn from(user: User) -> Self {
        UserModel::new(user.id, user.name, user.email, user.password)
    }
}

impl From<UserModel> for UserRequest {
    fn from(user: UserModel) -> Self {
        Self {
            name: user.name,
            email: user.email,
            password: user.password,
        }
    }
}

impl From<UserRequest> for UserModel {
    fn from(request: UserRequest) -> Self {
        UserModel::new(0, request.name, request.email, request.password)
    }
}

impl UserResponse {
    pub fn with_user(user: impl Into<User>) -> Self {
        Self {
            user: Some(user.into()),
        }
    }

    pub fn empty() -> Self {
        Self { user: None }
    }
}
