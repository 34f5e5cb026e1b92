use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::user::schema::UserEntity;

#[derive(Deserialize, Validate)]
pub struct SignUpModel {
    #[validate(
        email(message = "Invalid email format"),
        length(max = 254, message = "Email must be at most 254 characters long")
    )]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters long"))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 30, message = "First name must be at most 30 characters long"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 30, message = "Last name must be at most 30 characters long"))]
    pub last_name: String,
}

#[derive(Deserialize, Validate)]
pub struct SignInModel {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

#[derive(Deserialize, Validate)]
pub struct SearchQuery {
    #[validate(length(max = 254, message = "Keyword must be at most 254 characters long"))]
    pub keyword: Option<String>,
}

pub struct InsertUser {
    pub id: Uuid,
    pub email: String,
    pub hash_password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<UserEntity> for UserResponse {
    fn from(entity: UserEntity) -> Self {
        UserResponse {
            id: entity.id,
            email: entity.email,
            first_name: entity.first_name,
            last_name: entity.last_name,
        }
    }
}

/// Trims and lower-cases the domain part; the local part keeps its case.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}
