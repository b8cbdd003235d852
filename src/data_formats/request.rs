use serde::{Deserialize, Serialize};

use crate::{
    db_helpers::MoveDirection,
    models::{PublishStatus, Role},
};

// ----------------- User Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub email: String,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

// ----------------- Comment Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CommentRequest {
    #[serde(default)]
    pub content: String,
}

// ----------------- Admin Request -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct RoleRequest {
    pub role: Role,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct TagRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub status: Option<PublishStatus>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy)]
pub struct HeroOrderEntry {
    pub id: i64,
    pub order: i64,
}

#[derive(Deserialize, Debug)]
pub struct MoveRequest {
    pub direction: MoveDirection,
}
