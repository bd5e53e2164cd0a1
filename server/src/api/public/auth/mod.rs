//! Proxies to the WordPress account plugins.

pub mod forgot_password;
pub mod login;
pub mod logout;
pub mod register;

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
