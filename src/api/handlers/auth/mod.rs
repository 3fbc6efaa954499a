//! Auth handlers and supporting modules.
//!
//! Routes map onto the orchestrator in [`crate::auth`]:
//!
//! - `POST /auth/register`, `POST /auth/login`, `POST /auth/logout`
//! - `POST /auth/reset-password` and `POST /auth/reset-password/{ticket}`
//! - `PATCH /auth/permissions/{user_id}` (admin only)
//!
//! Bearer tokens travel in `Authorization: Bearer <token>` and are resolved
//! through [`principal::require_auth`], which fails closed on any cache or
//! signature problem.

pub mod admin;
pub mod login;
pub mod principal;
pub mod register;
pub mod reset;
pub mod types;

pub use self::admin::update_permissions;
pub use self::login::{login, logout};
pub use self::register::register;
pub use self::reset::{consume_reset, request_reset};
