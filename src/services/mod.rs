//! Domain services used by the HTTP routes and the route guard.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the session cookie contract and the translation of
//! upstream replies into typed results, so route handlers stay focused on
//! protocol translation and rendering.

pub mod auth;
pub mod session;
pub mod todo;
