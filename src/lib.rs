//! Course management backend.
//!
//! Teachers create courses and their content, students enroll and comment.
//! The [`service`] layer holds the rules, [`store`] persists records, and
//! [`api`] exposes both over HTTP.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod service;
pub mod store;
pub mod utils;
