//! Notes core library
//!
//! Note persistence, filtering and reminder scheduling for a personal
//! notes application. A UI layer drives everything through
//! [`app::AppState`] or the individual services.

pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod services;
