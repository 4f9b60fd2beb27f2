//! HTTP API for the Spider map session.
//!
//! This crate provides an Axum HTTP server that lets a browser map front end
//! drive a [`Session`]:
//!
//! - **Map data** (`/api/hex`, `/api/cells/{index}`) for rendering and
//!   popups
//! - **Parameters** (`/api/parameters`) for the slider and dropdown panel
//! - **Drawing** (`/api/draw/{attribute}`, `/api/propagate`) for laying
//!   infrastructure onto the grid and resetting it
//!
//! # Architecture
//!
//! One session sits behind a [`tokio::sync::RwLock`] in [`AppState`]. Reads
//! share the lock; every mutating request holds the write lock for its whole
//! propagate-then-recompute cycle.
//!
//! [`Session`]: spider_core::Session

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use spider_core::ServerConfig;
pub use state::AppState;
