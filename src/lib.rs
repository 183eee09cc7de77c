//! PAWSIGHT: priority and severity triage for animal-welfare incident reports.
//!
//! A request body is validated against the fixed feature schema, projected
//! into the model column order, scored by a priority classifier and a
//! severity regressor, and composed into a [`models::PredictionResult`].

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod ml;
pub mod models;
pub mod schema;
pub mod triage;
pub mod validation;

pub use error::{AppError, Result};
pub use triage::recommended_action;
pub use validation::{canonical_flag, validate};
