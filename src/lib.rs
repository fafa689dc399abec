mod inference_service;
mod ort_service;
mod routes;

pub mod classification;
pub mod config;
pub mod model_service;
pub mod preprocessing;
pub mod server;
pub mod telemetry;

pub use inference_service::{InferenceError, InferenceService};
pub use server::{build_router, start_server};
