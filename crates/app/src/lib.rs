//! `factura-app` — editing session and submission boundary.

pub mod session;
pub mod telemetry;

pub use session::{Session, SubmissionPayload};
