mod request;

pub use request::{ChatRequest, ResponseMode};
