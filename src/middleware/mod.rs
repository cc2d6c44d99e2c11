mod json_error;
mod panic;
mod request_log;

pub use json_error::json_error_middleware;
pub use panic::catch_panic_layer;
pub use request_log::{REQUEST_ID_HEADER, request_log_middleware};
