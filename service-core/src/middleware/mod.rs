pub mod metrics;
pub mod security_headers;
pub mod tracing;

pub use self::metrics::metrics_middleware;
pub use security_headers::{api_security_headers_middleware, page_security_headers_middleware};
pub use self::tracing::{REQUEST_ID_HEADER, RequestId, make_request_span, request_id_middleware};
