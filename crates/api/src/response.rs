//! Response envelope shared by every resource handler.
//!
//! Handlers return `{ "data": ... }` so clients can distinguish payloads
//! from the `{ "error", "code" }` shape produced by error responses without
//! sniffing fields. Auth and health endpoints return their own top-level
//! bodies and deliberately skip the envelope.

use serde::Serialize;

/// The `{ "data": T }` wrapper.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}
