//! HTTP host for the registrations module: ingress router with the shared
//! middleware stack, request ids and signal handling.

pub mod ingress;
pub mod request_id;
pub mod shutdown;
