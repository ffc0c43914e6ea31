//! # Forno Shared
//!
//! Types shared between the HTTP surface and its clients: request/response
//! DTOs and the uniform `{success, message?, data?, error?}` envelope.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorBody, ListResponse};
