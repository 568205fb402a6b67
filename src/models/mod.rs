//! Models Module
//!
//! Request and response DTOs shared by the node API and the coordinator
//! client.

mod requests;
mod responses;

pub use requests::SetRequest;
pub use responses::{
    DeleteResponse, ErrorResponse, GetResponse, HealthResponse, SetResponse, StatsResponse,
};
