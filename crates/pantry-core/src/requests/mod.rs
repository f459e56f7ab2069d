//! Inbound requests and outbound responses.
//!
//! Raw payloads are validated against the JSON Schemas in `schemas/`
//! before they are deserialized, so callers get every problem at once.

mod parser;
mod schema;

pub use parser::{
    FindRecipesRequest, FindRecipesResponse, MissingIngredientsRequest,
    MissingIngredientsResponse, RequestError, SendListRequest, SendListResponse,
};
pub use schema::{validate_request_schema, RequestKind};
