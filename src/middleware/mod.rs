pub mod auth;
pub mod json;
pub mod response;

pub use auth::{
    authorize_member, family_session_middleware, provider_token_middleware, resolve_provider_token,
    ProviderToken, FAMILY_TOKEN_HEADER,
};
pub use json::ApiJson;
pub use response::{ApiResponse, ApiResult};
