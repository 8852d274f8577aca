// handlers/protected/mod.rs - Handlers behind the provider bearer token
//
// Security Level: Authorization: Bearer <provider token> (or provider cookie)
// Middleware: provider_token_middleware injects `ProviderToken`
//
// The token is passed through to the document store untouched; the store is
// the actual authority and answers 401 for a bad token.

pub mod analytics;
pub mod members;
pub mod projects;

pub use analytics::summary as analytics_summary;

pub use members::create as members_create;
pub use members::delete as members_delete;
pub use members::list as members_list;
pub use members::login as family_login;
pub use members::settings_get;
pub use members::settings_put;
pub use members::update as members_update;

pub use projects::create as projects_create;
pub use projects::delete as projects_delete;
pub use projects::list as projects_list;
pub use projects::show as projects_show;
pub use projects::update as projects_update;
