// handlers/family/mod.rs - Per-member family data
//
// Security Level: provider token + X-Family-Token
// Route Prefix: /api/family/:member/*
// Middleware: provider_token_middleware, family_session_middleware
//
// Each handler checks that the session may act for `:member` before touching
// the store (own data, or any member's data for parents).

pub mod calendar;
pub mod finances;
pub mod todos;

pub use calendar::create as calendar_create;
pub use calendar::delete as calendar_delete;
pub use calendar::list as calendar_list;
pub use calendar::update as calendar_update;

pub use finances::create as finances_create;
pub use finances::delete as finances_delete;
pub use finances::list as finances_list;
pub use finances::summary as finances_summary;
pub use finances::update as finances_update;

pub use todos::create_item as todos_create_item;
pub use todos::create_list as todos_create_list;
pub use todos::delete_item as todos_delete_item;
pub use todos::delete_list as todos_delete_list;
pub use todos::list as todos_list;
pub use todos::update_item as todos_update_item;
pub use todos::update_list as todos_update_list;
