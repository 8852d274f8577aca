pub mod calendar;
pub mod documents;
pub mod finances;
pub mod members;
pub mod password;
pub mod ping;
