//! Record-intake web service: accepts name, mobile, and occupation plus an
//! optional image upload, persists the entry, and lists/retrieves saved
//! entries.

pub mod config;
pub mod errors;
pub mod intake;
pub mod routes;
pub mod storage;
