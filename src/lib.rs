pub mod config;
pub mod error;
pub mod intake;
pub mod model;
pub mod notify;
pub mod routes;
pub mod storage;
pub mod store;
pub mod supabase;
