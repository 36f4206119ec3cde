//! # Database — PostgreSQL connection pool
//!
//! The binary opens one pool at startup from [`crate::settings::Database`] and hands
//! it to [`store::PgStore`]. Without a configured URL there is no pool and the server
//! runs on [`store::MemoryStore`].

mod pool;

pub use pool::connect;
