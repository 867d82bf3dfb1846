//! Postgres-backed implementations of the `ChainStore` and `EventMirror`
//! ports. Kept as a thin layer of newtypes over `PgPool`, with
//! runtime-checked `sqlx::query`/`query_as` rather than the `query!`
//! macros, so the crate builds without a live database.
//!
//! Everything here is gated behind the `postgres` feature; without it
//! the crate exposes nothing.

#[cfg(feature = "postgres")]
mod chain_store;
#[cfg(feature = "postgres")]
mod event_mirror;

#[cfg(feature = "postgres")]
pub use chain_store::PgChainStore;
#[cfg(feature = "postgres")]
pub use event_mirror::PgEventMirror;
