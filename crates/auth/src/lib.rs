//! `clubhouse-auth` — the caller-identity boundary.
//!
//! This crate is intentionally decoupled from credential verification and
//! transport: the outer layer authenticates the caller and hands the engine a
//! pre-verified [`ActorContext`]. The engine re-checks authorization
//! logically (president role from claims, division-head scope from stored
//! state) but never authenticates.

pub mod actor;

pub use actor::{ActorContext, RoleClaim};
