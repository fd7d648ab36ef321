//! Traits implemented at crate seams.

pub mod user_lookup;

pub use user_lookup::UserLookup;
