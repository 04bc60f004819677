//! Flutter-facing bindings for quicknote core.

pub mod api;
