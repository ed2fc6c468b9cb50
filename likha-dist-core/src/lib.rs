#![doc = "likha-dist-core: core logic library for likha-dist."]

//! This crate contains the data model, storage contract and resolution logic
//! for turning a fixed catalog of Likha APK assets into concrete download links.
//! Transport code (the Supabase REST client) lives in the `likha-dist` crate.
//!
//! # Usage
//! Build a [`config::ResolverConfig`], pick a [`contract::StorageBackend`]
//! implementation and call [`resolver::resolve`], or start a
//! [`session::LinkSession`] to get defaults immediately and the resolved
//! links once they are ready. [`inventory::list_inventory`] lists what the
//! bucket actually holds.

pub mod asset;
pub mod config;
pub mod contract;
pub mod error;
pub mod inventory;
pub mod links;
pub mod resolver;
pub mod session;
