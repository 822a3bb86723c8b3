//! Sociogram Core — social network analysis over GML graphs.
//!
//! This crate holds the analysis logic: GML loading and export, clustering and
//! neighbourhood overlap, Girvan–Newman communities, homophily and structural
//! balance checks, edge-failure simulation, temporal event replay and plotting.

pub mod config;
pub mod error;
pub mod graph;
pub mod output;
pub mod phases;
pub mod pipeline;
pub mod render;
