//! Real-time fraud transaction monitoring: a relay that watches two
//! append-only store partitions and fans every insert out to WebSocket
//! observers, plus a feed client that maintains in-memory history with
//! derived statistics, chart series and an ad-hoc filter view.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod db;
pub mod feed;
pub mod filter;
pub mod model;
pub mod relay;
pub mod seed;
