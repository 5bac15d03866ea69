pub mod api;
pub mod client;
pub mod dto;

pub use client::TmdbClient;
