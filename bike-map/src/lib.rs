//! Live bike-share map client.
//!
//! Keeps a session's view of a bike-share network in sync with a remote
//! service: stations are polled and classified by availability, the user's
//! position is acquired once, recommendations are fetched on demand, and a
//! health monitor decides between live and sample data. The [`render`]
//! module composes all of that into a map view that [`web`] serves as JSON.

pub mod api;
pub mod clock;
pub mod config;
pub mod domain;
pub mod geo;
pub mod health;
pub mod insights;
mod lifecycle;
pub mod recommend;
pub mod render;
pub mod sync;
pub mod web;
