//! Weatherdeck - terminal weather dashboard
//!
//! Current conditions and a five-day outlook from OpenWeather, with recent
//! searches, favorites and a condition-driven palette. The library exposes
//! the modules for testing; `main.rs` wires them into the terminal runtime.

pub mod action;
pub mod api;
pub mod components;
pub mod effect;
pub mod favorites;
pub mod geolocation;
pub mod history;
pub mod model;
pub mod reducer;
pub mod state;
pub mod theme;
