//! keygate web application and identity companion server.
//!
//! This crate provides the Leptos single-page application that gates its
//! routes by role, and, with the `ssr` feature, the axum server that runs
//! the OIDC flow on its behalf.

#![allow(non_snake_case)]

pub mod app;
pub mod identity;
pub mod pages;
pub mod routes;
pub mod session;

#[cfg(feature = "ssr")]
pub mod auth;
#[cfg(feature = "ssr")]
pub mod config;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::App;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
