//! Stillpoint - Order fulfillment API for the Stillpoint wellness store
//!
//! This crate implements the checkout and fulfillment pipeline: free and paid
//! checkout, payment gateway webhooks, purchase recording, and delivery email.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
