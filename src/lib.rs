//! Paper Consult - researcher outreach and paid consultations.
//!
//! A platform user invites a paper's author, the researcher registers through
//! a signed link, sessions are booked with a video meeting, and payment
//! gateway webhooks are reconciled idempotently into session confirmations
//! and subscriptions.

pub mod adapters;
pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
