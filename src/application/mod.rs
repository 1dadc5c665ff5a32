//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! `services` holds the collaborators shared by several handlers (invitation
//! dispatch, notifications, meeting lifecycle).

pub mod handlers;
pub mod services;
