//! API route handlers

pub mod auth;
pub mod checkpoints;
pub mod competitions;
pub mod health;
pub mod organizers;
pub mod participants;
pub mod race_events;
pub mod races;
pub mod timings;
