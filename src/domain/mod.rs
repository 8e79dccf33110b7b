//! Domain values exchanged between the rendering contract and its collaborators.

pub mod auth;
pub mod record;
pub mod types;
