// Outbound HTTP clients for the services the match server talks to.

pub mod auth;
pub mod results;
