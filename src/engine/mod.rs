// Driftchat Gateway — Engine root
// The daemon side of driftchat: configuration, persona loading, the
// completion provider client, and the HTTP gateway tying them together.

pub mod config;
pub mod gateway;
pub mod persona;
pub mod provider;
