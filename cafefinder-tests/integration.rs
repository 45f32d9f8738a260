//! Integration tests for CafeFinder
//!
//! Real HTTP clients talk to stub Google, Overpass and Nominatim servers
//! bound to ephemeral local ports.

#[path = "integration/stubs.rs"]
mod stubs;

#[path = "integration/fallback_chain.rs"]
mod fallback_chain;
#[path = "integration/geocoding_flow.rs"]
mod geocoding_flow;

#[path = "integration/api_endpoints.rs"]
mod api_endpoints;
