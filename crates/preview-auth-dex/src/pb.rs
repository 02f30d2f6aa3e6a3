//! Dex API v2 wire types and gRPC stubs

#[allow(clippy::all)]
pub mod api {
    include!("generated/api.rs");
}
