//! Identity: decoding the bearer token issued by the identity provider.

pub mod jwt;
