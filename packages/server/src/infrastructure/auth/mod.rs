//! 認証情報の検証実装

pub mod jwt;

pub use jwt::JwtVerifier;
