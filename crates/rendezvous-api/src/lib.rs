// rendezvous-api: Async Rust client for the Books Rendezvous backend

pub mod auth;
mod books;
pub mod client;
pub mod error;
pub mod models;
mod session;
mod stats;
pub mod transport;

pub use auth::{AuthStrategy, Credentials, MemoryTokenStore, Registration, TokenStore, TokenStoreError};
pub use client::BackendClient;
pub use error::Error;
pub use models::{
    Achievement, Book, BookStatus, BooksPayload, LoginResponse, StatsSnapshot, UserProfile,
    Visibility,
};
pub use transport::TransportConfig;
