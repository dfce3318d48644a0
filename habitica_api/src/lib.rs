//! Client for the Habitica REST API.
//!
//! [`Connection`] routes each request to the versioned or top-level path,
//! attaches credentials and normalizes failures into [`Error`]. [`Habitica`]
//! adds account helpers on top.

mod client;
mod connection;
mod errors;
mod options;
pub mod route;
pub mod types;
pub use self::client::Habitica;
pub use self::connection::{
    ConfigUpdate, Connection, ConnectionConfig, ErrorHandler, API_KEY_HEADER, CLIENT_HEADER,
    USER_ID_HEADER,
};
pub use self::errors::{ApiError, ConnectionFailure, Error, UNKNOWN_CONNECTION_MESSAGE};
pub use self::options::RequestOptions;
pub use reqwest::Method;
