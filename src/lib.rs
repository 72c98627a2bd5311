pub mod auth;
pub mod client;
pub mod commands;
pub mod config;
pub mod download;
pub mod error;
pub mod types;

pub use auth::{Authenticator, Credentials, RequestSigner, SessionToken};
pub use client::Franklin;
pub use config::Config;
pub use download::{Downloader, file_name_from_url};
pub use error::{Error, Result};
