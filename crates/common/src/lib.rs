//! Common utilities and shared types for comicshelf.
//!
//! This crate provides foundational components used across all comicshelf crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Cryptography**: Argon2 password hashing
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Key-value storage**: The [`KvStore`] contract with memory, file and Redis backends
//!
//! # Example
//!
//! ```no_run
//! use comicshelf_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod id;
pub mod kv;
pub mod kv_redis;

pub use config::Config;
pub use crypto::{hash_password, is_password_hash, verify_password};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use kv::{FileKv, KvStore, MemoryKv, SharedKv};
pub use kv_redis::RedisKv;
