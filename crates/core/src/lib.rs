//! Core business logic for comicshelf.
//!
//! Services load whole collections through the repositories of
//! `comicshelf-db`, apply the site's rules and write the collections back.

pub mod access;
pub mod services;

pub use services::*;
