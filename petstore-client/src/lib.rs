//! HTTP operation wrappers for the petstore REST API
//!
//! Thin, uniform request handling: build URL, attach a rotating User-Agent
//! and a randomly chosen credential, issue the request with a fixed timeout,
//! classify the outcome by status code, and report it to an observer.
//! Transport failures are absorbed into a `NoResponse` outcome, never
//! propagated.

pub mod auth;
pub mod client;
pub mod errors;
pub mod models;
pub mod outcome;

pub use auth::{Credential, CredentialSet};
pub use client::{PetstoreClient, RequestObserver};
pub use errors::ClientError;
pub use models::{Category, Order, OrderStatus, Pet, PetStatus, Tag, User};
pub use outcome::Outcome;
