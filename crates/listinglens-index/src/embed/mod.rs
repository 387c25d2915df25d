//! Embedding provider implementations behind `listinglens_core::traits::Embedder`.
//!
//! `remote` talks to an OpenAI-compatible embeddings endpoint; `hashed` is a
//! deterministic offline provider used for tests and air-gapped runs.

pub mod hashed;
pub mod remote;

pub use hashed::HashedEmbedder;
pub use remote::RemoteEmbedder;
