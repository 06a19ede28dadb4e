//! Repositories over the in-memory document store.

pub mod staging;

pub use staging::StagingRepository;
