//! Export adapters for downstream collaborators.

pub mod export;
