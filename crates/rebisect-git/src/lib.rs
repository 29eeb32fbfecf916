//! # rebisect-git
//!
//! Git operations abstraction layer for rebisect, built on git2-rs.
//! Read-only queries (branches, upstreams, ahead/behind counts) go through
//! libgit2; rebases, aborts and cleans shell out to the `git` binary so the
//! working tree ends up exactly where a user running git by hand would
//! leave it.

mod error;
mod repository;
mod traits;

pub use error::{Error, Result};
pub use git2::Oid;
pub use repository::{RebaseOutcome, Repository};
pub use traits::GitOps;
