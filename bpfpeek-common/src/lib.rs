//! Kernel-facing plumbing for the bpfpeek tools: raw `bpf(2)` parameter
//! blocks, program FD and metadata resolution, and the TCX attachment
//! query.
//!
//! Everything here is a read-only view into kernel-owned state. Program IDs
//! and attachment lists are observed, never created or mutated, and every
//! descriptor the kernel hands out is returned as an [`std::os::fd::OwnedFd`]
//! so it is released on every exit path.

mod abi;
mod errors;
pub mod iface;
pub mod prog;
pub mod query;
mod sys;

pub use errors::Error;
