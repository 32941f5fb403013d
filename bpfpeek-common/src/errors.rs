use std::io;

use thiserror::Error;

/// Failures surfaced by the kernel-facing operations in this crate.
///
/// Every variant carries the underlying OS error so callers can print the
/// system error text; nothing here is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// A `bpf(2)` command failed; `call` is the libbpf-style name of the
    /// wrapper that issued it.
    #[error("`{call}` failed")]
    Syscall {
        call: &'static str,
        #[source]
        io_error: io::Error,
    },

    /// An interface name that does not resolve to an index.
    #[error("unknown network interface `{name}`")]
    UnknownInterface {
        name: String,
        #[source]
        errno: nix::errno::Errno,
    },

    /// A direction argument other than exactly `ingress` or `egress`.
    #[error("invalid direction `{0}`, expected `ingress` or `egress`")]
    InvalidDirection(String),
}
