//! Network interface name resolution.

use crate::Error;

/// Resolve an interface name to its kernel index.
///
/// An unknown name fails here, before any BPF syscall is attempted.
pub fn ifindex_from_ifname(name: &str) -> Result<u32, Error> {
    nix::net::if_::if_nametoindex(name).map_err(|errno| Error::UnknownInterface {
        name: name.to_string(),
        errno,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_resolves() {
        // every network namespace has a loopback device
        assert!(ifindex_from_ifname("lo").is_ok());
    }

    #[test]
    fn bogus_name_is_rejected() {
        let err = ifindex_from_ifname("no-such-iface0").unwrap_err();
        assert!(matches!(err, Error::UnknownInterface { .. }));
    }
}
