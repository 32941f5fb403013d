//! TCX attachment queries: which programs sit on an interface's
//! traffic-control ingress/egress hook, in attachment order.

use std::fmt;
use std::mem;
use std::str::FromStr;

use crate::abi::{ProgQueryAttr, BPF_TCX_EGRESS, BPF_TCX_INGRESS};
use crate::sys::{syscall, Syscall};
use crate::Error;

/// Traffic-control hook direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcxHook {
    Ingress,
    Egress,
}

impl TcxHook {
    fn attach_type(self) -> u32 {
        match self {
            Self::Ingress => BPF_TCX_INGRESS,
            Self::Egress => BPF_TCX_EGRESS,
        }
    }
}

impl fmt::Display for TcxHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingress => f.write_str("ingress"),
            Self::Egress => f.write_str("egress"),
        }
    }
}

impl FromStr for TcxHook {
    type Err = Error;

    // Exact, case-sensitive match; anything else is rejected before a
    // syscall is ever issued.
    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "ingress" => Ok(Self::Ingress),
            "egress" => Ok(Self::Egress),
            other => Err(Error::InvalidDirection(other.to_string())),
        }
    }
}

/// Programs attached at one TCX hook, in attachment-priority order, plus
/// the hook's revision counter at query time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcxAttachments {
    pub revision: u64,
    pub prog_ids: Vec<u32>,
}

/// Two-phase `BPF_PROG_QUERY` against the `hook` of interface `ifindex`.
///
/// Phase 1 passes a null buffer so the kernel only reports how many
/// programs are attached; a count of zero ends the query there. Phase 2
/// re-issues the query with a buffer of exactly that capacity. The count
/// the kernel returns from phase 2 is authoritative: programs detached in
/// between shrink it, and a list grown past our capacity makes the kernel
/// reject the call outright; a partial list is never returned.
pub fn query_tcx(ifindex: u32, hook: TcxHook) -> Result<TcxAttachments, Error> {
    let mut attr = unsafe { mem::zeroed::<ProgQueryAttr>() };
    attr.target_ifindex = ifindex;
    attr.attach_type = hook.attach_type();

    syscall(Syscall::ProgQuery { attr: &mut attr }).map_err(|(_, io_error)| Error::Syscall {
        call: "bpf_prog_query",
        io_error,
    })?;

    let count = attr.prog_cnt as usize;
    log::debug!(
        "{hook} hook on ifindex {ifindex}: {count} attached, revision {}",
        attr.revision
    );
    if count == 0 {
        return Ok(TcxAttachments {
            revision: attr.revision,
            prog_ids: Vec::new(),
        });
    }

    let mut prog_ids = vec![0u32; count];
    attr.prog_ids = prog_ids.as_mut_ptr() as u64;
    attr.prog_cnt = count as u32;

    syscall(Syscall::ProgQuery { attr: &mut attr }).map_err(|(_, io_error)| Error::Syscall {
        call: "bpf_prog_query",
        io_error,
    })?;

    prog_ids.truncate(attr.prog_cnt as usize);
    Ok(TcxAttachments {
        revision: attr.revision,
        prog_ids,
    })
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io;

    use super::*;
    use crate::sys::override_syscall;

    // each #[test] runs on its own thread, so the counter starts at zero
    thread_local! {
        static CALLS: Cell<u32> = const { Cell::new(0) };
    }

    fn next_call() -> u32 {
        CALLS.with(|c| {
            let n = c.get();
            c.set(n + 1);
            n
        })
    }

    #[test]
    fn empty_hook_skips_phase_two() {
        override_syscall(|call| match call {
            Syscall::ProgQuery { attr } => {
                assert_eq!(next_call(), 0, "phase 2 must not run for an empty hook");
                assert_eq!(attr.prog_ids, 0);
                assert_eq!(attr.prog_cnt, 0);
                attr.revision = 12;
                Ok(0)
            }
            call => panic!("unexpected syscall {call:?}"),
        });
        let got = query_tcx(3, TcxHook::Ingress).unwrap();
        assert_eq!(got.revision, 12);
        assert!(got.prog_ids.is_empty());
    }

    #[test]
    fn two_phases_preserve_attachment_order() {
        override_syscall(|call| match call {
            Syscall::ProgQuery { attr } => match next_call() {
                0 => {
                    assert_eq!(attr.target_ifindex, 4);
                    assert_eq!(attr.attach_type, BPF_TCX_EGRESS);
                    assert_eq!(attr.prog_ids, 0);
                    attr.prog_cnt = 3;
                    attr.revision = 7;
                    Ok(0)
                }
                1 => {
                    assert_eq!(attr.prog_cnt, 3);
                    assert_ne!(attr.prog_ids, 0);
                    // deliberately not sorted by ID: position is what counts
                    let ids = attr.prog_ids as *mut u32;
                    unsafe {
                        ids.write(30);
                        ids.add(1).write(10);
                        ids.add(2).write(20);
                    }
                    attr.revision = 7;
                    Ok(0)
                }
                _ => panic!("more than two queries issued"),
            },
            call => panic!("unexpected syscall {call:?}"),
        });
        let got = query_tcx(4, TcxHook::Egress).unwrap();
        assert_eq!(got.prog_ids, vec![30, 10, 20]);
        assert_eq!(got.revision, 7);
    }

    #[test]
    fn concurrent_detach_shrinks_the_result() {
        override_syscall(|call| match call {
            Syscall::ProgQuery { attr } => match next_call() {
                0 => {
                    attr.prog_cnt = 3;
                    attr.revision = 1;
                    Ok(0)
                }
                _ => {
                    let ids = attr.prog_ids as *mut u32;
                    unsafe { ids.write(42) };
                    attr.prog_cnt = 1;
                    attr.revision = 2;
                    Ok(0)
                }
            },
            call => panic!("unexpected syscall {call:?}"),
        });
        let got = query_tcx(1, TcxHook::Ingress).unwrap();
        assert_eq!(got.prog_ids, vec![42]);
        assert_eq!(got.revision, 2);
    }

    #[test]
    fn overflow_fails_cleanly() {
        override_syscall(|call| match call {
            Syscall::ProgQuery { attr } => match next_call() {
                0 => {
                    attr.prog_cnt = 2;
                    Ok(0)
                }
                _ => Err((-1, io::Error::from_raw_os_error(libc::ENOSPC))),
            },
            call => panic!("unexpected syscall {call:?}"),
        });
        let err = query_tcx(1, TcxHook::Ingress).unwrap_err();
        assert!(matches!(
            err,
            Error::Syscall {
                call: "bpf_prog_query",
                ..
            }
        ));
    }

    #[test]
    fn directions_parse_case_sensitively() {
        assert_eq!("ingress".parse::<TcxHook>().unwrap(), TcxHook::Ingress);
        assert_eq!("egress".parse::<TcxHook>().unwrap(), TcxHook::Egress);
        for bad in ["Ingress", "INGRESS", "Egress", "", "both", "ingress "] {
            assert!(bad.parse::<TcxHook>().is_err(), "{bad:?} must not parse");
        }
    }

    #[test]
    fn directions_display_as_their_argument_form() {
        assert_eq!(TcxHook::Ingress.to_string(), "ingress");
        assert_eq!(TcxHook::Egress.to_string(), "egress");
    }
}
