//! The `bpf(2)` entry point shared by every command this crate issues.

use std::fmt;
use std::io;
use std::mem;

use libc::{c_long, SYS_bpf};

use crate::abi::{
    ObjGetInfoByFdAttr, ProgGetFdByIdAttr, ProgQueryAttr, BPF_OBJ_GET_INFO_BY_FD,
    BPF_PROG_GET_FD_BY_ID, BPF_PROG_QUERY,
};

pub(crate) type SysResult = Result<c_long, (c_long, io::Error)>;

/// One variant per `bpf(2)` command in use. The variant fixes the command
/// number, the parameter block and the size the kernel is told to read.
pub(crate) enum Syscall<'a> {
    ProgGetFdById { attr: &'a mut ProgGetFdByIdAttr },
    ObjGetInfoByFd { attr: &'a mut ObjGetInfoByFdAttr },
    ProgQuery { attr: &'a mut ProgQueryAttr },
}

impl fmt::Debug for Syscall<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProgGetFdById { .. } => f.write_str("bpf_prog_get_fd_by_id"),
            Self::ObjGetInfoByFd { .. } => f.write_str("bpf_obj_get_info_by_fd"),
            Self::ProgQuery { .. } => f.write_str("bpf_prog_query"),
        }
    }
}

pub(crate) fn syscall(call: Syscall<'_>) -> SysResult {
    #[cfg(test)]
    return TEST_SYSCALL.with(|test_impl| {
        let f = *test_impl.borrow();
        f(call)
    });

    #[cfg_attr(test, allow(unreachable_code))]
    {
        let (cmd, attr, size) = match call {
            Syscall::ProgGetFdById { attr } => (
                BPF_PROG_GET_FD_BY_ID,
                attr as *mut ProgGetFdByIdAttr as *mut libc::c_void,
                mem::size_of::<ProgGetFdByIdAttr>(),
            ),
            Syscall::ObjGetInfoByFd { attr } => (
                BPF_OBJ_GET_INFO_BY_FD,
                attr as *mut ObjGetInfoByFdAttr as *mut libc::c_void,
                mem::size_of::<ObjGetInfoByFdAttr>(),
            ),
            Syscall::ProgQuery { attr } => (
                BPF_PROG_QUERY,
                attr as *mut ProgQueryAttr as *mut libc::c_void,
                mem::size_of::<ProgQueryAttr>(),
            ),
        };

        let ret = unsafe { libc::syscall(SYS_bpf, cmd, attr, size) };
        if ret >= 0 {
            Ok(ret)
        } else {
            Err((ret, io::Error::last_os_error()))
        }
    }
}

#[cfg(test)]
pub(crate) type SyscallFn = fn(Syscall<'_>) -> SysResult;

#[cfg(test)]
thread_local! {
    static TEST_SYSCALL: std::cell::RefCell<SyscallFn> = std::cell::RefCell::new(deny_syscall);
}

#[cfg(test)]
fn deny_syscall(_call: Syscall<'_>) -> SysResult {
    Err((-1, io::Error::from_raw_os_error(libc::EINVAL)))
}

/// Replace the syscall implementation for the current test thread.
#[cfg(test)]
pub(crate) fn override_syscall(f: SyscallFn) {
    TEST_SYSCALL.with(|test_impl| *test_impl.borrow_mut() = f);
}
