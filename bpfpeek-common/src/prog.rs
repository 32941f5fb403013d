//! Program FD resolution and metadata inspection.

use std::mem;
use std::os::fd::{AsFd as _, AsRawFd as _, BorrowedFd, FromRawFd as _, OwnedFd, RawFd};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::abi::{BpfProgInfo, ObjGetInfoByFdAttr, ProgGetFdByIdAttr};
use crate::sys::{syscall, Syscall};
use crate::Error;

/// Kernel names for `enum bpf_prog_type`, indexed by value.
const PROG_TYPE_NAMES: &[&str] = &[
    "unspec",
    "socket_filter",
    "kprobe",
    "sched_cls",
    "sched_act",
    "tracepoint",
    "xdp",
    "perf_event",
    "cgroup_skb",
    "cgroup_sock",
    "lwt_in",
    "lwt_out",
    "lwt_xmit",
    "sock_ops",
    "sk_skb",
    "cgroup_device",
    "sk_msg",
    "raw_tracepoint",
    "cgroup_sock_addr",
    "lwt_seg6local",
    "lirc_mode2",
    "sk_reuseport",
    "flow_dissector",
    "cgroup_sysctl",
    "raw_tracepoint_writable",
    "cgroup_sockopt",
    "tracing",
    "struct_ops",
    "ext",
    "lsm",
    "sk_lookup",
    "syscall",
    "netfilter",
];

/// Ask the kernel for a new file descriptor referencing the program with
/// `prog_id`.
///
/// The ID is passed through unvalidated; a missing one comes back as
/// ENOENT/ENODEV from the kernel, EPERM without privilege. Dropping the
/// returned fd releases the kernel's reference on the program object.
pub fn prog_fd_by_id(prog_id: u32) -> Result<OwnedFd, Error> {
    let mut attr = unsafe { mem::zeroed::<ProgGetFdByIdAttr>() };
    attr.prog_id = prog_id;

    let fd =
        syscall(Syscall::ProgGetFdById { attr: &mut attr }).map_err(|(_, io_error)| {
            Error::Syscall {
                call: "bpf_prog_get_fd_by_id",
                io_error,
            }
        })?;
    // SAFETY: on success the kernel returned a newly opened descriptor that
    // nothing else owns.
    Ok(unsafe { OwnedFd::from_raw_fd(fd as RawFd) })
}

/// Fetch the metadata record of the program behind `fd`.
///
/// `info_len` is declared as the size of the locally-known record shape and
/// stays visible at this call boundary: a kernel with a larger record fills
/// only this prefix, it does not error.
pub fn prog_info_by_fd(fd: BorrowedFd<'_>) -> Result<ProgramInfo, Error> {
    let mut info = unsafe { mem::zeroed::<BpfProgInfo>() };

    let mut attr = unsafe { mem::zeroed::<ObjGetInfoByFdAttr>() };
    attr.bpf_fd = fd.as_raw_fd() as u32;
    attr.info_len = mem::size_of::<BpfProgInfo>() as u32;
    attr.info = &mut info as *mut BpfProgInfo as u64;

    syscall(Syscall::ObjGetInfoByFd { attr: &mut attr }).map_err(|(_, io_error)| {
        Error::Syscall {
            call: "bpf_obj_get_info_by_fd",
            io_error,
        }
    })?;
    Ok(ProgramInfo(info))
}

/// Resolve `prog_id` and fetch its metadata in one step.
///
/// The intermediate descriptor is closed before this returns, on the error
/// path included.
pub fn prog_info_by_id(prog_id: u32) -> Result<ProgramInfo, Error> {
    let fd = prog_fd_by_id(prog_id)?;
    prog_info_by_fd(fd.as_fd())
}

/// Point-in-time snapshot of a loaded program's metadata.
#[derive(Debug)]
pub struct ProgramInfo(pub(crate) BpfProgInfo);

impl ProgramInfo {
    /// The kernel-assigned program ID.
    pub fn id(&self) -> u32 {
        self.0.id
    }

    /// Raw program type enumeration value.
    pub fn type_id(&self) -> u32 {
        self.0.type_
    }

    /// Kernel name for the program type, when the value is a known one.
    pub fn type_name(&self) -> Option<&'static str> {
        PROG_TYPE_NAMES.get(self.0.type_ as usize).copied()
    }

    /// Program name bytes: everything before the first NUL, or the whole
    /// 16-byte buffer when the kernel filled it completely.
    pub fn name(&self) -> &[u8] {
        let end = self
            .0
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.0.name.len());
        &self.0.name[..end]
    }

    /// Program name as UTF-8, if valid.
    pub fn name_as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.name()).ok()
    }

    /// Load timestamp in nanoseconds since boot, as the kernel reports it.
    pub fn load_time_ns(&self) -> u64 {
        self.0.load_time
    }

    /// Wall-clock load time; `None` on kernels that report 0.
    pub fn loaded_at(&self) -> Option<SystemTime> {
        (self.0.load_time > 0).then(|| boot_time() + Duration::from_nanos(self.0.load_time))
    }

    /// Cumulative invocation count.
    pub fn run_count(&self) -> u64 {
        self.0.run_cnt
    }

    /// Cumulative run time across all invocations.
    pub fn run_time(&self) -> Duration {
        Duration::from_nanos(self.0.run_time_ns)
    }
}

/// Wall-clock time of system boot, from the BOOTTIME and REALTIME clocks.
fn boot_time() -> SystemTime {
    let mut time = unsafe { mem::zeroed::<libc::timespec>() };

    let ret = unsafe { libc::clock_gettime(libc::CLOCK_BOOTTIME, &mut time) };
    assert_eq!(ret, 0, "failed to read the boot clock");
    let libc::timespec { tv_sec, tv_nsec } = time;
    let since_boot = Duration::new(tv_sec as u64, tv_nsec as u32);

    let ret = unsafe { libc::clock_gettime(libc::CLOCK_REALTIME, &mut time) };
    assert_eq!(ret, 0, "failed to read the wall clock");
    let libc::timespec { tv_sec, tv_nsec } = time;
    let since_epoch = Duration::new(tv_sec as u64, tv_nsec as u32);

    UNIX_EPOCH + (since_epoch - since_boot)
}
