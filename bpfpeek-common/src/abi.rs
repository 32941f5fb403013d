//! Fixed-layout parameter blocks for the `bpf(2)` commands in use.
//!
//! The kernel declares one `union bpf_attr` shared by every command and
//! reads `size` bytes of it per call. Each command here gets its own
//! `#[repr(C)]` struct matching the layout of the union member it
//! corresponds to, with the struct's own size passed as the syscall `size`
//! argument. Passing a size smaller than the full union is valid ABI: the
//! kernel zero-extends the tail.

pub(crate) const BPF_PROG_GET_FD_BY_ID: u32 = 13;
pub(crate) const BPF_OBJ_GET_INFO_BY_FD: u32 = 15;
pub(crate) const BPF_PROG_QUERY: u32 = 16;

/// `enum bpf_attach_type` values for the TCX hooks.
pub(crate) const BPF_TCX_INGRESS: u32 = 46;
pub(crate) const BPF_TCX_EGRESS: u32 = 47;

pub(crate) const BPF_OBJ_NAME_LEN: usize = 16;
pub(crate) const BPF_TAG_SIZE: usize = 8;

/// `BPF_PROG_GET_FD_BY_ID` parameters: the `*_GET_*_ID` member of the union.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProgGetFdByIdAttr {
    pub prog_id: u32,
    pub next_id: u32,
    pub open_flags: u32,
}

/// `BPF_OBJ_GET_INFO_BY_FD` parameters: the `info` member of the union.
///
/// `info_len` declares the byte length of the buffer behind `info`; the
/// kernel fills at most that much and never errors on a short buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct ObjGetInfoByFdAttr {
    pub bpf_fd: u32,
    pub info_len: u32,
    pub info: u64,
}

/// `BPF_PROG_QUERY` parameters: the `query` member of the union.
///
/// `prog_cnt` is in/out: buffer capacity going in, number of attached
/// programs coming out. `revision` advances whenever the hook's attachment
/// list changes.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProgQueryAttr {
    pub target_ifindex: u32,
    pub attach_type: u32,
    pub query_flags: u32,
    pub attach_flags: u32,
    pub prog_ids: u64,
    pub prog_cnt: u32,
    _pad: u32,
    pub prog_attach_flags: u64,
    pub link_ids: u64,
    pub link_attach_flags: u64,
    pub revision: u64,
}

/// Prefix of the kernel's `bpf_prog_info` record, declared through the last
/// field these tools read (`run_cnt`). Newer kernels append fields past this
/// prefix; they stay unavailable rather than failing the call.
#[doc(alias = "bpf_prog_info")]
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct BpfProgInfo {
    pub type_: u32,
    pub id: u32,
    pub tag: [u8; BPF_TAG_SIZE],
    pub jited_prog_len: u32,
    pub xlated_prog_len: u32,
    pub jited_prog_insns: u64,
    pub xlated_prog_insns: u64,
    pub load_time: u64,
    pub created_by_uid: u32,
    pub nr_map_ids: u32,
    pub map_ids: u64,
    pub name: [u8; BPF_OBJ_NAME_LEN],
    pub ifindex: u32,
    // gpl_compatible:1 plus 31 bits of padding in the kernel header
    pub flags: u32,
    pub netns_dev: u64,
    pub netns_ino: u64,
    pub nr_jited_ksyms: u32,
    pub nr_jited_func_lens: u32,
    pub jited_ksyms: u64,
    pub jited_func_lens: u64,
    pub btf_id: u32,
    pub func_info_rec_size: u32,
    pub func_info: u64,
    pub nr_func_info: u32,
    pub nr_line_info: u32,
    pub line_info: u64,
    pub jited_line_info: u64,
    pub nr_jited_line_info: u32,
    pub line_info_rec_size: u32,
    pub jited_line_info_rec_size: u32,
    pub nr_prog_tags: u32,
    pub prog_tags: u64,
    pub run_time_ns: u64,
    pub run_cnt: u64,
}

#[cfg(test)]
mod tests {
    use core::mem::{offset_of, size_of};

    use super::*;

    #[test]
    fn prog_get_fd_by_id_attr_layout() {
        assert_eq!(size_of::<ProgGetFdByIdAttr>(), 12);
        assert_eq!(offset_of!(ProgGetFdByIdAttr, prog_id), 0);
        assert_eq!(offset_of!(ProgGetFdByIdAttr, next_id), 4);
        assert_eq!(offset_of!(ProgGetFdByIdAttr, open_flags), 8);
    }

    #[test]
    fn obj_get_info_by_fd_attr_layout() {
        assert_eq!(size_of::<ObjGetInfoByFdAttr>(), 16);
        assert_eq!(offset_of!(ObjGetInfoByFdAttr, bpf_fd), 0);
        assert_eq!(offset_of!(ObjGetInfoByFdAttr, info_len), 4);
        assert_eq!(offset_of!(ObjGetInfoByFdAttr, info), 8);
    }

    #[test]
    fn prog_query_attr_layout() {
        assert_eq!(size_of::<ProgQueryAttr>(), 64);
        assert_eq!(offset_of!(ProgQueryAttr, target_ifindex), 0);
        assert_eq!(offset_of!(ProgQueryAttr, attach_type), 4);
        assert_eq!(offset_of!(ProgQueryAttr, query_flags), 8);
        assert_eq!(offset_of!(ProgQueryAttr, attach_flags), 12);
        assert_eq!(offset_of!(ProgQueryAttr, prog_ids), 16);
        assert_eq!(offset_of!(ProgQueryAttr, prog_cnt), 24);
        assert_eq!(offset_of!(ProgQueryAttr, prog_attach_flags), 32);
        assert_eq!(offset_of!(ProgQueryAttr, link_ids), 40);
        assert_eq!(offset_of!(ProgQueryAttr, link_attach_flags), 48);
        assert_eq!(offset_of!(ProgQueryAttr, revision), 56);
    }

    #[test]
    fn prog_info_layout() {
        assert_eq!(size_of::<BpfProgInfo>(), 208);
        assert_eq!(offset_of!(BpfProgInfo, type_), 0);
        assert_eq!(offset_of!(BpfProgInfo, id), 4);
        assert_eq!(offset_of!(BpfProgInfo, tag), 8);
        assert_eq!(offset_of!(BpfProgInfo, jited_prog_insns), 24);
        assert_eq!(offset_of!(BpfProgInfo, load_time), 40);
        assert_eq!(offset_of!(BpfProgInfo, created_by_uid), 48);
        assert_eq!(offset_of!(BpfProgInfo, map_ids), 56);
        assert_eq!(offset_of!(BpfProgInfo, name), 64);
        assert_eq!(offset_of!(BpfProgInfo, ifindex), 80);
        assert_eq!(offset_of!(BpfProgInfo, netns_dev), 88);
        assert_eq!(offset_of!(BpfProgInfo, btf_id), 128);
        assert_eq!(offset_of!(BpfProgInfo, prog_tags), 184);
        assert_eq!(offset_of!(BpfProgInfo, run_time_ns), 192);
        assert_eq!(offset_of!(BpfProgInfo, run_cnt), 200);
    }
}
