//! Bit-to-name tables for every flag word on a page
//!
//! Each mapping is data: a static `(mask, name)` table folded in order.
//! The ordering is part of the output contract - users diff inspector
//! output between runs, so a fixed bitfield must always yield the same
//! name list. Unknown bits stay visible in the raw hex rendering but are
//! never named.

/// pd_flags bits
pub const PD_FLAGS: &[(u16, &str)] = &[
    (0x0001, "HAS_FREE_LINES"),
    (0x0002, "PAGE_FULL"),
    (0x0004, "ALL_VISIBLE"),
];

/// t_infomask bits below the two-bit xmin status field
pub const HEAP_INFOMASK_LOW: &[(u16, &str)] = &[
    (0x0001, "HAS_NULL"),
    (0x0002, "HAS_VARWIDTH"),
    (0x0004, "HAS_EXTERNAL"),
    (0x0008, "HAS_OID_OLD"),
    (0x0010, "XMAX_KEYSHR_LOCK"),
    (0x0020, "COMBO_CID"),
    (0x0040, "XMAX_EXCL_LOCK"),
    (0x0080, "XMAX_LOCK_ONLY"),
];

/// t_infomask bits above the two-bit xmin status field
pub const HEAP_INFOMASK_HIGH: &[(u16, &str)] = &[
    (0x0400, "XMAX_COMMITTED"),
    (0x0800, "XMAX_INVALID"),
    (0x1000, "XMAX_IS_MULTI"),
    (0x2000, "UPDATED"),
    (0x4000, "MOVED_OFF"),
    (0x8000, "MOVED_IN"),
];

/// t_infomask2 flag bits (the low 11 bits are the attribute count)
pub const HEAP_INFOMASK2: &[(u16, &str)] = &[
    (0x2000, "KEYS_UPDATED"),
    (0x4000, "HOT_UPDATED"),
    (0x8000, "HEAP_ONLY"),
];

/// Index tuple t_info flag bits (the low 13 bits are the tuple size)
pub const INDEX_INFO: &[(u16, &str)] = &[
    (0x8000, "HAS_NULLS"),
    (0x4000, "HAS_VARWIDTH"),
    (0x2000, "AM_RESERVED"),
];

/// btpo_flags bits
pub const BTREE_FLAGS: &[(u16, &str)] = &[
    (0x0001, "BTP_LEAF"),
    (0x0002, "BTP_ROOT"),
    (0x0004, "BTP_DELETED"),
    (0x0008, "BTP_META"),
    (0x0010, "BTP_HALF_DEAD"),
    (0x0020, "BTP_SPLIT_END"),
    (0x0040, "BTP_HAS_GARBAGE"),
    (0x0080, "BTP_INCOMPLETE_SPLIT"),
    (0x0100, "BTP_HAS_FULLXID"),
];

/// hasho_flag lifecycle bits (the low nibble is the page kind)
pub const HASH_FLAGS_HIGH: &[(u16, &str)] = &[
    (0x0010, "LH_BUCKET_BEING_POPULATED"),
    (0x0020, "LH_BUCKET_BEING_SPLIT"),
    (0x0040, "LH_BUCKET_NEEDS_SPLIT_CLEANUP"),
    (0x0080, "LH_PAGE_HAS_DEAD_TUPLES"),
];

/// GiST special flags
pub const GIST_FLAGS: &[(u16, &str)] = &[
    (0x0001, "F_LEAF"),
    (0x0002, "F_DELETED"),
    (0x0004, "F_TUPLES_DELETED"),
    (0x0008, "F_FOLLOW_RIGHT"),
    (0x0010, "F_HAS_GARBAGE"),
];

/// GIN special flags
pub const GIN_FLAGS: &[(u16, &str)] = &[
    (0x0001, "GIN_DATA"),
    (0x0002, "GIN_LEAF"),
    (0x0004, "GIN_DELETED"),
    (0x0008, "GIN_META"),
    (0x0010, "GIN_LIST"),
    (0x0020, "GIN_LIST_FULLROW"),
    (0x0040, "GIN_INCOMPLETE_SPLIT"),
    (0x0080, "GIN_COMPRESSED"),
];

/// SP-GiST special flags
pub const SPGIST_FLAGS: &[(u16, &str)] = &[
    (0x0001, "SPGIST_META"),
    (0x0002, "SPGIST_DELETED"),
    (0x0004, "SPGIST_LEAF"),
    (0x0008, "SPGIST_NULLS"),
];

/// BRIN special flags
pub const BRIN_FLAGS: &[(u16, &str)] = &[(0x0001, "BRIN_EVACUATE_PAGE")];

/// Collect the names of all set bits, in table order.
pub fn collect_names(bits: u16, table: &[(u16, &'static str)]) -> Vec<&'static str> {
    table
        .iter()
        .filter(|(mask, _)| bits & mask != 0)
        .map(|&(_, name)| name)
        .collect()
}

/// Join a name list with ` | `.
pub fn join(names: &[&str]) -> String {
    names.join(" | ")
}

/// Render pd_flags; the empty set renders as `none`.
pub fn page_flags_string(flags: u16) -> String {
    let names = collect_names(flags, PD_FLAGS);
    if names.is_empty() {
        "none".to_string()
    } else {
        join(&names)
    }
}
