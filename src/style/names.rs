//! Well-known queue identifiers and their display names.

/// Priority order of well-known queue types. A type's position here is its
/// style slot.
pub const KNOWN_QUEUE_TYPES: [&str; 31] = [
    "faaaq_rust_optimised",
    "faaaq_rust_unoptimised",
    "faaa_queue_cpp",
    "lprq_rust_correct",
    "lcrq_rust_correct",
    "lcrq_cpp",
    "lprq_rust_unoptimised",
    "lcrq_rust_unoptimised",
    "lprq_cpp",
    "lcrq_rust",
    "lprq_rust",
    "moodycamel_cpp",
    "seg_queue",
    "array_queue",
    "atomic_queue",
    "basic_queue",
    "bounded_ringbuffer",
    "bounded_concurrent_queue",
    "unbounded_concurrent_queue",
    "lf_queue",
    "lockfree_queue",
    "lockfree_stack",
    "scc2_queue",
    "scc2_stack",
    "scc_queue",
    "scc_stack",
    "boost_cpp",
    "faaa_queue_rust",
    "tz_queue_hp",
    "bbq",
    "ms_queue",
];

const DISPLAY_NAMES: [(&str, &str); 31] = [
    ("faaaq_rust_optimised", "FAAAQueue Optimised"),
    ("faaaq_rust_unoptimised", "FAAAQueue Unoptimised"),
    ("faaa_queue_cpp", "C++ FAAAQueue"),
    ("lprq_rust_correct", "Rust LPRQ Optimised"),
    ("lcrq_rust_correct", "Rust LCRQ Optimised"),
    ("lcrq_cpp", "C++ LCRQ"),
    ("lprq_rust_unoptimised", "Rust LPRQ Unoptimised"),
    ("lcrq_rust_unoptimised", "Rust LCRQ Unoptimised"),
    ("lprq_cpp", "C++ LPRQ"),
    ("lcrq_rust", "Rust LCRQ"),
    ("lprq_rust", "Rust LPRQ"),
    ("moodycamel_cpp", "moodycamel (C++)"),
    ("seg_queue", "SegQueue"),
    ("array_queue", "ArrayQueue"),
    ("atomic_queue", "atomic-queue"),
    ("basic_queue", "BasicQueue"),
    ("bounded_ringbuffer", "Bounded Ringbuffer"),
    ("bounded_concurrent_queue", "concurrent_queue::bounded"),
    ("unbounded_concurrent_queue", "concurrent_queue::unbounded"),
    ("lf_queue", "lf-queue"),
    ("lockfree_queue", "lockfree::Queue"),
    ("lockfree_stack", "lockfree::Stack"),
    ("scc2_queue", "scc2::Queue"),
    ("scc2_stack", "scc2::Stack"),
    ("scc_queue", "scc::Queue"),
    ("scc_stack", "scc::Stack"),
    ("boost_cpp", "boost (C++)"),
    ("faaa_queue_rust", "Rust FAAAQueue"),
    ("tz_queue_hp", "TsigasZhang (HP)"),
    ("bbq", "BBQ"),
    ("ms_queue", "MSQueue"),
];

/// Position of `queue_type` in [`KNOWN_QUEUE_TYPES`].
pub fn priority_index(queue_type: &str) -> Option<usize> {
    KNOWN_QUEUE_TYPES.iter().position(|q| *q == queue_type)
}

/// Human-readable name, or the identifier itself if untranslated.
pub fn resolve_label(queue_type: &str) -> &str {
    DISPLAY_NAMES
        .iter()
        .find(|(id, _)| *id == queue_type)
        .map(|(_, name)| *name)
        .unwrap_or(queue_type)
}
