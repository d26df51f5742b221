//! Built-in scheme definitions compiled into the binary.

pub const RENAL: &str = include_str!("../data/renal.toml");
pub const CCLS: &str = include_str!("../data/ccls.toml");
pub const UCLS_MRS: &str = include_str!("../data/ucls-mrs.toml");
pub const UCLS_CTS: &str = include_str!("../data/ucls-cts.toml");
pub const TNM_KIDNEY: &str = include_str!("../data/tnm-kidney.toml");
pub const TNM_BLADDER: &str = include_str!("../data/tnm-bladder.toml");
pub const TNM_ADRENAL: &str = include_str!("../data/tnm-adrenal.toml");

/// `(origin, definition)` pairs in load order.
pub const BUILTIN_SCHEMES: &[(&str, &str)] = &[
    ("renal.toml", RENAL),
    ("ccls.toml", CCLS),
    ("ucls-mrs.toml", UCLS_MRS),
    ("ucls-cts.toml", UCLS_CTS),
    ("tnm-kidney.toml", TNM_KIDNEY),
    ("tnm-bladder.toml", TNM_BLADDER),
    ("tnm-adrenal.toml", TNM_ADRENAL),
];
