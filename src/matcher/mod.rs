//! Prefix/suffix matching for 20-byte addresses (hex nibbles).

mod criteria;

pub use criteria::{Criteria, CriteriaError, ADDRESS_HEX_LEN};
