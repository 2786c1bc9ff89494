//! # create2_vanity
//!
//! Deterministic CREATE2 salt finder. Walks salts upward from
//! `1 + keccak256(seed label)` until the address
//! `keccak256(0xff || deployer || salt || initCodeHash)[12..32]` starts and
//! ends with the requested hex fragments.
//!
//! ## Architecture
//!
//! - `crypto`: Keccak-256, CREATE2 derivation, 256-bit salts, addresses
//! - `matcher`: Prefix/suffix criteria
//! - `search`: The salt finder and its outcome types
//! - `worker`: Ordered parallel search over disjoint salt blocks
//! - `config`: Runtime configuration

pub mod config;
pub mod crypto;
pub mod matcher;
pub mod search;
pub mod worker;

pub use config::{Config, ConfigError};
pub use crypto::{create2_address, init_code_hash, keccak256, Address, Salt, DEFAULT_DEPLOYER};
pub use matcher::{Criteria, CriteriaError};
pub use search::{find_salt, Progress, SaltFinder, SaltMatch, SearchError, SearchOutcome, SearchParams};
pub use worker::WorkerPool;
