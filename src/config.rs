//! Runtime configuration for the salt finder.

use std::time::Duration;

use clap::Parser;

use crate::crypto::{decode_bytes, decode_fixed, init_code_hash, Address, HexError, DEFAULT_DEPLOYER};
use crate::matcher::{Criteria, CriteriaError};
use crate::search::{SearchParams, DEFAULT_PROGRESS_EVERY};

/// CREATE2 Salt Finder
///
/// Counts salts up from 1 + keccak256(seed) until the CREATE2 address of the
/// given init code starts with --prefix and ends with --suffix. The same
/// inputs always produce the same salt.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Desired address prefix (hex, 0x optional; may be empty)
    #[arg(short, long)]
    pub prefix: String,

    /// Desired address suffix (hex, 0x optional; may be empty)
    #[arg(short, long)]
    pub suffix: String,

    /// Label hashed with keccak256 to pick the starting salt
    #[arg(long)]
    pub seed: String,

    /// keccak256(creationCode || constructorArgs), 32 bytes hex
    #[arg(long, conflicts_with_all = ["init_code", "constructor_args"])]
    pub init_code_hash: Option<String>,

    /// Contract creation bytecode, hex (hashed together with --constructor-args)
    #[arg(long)]
    pub init_code: Option<String>,

    /// ABI-encoded constructor arguments appended to --init-code, hex
    #[arg(long, requires = "init_code")]
    pub constructor_args: Option<String>,

    /// Address performing the CREATE2 deployment (default: deterministic deployment proxy)
    #[arg(long)]
    pub deployer: Option<String>,

    /// Number of worker threads (default: number of CPU cores)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Skip the first N salts, already scanned by an earlier run
    #[arg(long, default_value_t = 0)]
    pub resume_from: u64,

    /// Give up after this many salts in this run (default: no limit)
    #[arg(long)]
    pub max_attempts: Option<u64>,

    /// Give up after this many seconds (default: no limit)
    #[arg(long)]
    pub max_seconds: Option<u64>,

    /// Report progress every N salts (0 = never)
    #[arg(long, default_value_t = DEFAULT_PROGRESS_EVERY)]
    pub progress_every: u64,
}

impl Config {
    /// Returns the number of workers, defaulting to CPU count.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get)
    }

    /// Validates the configuration and returns the parameters of the search.
    pub fn validate(&self) -> Result<SearchParams, ConfigError> {
        if self.workers == Some(0) {
            return Err(ConfigError::InvalidConfig("workers must be at least 1".into()));
        }
        self.search_params()
    }

    pub fn criteria(&self) -> Result<Criteria, ConfigError> {
        Ok(Criteria::new(&self.prefix, &self.suffix)?)
    }

    pub fn deployer(&self) -> Result<Address, ConfigError> {
        match &self.deployer {
            Some(raw) => raw.parse().map_err(|source| ConfigError::Hex {
                field: "deployer",
                source,
            }),
            None => Ok(DEFAULT_DEPLOYER),
        }
    }

    /// The init-code hash, either given directly or computed from
    /// `--init-code` and `--constructor-args`.
    pub fn init_code_hash(&self) -> Result<[u8; 32], ConfigError> {
        match (&self.init_code_hash, &self.init_code) {
            (Some(hash), None) => decode_fixed::<32>(hash).map_err(|source| ConfigError::Hex {
                field: "init-code-hash",
                source,
            }),
            (None, Some(code)) => {
                let bytecode = decode_bytes(code).map_err(|source| ConfigError::Hex {
                    field: "init-code",
                    source,
                })?;
                let args = match &self.constructor_args {
                    Some(args) => decode_bytes(args).map_err(|source| ConfigError::Hex {
                        field: "constructor-args",
                        source,
                    })?,
                    None => Vec::new(),
                };
                if bytecode.is_empty() {
                    return Err(ConfigError::InvalidConfig("init-code cannot be empty".into()));
                }
                Ok(init_code_hash(&bytecode, &args))
            }
            (Some(_), Some(_)) => Err(ConfigError::InvalidConfig(
                "pass either --init-code-hash or --init-code, not both".into(),
            )),
            (None, None) => Err(ConfigError::InvalidConfig(
                "one of --init-code-hash or --init-code is required".into(),
            )),
        }
    }

    pub fn search_params(&self) -> Result<SearchParams, ConfigError> {
        Ok(SearchParams::new(
            self.deployer()?,
            self.init_code_hash()?,
            self.criteria()?,
            self.seed.clone(),
        ))
    }

    pub fn max_duration(&self) -> Option<Duration> {
        self.max_seconds.map(Duration::from_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid criteria: {0}")]
    InvalidCriteria(#[from] CriteriaError),
    #[error("Invalid {field}: {source}")]
    Hex {
        field: &'static str,
        #[source]
        source: HexError,
    },
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
