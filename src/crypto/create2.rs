//! CREATE2 address computation (EIP-1014).
//!
//!   address = keccak256(0xff || deployer || salt || keccak256(initCode))[12:32]

use super::{keccak256, Address, Salt};

/// Arachnid's deterministic deployment proxy, deployed at the same address on
/// most EVM chains.
pub const DEFAULT_DEPLOYER: Address = Address::from_bytes([
    0x4e, 0x59, 0xb4, 0x48, 0x47, 0xb3, 0x79, 0x57, 0x85, 0x88, 0x92, 0x0c, 0xa7, 0x8f, 0xbf, 0x26,
    0xc0, 0xb4, 0x95, 0x6c,
]);

/// Hash of the creation bytecode followed by its ABI-encoded constructor
/// arguments. This is what the deployer hashes when it runs CREATE2.
pub fn init_code_hash(bytecode: &[u8], constructor_args: &[u8]) -> [u8; 32] {
    let mut init_code = Vec::with_capacity(bytecode.len() + constructor_args.len());
    init_code.extend_from_slice(bytecode);
    init_code.extend_from_slice(constructor_args);
    keccak256(&init_code)
}

/// Computes the CREATE2 address.
/// Preimage: 0xff (1) || deployer (20) || salt (32) || init_code_hash (32) = 85 bytes.
#[inline]
pub fn create2_address(deployer: &Address, salt: &Salt, init_code_hash: &[u8; 32]) -> Address {
    let mut preimage = [0u8; 85];
    preimage[0] = 0xff;
    preimage[1..21].copy_from_slice(deployer.as_bytes());
    preimage[21..53].copy_from_slice(salt.as_bytes());
    preimage[53..85].copy_from_slice(init_code_hash);

    let hash = keccak256(&preimage);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..32]);
    Address::from_bytes(addr)
}
