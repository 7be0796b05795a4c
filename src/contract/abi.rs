//! Compiled WavePortal interface and verification of a configured ABI artifact.

use std::path::Path;

use alloy::json_abi::JsonAbi;
use alloy::primitives::Selector;
use alloy::sol;
use alloy::sol_types::{SolCall, SolEvent};
use thiserror::Error;

sol! {
    /// A stored wave as returned by `getAllWaves`.
    #[derive(Debug, PartialEq, Eq)]
    struct Wave {
        address waver;
        string message;
        uint256 timestamp;
    }

    function getAllWaves() external view returns (Wave[] memory);

    function getTotalWaves() external view returns (uint256);

    function wave(string _message) external;

    /// Emitted for every stored wave.
    #[derive(Debug)]
    event NewWave(address indexed from, uint256 timestamp, string message);
}

/// Errors raised while loading or checking an ABI artifact.
#[derive(Debug, Error)]
pub enum AbiError {
    #[error("failed to read ABI file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse ABI: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("ABI does not match the WavePortal interface: {}", .0.join(", "))]
    Mismatch(Vec<String>),
}

/// Load an ABI from a Hardhat-style artifact (`{ "abi": [...] }`) or a bare ABI array.
pub fn load_abi(path: &Path) -> Result<JsonAbi, AbiError> {
    let content = std::fs::read_to_string(path)?;
    parse_abi(&content)
}

pub fn parse_abi(content: &str) -> Result<JsonAbi, AbiError> {
    let mut value: serde_json::Value = serde_json::from_str(content)?;
    let abi = match value.get_mut("abi") {
        Some(inner) => inner.take(),
        None => value,
    };
    Ok(serde_json::from_value(abi)?)
}

/// Check that `abi` exposes every function and event the client uses, with
/// the same selectors as the compiled interface.
pub fn verify_abi(abi: &JsonAbi) -> Result<(), AbiError> {
    let mut problems = Vec::new();

    let functions: [(&str, [u8; 4]); 3] = [
        ("getAllWaves", getAllWavesCall::SELECTOR),
        ("getTotalWaves", getTotalWavesCall::SELECTOR),
        ("wave", waveCall::SELECTOR),
    ];
    for (name, selector) in functions {
        let found = abi
            .function(name)
            .is_some_and(|overloads| overloads.iter().any(|f| f.selector() == Selector::from(selector)));
        if !found {
            problems.push(format!("function {} missing or incompatible", name));
        }
    }

    let event_found = abi
        .event("NewWave")
        .is_some_and(|overloads| overloads.iter().any(|e| e.selector() == NewWave::SIGNATURE_HASH));
    if !event_found {
        problems.push("event NewWave missing or incompatible".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AbiError::Mismatch(problems))
    }
}
