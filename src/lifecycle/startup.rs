//! Startup orchestration.
//!
//! Subsystems are built in dependency order: provider gateway, ABI check,
//! contract client, session controller. Any startup error is fatal; once
//! running, failures are reported through session state instead.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use thiserror::Error;

use crate::config::PortalConfig;
use crate::contract::abi::{load_abi, verify_abi, AbiError};
use crate::contract::{ChainContract, ChainContractOptions};
use crate::error::SyncError;
use crate::provider::{HttpWalletProvider, ProviderGateway};
use crate::session::SessionController;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid contract address '{0}'")]
    ContractAddress(String),

    #[error(transparent)]
    Abi(#[from] AbiError),

    #[error(transparent)]
    Provider(#[from] SyncError),
}

/// Gateway for the configured wallet, or an empty one if none is configured.
pub fn build_gateway(config: &PortalConfig) -> Result<ProviderGateway, StartupError> {
    match &config.wallet.rpc_url {
        Some(url) => {
            let provider = HttpWalletProvider::new(url)?;
            tracing::info!(url = %provider.url(), "Using wallet provider");
            Ok(ProviderGateway::new(Arc::new(provider)))
        }
        None => {
            tracing::warn!("No wallet provider configured");
            Ok(ProviderGateway::unavailable())
        }
    }
}

/// Wire up a session controller from validated configuration.
pub fn build_controller(config: &PortalConfig) -> Result<SessionController, StartupError> {
    let address: Address = config
        .contract
        .address
        .parse()
        .map_err(|_| StartupError::ContractAddress(config.contract.address.clone()))?;

    if let Some(path) = &config.contract.abi_path {
        verify_abi(&load_abi(Path::new(path))?)?;
        tracing::info!(path = %path, "Contract ABI matches the WavePortal interface");
    }

    let gateway = build_gateway(config)?;
    let contract = ChainContract::new(
        gateway.clone(),
        address,
        ChainContractOptions::from(&config.sync),
    );

    tracing::info!(
        contract = %address,
        required_network = %config.network.required(),
        "Session components initialized"
    );

    Ok(SessionController::new(
        gateway,
        Arc::new(contract),
        config.network.required(),
    )
    .with_network_poll_interval(Duration::from_millis(config.sync.receipt_poll_interval_ms)))
}
