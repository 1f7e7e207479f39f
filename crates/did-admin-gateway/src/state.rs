//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers.

use std::sync::Arc;

use did_admin_inventory::Inventory;

use crate::config::GatewayConfig;

/// Shared application state for the gateway.
pub struct GatewayState<I>
where
    I: Inventory,
{
    /// The inventory service.
    pub inventory: Arc<I>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl<I> GatewayState<I>
where
    I: Inventory,
{
    /// Create a new gateway state.
    #[must_use]
    pub fn new(inventory: Arc<I>, config: GatewayConfig) -> Self {
        Self { inventory, config }
    }
}

impl<I> Clone for GatewayState<I>
where
    I: Inventory,
{
    fn clone(&self) -> Self {
        Self {
            inventory: Arc::clone(&self.inventory),
            config: self.config.clone(),
        }
    }
}
