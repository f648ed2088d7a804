//! Tenancy propagation
//!
//! Every handler extracts the tenancy triple from request headers into a
//! [`TenancyContext`] carried through activities and events. Default values
//! are allowed at the service boundary but never inside a workflow — once a
//! workflow starts, its tenancy context is part of its input and is
//! immutable for the life of the run.

use serde::{Deserialize, Serialize};

/// Tenant / facility / warehouse / seller / channel propagated through every
/// activity dispatch and event envelope.
///
/// Mirrors the `X-WMS-Tenant-ID`, `X-WMS-Facility-ID`, `X-WMS-Warehouse-ID`,
/// `X-WMS-Seller-ID`, `X-WMS-Channel-ID` request headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TenancyContext {
    pub tenant_id: String,
    pub facility_id: String,
    pub warehouse_id: String,
    pub seller_id: Option<String>,
    pub channel_id: Option<String>,
}

impl TenancyContext {
    pub fn new(tenant_id: impl Into<String>, facility_id: impl Into<String>, warehouse_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            facility_id: facility_id.into(),
            warehouse_id: warehouse_id.into(),
            seller_id: None,
            channel_id: None,
        }
    }

    pub fn with_seller(mut self, seller_id: impl Into<String>) -> Self {
        self.seller_id = Some(seller_id.into());
        self
    }

    pub fn with_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }
}
