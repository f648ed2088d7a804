//! OpenAPI specification for the fulfillment orchestrator's HTTP surface.

use crate::api;
use crate::api::ListResponse;
use utoipa::OpenApi;

use wms_domain::dead_letter::{DeadLetterEntry, DeadLetterResolution};
use wms_domain::order::{LineItem, Order, OrderPriority, OrderStatus, ShipAddress};

#[derive(OpenApi)]
#[openapi(
    paths(
        api::orders::create_order,
        api::orders::get_order,
        api::orders::list_orders,
        api::signals::send_signal,
        api::dead_letters::list_dead_letters,
        api::dead_letters::get_dead_letter,
        api::dead_letters::resolve_dead_letter,
    ),
    components(
        schemas(
            Order, OrderStatus, OrderPriority, LineItem, ShipAddress,
            DeadLetterEntry, DeadLetterResolution,
            api::orders::CreateOrderRequest, api::orders::CreateOrderResponse,
            api::signals::SignalRequest, api::signals::SignalResponse,
            api::dead_letters::ResolveDeadLetterRequest,
            api::ErrorResponse,
            ListResponse<Order>,
            ListResponse<DeadLetterEntry>,
        )
    ),
    tags(
        (name = "orders", description = "Order intake and status"),
        (name = "signals", description = "External completion signals routed to running workflows"),
        (name = "dead-letters", description = "Dead-letter queue triage"),
    ),
    info(
        title = "Fulfillment Orchestrator API",
        version = "0.1.0",
        description = "HTTP surface for order intake, the signal bridge, and dead-letter queue operations",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    pub fn to_json() -> String {
        Self::openapi()
            .to_pretty_json()
            .expect("Failed to serialize OpenAPI spec")
    }
}
