//! Application layer - Commands, Handlers and the model gateway.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;
pub mod model_gateway;

pub use handlers::{RunAuditCommand, RunAuditError, RunAuditHandler};
pub use model_gateway::{GatewayError, ModelGateway};
