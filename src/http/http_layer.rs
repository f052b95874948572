// The http module is the delivery surface: axum handlers and routes
// exposing the core services over HTTP.

#[path = "handlers.rs"]
pub mod handlers;
#[path = "routes.rs"]
pub mod routes;
#[path = "state.rs"]
pub mod state;
