//! # 网关 HTTP 层
//!
//! axum 路由、中间件与服务器生命周期

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use handlers::{SERVICE_NAME, ServiceDescriptor};
pub use middleware::{REQUEST_ID_HEADER, RequestId};
pub use routes::{API_PREFIX, API_ROUTES, RouteSpec, create_router};
pub use server::GatewayServer;
pub use state::AppState;
