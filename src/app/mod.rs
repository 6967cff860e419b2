//! 应用装配：启动时构建一次的共享上下文

pub mod context;

pub use context::GatewayContext;
