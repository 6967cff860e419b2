//! # 网关应用状态

use std::ops::Deref;
use std::sync::Arc;

use crate::app::GatewayContext;

/// axum 处理器共享的状态，克隆只增加引用计数
#[derive(Clone)]
pub struct AppState {
    context: Arc<GatewayContext>,
}

impl AppState {
    /// 包装共享上下文
    #[must_use]
    pub const fn new(context: Arc<GatewayContext>) -> Self {
        Self { context }
    }
}

impl Deref for AppState {
    type Target = GatewayContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}
