use std::sync::Arc;

use crate::features::logo::{
    LogoRenderer, RasterEncoder, RenderDispatcher, SeriesRegistry,
};

/// 聚合的应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// 只读的 series 默认配置表
    pub registry: &'static SeriesRegistry,
    /// 渲染/编码调度（内部持有并发许可）
    pub dispatcher: Arc<RenderDispatcher>,
}

impl AppState {
    pub fn new(
        renderer: Arc<dyn LogoRenderer>,
        encoder: Arc<dyn RasterEncoder>,
        max_parallel: usize,
    ) -> Self {
        Self {
            registry: SeriesRegistry::global(),
            dispatcher: Arc::new(RenderDispatcher::new(renderer, encoder, max_parallel)),
        }
    }
}
