use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;

use crate::error::AppError;

use super::encoder::RasterEncoder;
use super::renderer::LogoRenderer;
use super::resolver::ResolvedRenderJob;
use super::types::OutputFormat;

/// 渲染结果：SVG 文本或栅格字节。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoPayload {
    Svg(String),
    Png(Vec<u8>),
}

impl LogoPayload {
    pub fn format(&self) -> OutputFormat {
        match self {
            LogoPayload::Svg(_) => OutputFormat::Svg,
            LogoPayload::Png(_) => OutputFormat::Png,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            LogoPayload::Svg(s) => s.len(),
            LogoPayload::Png(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 把渲染任务交给渲染能力与编码器执行。
///
/// 渲染与编码都是 CPU 密集型同步调用，放到阻塞线程池中执行；
/// 信号量限制同时进行的渲染数量，编码严格在渲染完成之后开始。
pub struct RenderDispatcher {
    renderer: Arc<dyn LogoRenderer>,
    encoder: Arc<dyn RasterEncoder>,
    permits: Arc<Semaphore>,
}

impl RenderDispatcher {
    pub fn new(
        renderer: Arc<dyn LogoRenderer>,
        encoder: Arc<dyn RasterEncoder>,
        max_parallel: usize,
    ) -> Self {
        Self {
            renderer,
            encoder,
            permits: Arc::new(Semaphore::new(max_parallel.max(1))),
        }
    }

    /// 当前空闲的渲染许可数
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    pub async fn dispatch(&self, job: ResolvedRenderJob) -> Result<LogoPayload, AppError> {
        let t_wait = Instant::now();
        let _permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AppError::Internal(format!("获取渲染信号量失败: {e}")))?;
        tracing::debug!(
            wait_ms = t_wait.elapsed().as_millis() as u64,
            idle_permits = self.available_permits(),
            "渲染许可已获取"
        );

        let format = job.output_format();
        let renderer = Arc::clone(&self.renderer);
        let t_render = Instant::now();
        let svg = tokio::task::spawn_blocking(move || {
            renderer.render(
                job.visual(),
                job.orientation(),
                job.text1(),
                job.text2(),
                job.highlights(),
                job.centered(),
            )
        })
        .await
        .map_err(|e| AppError::Internal(format!("阻塞 SVG 生成任务执行失败: {e}")))??;
        tracing::debug!(
            svg_len = svg.len(),
            render_ms = t_render.elapsed().as_millis() as u64,
            "SVG 生成完成"
        );

        match format {
            OutputFormat::Svg => Ok(LogoPayload::Svg(svg)),
            OutputFormat::Png => {
                let encoder = Arc::clone(&self.encoder);
                let t_encode = Instant::now();
                let bytes = tokio::task::spawn_blocking(move || encoder.encode(&svg))
                    .await
                    .map_err(|e| AppError::Internal(format!("阻塞 PNG 编码任务执行失败: {e}")))??;
                tracing::debug!(
                    png_len = bytes.len(),
                    encode_ms = t_encode.elapsed().as_millis() as u64,
                    "PNG 编码完成"
                );
                Ok(LogoPayload::Png(bytes))
            }
        }
    }
}
