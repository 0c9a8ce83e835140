pub mod dispatcher;
pub mod encoder;
pub mod handler;
pub mod highlight;
pub mod renderer;
pub mod resolver;
mod response;
pub mod schema;
pub mod series;
pub mod types;

pub use dispatcher::{LogoPayload, RenderDispatcher};
pub use encoder::{RasterEncoder, ResvgPngEncoder};
pub use handler::create_logo_router;
pub use renderer::{LogoRenderer, SvgLogoRenderer};
pub use resolver::{ResolvedRenderJob, resolve};
pub use response::{CACHE_CONTROL_VALUE, restore_any_origin};
pub use schema::LogoQuery;
pub use series::{SeriesId, SeriesRegistry};
pub use types::{HexColor, HighlightRange, Orientation, OutputFormat, ValidatedRequest, VisualConfig};
