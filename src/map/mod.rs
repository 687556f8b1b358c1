//! Everything between the dispatch state and a map widget: projection, framing,
//! the surface seam, feature diffing and pointer interaction.

pub mod framing;
pub mod interaction;
pub mod projection;
pub mod surface;
pub mod sync;

pub use framing::{FramingPolicy, ViewDirective};
pub use interaction::{InteractionController, InteractionMode, PointerOutcome, Popup, PopupAction};
pub use projection::{Pixel, Viewport};
pub use surface::{
    FeatureBatch, HeadlessSurface, MapSurface, PointerEvent, PointerSink, RenderedRoute, SurfaceGuard,
};
pub use sync::FeatureSynchronizer;
