mod arc;
mod buffer;
mod color;
mod context;
mod controller;
mod convert;
mod curves;
mod dash;
mod depthmap;
mod document;
mod error;
mod math;
mod outline;
mod path;
mod raster;
mod render;
mod stroke;

pub use buffer::{PixelFormat, RenderBuffer, TextureData};
pub use color::Color;
pub use context::RenderContext;
pub use controller::PathController;
pub use convert::{flatten_curves, Conversion};
pub use curves::{CurveApproximation, CurveSettings};
pub use dash::DashSettings;
pub use depthmap::{generate_depth_map, generate_depth_map_texture, ResponseCurve};
pub use document::{
    draw_document, extract_paths, Document, Element, PathData, ShapeKind, ShapeStyle,
};
pub use error::Error;
pub use math::{next_power_of_two, Affine, Vec2};
pub use outline::{OutlineJoin, OutlineSettings};
pub use path::{PathCmd, PathStorage, SubPath, Vertex};
pub use raster::{CoverRun, Rasterizer, Scanline, ScanlineKind, Span};
pub use render::{OutlineRenderer, ScanlineRenderer};
pub use stroke::{InnerJoin, LineCap, LineJoin, StrokeSettings};
