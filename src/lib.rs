//! Deterministic document flow and pagination for quotations and proposals.
//!
//! A [`LayoutEngine`] takes a [`DocumentModel`], a [`PageGeometry`] and a
//! [`TextMeasurer`] and produces a [`LaidOutDocument`]: draw commands grouped
//! by page, with table headers repeated after breaks, one footer per page and
//! no content inside the footer band. Turning commands into PDF or pixels is
//! the job of a [`Renderer`].

pub mod audit;
mod cancel;
mod command;
mod config;
mod debug;
mod engine;
mod error;
mod font;
mod frame;
mod geometry;
mod layout;
mod measure;
mod metrics;
mod model;
mod naming;
mod render;
mod style;
mod totals;
mod types;

pub use audit::Violation;
pub use cancel::CancelToken;
pub use command::{DrawCommand, FillRole, LaidOutDocument, Page};
pub use config::{FontConfig, FontSizes, FooterConfig, Labels, LayoutConfig, Palette, TableConfig};
pub use engine::{LayoutEngine, LayoutEngineBuilder};
pub use error::DocFlowError;
pub use font::FontBook;
pub use geometry::PageGeometry;
pub use measure::{FixedWidthMeasurer, FontMeasurer, MeasureError, TextMeasurer, fallback_width};
pub use metrics::{DocumentMetrics, PageMetrics};
pub use model::{
    AttachmentRef, Company, Contact, DiscountKind, DiscountPolicy, DocumentKind, DocumentModel,
    LineItem, coerce_amount,
};
pub use naming::{suggested_file_name, suggested_file_name_now};
pub use render::{OutlineRenderer, Renderer};
pub use style::{TextAlign, TextStyle};
pub use totals::{
    DEFAULT_TAX_RATE_BPS, MoneyFormat, TaxPolicy, Totals, compute_totals, format_percent,
    format_quantity,
};
pub use types::{Color, Pt, Rect, Size};
