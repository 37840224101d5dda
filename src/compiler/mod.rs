//! Layout compiler: grid of cell keys in, positioned HTML document out.
//!
//! Compilation runs in three stages: the cell size is derived from the
//! resolution, the grid is grouped into placements (see [`MergePolicy`]) and
//! the placements are emitted as absolutely positioned elements inside a
//! fixed-size container.

pub mod emit;
pub mod grid;

pub use grid::{BoundingBox, CellSize, LayoutGrid, MergePolicy, Placement, Rect};

use crate::{Error, Resolution, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Compiler input as accepted by the HTTP layer and the CLI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayoutRequest {
    pub layout: LayoutGrid,
    #[serde(default)]
    pub content: HashMap<String, String>,
    #[serde(default)]
    pub styles: HashMap<String, String>,
    #[serde(default)]
    pub resolution: Option<Resolution>,
}

impl LayoutRequest {
    /// Parse a JSON payload. Shape errors are reported as invalid input.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| Error::InvalidInput(format!("invalid payload: {}", e)))
    }
}

/// Knobs that do not come from the request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Text of the document `<title>`
    pub title: String,
    pub merge_policy: MergePolicy,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            title: "Fixed Monitor Layout".to_string(),
            merge_policy: MergePolicy::BoundingHull,
        }
    }
}

/// A compiled page together with the geometry it was built from.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    pub html: String,
    pub cell: CellSize,
    pub placements: Vec<Placement>,
    pub tags: Vec<String>,
}

impl HtmlDocument {
    /// Pixel rectangle of the first placement carrying `element_id`.
    pub fn rect_of(&self, element_id: &str) -> Option<Rect> {
        self.placements
            .iter()
            .find(|p| p.element_id == element_id)
            .map(|p| p.bounds.to_rect(self.cell))
    }
}

/// Check that the resolution is present and non-zero on both axes.
pub fn require_resolution(resolution: Option<Resolution>) -> Result<Resolution> {
    match resolution {
        None => Err(Error::InvalidInput(
            "Missing resolution information. Please provide { width, height }.".into(),
        )),
        Some(r) if r.width == 0 => Err(Error::InvalidInput("resolution width must be positive".into())),
        Some(r) if r.height == 0 => Err(Error::InvalidInput("resolution height must be positive".into())),
        Some(r) => Ok(r),
    }
}

/// Compile a layout request into a complete HTML document.
///
/// Fails before doing any work when the resolution is missing or zero
/// ([`Error::InvalidInput`]) or when the grid is empty, ragged, too dense for
/// the resolution or uses an unusable tag ([`Error::MalformedLayout`]).
pub fn compile(request: &LayoutRequest, options: &CompileOptions) -> Result<HtmlDocument> {
    let resolution = require_resolution(request.resolution)?;
    let (rows, cols) = grid::validate(&request.layout)?;
    let cell = grid::cell_size(resolution, rows, cols)?;
    grid::check_tags(&request.layout)?;

    let grouping = grid::group(&request.layout, options.merge_policy);

    let ctx = emit::EmitContext {
        resolution,
        cell,
        title: &options.title,
        content: &request.content,
        styles: &request.styles,
    };
    let html = emit::render_document(&ctx, &grouping.placements, &grouping.tags);

    log::debug!(
        "compiled {}x{} grid at {}x{} into {} elements ({} bytes)",
        rows,
        cols,
        resolution.width,
        resolution.height,
        grouping.placements.len(),
        html.len()
    );

    Ok(HtmlDocument {
        html,
        cell,
        placements: grouping.placements,
        tags: grouping.tags,
    })
}
