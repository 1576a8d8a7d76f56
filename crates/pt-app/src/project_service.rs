//! Layout loading, saving, validation, and introspection.

use std::path::Path;

use pt_layout::{Diagnostic, Format, Layout, LayoutError, NodeKind, Script};

use crate::error::{AppError, AppResult};

/// Counts of what a layout declares, for listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutSummary {
    pub tanks: usize,
    pub pumps: usize,
    pub splitters: usize,
    pub lines: usize,
    pub plcs: usize,
    pub has_scada: bool,
    /// Sum of tank capacities.
    pub capacity: f64,
    /// Sum of initial tank volumes.
    pub initial_volume: f64,
}

fn read_error(path: &Path, err: LayoutError) -> AppError {
    match err {
        LayoutError::Io(e) => AppError::LayoutFileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
        other => other.into(),
    }
}

/// Load a layout from a JSON or YAML file.
pub fn load_layout(path: &Path) -> AppResult<Layout> {
    pt_layout::load(path).map_err(|e| read_error(path, e))
}

/// Load a traffic injection script from a JSON or YAML file.
pub fn load_script(path: &Path) -> AppResult<Script> {
    pt_layout::load_script(path).map_err(|e| read_error(path, e))
}

/// Save a layout, in the format named by the file extension.
pub fn save_layout(path: &Path, layout: &Layout) -> AppResult<()> {
    match Format::from_path(path)? {
        Format::Json => pt_layout::save_json(path, layout)?,
        Format::Yaml => pt_layout::save_yaml(path, layout)?,
    }
    Ok(())
}

/// Every problem in the layout. An empty list means it compiles strictly.
pub fn validate(layout: &Layout) -> Vec<Diagnostic> {
    pt_layout::validate_layout(layout)
}

pub fn summarize(layout: &Layout) -> LayoutSummary {
    let mut summary = LayoutSummary {
        lines: layout.edges.len(),
        plcs: layout.plcs.len(),
        has_scada: layout.scada.is_some(),
        ..LayoutSummary::default()
    };
    for node in &layout.nodes {
        match node.kind {
            NodeKind::Tank {
                max_capacity,
                initial_capacity,
            } => {
                summary.tanks += 1;
                summary.capacity += max_capacity;
                summary.initial_volume += initial_capacity;
            }
            NodeKind::Pump { .. } => summary.pumps += 1,
            NodeKind::Splitter => summary.splitters += 1,
        }
    }
    summary
}
