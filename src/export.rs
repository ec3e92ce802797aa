//! Layer export coordination
//!
//! Every layer is converted and written independently. Layers run on the
//! rayon pool unless [`ExportOptions::parallel`] is off; either way reports
//! come back in document order and the total is reduced after all layers
//! have finished.

use crate::error::ExportError;
use crate::terrain_builder::{OrientationConverter, RotationStrategy, export_layer};
use crate::worldcreator::Layer;
use log::{info, warn};
use rayon::prelude::*;
use std::collections::HashSet;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Extension of generated placement files
pub const OUTPUT_EXTENSION: &str = "txt";

/// Options for a conversion run
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Rotation extraction algorithm (default: basis)
    pub rotation: RotationStrategy,
    /// Process layers concurrently (default: true)
    pub parallel: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            rotation: RotationStrategy::default(),
            parallel: true,
        }
    }
}

/// Destination for the lines of one layer
///
/// Each layer name is written at most once per run, so implementations never
/// see concurrent writes for the same name.
pub trait LayerSink: Sync {
    fn write_layer(&self, name: &str, lines: &[String]) -> Result<(), ExportError>;
}

/// Writes `{dir}/{LayerName}.txt`, one file per layer
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn layer_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, OUTPUT_EXTENSION))
    }
}

fn is_valid_file_stem(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

impl LayerSink for DirectorySink {
    /// Lines go to a temporary file in the same directory which is renamed
    /// over the target only once everything has been flushed.
    fn write_layer(&self, name: &str, lines: &[String]) -> Result<(), ExportError> {
        if !is_valid_file_stem(name) {
            return Err(ExportError::InvalidLayerName(name.to_string()));
        }

        let path = self.layer_path(name);
        let io_error = |source: std::io::Error| ExportError::Io {
            path: path.clone(),
            source,
        };

        let mut file = NamedTempFile::new_in(&self.dir).map_err(io_error)?;
        {
            let mut writer = BufWriter::new(file.as_file_mut());
            for line in lines {
                writeln!(writer, "{}", line).map_err(io_error)?;
            }
            writer.flush().map_err(io_error)?;
        }
        file.persist(&path).map_err(|e| io_error(e.error))?;

        Ok(())
    }
}

/// Outcome for one layer
#[derive(Debug)]
pub struct LayerReport {
    pub name: String,
    /// Lines produced for the layer
    pub exported: usize,
    pub skipped_groups: usize,
    pub skipped_records: usize,
    /// Set when the layer could not be written
    pub error: Option<ExportError>,
}

impl LayerReport {
    pub fn is_written(&self) -> bool {
        self.error.is_none()
    }
}

/// Reports for all layers, in document order
#[derive(Debug)]
pub struct ExportSummary {
    pub layers: Vec<LayerReport>,
    /// Objects in successfully written layers
    pub total: usize,
}

impl ExportSummary {
    pub fn written_layers(&self) -> usize {
        self.layers.iter().filter(|r| r.is_written()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &LayerReport> {
        self.layers.iter().filter(|r| !r.is_written())
    }
}

/// Convert and persist every layer.
///
/// Duplicate layer names are rejected before anything is written. Names are
/// compared case-insensitively since `Trees.txt` and `trees.txt` are the same
/// file on Windows and macOS file systems. A layer that fails to write is
/// reported in its [`LayerReport`] and does not stop the others.
pub fn export_layers<S: LayerSink>(
    layers: &[Layer],
    options: &ExportOptions,
    sink: &S,
) -> Result<ExportSummary, ExportError> {
    let mut seen = HashSet::new();
    for layer in layers {
        if !seen.insert(layer.name.to_lowercase()) {
            return Err(ExportError::DuplicateLayer(layer.name.clone()));
        }
    }

    let converter = OrientationConverter::new(options.rotation);
    let run = |layer: &Layer| -> LayerReport {
        let export = export_layer(layer, &converter);
        let error = sink.write_layer(&layer.name, &export.lines).err();
        match &error {
            None => info!("Layer {} exported ({} objects)", layer.name, export.exported()),
            Some(e) => warn!("Layer {} not written: {}", layer.name, e),
        }
        LayerReport {
            name: layer.name.clone(),
            exported: export.exported(),
            skipped_groups: export.skipped_groups,
            skipped_records: export.skipped_records,
            error,
        }
    };

    let reports: Vec<LayerReport> = if options.parallel {
        layers.par_iter().map(&run).collect()
    } else {
        layers.iter().map(&run).collect()
    };

    let total = reports
        .iter()
        .filter(|r| r.is_written())
        .map(|r| r.exported)
        .sum();

    Ok(ExportSummary {
        layers: reports,
        total,
    })
}
