use super::orientation::OrientationConverter;
use crate::error::RecordError;
use crate::worldcreator::{InstanceRecord, Layer};
use log::{debug, warn};

/// Shift applied to X so placements land in Terrain Builder's positive range
pub const TB_OFFSET: f64 = 200_000.0;

/// One Terrain Builder placement line
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRecord {
    pub tag: String,
    /// Target-space `[x, y, z]`, Z up
    pub position: [f32; 3],
    /// `[yaw, pitch, roll]` in degrees
    pub rotation: [f32; 3],
    pub scale: f32,
}

impl OutputRecord {
    /// Map a source instance into Terrain Builder space.
    ///
    /// `index` is the record's position in its group and only used for errors.
    pub fn from_instance(
        tag: &str,
        index: usize,
        record: &InstanceRecord,
        converter: &OrientationConverter,
    ) -> Result<Self, RecordError> {
        let position = [
            (f64::from(record.x) + TB_OFFSET) as f32,
            record.depth,
            record.height,
        ];
        if !position.iter().all(|v| v.is_finite()) || !record.scale.is_finite() {
            return Err(RecordError::InvalidRecord {
                index,
                reason: "non-finite position or scale",
            });
        }

        let angles = converter
            .convert(record.rotation)
            .ok_or(RecordError::InvalidRecord {
                index,
                reason: "quaternion cannot be normalized",
            })?;

        Ok(Self {
            tag: tag.to_string(),
            position,
            rotation: [angles.yaw as f32, angles.pitch as f32, angles.roll as f32],
            scale: record.scale,
        })
    }

    /// Format as `"tag";x;y;yaw;pitch;roll;scale;z;`
    pub fn to_line(&self) -> String {
        let [x, y, z] = self.position;
        let [yaw, pitch, roll] = self.rotation;
        format!(
            "\"{}\";{};{};{};{};{};{};{};",
            self.tag,
            f(x),
            f(y),
            f(yaw),
            f(pitch),
            f(roll),
            f(self.scale),
            f(z)
        )
    }
}

/// Shortest round-trip formatting, treating -0 as 0
fn f(n: f32) -> String {
    let n = if n == 0.0 { 0.0 } else { n };
    format!("{}", n)
}

/// Result of exporting one layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerExport {
    pub lines: Vec<String>,
    pub skipped_groups: usize,
    pub skipped_records: usize,
}

impl LayerExport {
    /// Number of instances written
    pub fn exported(&self) -> usize {
        self.lines.len()
    }
}

/// Convert every instance of a layer into placement lines, in document order.
///
/// Groups that fail to decode and records that fail to convert are skipped
/// and logged; the rest of the layer is still exported.
pub fn export_layer(layer: &Layer, converter: &OrientationConverter) -> LayerExport {
    let mut export = LayerExport::default();

    for group in &layer.groups {
        let records = match group.records() {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    "Layer '{}': skipping object group '{}': {}",
                    layer.name, group.tag, e
                );
                export.skipped_groups += 1;
                continue;
            }
        };
        debug!(
            "Layer '{}': {} instances of '{}'",
            layer.name,
            records.len(),
            group.tag
        );

        for (index, record) in records.iter().enumerate() {
            match OutputRecord::from_instance(&group.tag, index, record, converter) {
                Ok(output) => export.lines.push(output.to_line()),
                Err(e) => {
                    warn!(
                        "Layer '{}': skipping instance of '{}': {}",
                        layer.name, group.tag, e
                    );
                    export.skipped_records += 1;
                }
            }
        }
    }

    export
}
