/// Number of float32 fields packed per instance
pub const RECORD_FIELDS: usize = 9;

/// Size in bytes of one packed instance
pub const RECORD_SIZE: usize = RECORD_FIELDS * 4;

/// One placed instance as stored by World Creator (Y-up, left-handed)
///
/// Packed field order: `[x, height, depth, reserved, scale, qx, qy, qz, qw]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceRecord {
    pub x: f32,
    /// Source "up" axis, becomes target Z
    pub height: f32,
    /// Remaining horizontal axis, becomes target Y
    pub depth: f32,
    pub reserved: f32,
    /// Uniform scale
    pub scale: f32,
    /// Orientation quaternion as `[x, y, z, w]`, not guaranteed normalized
    pub rotation: [f32; 4],
}

impl InstanceRecord {
    pub fn from_fields(f: [f32; RECORD_FIELDS]) -> Self {
        Self {
            x: f[0],
            height: f[1],
            depth: f[2],
            reserved: f[3],
            scale: f[4],
            rotation: [f[5], f[6], f[7], f[8]],
        }
    }

    pub fn to_fields(&self) -> [f32; RECORD_FIELDS] {
        let [qx, qy, qz, qw] = self.rotation;
        [
            self.x,
            self.height,
            self.depth,
            self.reserved,
            self.scale,
            qx,
            qy,
            qz,
            qw,
        ]
    }
}

/// A block of instances sharing one model tag
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectGroup {
    pub tag: String,
    /// Declared record count, kept verbatim so malformed values can be reported
    pub data_count: String,
    /// Base64 payload of packed records
    pub data: String,
}

/// Named layer of object groups, exported to one file
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub name: String,
    pub groups: Vec<ObjectGroup>,
}

/// Parsed World Creator project
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldCreatorDocument {
    pub layers: Vec<Layer>,
}
