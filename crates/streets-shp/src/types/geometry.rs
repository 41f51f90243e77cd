//! Shape types, bounding boxes and opaque geometry records.

use std::fmt;

use crate::error::{Result, ShpError};

/// ESRI shape type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeType {
    Null,
    Point,
    PolyLine,
    Polygon,
    MultiPoint,
    PointZ,
    PolyLineZ,
    PolygonZ,
    MultiPointZ,
    PointM,
    PolyLineM,
    PolygonM,
    MultiPointM,
    MultiPatch,
}

impl ShapeType {
    /// Map a numeric shape type code to a shape type.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::Null,
            1 => Self::Point,
            3 => Self::PolyLine,
            5 => Self::Polygon,
            8 => Self::MultiPoint,
            11 => Self::PointZ,
            13 => Self::PolyLineZ,
            15 => Self::PolygonZ,
            18 => Self::MultiPointZ,
            21 => Self::PointM,
            23 => Self::PolyLineM,
            25 => Self::PolygonM,
            28 => Self::MultiPointM,
            31 => Self::MultiPatch,
            _ => return None,
        })
    }

    /// Numeric code stored in headers and records.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Null => 0,
            Self::Point => 1,
            Self::PolyLine => 3,
            Self::Polygon => 5,
            Self::MultiPoint => 8,
            Self::PointZ => 11,
            Self::PolyLineZ => 13,
            Self::PolygonZ => 15,
            Self::MultiPointZ => 18,
            Self::PointM => 21,
            Self::PolyLineM => 23,
            Self::PolygonM => 25,
            Self::MultiPointM => 28,
            Self::MultiPatch => 31,
        }
    }

    const fn is_point(self) -> bool {
        matches!(self, Self::Point | Self::PointZ | Self::PointM)
    }

    const fn is_multipoint(self) -> bool {
        matches!(self, Self::MultiPoint | Self::MultiPointZ | Self::MultiPointM)
    }

    const fn is_multipart(self) -> bool {
        matches!(
            self,
            Self::PolyLine
                | Self::Polygon
                | Self::PolyLineZ
                | Self::PolygonZ
                | Self::PolyLineM
                | Self::PolygonM
                | Self::MultiPatch
        )
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Bounding box stored in the main-file and index headers.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
    pub z_min: f64,
    pub z_max: f64,
    pub m_min: f64,
    pub m_max: f64,
}

impl BoundingBox {
    /// Replace the x/y extents with the union of the given geometries.
    ///
    /// Z and M ranges are left untouched. When no geometry has bounds the
    /// x/y extents become zero.
    pub fn recompute_xy<'a>(&mut self, geometries: impl IntoIterator<Item = &'a Geometry>) {
        let mut extent: Option<[f64; 4]> = None;
        for bounds in geometries.into_iter().filter_map(Geometry::bounds) {
            extent = Some(match extent {
                None => bounds,
                Some([x0, y0, x1, y1]) => [
                    x0.min(bounds[0]),
                    y0.min(bounds[1]),
                    x1.max(bounds[2]),
                    y1.max(bounds[3]),
                ],
            });
        }
        let [x_min, y_min, x_max, y_max] = extent.unwrap_or_default();
        self.x_min = x_min;
        self.y_min = y_min;
        self.x_max = x_max;
        self.y_max = y_max;
    }
}

/// One geometry record, kept as its raw little-endian payload.
///
/// The payload starts with the record's shape type code and is never
/// modified after reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    content: Vec<u8>,
}

impl Geometry {
    /// Wrap a record payload read from a `.shp` file.
    pub fn from_content(content: Vec<u8>) -> Result<Self> {
        if content.len() < 4 {
            return Err(ShpError::invalid_format("geometry record shorter than 4 bytes"));
        }
        if content.len() % 2 != 0 {
            return Err(ShpError::invalid_format(
                "geometry record length is not a whole number of 16-bit words",
            ));
        }
        let code = le_i32(&content, 0).unwrap_or_default();
        if ShapeType::from_code(code).is_none() {
            return Err(ShpError::invalid_format(format!(
                "unknown shape type code {code}"
            )));
        }
        Ok(Self { content })
    }

    /// A null shape record.
    #[must_use]
    pub fn null() -> Self {
        Self {
            content: ShapeType::Null.code().to_le_bytes().to_vec(),
        }
    }

    /// Build a 2D point record.
    #[must_use]
    pub fn point(x: f64, y: f64) -> Self {
        let mut content = Vec::with_capacity(20);
        content.extend_from_slice(&ShapeType::Point.code().to_le_bytes());
        content.extend_from_slice(&x.to_le_bytes());
        content.extend_from_slice(&y.to_le_bytes());
        Self { content }
    }

    /// Build a 2D polyline record from its parts.
    #[must_use]
    pub fn polyline(parts: &[Vec<(f64, f64)>]) -> Self {
        Self::multipart(ShapeType::PolyLine, parts)
    }

    /// Build a 2D polygon record from its rings.
    #[must_use]
    pub fn polygon(rings: &[Vec<(f64, f64)>]) -> Self {
        Self::multipart(ShapeType::Polygon, rings)
    }

    fn multipart(shape_type: ShapeType, parts: &[Vec<(f64, f64)>]) -> Self {
        let points: Vec<(f64, f64)> = parts.iter().flatten().copied().collect();
        let mut bounds = [0.0f64; 4];
        if let Some(&(x, y)) = points.first() {
            bounds = [x, y, x, y];
            for &(x, y) in &points {
                bounds[0] = bounds[0].min(x);
                bounds[1] = bounds[1].min(y);
                bounds[2] = bounds[2].max(x);
                bounds[3] = bounds[3].max(y);
            }
        }

        let mut content = Vec::with_capacity(44 + parts.len() * 4 + points.len() * 16);
        content.extend_from_slice(&shape_type.code().to_le_bytes());
        for value in bounds {
            content.extend_from_slice(&value.to_le_bytes());
        }
        content.extend_from_slice(&(parts.len() as i32).to_le_bytes());
        content.extend_from_slice(&(points.len() as i32).to_le_bytes());
        let mut start = 0i32;
        for part in parts {
            content.extend_from_slice(&start.to_le_bytes());
            start += part.len() as i32;
        }
        for (x, y) in points {
            content.extend_from_slice(&x.to_le_bytes());
            content.extend_from_slice(&y.to_le_bytes());
        }
        Self { content }
    }

    /// Shape type of this record.
    #[must_use]
    pub fn shape_type(&self) -> ShapeType {
        le_i32(&self.content, 0)
            .and_then(ShapeType::from_code)
            .unwrap_or(ShapeType::Null)
    }

    /// Raw record payload.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Payload length in 16-bit words, as stored in record headers.
    #[must_use]
    pub fn content_words(&self) -> i32 {
        (self.content.len() / 2) as i32
    }

    /// X/Y bounds as `[x_min, y_min, x_max, y_max]`, if the shape has any.
    #[must_use]
    pub fn bounds(&self) -> Option<[f64; 4]> {
        let shape_type = self.shape_type();
        if shape_type.is_point() {
            let x = le_f64(&self.content, 4)?;
            let y = le_f64(&self.content, 12)?;
            return Some([x, y, x, y]);
        }
        if shape_type.is_multipart() || shape_type.is_multipoint() {
            if self.point_count() == 0 {
                return None;
            }
            return Some([
                le_f64(&self.content, 4)?,
                le_f64(&self.content, 12)?,
                le_f64(&self.content, 20)?,
                le_f64(&self.content, 28)?,
            ]);
        }
        None
    }

    /// Number of parts (rings or line strings).
    #[must_use]
    pub fn part_count(&self) -> usize {
        let shape_type = self.shape_type();
        if shape_type.is_multipart() {
            le_i32(&self.content, 36).map_or(0, |n| n.max(0) as usize)
        } else if shape_type == ShapeType::Null {
            0
        } else {
            1
        }
    }

    /// Number of vertices.
    #[must_use]
    pub fn point_count(&self) -> usize {
        let shape_type = self.shape_type();
        if shape_type.is_point() {
            1
        } else if shape_type.is_multipart() {
            le_i32(&self.content, 40).map_or(0, |n| n.max(0) as usize)
        } else if shape_type.is_multipoint() {
            le_i32(&self.content, 36).map_or(0, |n| n.max(0) as usize)
        } else {
            0
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape_type = self.shape_type();
        if shape_type == ShapeType::Null {
            return f.write_str("Null");
        }
        if shape_type.is_point() {
            if let Some([x, y, _, _]) = self.bounds() {
                return write!(f, "{shape_type} ({x} {y})");
            }
        }
        write!(
            f,
            "{shape_type} ({} parts, {} points)",
            self.part_count(),
            self.point_count()
        )
    }
}

fn le_i32(data: &[u8], offset: usize) -> Option<i32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(i32::from_le_bytes(bytes.try_into().ok()?))
}

fn le_f64(data: &[u8], offset: usize) -> Option<f64> {
    let bytes = data.get(offset..offset + 8)?;
    Some(f64::from_le_bytes(bytes.try_into().ok()?))
}
