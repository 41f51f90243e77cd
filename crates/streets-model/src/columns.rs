//! Attribute column names.
//!
//! These names are a contract with the producer of the street shapefiles and
//! must match exactly.

pub const FID: &str = "fid";
pub const ID: &str = "id";
pub const ID_STREET: &str = "id_street";
pub const ID_TYPE: &str = "id_type";
pub const NAME: &str = "name";
pub const TYPE: &str = "type";
pub const OBS: &str = "obs";
pub const FIRST_YEAR: &str = "first_year";
pub const LAST_YEAR: &str = "last_year";
pub const PERIMETER: &str = "perimeter";
pub const VERSION: &str = "version";
pub const CHANGESET_ID: &str = "changeset_id";

/// `changeset_id` as truncated by the 10-byte dBASE name limit.
pub const CHANGESET_TRUNCATED: &str = "changeset_";

/// Pseudo-column naming the geometry in column lists.
pub const GEOMETRY: &str = "geometry";
