use crate::galactocentric::GalactocentricPoint;
use crate::gaia3d_errors::Gaia3dError;

/// Serialize the point cloud as a compact JSON array, one object per star, in processing order.
///
/// ```text
/// [{"source_id":1,"x":-8.1,"y":0.2,"z":0.03,"vx":11.0,"vy":240.1,"vz":7.9}, ...]
/// ```
///
/// The returned string is written verbatim to the JSON dump **and** embedded in the HTML
/// viewer, so both artifacts always carry the same data.
pub fn serialize_points(points: &[GalactocentricPoint]) -> Result<String, Gaia3dError> {
    Ok(serde_json::to_string(points)?)
}

/// Read back a JSON dump.
pub fn parse_points(json: &str) -> Result<Vec<GalactocentricPoint>, Gaia3dError> {
    Ok(serde_json::from_str(json)?)
}
