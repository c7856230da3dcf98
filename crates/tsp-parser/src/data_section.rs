//! The coordinate or edge-weight data that follows the specification section, turned into a
//! dense symmetric length matrix.

use memchr::memchr;
use tsp_core::{
    distance::Distance,
    instance::{EdgeWeightFormat, EdgeWeightType, InstanceMetadata},
    matrix::MatrixSym,
    node::Node,
};

use crate::{error::ParserError, metadata::DataKeyword};

pub fn parse_data_section(
    bytes: &[u8],
    cursor: &mut usize,
    data_keyword: DataKeyword,
    metadata: &mut InstanceMetadata,
) -> Result<MatrixSym<Distance>, ParserError> {
    match (data_keyword, metadata.edge_weight_type) {
        (DataKeyword::NodeCoordSection, EdgeWeightType::Explicit) => Err(
            ParserError::SectionMismatch {
                found: "NODE_COORD_SECTION".into(),
                expected_for: "EXPLICIT",
            },
        ),
        (DataKeyword::EdgeWeightSection, t) if t != EdgeWeightType::Explicit => {
            Err(ParserError::SectionMismatch {
                found: "EDGE_WEIGHT_SECTION".into(),
                expected_for: "EUC_2D/CEIL_2D/ATT/GEO",
            })
        }
        (DataKeyword::NodeCoordSection, _) => {
            let coords = parse_node_coord_section(bytes, cursor, metadata.dimension)?;
            let lengths = lengths_from_coords(&coords, metadata.edge_weight_type);
            metadata.coords = Some(coords);
            Ok(lengths)
        }
        (DataKeyword::EdgeWeightSection, EdgeWeightType::Explicit) => {
            let format = metadata.edge_weight_format.ok_or(ParserError::MissingEdgeWeightFormat)?;
            parse_edge_weight_section(bytes, cursor, metadata.dimension, format)
        }
    }
}

fn parse_node_coord_section(
    bytes: &[u8],
    cursor: &mut usize,
    dimension: usize,
) -> Result<Vec<(f64, f64)>, ParserError> {
    let mut coords = Vec::with_capacity(dimension);
    while coords.len() < dimension {
        let Some(nl) = memchr(b'\n', &bytes[*cursor..]) else {
            return Err(ParserError::UnexpectedEof("NODE_COORD_SECTION"));
        };
        let line = unsafe { std::str::from_utf8_unchecked(&bytes[*cursor..*cursor + nl]) }.trim();
        *cursor += nl + 1;
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_ascii_whitespace();
        let _index = parts.next();
        let x: f64 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| ParserError::InvalidValue { field: "x", value: line.to_string() })?;
        let y: f64 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| ParserError::InvalidValue { field: "y", value: line.to_string() })?;
        coords.push((x, y));
    }
    Ok(coords)
}

fn parse_edge_weight_section(
    bytes: &[u8],
    cursor: &mut usize,
    dimension: usize,
    format: EdgeWeightFormat,
) -> Result<MatrixSym<Distance>, ParserError> {
    let needed = match format {
        EdgeWeightFormat::FullMatrix => dimension * dimension,
        EdgeWeightFormat::UpperRow => dimension * (dimension - 1) / 2,
        EdgeWeightFormat::LowerDiagRow | EdgeWeightFormat::UpperDiagRow => {
            dimension * (dimension + 1) / 2
        }
    };
    let values = read_integers(bytes, cursor, needed, "EDGE_WEIGHT_SECTION")?;

    let mut m = MatrixSym::new_from_dimension_with_value(dimension, Distance::ZERO);
    let mut it = values.into_iter();
    match format {
        EdgeWeightFormat::FullMatrix => {
            for i in 0..dimension {
                for j in 0..dimension {
                    let v = it.next().unwrap();
                    if j <= i {
                        m.set_data(Node(i), Node(j), Distance(v));
                    }
                }
            }
        }
        EdgeWeightFormat::UpperRow => {
            for i in 0..dimension {
                for j in (i + 1)..dimension {
                    let v = it.next().unwrap();
                    m.set_data(Node(i), Node(j), Distance(v));
                }
            }
        }
        EdgeWeightFormat::UpperDiagRow => {
            for i in 0..dimension {
                for j in i..dimension {
                    let v = it.next().unwrap();
                    m.set_data(Node(i), Node(j), Distance(v));
                }
            }
        }
        EdgeWeightFormat::LowerDiagRow => {
            for i in 0..dimension {
                for j in 0..=i {
                    let v = it.next().unwrap();
                    m.set_data(Node(i), Node(j), Distance(v));
                }
            }
        }
    }
    Ok(m)
}

fn read_integers(
    bytes: &[u8],
    cursor: &mut usize,
    count: usize,
    context: &'static str,
) -> Result<Vec<i64>, ParserError> {
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let Some(nl) = memchr(b'\n', &bytes[*cursor..]) else {
            return Err(ParserError::UnexpectedEof(context));
        };
        let line = unsafe { std::str::from_utf8_unchecked(&bytes[*cursor..*cursor + nl]) }.trim();
        *cursor += nl + 1;
        if line.is_empty() || line == "EOF" {
            continue;
        }
        for tok in line.split_ascii_whitespace() {
            let v: i64 = tok
                .parse()
                .map_err(|_| ParserError::InvalidValue { field: context, value: tok.to_string() })?;
            out.push(v);
        }
    }
    Ok(out)
}

fn lengths_from_coords(coords: &[(f64, f64)], kind: EdgeWeightType) -> MatrixSym<Distance> {
    let n = coords.len();
    let distance_fn: fn((f64, f64), (f64, f64)) -> Distance = match kind {
        EdgeWeightType::Euc2D => euc_2d,
        EdgeWeightType::Ceil2D => ceil_2d,
        EdgeWeightType::Att => att,
        EdgeWeightType::Geo => geo,
        EdgeWeightType::Explicit => unreachable!("EXPLICIT has no coordinate section"),
    };
    MatrixSym::slow_new_from_fn(n, |a, b| distance_fn(coords[a.0], coords[b.0]))
}

#[inline(always)]
fn nint(x: f64) -> i64 {
    (x + 0.5) as i64
}

/// 2D Euclidean distance, rounded to the nearest integer.
pub fn euc_2d(a: (f64, f64), b: (f64, f64)) -> Distance {
    Distance(nint(((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()))
}

/// 2D Euclidean distance, rounded up.
pub fn ceil_2d(a: (f64, f64), b: (f64, f64)) -> Distance {
    Distance((((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()).ceil() as i64)
}

/// The pseudo-Euclidean ATT distance used by the TSPLIB `att*` instances.
pub fn att(a: (f64, f64), b: (f64, f64)) -> Distance {
    let rij = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt() / 10.0;
    let tij = nint(rij);
    if (tij as f64) < rij { Distance(tij + 1) } else { Distance(tij) }
}

const GEO_EARTH_RADIUS_KM: f64 = 6378.388;

fn to_geo_radians(coord: f64) -> f64 {
    let deg = coord.trunc();
    let min = coord - deg;
    std::f64::consts::PI * (deg + 5.0 * min / 3.0) / 180.0
}

/// Great-circle distance between two TSPLIB `GEO` points, given as `DDD.MM` latitude/longitude.
pub fn geo(a: (f64, f64), b: (f64, f64)) -> Distance {
    if a == b {
        return Distance::ZERO;
    }
    let (lat1, lon1) = (to_geo_radians(a.0), to_geo_radians(a.1));
    let (lat2, lon2) = (to_geo_radians(b.0), to_geo_radians(b.1));
    let q1 = (lon1 - lon2).cos();
    let q2 = (lat1 - lat2).cos();
    let q3 = (lat1 + lat2).cos();
    let d = GEO_EARTH_RADIUS_KM
        * ((0.5 * ((1.0 + q1) * q2 - (1.0 - q1) * q3)).acos())
        + 1.0;
    Distance(d as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euc_2d_matches_hand_computation() {
        let d = euc_2d((0.0, 0.0), (3.0, 4.0));
        assert_eq!(d, Distance(5));
    }

    #[test]
    fn ceil_2d_rounds_up() {
        let d = ceil_2d((0.0, 0.0), (1.0, 1.0));
        assert_eq!(d, Distance(2));
    }

    #[test]
    fn geo_of_coincident_points_is_zero() {
        assert_eq!(geo((10.0, 20.0), (10.0, 20.0)), Distance::ZERO);
    }
}
