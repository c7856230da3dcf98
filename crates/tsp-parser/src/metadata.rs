//! The specification part of a TSPLIB file: `KEYWORD : value` lines up to the first bare
//! data-section keyword.

use memchr::memchr;
use tsp_core::instance::{EdgeWeightFormat, EdgeWeightType, InstanceMetadata, NodeCoordType, ProblemType};

use crate::error::ParserError;

/// The data-section keyword that terminates the specification part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKeyword {
    NodeCoordSection,
    EdgeWeightSection,
}

#[derive(Default)]
struct MetadataBuilder {
    name: Option<String>,
    problem_type: Option<ProblemType>,
    comment: Option<String>,
    dimension: Option<usize>,
    edge_weight_type: Option<EdgeWeightType>,
    edge_weight_format: Option<EdgeWeightFormat>,
    node_coord_type: Option<NodeCoordType>,
}

impl MetadataBuilder {
    fn build(self) -> Result<InstanceMetadata, ParserError> {
        let edge_weight_type =
            self.edge_weight_type.ok_or(ParserError::MissingField("EDGE_WEIGHT_TYPE"))?;
        if edge_weight_type == EdgeWeightType::Explicit && self.edge_weight_format.is_none() {
            return Err(ParserError::MissingEdgeWeightFormat);
        }
        Ok(InstanceMetadata {
            name: self.name.ok_or(ParserError::MissingField("NAME"))?,
            problem_type: self.problem_type.ok_or(ParserError::MissingField("TYPE"))?,
            comment: self.comment,
            dimension: self.dimension.ok_or(ParserError::MissingField("DIMENSION"))?,
            edge_weight_type,
            edge_weight_format: self.edge_weight_format,
            node_coord_type: self.node_coord_type.unwrap_or_default(),
            coords: None,
        })
    }
}

/// Reads specification lines from `bytes[*cursor..]` until the first bare data-section keyword,
/// advancing `cursor` to the start of that section's data. Returns the parsed metadata and which
/// section follows.
pub fn parse_metadata(
    bytes: &[u8],
    cursor: &mut usize,
) -> Result<(InstanceMetadata, DataKeyword), ParserError> {
    let mut builder = MetadataBuilder::default();
    let data_keyword = loop {
        let Some(nl) = memchr(b'\n', &bytes[*cursor..]) else {
            return Err(ParserError::UnexpectedEof("specification section"));
        };
        // SAFETY: TSPLIB files are ASCII/UTF-8 by convention.
        let line = unsafe { std::str::from_utf8_unchecked(&bytes[*cursor..*cursor + nl]) }.trim();
        *cursor += nl + 1;

        if line.is_empty() {
            continue;
        }

        let mut parts = line.splitn(2, ':');
        match (parts.next(), parts.next()) {
            (Some(keyword), Some(value)) => {
                apply_specification(keyword.trim(), value.trim(), &mut builder)?;
            }
            (Some(keyword), None) => break parse_data_keyword(keyword.trim())?,
            (None, _) => return Err(ParserError::InvalidKeyword(line.to_string())),
        }
    };

    Ok((builder.build()?, data_keyword))
}

fn apply_specification(
    keyword: &str,
    value: &str,
    builder: &mut MetadataBuilder,
) -> Result<(), ParserError> {
    match keyword {
        "NAME" => builder.name = Some(value.to_string()),
        "TYPE" => builder.problem_type = Some(parse_problem_type(value)?),
        "COMMENT" => builder.comment = Some(value.to_string()),
        "DIMENSION" => {
            builder.dimension = Some(value.parse().map_err(|_| ParserError::InvalidValue {
                field: "DIMENSION",
                value: value.to_string(),
            })?)
        }
        "EDGE_WEIGHT_TYPE" => builder.edge_weight_type = Some(parse_edge_weight_type(value)?),
        "EDGE_WEIGHT_FORMAT" => {
            builder.edge_weight_format = Some(parse_edge_weight_format(value)?)
        }
        "NODE_COORD_TYPE" => builder.node_coord_type = Some(parse_node_coord_type(value)?),
        // Specification keywords we read but don't act on: present in real TSPLIB files but
        // irrelevant to a symmetric-TSP-only parser.
        "DISPLAY_DATA_TYPE" | "EDGE_DATA_FORMAT" => {}
        _ => return Err(ParserError::InvalidKeyword(keyword.to_string())),
    }
    Ok(())
}

fn parse_data_keyword(keyword: &str) -> Result<DataKeyword, ParserError> {
    match keyword {
        "NODE_COORD_SECTION" => Ok(DataKeyword::NodeCoordSection),
        "EDGE_WEIGHT_SECTION" => Ok(DataKeyword::EdgeWeightSection),
        _ => Err(ParserError::InvalidKeyword(keyword.to_string())),
    }
}

fn parse_problem_type(value: &str) -> Result<ProblemType, ParserError> {
    match value {
        "TSP" => Ok(ProblemType::Tsp),
        "ATSP" => Ok(ProblemType::Atsp),
        "TOUR" => Ok(ProblemType::Tour),
        _ => Err(ParserError::InvalidValue { field: "TYPE", value: value.to_string() }),
    }
}

fn parse_edge_weight_type(value: &str) -> Result<EdgeWeightType, ParserError> {
    match value {
        "EXPLICIT" => Ok(EdgeWeightType::Explicit),
        "EUC_2D" => Ok(EdgeWeightType::Euc2D),
        "CEIL_2D" => Ok(EdgeWeightType::Ceil2D),
        "ATT" => Ok(EdgeWeightType::Att),
        "GEO" => Ok(EdgeWeightType::Geo),
        _ => Err(ParserError::InvalidValue { field: "EDGE_WEIGHT_TYPE", value: value.to_string() }),
    }
}

fn parse_edge_weight_format(value: &str) -> Result<EdgeWeightFormat, ParserError> {
    match value {
        "FULL_MATRIX" => Ok(EdgeWeightFormat::FullMatrix),
        "UPPER_ROW" => Ok(EdgeWeightFormat::UpperRow),
        "LOWER_DIAG_ROW" => Ok(EdgeWeightFormat::LowerDiagRow),
        "UPPER_DIAG_ROW" => Ok(EdgeWeightFormat::UpperDiagRow),
        _ => {
            Err(ParserError::InvalidValue { field: "EDGE_WEIGHT_FORMAT", value: value.to_string() })
        }
    }
}

fn parse_node_coord_type(value: &str) -> Result<NodeCoordType, ParserError> {
    match value {
        "TWOD_COORDS" => Ok(NodeCoordType::TwoDCoords),
        "NO_COORDS" => Ok(NodeCoordType::NoCoords),
        _ => Err(ParserError::InvalidValue { field: "NODE_COORD_TYPE", value: value.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_euc_2d_header() {
        let text = b"NAME: test\nTYPE: TSP\nDIMENSION: 3\nEDGE_WEIGHT_TYPE: EUC_2D\nNODE_COORD_SECTION\n";
        let mut cursor = 0;
        let (meta, keyword) = parse_metadata(text, &mut cursor).unwrap();
        assert_eq!(meta.name, "test");
        assert_eq!(meta.dimension, 3);
        assert_eq!(meta.edge_weight_type, EdgeWeightType::Euc2D);
        assert_eq!(keyword, DataKeyword::NodeCoordSection);
    }

    #[test]
    fn explicit_without_format_is_rejected() {
        let text = b"NAME: t\nTYPE: TSP\nDIMENSION: 2\nEDGE_WEIGHT_TYPE: EXPLICIT\nEDGE_WEIGHT_SECTION\n";
        let mut cursor = 0;
        let err = parse_metadata(text, &mut cursor).unwrap_err();
        assert!(matches!(err, ParserError::MissingEdgeWeightFormat));
    }
}
