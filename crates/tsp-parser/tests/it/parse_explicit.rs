use std::io::Write;

use tsp_core::Node;

// Lower-diagonal-row explicit weights for a 3-node instance:
//   d(0,0)=0
//   d(1,0)=5 d(1,1)=0
//   d(2,0)=7 d(2,1)=3 d(2,2)=0
const EXPLICIT_TSP: &str = "\
NAME: tri3
TYPE: TSP
DIMENSION: 3
EDGE_WEIGHT_TYPE: EXPLICIT
EDGE_WEIGHT_FORMAT: LOWER_DIAG_ROW
EDGE_WEIGHT_SECTION
0
5 0
7 3 0
EOF
";

#[test]
fn parses_lower_diag_row_explicit_weights() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{EXPLICIT_TSP}").unwrap();

    let instance = tsp_parser::parse_instance(file.path()).unwrap();
    assert_eq!(instance.length(Node(1), Node(0)), tsp_core::Distance(5));
    assert_eq!(instance.length(Node(0), Node(1)), tsp_core::Distance(5));
    assert_eq!(instance.length(Node(2), Node(1)), tsp_core::Distance(3));
    assert_eq!(instance.length(Node(2), Node(2)), tsp_core::Distance(0));
}

#[test]
fn explicit_without_edge_weight_format_is_rejected() {
    let text = EXPLICIT_TSP.replace("EDGE_WEIGHT_FORMAT: LOWER_DIAG_ROW\n", "");
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{text}").unwrap();

    let err = tsp_parser::parse_instance(file.path()).unwrap_err();
    assert!(matches!(err, tsp_parser::ParserError::MissingEdgeWeightFormat));
}
