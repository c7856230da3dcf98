use std::io::Write;

use tsp_core::{instance::EdgeWeightType, Node};

const SQUARE_TSP: &str = "\
NAME: square4
TYPE: TSP
COMMENT: unit square corners
DIMENSION: 4
EDGE_WEIGHT_TYPE: EUC_2D
NODE_COORD_SECTION
1 0 0
2 10 0
3 10 10
4 0 10
EOF
";

#[test]
fn parses_square_instance_and_computes_lengths() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{SQUARE_TSP}").unwrap();

    let instance = tsp_parser::parse_instance(file.path()).unwrap();
    assert_eq!(instance.dimension(), 4);
    assert_eq!(instance.metadata().edge_weight_type, EdgeWeightType::Euc2D);
    assert_eq!(instance.length(Node(0), Node(1)), tsp_core::Distance(10));
    assert_eq!(instance.length(Node(0), Node(2)), tsp_core::Distance(14));
    assert_eq!(instance.tour_length(&[Node(0), Node(1), Node(2), Node(3)]), tsp_core::Distance(40));
}
