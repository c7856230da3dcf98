use tsp_core::Node;

#[test]
fn write_then_read_tour_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("probname.sol");
    let tour = vec![Node(2), Node(0), Node(3), Node(1)];

    tsp_parser::write_tour(&path, &tour).unwrap();
    let read_back = tsp_parser::read_tour(&path).unwrap();

    assert_eq!(read_back, tour);
}

#[test]
fn write_tour_edges_lists_every_cyclic_edge() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("probname_tour.x");
    let tour = vec![Node(0), Node(1), Node(2)];

    tsp_parser::write_tour_edges(&path, &tour).unwrap();
    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();

    assert_eq!(lines[0], "3 3");
    assert_eq!(lines.len(), 4);
    assert!(contents.contains("2 0 1.0"));
}

#[test]
fn read_tour_rejects_wrong_length() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.sol");
    std::fs::write(&path, "3\n1\n2\n").unwrap();

    let err = tsp_parser::read_tour(&path).unwrap_err();
    assert!(matches!(err, tsp_parser::ParserError::WrongTourLength { found: 2, expected: 3 }));
}
