use tsp_core::Node;
use tsp_parser::random_euclidean_instance;

#[test]
fn random_instance_respects_node_count_and_triangle_inequality() {
    let instance = random_euclidean_instance(123, 40, 5000);
    assert_eq!(instance.dimension(), 40);

    for i in 0..40 {
        for j in 0..40 {
            for k in 0..40 {
                let direct = instance.length(Node(i), Node(k));
                let via = instance.length(Node(i), Node(j)) + instance.length(Node(j), Node(k));
                assert!(direct <= via + tsp_core::Distance(2), "triangle inequality violated (rounding aside)");
            }
        }
    }
}
