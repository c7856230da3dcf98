//! Deterministic geometric random instances: `n` points drawn uniformly from an integer grid,
//! EUC_2D lengths computed the same way a parsed instance would.
//!
//! Reproducibility only requires that the same `(seed, node_count, grid_size)` always produce the
//! same instance, so a single seeded RNG stream is enough; no replay-token scheme is needed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tsp_core::{
    distance::Distance,
    instance::{EdgeWeightType, Instance, InstanceMetadata, NodeCoordType, ProblemType},
    matrix::MatrixSym,
};

use crate::data_section::euc_2d;

/// Generates a random Euclidean TSP instance: `node_count` points sampled uniformly (with
/// replacement) from `[0, grid_size]^2`.
pub fn random_euclidean_instance(seed: u64, node_count: usize, grid_size: u32) -> Instance {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let coords: Vec<(f64, f64)> = (0..node_count)
        .map(|_| {
            (
                rng.gen_range(0..=grid_size) as f64,
                rng.gen_range(0..=grid_size) as f64,
            )
        })
        .collect();

    let lengths = MatrixSym::slow_new_from_fn(node_count, |a, b| {
        euc_2d(coords[a.0], coords[b.0])
    });

    let metadata = InstanceMetadata {
        name: format!("random-seed{seed}-n{node_count}-g{grid_size}"),
        problem_type: ProblemType::Tsp,
        comment: Some("generated by tsp-parser::random".to_string()),
        dimension: node_count,
        edge_weight_type: EdgeWeightType::Euc2D,
        edge_weight_format: None,
        node_coord_type: NodeCoordType::TwoDCoords,
        coords: Some(coords),
    };
    Instance::new(metadata, lengths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_is_reproducible() {
        let a = random_euclidean_instance(42, 50, 1000);
        let b = random_euclidean_instance(42, 50, 1000);
        assert_eq!(a.metadata().coords, b.metadata().coords);
        for i in 0..50 {
            for j in 0..50 {
                assert_eq!(
                    a.length(tsp_core::Node(i), tsp_core::Node(j)),
                    b.length(tsp_core::Node(i), tsp_core::Node(j))
                );
            }
        }
    }

    #[test]
    fn different_seeds_usually_differ() {
        let a = random_euclidean_instance(1, 20, 500);
        let b = random_euclidean_instance(2, 20, 500);
        assert_ne!(a.metadata().coords, b.metadata().coords);
    }

    #[test]
    fn all_lengths_are_nonnegative() {
        let instance = random_euclidean_instance(7, 30, 200);
        for i in 0..30 {
            for j in 0..30 {
                assert!(instance.length(tsp_core::Node(i), tsp_core::Node(j)) >= Distance::ZERO);
            }
        }
    }
}
