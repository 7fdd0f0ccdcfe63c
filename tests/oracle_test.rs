use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use labeled_distance_oracle::graph_algorithms::Dijkstra;
use labeled_distance_oracle::graph_representation::{Graph, GraphArray, GraphList};
use labeled_distance_oracle::horizon_index::NearestPortal;
use labeled_distance_oracle::types::*;
use labeled_distance_oracle::{LabeledOracle, OracleConfig, OracleError};

const GRID_SIZE: u32 = 6;
const GRID_LABELS: Label = 5;

// 0 ─ 1 ─ 2 ─ 3 ─ 4   unit weights
fn get_path_graph() -> (Vec<(NodeId, NodeId)>, Vec<Weight>, Labels) {
    let edges = vec![(0, 1), (1, 2), (2, 3), (3, 4)];
    let weights = vec![1, 1, 1, 1];
    let labels = vec![0, 0, 1, 1, 2];

    (edges, weights, labels)
}

/// 6x6 grid with uneven weights, labels cycle through 0..5
fn get_grid_graph() -> (GraphArray<Weight>, Labels) {
    let mut edges = Vec::new();
    let mut weights = Vec::new();

    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let node = row * GRID_SIZE + col;

            if col + 1 < GRID_SIZE {
                edges.push((node, node + 1));
                weights.push(1 + (row * 7 + col * 3) % 5);
            }

            if row + 1 < GRID_SIZE {
                edges.push((node, node + GRID_SIZE));
                weights.push(1 + (row * 2 + col * 5) % 4);
            }
        }
    }

    let num_nodes = (GRID_SIZE * GRID_SIZE) as usize;
    let graph = GraphArray::from_undirected_edges(num_nodes, &edges, &weights).unwrap();
    let labels = (0..num_nodes as Label).map(|node| node % GRID_LABELS).collect();

    (graph, labels)
}

fn all_pairs_distances(graph: &impl Graph<Weight = Weight>) -> Vec<Vec<Weight>> {
    let mut search = Dijkstra::new(graph.num_nodes());

    graph.node_ids().map(|node| search.distances_from(graph, node)).collect()
}

fn distinct_labels(oracle: &LabeledOracle) -> BTreeSet<Label> {
    oracle.labels().iter().copied().collect()
}

fn assert_buckets_consistent(oracle: &LabeledOracle) {
    let labels = distinct_labels(oracle);

    for portal in oracle.portal_table().iter() {
        for node in 0..oracle.num_nodes() as NodeId {
            let label = oracle.label(node).unwrap();
            let bucket = portal.bucket(label).unwrap();
            assert!(bucket.contains(&(portal.distance(node), node)));
        }

        let total: usize = labels.iter().map(|label| portal.bucket(*label).map_or(0, |bucket| bucket.len())).sum();
        assert_eq!(total, oracle.num_nodes());
    }
}

#[test]
fn test_path_graph_scenario() {
    for seed in 0..10 {
        let (edges, weights, labels) = get_path_graph();
        let config = OracleConfig { portal_count: Some(1), seed, parallel: false };
        let mut oracle = LabeledOracle::from_edges(5, &edges, &weights, Some(labels), &config).unwrap();

        assert_eq!(oracle.num_portals(), 1);

        let to_label = oracle.distance_to_label(0, 2).unwrap();
        assert_eq!(to_label.distance, 4);
        assert_eq!(to_label.witness, Some(4));

        let between = oracle.distance_between_labels(0, 1);
        assert_eq!(between.distance, 1);
        assert_eq!(between.witnesses, Some((1, 2)));

        oracle.set_label(4, 0).unwrap();

        let own_label = oracle.distance_to_label(0, 0).unwrap();
        assert_eq!(own_label.distance, 0);
        assert_eq!(own_label.witness, Some(0));

        let gone = oracle.distance_between_labels(0, 2);
        assert!(!gone.is_reachable());
        assert_eq!(gone.distance, INFINITY);
        assert_eq!(gone.witnesses, None);

        let gone = oracle.distance_to_label(1, 2).unwrap();
        assert!(!gone.is_reachable());
        assert_eq!(gone.distance, INFINITY);
    }
}

#[test]
fn test_vertex_records() {
    let (graph, labels) = get_grid_graph();
    let oracle = LabeledOracle::build(&graph, Some(labels), &OracleConfig { seed: 5, ..OracleConfig::default() }).unwrap();
    let distances = all_pairs_distances(&graph);

    for node in graph.node_ids() {
        let record = oracle.vertex_record(node).unwrap();
        let nearest_portal = record.nearest_portal.unwrap();

        let closest_portal = oracle.portal_nodes().iter().map(|portal| distances[node as usize][*portal as usize]).min().unwrap();
        assert_eq!(nearest_portal.distance, closest_portal);
        let portal_node = oracle.portal_table().portal(nearest_portal.portal).node_id();
        assert_eq!(distances[node as usize][portal_node as usize], nearest_portal.distance);

        if let Some(portal) = oracle.portal_table().portal_index(node) {
            assert!(record.local.is_empty());
            assert_eq!(record.nearest_portal, Some(NearestPortal { distance: 0, portal }));
            continue;
        }

        assert_eq!(record.local[0], (0, node));
        assert!(record.local.windows(2).all(|pair| pair[0].0 <= pair[1].0));

        for (distance, other) in &record.local {
            assert!(*distance < nearest_portal.distance);
            assert_eq!(*distance, distances[node as usize][*other as usize]);
        }

        let inside_horizon = distances[node as usize].iter().filter(|distance| **distance < nearest_portal.distance).count();
        assert_eq!(record.local.len(), inside_horizon);
    }
}

#[test]
fn test_portal_distances_and_buckets() {
    let (graph, labels) = get_grid_graph();
    let mut oracle = LabeledOracle::build(&graph, Some(labels), &OracleConfig { seed: 1, ..OracleConfig::default() }).unwrap();
    let distances = all_pairs_distances(&graph);

    for portal in oracle.portal_table().iter() {
        assert_eq!(portal.distances(), &distances[portal.node_id() as usize][..]);
    }

    assert_buckets_consistent(&oracle);

    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..50 {
        let node = rng.gen_range(0..oracle.num_nodes()) as NodeId;
        let label = rng.gen_range(0..GRID_LABELS + 2);
        oracle.set_label(node, label).unwrap();

        assert_buckets_consistent(&oracle);
    }
}

#[test]
fn test_empty_bucket_is_dropped() {
    let (edges, weights, labels) = get_path_graph();
    let mut oracle = LabeledOracle::from_edges(5, &edges, &weights, Some(labels), &OracleConfig::default()).unwrap();

    oracle.set_label(4, 7).unwrap();

    for portal in oracle.portal_table().iter() {
        assert!(portal.bucket(2).is_none());
        assert_eq!(portal.nearest_of_label(7), Some((portal.distance(4), 4)));
    }

    assert_eq!(oracle.label_members(7), vec![4]);
    assert!(oracle.label_members(2).is_empty());
}

#[test]
fn test_same_label_is_zero() {
    let (graph, labels) = get_grid_graph();
    let mut oracle = LabeledOracle::build(&graph, Some(labels), &OracleConfig { seed: 2, ..OracleConfig::default() }).unwrap();

    let check = |oracle: &LabeledOracle| {
        for node in graph.node_ids() {
            let result = oracle.distance_to_label(node, oracle.label(node).unwrap()).unwrap();
            assert_eq!(result.distance, 0);
            assert_eq!(result.witness, Some(node));
        }

        for label in distinct_labels(oracle) {
            let result = oracle.distance_between_labels(label, label);
            assert_eq!(result.distance, 0);
            let (first, second) = result.witnesses.unwrap();
            assert_eq!(first, second);
            assert_eq!(oracle.label(first).unwrap(), label);
        }
    };

    check(&oracle);

    oracle.set_label(7, 42).unwrap();
    oracle.set_label(8, 42).unwrap();
    oracle.set_label(0, 3).unwrap();
    check(&oracle);
}

#[test]
fn test_noop_relabel_keeps_buckets() {
    let (graph, labels) = get_grid_graph();
    let mut oracle = LabeledOracle::build(&graph, Some(labels), &OracleConfig::default()).unwrap();

    let snapshot = |oracle: &LabeledOracle| -> Vec<Vec<(Weight, NodeId)>> {
        let mut buckets = Vec::new();
        for portal in oracle.portal_table().iter() {
            for label in 0..GRID_LABELS {
                buckets.push(portal.bucket(label).map(|bucket| bucket.iter().copied().collect()).unwrap_or_default());
            }
        }
        buckets
    };

    let before = snapshot(&oracle);

    for node in graph.node_ids() {
        let label = oracle.label(node).unwrap();
        oracle.set_label(node, label).unwrap();
    }

    assert_eq!(snapshot(&oracle), before);
}

#[test]
fn test_queries_are_upper_bounds_after_relabels() {
    let (graph, labels) = get_grid_graph();
    let mut oracle = LabeledOracle::build(&graph, Some(labels), &OracleConfig { seed: 4, ..OracleConfig::default() }).unwrap();
    let distances = all_pairs_distances(&graph);
    let mut rng = StdRng::seed_from_u64(17);

    for round in 0..6 {
        if round > 0 {
            for _ in 0..8 {
                let node = rng.gen_range(0..oracle.num_nodes()) as NodeId;
                oracle.set_label(node, rng.gen_range(0..GRID_LABELS + 1)).unwrap();
            }
        }

        for node in graph.node_ids() {
            for label in 0..GRID_LABELS + 2 {
                let members = oracle.label_members(label);
                let result = oracle.distance_to_label(node, label).unwrap();

                if members.is_empty() {
                    assert!(!result.is_reachable());
                    continue;
                }

                let truth = members.iter().map(|member| distances[node as usize][*member as usize]).min().unwrap();
                let witness = result.witness.unwrap();
                assert!(result.distance >= truth);
                assert_eq!(oracle.label(witness).unwrap(), label);
                assert!(result.distance >= distances[node as usize][witness as usize]);
            }
        }

        for first in 0..GRID_LABELS + 2 {
            for second in 0..GRID_LABELS + 2 {
                let first_members = oracle.label_members(first);
                let second_members = oracle.label_members(second);
                let result = oracle.distance_between_labels(first, second);

                if first_members.is_empty() || second_members.is_empty() {
                    assert!(!result.is_reachable());
                    continue;
                }

                let truth = first_members.iter()
                    .flat_map(|u| second_members.iter().map(|v| distances[*u as usize][*v as usize]))
                    .min()
                    .unwrap();
                let (first_witness, second_witness) = result.witnesses.unwrap();
                assert!(result.distance >= truth);
                assert_eq!(oracle.label(first_witness).unwrap(), first);
                assert_eq!(oracle.label(second_witness).unwrap(), second);
                assert!(result.distance >= distances[first_witness as usize][second_witness as usize]);
            }
        }
    }
}

#[test]
fn test_rebuild_matches_fresh_build() {
    let (graph, labels) = get_grid_graph();
    let config = OracleConfig { seed: 3, ..OracleConfig::default() };
    let mut oracle = LabeledOracle::build(&graph, Some(labels), &config).unwrap();

    oracle.set_label(0, 4).unwrap();
    oracle.set_label(14, 0).unwrap();
    oracle.set_label(35, 9).unwrap();
    oracle.rebuild_local_index(&graph).unwrap();

    let fresh = LabeledOracle::build(&graph, Some(oracle.labels().to_vec()), &config).unwrap();
    assert_eq!(oracle.portal_nodes(), fresh.portal_nodes());

    for node in graph.node_ids() {
        assert_eq!(oracle.vertex_record(node).unwrap(), fresh.vertex_record(node).unwrap());

        for label in 0..10 {
            assert_eq!(oracle.distance_to_label(node, label).unwrap(), fresh.distance_to_label(node, label).unwrap());
        }
    }

    for first in 0..10 {
        for second in 0..10 {
            assert_eq!(oracle.distance_between_labels(first, second), fresh.distance_between_labels(first, second));
        }
    }

    assert_eq!(oracle.stats(), fresh.stats());
}

#[test]
fn test_rebuild_rejects_other_graph() {
    let (graph, labels) = get_grid_graph();
    let mut oracle = LabeledOracle::build(&graph, Some(labels), &OracleConfig::default()).unwrap();
    let other = GraphArray::from_undirected_edges(3, &[(0, 1)], &[1u32]).unwrap();

    assert!(matches!(oracle.rebuild_local_index(&other), Err(OracleError::LabelCountMismatch { labels: 36, num_nodes: 3 })));
}

#[test]
fn test_parallel_build_matches_sequential() {
    let (graph, labels) = get_grid_graph();
    let sequential = LabeledOracle::build(&graph, Some(labels.clone()), &OracleConfig { seed: 8, ..OracleConfig::default() }).unwrap();
    let parallel = LabeledOracle::build(&graph, Some(labels), &OracleConfig { seed: 8, parallel: true, ..OracleConfig::default() }).unwrap();

    assert_eq!(sequential.portal_nodes(), parallel.portal_nodes());
    assert_eq!(sequential.stats(), parallel.stats());

    for node in graph.node_ids() {
        assert_eq!(sequential.vertex_record(node).unwrap(), parallel.vertex_record(node).unwrap());
    }

    for first in 0..GRID_LABELS {
        for second in 0..GRID_LABELS {
            assert_eq!(sequential.distance_between_labels(first, second), parallel.distance_between_labels(first, second));
        }
    }
}

#[test]
fn test_portal_selection() {
    let (graph, labels) = get_grid_graph();
    let oracle = LabeledOracle::build(&graph, Some(labels.clone()), &OracleConfig { seed: 21, ..OracleConfig::default() }).unwrap();

    // round(sqrt(36))
    assert_eq!(oracle.num_portals(), 6);
    let distinct: BTreeSet<NodeId> = oracle.portal_nodes().into_iter().collect();
    assert_eq!(distinct.len(), 6);

    for (index, portal) in oracle.portal_nodes().iter().enumerate() {
        assert_eq!(oracle.portal_table().portal_index(*portal), Some(index as PortalId));
    }

    let mut rng = StdRng::seed_from_u64(21);
    let injected = LabeledOracle::build_with_rng(&graph, Some(labels), &OracleConfig::default(), &mut rng).unwrap();
    assert_eq!(oracle.portal_nodes(), injected.portal_nodes());
}

#[test]
fn test_default_labels_are_vertex_ids() {
    let (edges, weights, _) = get_path_graph();
    let oracle = LabeledOracle::from_edges(5, &edges, &weights, None, &OracleConfig::default()).unwrap();

    assert_eq!(oracle.labels(), &[0, 1, 2, 3, 4]);

    let result = oracle.distance_between_labels(0, 3);
    assert_eq!(result.distance, 3);
    assert_eq!(result.witnesses, Some((0, 3)));
}

#[test]
fn test_out_of_range_vertex() {
    let (edges, weights, labels) = get_path_graph();
    let mut oracle = LabeledOracle::from_edges(5, &edges, &weights, Some(labels), &OracleConfig::default()).unwrap();

    assert!(matches!(oracle.distance_to_label(5, 0), Err(OracleError::NodeOutOfRange { node: 5, num_nodes: 5 })));
    assert!(matches!(oracle.set_label(9, 0), Err(OracleError::NodeOutOfRange { node: 9, num_nodes: 5 })));
    assert!(matches!(oracle.label(5), Err(OracleError::NodeOutOfRange { .. })));
    assert!(oracle.vertex_record(5).is_err());
}

// 0 ─2─ 1 ─3─ 2     3 ─1─ 4
#[test]
fn test_component_without_portal() {
    for seed in 0..10 {
        let mut graph: GraphList<Weight> = GraphList::new(5);
        graph.add_undirected_edge(0, 1, 2);
        graph.add_undirected_edge(1, 2, 3);
        graph.add_undirected_edge(3, 4, 1);

        let config = OracleConfig { portal_count: Some(1), seed, parallel: false };
        let oracle = LabeledOracle::build(&graph, Some(vec![0, 0, 1, 2, 2]), &config).unwrap();
        let portal = oracle.portal_nodes()[0];

        let portal_free: Vec<NodeId> = if portal < 3 { vec![3, 4] } else { vec![0, 1, 2] };
        for node in &portal_free {
            let record = oracle.vertex_record(*node).unwrap();
            assert_eq!(record.nearest_portal, None);
            assert_eq!(record.local.len(), portal_free.len());
        }

        assert!(!oracle.distance_to_label(0, 2).unwrap().is_reachable());
        assert!(!oracle.distance_to_label(4, 1).unwrap().is_reachable());
        assert!(!oracle.distance_between_labels(0, 2).is_reachable());

        let between = oracle.distance_between_labels(0, 1);
        assert_eq!(between.distance, 3);
        assert_eq!(between.witnesses, Some((1, 2)));

        let to_label = oracle.distance_to_label(3, 2).unwrap();
        assert_eq!(to_label.distance, 0);
        assert_eq!(to_label.witness, Some(3));
    }
}

#[test]
fn test_stats() {
    let (graph, labels) = get_grid_graph();
    let oracle = LabeledOracle::build(&graph, Some(labels), &OracleConfig::default()).unwrap();
    let stats = oracle.stats();

    assert_eq!(stats.num_nodes, 36);
    assert_eq!(stats.num_portals, 6);

    let local_entries: usize = graph.node_ids().map(|node| oracle.vertex_record(node).unwrap().local.len()).sum();
    assert_eq!(stats.local_entries, local_entries);
    assert_eq!(stats.pair_records, local_entries);
    assert_eq!(oracle.label_pair_index().len(), local_entries);
    assert!(stats.max_local_entries >= 1);
    assert!((stats.average_local_entries - local_entries as f64 / 36.0).abs() < 1e-9);
}
