use crate::types::*;
use crate::graph_representation::Graph;
use crate::utils::binary_heap::{HeapElement, MinBinaryHeap};
use crate::utils::data_structures::{ArrayStructure, ValidFlags};

#[derive(Copy, Clone, Eq, PartialEq, Debug, Ord, PartialOrd)]
pub struct DijkstraState<W: Distance> {
    pub distance: W,
    pub node_id: NodeId,
}

impl<W: Distance> HeapElement for DijkstraState<W> {

    fn unique_index(&self) -> usize {
        self.node_id as usize
    }
}

/// reusable single source search, keeps its queue and distance table between runs
pub struct Dijkstra<W: Distance> {
    to_visit: MinBinaryHeap<DijkstraState<W>>,
    distances: ValidFlags<W>,
}

impl<W: Distance> Dijkstra<W> {

    pub fn new(num_nodes: usize) -> Self {
        Dijkstra {
            to_visit: MinBinaryHeap::new(num_nodes),
            distances: ValidFlags::new(num_nodes, W::INFINITY),
        }
    }

    /// settles the whole graph and returns the distance from `start` to every vertex,
    /// `INFINITY` for vertices that can not be reached
    pub fn distances_from(&mut self, graph: &impl Graph<Weight = W>, start: NodeId) -> Vec<W> {
        self.to_visit.clear();
        self.distances.reset();

        self.to_visit.insert(DijkstraState { distance: W::ZERO, node_id: start });
        self.distances.set(start as usize, W::ZERO);

        while let Some(DijkstraState { distance, node_id }) = self.to_visit.pop() {
            self.relax_edges(graph, node_id, distance);
        }

        self.distances.to_vec()
    }

    fn relax_edges(&mut self, graph: &impl Graph<Weight = W>, node_id: NodeId, distance: W) {
        for edge_id in graph.edge_ids(node_id) {
            let target_node = graph.target_id(node_id, edge_id);
            let new_distance = distance.link(graph.weight(node_id, edge_id));

            if self.distances[target_node as usize] > new_distance {
                self.distances.set(target_node as usize, new_distance);

                self.to_visit.insert_or_decrease(DijkstraState { distance: new_distance, node_id: target_node });
            }
        }
    }
}

/// point to point shortest path distance, `None` if `goal` is not reachable from `start`
pub fn dijkstra<W: Distance>(start: NodeId, goal: NodeId, graph: &impl Graph<Weight = W>) -> Option<W> {
    let mut to_visit: MinBinaryHeap<DijkstraState<W>> = MinBinaryHeap::new(graph.num_nodes());
    to_visit.insert(DijkstraState {
        distance: W::ZERO,
        node_id: start,
    });

    let mut distance_table: Vec<W> = vec![W::INFINITY; graph.num_nodes()];
    distance_table[start as usize] = W::ZERO;

    while let Some(DijkstraState { distance, node_id }) = to_visit.pop() {
        if node_id == goal {
            return Some(distance);
        }

        for edge_id in graph.edge_ids(node_id) {
            let target_node = graph.target_id(node_id, edge_id);
            let new_distance = distance.link(graph.weight(node_id, edge_id));

            if distance_table[target_node as usize] > new_distance {
                distance_table[target_node as usize] = new_distance;

                to_visit.insert_or_decrease(DijkstraState { distance: new_distance, node_id: target_node });
            }
        }
    }

    None
}
