use log::{debug, info};
use rayon::prelude::*;

use crate::graph_representation::Graph;
use crate::types::*;
use crate::utils::binary_heap::{HeapElement, MinBinaryHeap};
use crate::utils::data_structures::{ArrayStructure, ValidFlags};

/// portals are settled before ordinary vertices at the same distance,
/// so every local entry lies strictly inside the horizon
const PORTAL_TIER: u8 = 0;
const VERTEX_TIER: u8 = 1;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Ord, PartialOrd)]
struct HorizonState<W: Distance> {
    distance: W,
    tier: u8,
    node_id: NodeId,
}

impl<W: Distance> HeapElement for HorizonState<W> {

    fn unique_index(&self) -> usize {
        self.node_id as usize
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct NearestPortal<W: Distance> {
    pub distance: W,
    pub portal: PortalId,
}

/// the local neighbourhood of one vertex
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexRecord<W: Distance> {
    /// first portal settled by the search, `None` if no portal is reachable
    pub nearest_portal: Option<NearestPortal<W>>,
    /// every vertex settled before the portal with its exact distance, in settle order
    pub local: Vec<(W, NodeId)>,
}

/// dijkstra that stops at the first portal it settles
pub struct HorizonSearch<W: Distance> {
    to_visit: MinBinaryHeap<HorizonState<W>>,
    distances: ValidFlags<W>,
}

impl<W: Distance> HorizonSearch<W> {

    pub fn new(num_nodes: usize) -> Self {
        HorizonSearch {
            to_visit: MinBinaryHeap::new(num_nodes),
            distances: ValidFlags::new(num_nodes, W::INFINITY),
        }
    }

    pub fn run(&mut self, graph: &impl Graph<Weight = W>, start: NodeId, membership: &[Option<PortalId>]) -> VertexRecord<W> {
        self.to_visit.clear();
        self.distances.reset();

        self.to_visit.insert(HorizonState { distance: W::ZERO, tier: tier_of(membership, start), node_id: start });
        self.distances.set(start as usize, W::ZERO);

        let mut local: Vec<(W, NodeId)> = Vec::new();

        while let Some(HorizonState { distance, node_id, .. }) = self.to_visit.pop() {
            if let Some(portal) = membership[node_id as usize] {
                self.to_visit.clear();

                return VertexRecord {
                    nearest_portal: Some(NearestPortal { distance, portal }),
                    local,
                };
            }

            local.push((distance, node_id));

            for edge_id in graph.edge_ids(node_id) {
                let target_node = graph.target_id(node_id, edge_id);
                let new_distance = distance.link(graph.weight(node_id, edge_id));

                if self.distances[target_node as usize] > new_distance {
                    self.distances.set(target_node as usize, new_distance);

                    self.to_visit.insert_or_decrease(HorizonState {
                        distance: new_distance,
                        tier: tier_of(membership, target_node),
                        node_id: target_node
                    });
                }
            }
        }

        // component without a portal, the local list covers all of it
        VertexRecord {
            nearest_portal: None,
            local,
        }
    }
}

fn tier_of(membership: &[Option<PortalId>], node: NodeId) -> u8 {
    match membership[node as usize] {
        Some(_) => PORTAL_TIER,
        None => VERTEX_TIER,
    }
}

/// vertex records of all vertices
pub struct HorizonIndex<W: Distance> {
    records: Vec<VertexRecord<W>>,
}

impl<W: Distance> HorizonIndex<W> {

    pub fn build<G>(graph: &G, membership: &[Option<PortalId>], parallel: bool) -> Self
    where
        G: Graph<Weight = W> + Sync
    {
        let num_nodes = graph.num_nodes();
        info!("building horizon index for {} vertices", num_nodes);

        let records: Vec<VertexRecord<W>> = if parallel {
            graph.node_ids().into_par_iter()
                .map_init(|| HorizonSearch::new(num_nodes), |search, node| search.run(graph, node, membership))
                .collect()
        }
        else {
            let mut search = HorizonSearch::new(num_nodes);
            graph.node_ids().map(|node| search.run(graph, node, membership)).collect()
        };

        let index = HorizonIndex { records };
        debug!("horizon index done, {} local entries in total, longest list {}", index.total_entries(), index.max_entries());

        index
    }

    pub fn record(&self, node: NodeId) -> &VertexRecord<W> {
        &self.records[node as usize]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &VertexRecord<W>)> {
        self.records.iter().enumerate().map(|(node, record)| (node as NodeId, record))
    }

    pub fn total_entries(&self) -> usize {
        self.records.iter().map(|record| record.local.len()).sum()
    }

    pub fn max_entries(&self) -> usize {
        self.records.iter().map(|record| record.local.len()).max().unwrap_or(0)
    }
}
