use std::collections::{BTreeSet, HashMap};

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;

use crate::error::{OracleError, Result};
use crate::graph_algorithms::Dijkstra;
use crate::graph_representation::Graph;
use crate::types::*;

/// vertices of one label as seen from a portal, ordered by distance and then by vertex id
pub type LabelBucket<W> = BTreeSet<(W, NodeId)>;

/// a randomly chosen vertex together with its full shortest path tree
pub struct Portal<W: Distance> {
    node_id: NodeId,
    distances: Vec<W>,
    by_label: HashMap<Label, LabelBucket<W>>,
}

impl<W: Distance> Portal<W> {

    fn new(node_id: NodeId, distances: Vec<W>, labels: &[Label]) -> Self {
        let mut by_label: HashMap<Label, LabelBucket<W>> = HashMap::new();

        for (node, (distance, label)) in distances.iter().zip(labels.iter()).enumerate() {
            by_label.entry(*label).or_default().insert((*distance, node as NodeId));
        }

        Portal {
            node_id,
            distances,
            by_label,
        }
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn distance(&self, node: NodeId) -> W {
        self.distances[node as usize]
    }

    pub fn distances(&self) -> &[W] {
        &self.distances
    }

    pub fn bucket(&self, label: Label) -> Option<&LabelBucket<W>> {
        self.by_label.get(&label)
    }

    /// closest vertex currently carrying `label`, ties broken by the smaller vertex id
    pub fn nearest_of_label(&self, label: Label) -> Option<(W, NodeId)> {
        self.by_label.get(&label).and_then(|bucket| bucket.iter().next().copied())
    }

    /// moves `node` from the bucket of `old_label` into the bucket of `new_label`
    fn relabel(&mut self, node: NodeId, old_label: Label, new_label: Label) {
        let entry = (self.distances[node as usize], node);

        if let Some(bucket) = self.by_label.get_mut(&old_label) {
            bucket.remove(&entry);

            if bucket.is_empty() {
                self.by_label.remove(&old_label);
            }
        }

        self.by_label.entry(new_label).or_default().insert(entry);
    }
}

/// all portals of an oracle plus the reverse lookup vertex -> portal index
pub struct PortalTable<W: Distance> {
    portals: Vec<Portal<W>>,
    portal_index: Vec<Option<PortalId>>,
}

/// `max(1, round(sqrt(n)))`
pub fn default_portal_count(num_nodes: usize) -> usize {
    ((num_nodes as f64).sqrt().round() as usize).max(1)
}

/// picks `count` distinct vertices uniformly at random: shuffles all vertex ids and keeps a prefix
pub fn select_portals<R: Rng + ?Sized>(num_nodes: usize, count: usize, rng: &mut R) -> Result<NodeIds> {
    if count == 0 || count > num_nodes {
        return Err(OracleError::InvalidPortalCount { portals: count, num_nodes });
    }

    let mut node_ids: NodeIds = (0..num_nodes as NodeId).collect();
    node_ids.shuffle(rng);
    node_ids.truncate(count);

    Ok(node_ids)
}

impl<W: Distance> PortalTable<W> {

    /// runs one full shortest path search per portal and files every vertex under its label
    pub fn build<G>(graph: &G, labels: &[Label], portal_nodes: NodeIds, parallel: bool) -> Self
    where
        G: Graph<Weight = W> + Sync
    {
        let num_nodes = graph.num_nodes();
        info!("building portal table with {} portals for {} vertices", portal_nodes.len(), num_nodes);

        let distance_vectors: Vec<Vec<W>> = if parallel {
            portal_nodes.par_iter()
                .map_init(|| Dijkstra::new(num_nodes), |search, portal| search.distances_from(graph, *portal))
                .collect()
        }
        else {
            let mut search = Dijkstra::new(num_nodes);
            portal_nodes.iter().map(|portal| search.distances_from(graph, *portal)).collect()
        };

        let mut portal_index: Vec<Option<PortalId>> = vec![None; num_nodes];
        let mut portals: Vec<Portal<W>> = Vec::with_capacity(portal_nodes.len());

        for (index, (portal, distances)) in portal_nodes.into_iter().zip(distance_vectors).enumerate() {
            portal_index[portal as usize] = Some(index as PortalId);
            portals.push(Portal::new(portal, distances, labels));
        }

        debug!("portal table done, {} distinct labels", portals.first().map_or(0, |portal| portal.by_label.len()));

        PortalTable {
            portals,
            portal_index,
        }
    }

    pub fn len(&self) -> usize {
        self.portals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portals.is_empty()
    }

    pub fn portal(&self, portal: PortalId) -> &Portal<W> {
        &self.portals[portal as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Portal<W>> {
        self.portals.iter()
    }

    /// portal index of `node` if it is a portal
    pub fn portal_index(&self, node: NodeId) -> Option<PortalId> {
        self.portal_index[node as usize]
    }

    pub fn membership(&self) -> &[Option<PortalId>] {
        &self.portal_index
    }

    pub fn node_ids(&self) -> NodeIds {
        self.portals.iter().map(Portal::node_id).collect()
    }

    /// keeps every portal's buckets in line with a label change of `node`
    pub fn relabel(&mut self, node: NodeId, old_label: Label, new_label: Label) {
        for portal in &mut self.portals {
            portal.relabel(node, old_label, new_label);
        }
    }
}
