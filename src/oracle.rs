use log::{info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{OracleError, Result};
use crate::graph_representation::{validate_graph, Graph, GraphArray};
use crate::horizon_index::{HorizonIndex, VertexRecord};
use crate::label_pairs::{LabelPairIndex, PairRecord};
use crate::portal_table::{default_portal_count, select_portals, PortalTable};
use crate::types::*;

/// construction parameters of a [`LabeledOracle`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleConfig {
    /// number of portals, `max(1, round(sqrt(n)))` if not set
    pub portal_count: Option<usize>,
    /// seed of the generator used to pick the portals
    pub seed: u64,
    /// run the per portal and per vertex searches on the rayon thread pool
    pub parallel: bool,
}

impl Default for OracleConfig {

    fn default() -> Self {
        OracleConfig {
            portal_count: None,
            seed: 0,
            parallel: false,
        }
    }
}

/// answer of a vertex to label query
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LabelDistance<W: Distance> {
    pub distance: W,
    /// vertex of the label realizing `distance`, `None` if the label is unreachable
    pub witness: Option<NodeId>,
}

impl<W: Distance> LabelDistance<W> {

    pub fn unreachable() -> Self {
        LabelDistance { distance: W::INFINITY, witness: None }
    }

    pub fn is_reachable(&self) -> bool {
        self.witness.is_some()
    }

    fn from_candidate(candidate: Option<(W, NodeId)>) -> Self {
        match candidate {
            Some((distance, witness)) if !distance.is_infinite() => LabelDistance { distance, witness: Some(witness) },
            _ => LabelDistance::unreachable(),
        }
    }
}

/// answer of a label to label query
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LabelPairDistance<W: Distance> {
    pub distance: W,
    /// one vertex of each label realizing `distance`, in query order
    pub witnesses: Option<(NodeId, NodeId)>,
}

impl<W: Distance> LabelPairDistance<W> {

    pub fn unreachable() -> Self {
        LabelPairDistance { distance: W::INFINITY, witnesses: None }
    }

    pub fn is_reachable(&self) -> bool {
        self.witnesses.is_some()
    }

    fn from_candidate(candidate: Option<PairRecord<W>>) -> Self {
        match candidate {
            Some((distance, witnesses)) if !distance.is_infinite() => LabelPairDistance { distance, witnesses: Some(witnesses) },
            _ => LabelPairDistance::unreachable(),
        }
    }
}

/// size figures of the built index
#[derive(Clone, Debug, PartialEq)]
pub struct IndexStats {
    pub num_nodes: usize,
    pub num_portals: usize,
    pub local_entries: usize,
    pub max_local_entries: usize,
    pub average_local_entries: f64,
    pub label_pairs: usize,
    pub pair_records: usize,
}

/// distance oracle answering nearest label and closest label pair queries
///
/// preprocessing picks random portals and computes a full shortest path tree for each of them.
/// every vertex additionally knows the exact distances to all vertices that are closer than its
/// nearest portal. a query combines the exact local part with the portal detour
/// `d(v, p) + d(p, x)`, which is an upper bound on `d(v, x)` as long as the graph is symmetric.
///
/// [`set_label`](Self::set_label) only updates the portal buckets. the local lists and the label
/// pair index keep the label layout of the last build, local answers are filtered by the current
/// labels and stay valid upper bounds, but a vertex that joined a label after the build is only
/// found through the portals. call [`rebuild_local_index`](Self::rebuild_local_index) to make
/// local answers exact again.
///
/// the label pair query skips pair records whose endpoints were relabeled since the last build.
/// after many relabels this scan is linear in the number of records of the two labels, a
/// rebuild brings it back to the first record.
pub struct LabeledOracle<W: Distance = Weight> {
    labels: Labels,
    portals: PortalTable<W>,
    horizon: HorizonIndex<W>,
    label_pairs: LabelPairIndex<W>,
    parallel: bool,
}

impl<W: Distance> LabeledOracle<W> {

    /// builds an oracle over an undirected edge list, every edge is inserted in both directions
    pub fn from_edges(num_nodes: usize, edges: &[(NodeId, NodeId)], weights: &[W], labels: Option<Labels>, config: &OracleConfig) -> Result<Self> {
        let graph = GraphArray::from_undirected_edges(num_nodes, edges, weights)?;

        Self::build(&graph, labels, config)
    }

    /// builds an oracle over `graph`, picking portals with a generator seeded from `config.seed`
    pub fn build<G>(graph: &G, labels: Option<Labels>, config: &OracleConfig) -> Result<Self>
    where
        G: Graph<Weight = W> + Sync
    {
        let mut rng = StdRng::seed_from_u64(config.seed);

        Self::build_with_rng(graph, labels, config, &mut rng)
    }

    /// builds an oracle over `graph`, picking portals with `rng`
    ///
    /// without labels every vertex gets its own id as label
    pub fn build_with_rng<G, R>(graph: &G, labels: Option<Labels>, config: &OracleConfig, rng: &mut R) -> Result<Self>
    where
        G: Graph<Weight = W> + Sync,
        R: Rng + ?Sized
    {
        validate_graph(graph)?;
        let num_nodes = graph.num_nodes();

        let labels = match labels {
            Some(labels) if labels.len() != num_nodes => {
                return Err(OracleError::LabelCountMismatch { labels: labels.len(), num_nodes });
            },
            Some(labels) => labels,
            None => (0..num_nodes as Label).collect(),
        };

        let portal_count = config.portal_count.unwrap_or_else(|| default_portal_count(num_nodes));
        let portal_nodes = select_portals(num_nodes, portal_count, rng)?;

        let portals = PortalTable::build(graph, &labels, portal_nodes, config.parallel);
        let horizon = HorizonIndex::build(graph, portals.membership(), config.parallel);
        let label_pairs = LabelPairIndex::build(&horizon, &labels);

        let oracle = LabeledOracle {
            labels,
            portals,
            horizon,
            label_pairs,
            parallel: config.parallel,
        };

        let stats = oracle.stats();
        info!("oracle ready: {} vertices, {} portals, {:.2} local entries per vertex, {} pair records", 
            stats.num_nodes, stats.num_portals, stats.average_local_entries, stats.pair_records);

        Ok(oracle)
    }

    /// closest vertex carrying `label` as seen from `node`
    pub fn distance_to_label(&self, node: NodeId, label: Label) -> Result<LabelDistance<W>> {
        self.check_node(node)?;

        if self.labels[node as usize] == label {
            return Ok(LabelDistance { distance: W::ZERO, witness: Some(node) });
        }

        let record = self.horizon.record(node);

        // the list is sorted, so the first current member is the closest local one
        let mut best: Option<(W, NodeId)> = record.local.iter()
            .find(|(_, other)| self.labels[*other as usize] == label)
            .copied();

        if let Some(nearest_portal) = record.nearest_portal {
            let portal = self.portals.portal(nearest_portal.portal);

            if let Some((distance, witness)) = portal.nearest_of_label(label) {
                best = min_candidate(best, (nearest_portal.distance.link(distance), witness));
            }
        }

        Ok(LabelDistance::from_candidate(best))
    }

    /// closest pair of vertices with the first one carrying `first` and the second one carrying `second`
    pub fn distance_between_labels(&self, first: Label, second: Label) -> LabelPairDistance<W> {
        if first == second {
            if let Some(member) = self.any_member(first) {
                return LabelPairDistance { distance: W::ZERO, witnesses: Some((member, member)) };
            }

            return LabelPairDistance::unreachable();
        }

        let mut best: Option<PairRecord<W>> = None;

        for portal in self.portals.iter() {
            let (Some((first_distance, first_node)), Some((second_distance, second_node))) = (portal.nearest_of_label(first), portal.nearest_of_label(second)) else {
                continue;
            };

            best = min_candidate(best, (first_distance.link(second_distance), (first_node, second_node)));
        }

        let forward = self.label_pairs.records(first, second)
            .find(|(_, (node, other))| self.labels[*node as usize] == first && self.labels[*other as usize] == second)
            .copied();

        // symmetric graph: a record found from the second label's side is just as good
        let backward = self.label_pairs.records(second, first)
            .find(|(_, (node, other))| self.labels[*node as usize] == second && self.labels[*other as usize] == first)
            .map(|(distance, (node, other))| (*distance, (*other, *node)));

        for candidate in forward.into_iter().chain(backward) {
            best = min_candidate(best, candidate);
        }

        LabelPairDistance::from_candidate(best)
    }

    /// moves `node` to `label`, keeping the portal buckets consistent
    ///
    /// the local lists and the label pair index are left untouched, see the type level docs
    pub fn set_label(&mut self, node: NodeId, label: Label) -> Result<()> {
        self.check_node(node)?;

        let old_label = self.labels[node as usize];
        if old_label == label {
            return Ok(());
        }

        trace!("relabel vertex {} from {} to {}", node, old_label, label);

        self.portals.relabel(node, old_label, label);
        self.labels[node as usize] = label;

        Ok(())
    }

    /// recomputes the local lists and the label pair index under the current labels, the portals stay
    pub fn rebuild_local_index<G>(&mut self, graph: &G) -> Result<()>
    where
        G: Graph<Weight = W> + Sync
    {
        if graph.num_nodes() != self.labels.len() {
            return Err(OracleError::LabelCountMismatch { labels: self.labels.len(), num_nodes: graph.num_nodes() });
        }

        self.horizon = HorizonIndex::build(graph, self.portals.membership(), self.parallel);
        self.label_pairs = LabelPairIndex::build(&self.horizon, &self.labels);

        Ok(())
    }

    pub fn num_nodes(&self) -> usize {
        self.labels.len()
    }

    pub fn num_portals(&self) -> usize {
        self.portals.len()
    }

    /// vertex ids of the portals, in portal index order
    pub fn portal_nodes(&self) -> NodeIds {
        self.portals.node_ids()
    }

    pub fn label(&self, node: NodeId) -> Result<Label> {
        self.check_node(node)?;

        Ok(self.labels[node as usize])
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn vertex_record(&self, node: NodeId) -> Result<&VertexRecord<W>> {
        self.check_node(node)?;

        Ok(self.horizon.record(node))
    }

    pub fn portal_table(&self) -> &PortalTable<W> {
        &self.portals
    }

    pub fn label_pair_index(&self) -> &LabelPairIndex<W> {
        &self.label_pairs
    }

    /// all vertices currently carrying `label`, ascending
    pub fn label_members(&self, label: Label) -> NodeIds {
        let mut members: NodeIds = self.portals.portal(0).bucket(label)
            .map(|bucket| bucket.iter().map(|(_, node)| *node).collect())
            .unwrap_or_default();
        members.sort_unstable();

        members
    }

    pub fn stats(&self) -> IndexStats {
        let local_entries = self.horizon.total_entries();

        IndexStats {
            num_nodes: self.num_nodes(),
            num_portals: self.num_portals(),
            local_entries,
            max_local_entries: self.horizon.max_entries(),
            average_local_entries: local_entries as f64 / self.num_nodes() as f64,
            label_pairs: self.label_pairs.num_pairs(),
            pair_records: self.label_pairs.len(),
        }
    }

    fn any_member(&self, label: Label) -> Option<NodeId> {
        self.portals.portal(0).nearest_of_label(label).map(|(_, node)| node)
    }

    fn check_node(&self, node: NodeId) -> Result<()> {
        if node as usize >= self.labels.len() {
            return Err(OracleError::NodeOutOfRange { node, num_nodes: self.labels.len() });
        }

        Ok(())
    }
}

fn min_candidate<T: Ord>(current: Option<T>, candidate: T) -> Option<T> {
    match current {
        Some(current) if current <= candidate => Some(current),
        _ => Some(candidate),
    }
}
