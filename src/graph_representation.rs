use crate::error::{OracleError, Result};
use crate::types::*;
use std::ops::Range;

/// read-only view on a directed, weighted graph
///
/// the oracle only ever reads through this trait. its portal bound assumes the graph is
/// effectively symmetric: for every arc u -> v there has to be a path v -> u of the same weight,
/// usually because every edge was inserted in both directions.
pub trait Graph {

    type Weight: Distance;

    fn node_ids(&self) -> Range<NodeId>;
    fn edge_ids(&self, node: NodeId) -> Range<EdgeId>;
    fn target_id(&self, node: NodeId, edge_id: EdgeId) -> NodeId;
    fn weight(&self, node: NodeId, edge_id: EdgeId) -> Self::Weight;

    fn num_nodes(&self) -> usize {
        self.node_ids().len()
    }
}

/// adjacency array representation: the arcs of node `v` are stored at `first_edge[v]..first_edge[v + 1]`
pub struct GraphArray<W: Distance = Weight> {

    first_edge: Vec<EdgeId>,
    target_node: Vec<NodeId>,
    weights: Vec<W>,
}

impl<W: Distance> GraphArray<W> {

    pub fn new(first_edge: EdgeIds, target_node: NodeIds, weights: Vec<W>) -> GraphArray<W> {
        GraphArray {
            first_edge,
            target_node,
            weights,
        }
    }

    /// builds the graph from an edge list, inserting every edge in both directions
    pub fn from_undirected_edges(num_nodes: usize, edges: &[(NodeId, NodeId)], weights: &[W]) -> Result<GraphArray<W>> {
        validate_edges(num_nodes, edges, weights)?;

        let mut arcs: Vec<Vec<(NodeId, W)>> = vec![Vec::new(); num_nodes];
        for ((source_node, target_node), weight) in edges.iter().zip(weights.iter()) {
            arcs[*source_node as usize].push((*target_node, *weight));
            arcs[*target_node as usize].push((*source_node, *weight));
        }

        Ok(GraphArray::from_arcs(&arcs))
    }

    /// builds the graph from an edge list, keeping the direction of each edge
    pub fn from_directed_edges(num_nodes: usize, edges: &[(NodeId, NodeId)], weights: &[W]) -> Result<GraphArray<W>> {
        validate_edges(num_nodes, edges, weights)?;

        let mut arcs: Vec<Vec<(NodeId, W)>> = vec![Vec::new(); num_nodes];
        for ((source_node, target_node), weight) in edges.iter().zip(weights.iter()) {
            arcs[*source_node as usize].push((*target_node, *weight));
        }

        Ok(GraphArray::from_arcs(&arcs))
    }

    fn from_arcs(arcs: &[Vec<(NodeId, W)>]) -> GraphArray<W> {
        let num_vertices = arcs.len();

        let mut first_edge: EdgeIds = vec![0; num_vertices + 1];
        let mut target_node: NodeIds = Vec::new();
        let mut weights: Vec<W> = Vec::new();

        let mut first_edge_index = 0;

        for node_index in 0..num_vertices {
            first_edge[node_index] = first_edge_index;

            for (adj_node, weight) in &arcs[node_index] {
                target_node.push(*adj_node);
                weights.push(*weight);
                first_edge_index += 1;
            }
        }

        first_edge[num_vertices] = first_edge_index;

        GraphArray::new(first_edge, target_node, weights)
    }

    pub fn num_edges(&self) -> usize {
        self.target_node.len()
    }
}

/// adjacency list representation, handy for building small graphs edge by edge
pub struct GraphList<W: Distance = Weight> {

    edges: Vec<Vec<NodeId>>,
    weights: Vec<Vec<W>>,
}

impl<W: Distance> GraphList<W> {

    pub fn new(num_nodes: usize) -> GraphList<W> {
        GraphList {
            edges: vec![Vec::new(); num_nodes],
            weights: vec![Vec::new(); num_nodes],
        }
    }

    pub fn add_edge(&mut self, start: NodeId, end: NodeId, weight: W) {
        self.edges[start as usize].push(end);
        self.weights[start as usize].push(weight);
    }

    pub fn add_undirected_edge(&mut self, first: NodeId, second: NodeId, weight: W) {
        self.add_edge(first, second, weight);
        self.add_edge(second, first, weight);
    }
}

impl<W: Distance> Graph for GraphArray<W> {

    type Weight = W;

    fn node_ids(&self) -> Range<NodeId> {
        0..(self.first_edge.len().saturating_sub(1) as NodeId)
    }

    fn edge_ids(&self, node: NodeId) -> Range<EdgeId> {
        self.first_edge[node as usize]..self.first_edge[(node as usize) + 1]
    }

    fn target_id(&self, _node: NodeId, edge_id: EdgeId) -> NodeId {
        self.target_node[edge_id as usize]
    }

    fn weight(&self, _node: NodeId, edge_id: EdgeId) -> W {
        self.weights[edge_id as usize]
    }
}

impl<W: Distance> Graph for GraphList<W> {

    type Weight = W;

    fn node_ids(&self) -> Range<NodeId> {
        0..(self.edges.len() as NodeId)
    }

    fn edge_ids(&self, node: NodeId) -> Range<EdgeId> {
        0..(self.edges[node as usize].len() as EdgeId)
    }

    fn target_id(&self, node: NodeId, edge_id: EdgeId) -> NodeId {
        self.edges[node as usize][edge_id as usize]
    }

    fn weight(&self, node: NodeId, edge_id: EdgeId) -> W {
        self.weights[node as usize][edge_id as usize]
    }
}

/// rejects edge lists the shortest path searches can not handle:
/// endpoints outside of the vertex range, negative weights and weights that reach infinity
pub fn validate_edges<W: Distance>(num_nodes: usize, edges: &[(NodeId, NodeId)], weights: &[W]) -> Result<()> {
    if num_nodes == 0 {
        return Err(OracleError::EmptyGraph);
    }

    if edges.len() != weights.len() {
        return Err(OracleError::WeightCountMismatch { edges: edges.len(), weights: weights.len() });
    }

    for (edge, ((source_node, target_node), weight)) in edges.iter().zip(weights.iter()).enumerate() {
        if *source_node as usize >= num_nodes || *target_node as usize >= num_nodes {
            return Err(OracleError::EdgeOutOfRange { edge, source_node: *source_node, target_node: *target_node, num_nodes });
        }

        if weight.is_negative() {
            return Err(OracleError::NegativeWeight { edge, weight: format!("{:?}", weight) });
        }

        if weight.is_infinite() {
            return Err(OracleError::WeightOutOfRange { edge, weight: format!("{:?}", weight) });
        }
    }

    Ok(())
}

/// same checks as [`validate_edges`] for a graph that is already built,
/// arcs are numbered in the order `node_ids` and `edge_ids` visit them
pub fn validate_graph<G: Graph>(graph: &G) -> Result<()> {
    let num_nodes = graph.num_nodes();
    if num_nodes == 0 {
        return Err(OracleError::EmptyGraph);
    }

    let mut edge = 0;
    for node in graph.node_ids() {
        for edge_id in graph.edge_ids(node) {
            let target_node = graph.target_id(node, edge_id);
            if target_node as usize >= num_nodes {
                return Err(OracleError::EdgeOutOfRange { edge, source_node: node, target_node, num_nodes });
            }

            let weight = graph.weight(node, edge_id);
            if weight.is_negative() {
                return Err(OracleError::NegativeWeight { edge, weight: format!("{:?}", weight) });
            }

            if weight.is_infinite() {
                return Err(OracleError::WeightOutOfRange { edge, weight: format!("{:?}", weight) });
            }

            edge += 1;
        }
    }

    Ok(())
}
