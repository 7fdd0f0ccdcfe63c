use std::fmt::Display;
use std::str::FromStr;
use std::{path::Path, fs::File};
use std::io::{BufRead, BufReader, BufWriter, Write};

use crate::error::{OracleError, Result};
use crate::types::*;

/// edge list and optional labels as stored in a graph file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphData<W> {
    pub num_nodes: usize,
    pub edges: Vec<(NodeId, NodeId)>,
    pub weights: Vec<W>,
    pub labels: Option<Labels>,
}

/// reads a dimacs style graph file
///
/// `c` lines are comments, `p sp <nodes> <arcs>` gives the size, `a <source> <target> <weight>`
/// adds an arc and `l <node> <label>` sets a label. node ids in the file are one based.
/// without any `l` line the labels are `None`, otherwise unlisted vertices keep their own id as label.
pub fn read_graph_data<W: Distance + FromStr>(path: &dyn AsRef<Path>) -> Result<GraphData<W>> {
    let file = File::open(path)?;

    parse_graph_data(BufReader::new(file))
}

pub fn parse_graph_data<W: Distance + FromStr, R: BufRead>(reader: R) -> Result<GraphData<W>> {
    let mut num_nodes: Option<usize> = None;
    let mut edges: Vec<(NodeId, NodeId)> = Vec::new();
    let mut weights: Vec<W> = Vec::new();
    let mut labels: Option<Labels> = None;

    for (line_index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = line_index + 1;
        let split = line.split_whitespace().collect::<Vec<&str>>();

        match split.first() {
            None | Some(&"c") => continue,
            Some(&"p") => {
                if split.len() != 4 || split[1] != "sp" {
                    return Err(parse_error(line_number, "expected `p sp <nodes> <arcs>`"));
                }

                let nodes: usize = parse_field(&split, 2, line_number)?;
                let arcs: usize = parse_field(&split, 3, line_number)?;
                num_nodes = Some(nodes);
                edges.reserve(arcs);
                weights.reserve(arcs);
            },
            Some(&"a") => {
                let nodes = num_nodes.ok_or_else(|| parse_error(line_number, "arc before the problem line"))?;
                if split.len() != 4 {
                    return Err(parse_error(line_number, "expected `a <source> <target> <weight>`"));
                }

                let source_node = parse_node(&split, 1, nodes, line_number)?;
                let target_node = parse_node(&split, 2, nodes, line_number)?;
                let weight: W = parse_field(&split, 3, line_number)?;

                edges.push((source_node, target_node));
                weights.push(weight);
            },
            Some(&"l") => {
                let nodes = num_nodes.ok_or_else(|| parse_error(line_number, "label before the problem line"))?;
                if split.len() != 3 {
                    return Err(parse_error(line_number, "expected `l <node> <label>`"));
                }

                let node = parse_node(&split, 1, nodes, line_number)?;
                let label: Label = parse_field(&split, 2, line_number)?;

                labels.get_or_insert_with(|| (0..nodes as Label).collect())[node as usize] = label;
            },
            Some(other) => return Err(parse_error(line_number, &format!("unknown line type `{}`", other))),
        }
    }

    let num_nodes = num_nodes.ok_or_else(|| parse_error(0, "missing problem line"))?;

    Ok(GraphData {
        num_nodes,
        edges,
        weights,
        labels,
    })
}

/// writes the graph in the format understood by `read_graph_data`
pub fn export_graph_data<W: Distance + Display>(path: &dyn AsRef<Path>, data: &GraphData<W>) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    writeln!(&mut file, "p sp {} {}", data.num_nodes, data.edges.len())?;

    for ((source_node, target_node), weight) in data.edges.iter().zip(data.weights.iter()) {
        writeln!(&mut file, "a {} {} {}", source_node + 1, target_node + 1, weight)?;
    }

    if let Some(labels) = &data.labels {
        for (node, label) in labels.iter().enumerate() {
            writeln!(&mut file, "l {} {}", node + 1, label)?;
        }
    }

    file.flush()?;

    Ok(())
}

fn parse_error(line: usize, message: &str) -> OracleError {
    OracleError::Parse { line, message: message.to_string() }
}

fn parse_field<T: FromStr>(split: &[&str], index: usize, line: usize) -> Result<T> {
    split[index].parse().map_err(|_| parse_error(line, &format!("invalid value `{}`", split[index])))
}

/// converts a one based node id of the file into a zero based id
fn parse_node(split: &[&str], index: usize, num_nodes: usize, line: usize) -> Result<NodeId> {
    let node: NodeId = parse_field(split, index, line)?;

    if node == 0 || node as usize > num_nodes {
        return Err(parse_error(line, &format!("node {} is not within 1..={}", node, num_nodes)));
    }

    Ok(node - 1)
}
