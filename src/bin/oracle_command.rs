use std::path::Path;
use std::process;

use clap::{Args, Parser};
use log::{error, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use labeled_distance_oracle::types::{Label, NodeId, Weight};
use labeled_distance_oracle::utils::io::read_graph_data;
use labeled_distance_oracle::utils::measure_time;
use labeled_distance_oracle::{LabeledOracle, OracleConfig, Result};

#[derive(Parser)]
struct Opts {

    #[clap(subcommand)]
    subcmd: SubCommand
}

#[derive(Parser)]
enum SubCommand {
    ToLabel(ToLabelCommand),
    BetweenLabels(BetweenLabelsCommand),
    RelabelAndQuery(RelabelAndQueryCommand),
    Experiment(ExperimentCommand)
}

#[derive(Args)]
struct BuildOptions {

    /// path to the graph file
    #[clap(short, long)]
    graph_path: String,

    /// number of portals, defaults to the square root of the number of vertices
    #[clap(short, long)]
    portals: Option<usize>,

    /// seed used to pick the portals
    #[clap(long, default_value="0")]
    seed: u64,

    /// build the index on all cores
    #[clap(long)]
    parallel: bool
}

#[derive(Parser)]
struct ToLabelCommand {

    #[clap(flatten)]
    build: BuildOptions,

    /// zero based source vertex
    #[clap(short, long)]
    vertex: NodeId,

    /// label to search for
    #[clap(short, long)]
    label: Label
}

#[derive(Parser)]
struct BetweenLabelsCommand {

    #[clap(flatten)]
    build: BuildOptions,

    #[clap(long)]
    first_label: Label,

    #[clap(long)]
    second_label: Label
}

#[derive(Parser)]
struct RelabelAndQueryCommand {

    #[clap(flatten)]
    build: BuildOptions,

    /// zero based vertex to relabel
    #[clap(short, long)]
    vertex: NodeId,

    /// new label of the vertex
    #[clap(short, long)]
    label: Label,

    /// label queried from the relabeled vertex afterwards
    #[clap(short, long)]
    target_label: Label
}

#[derive(Parser)]
struct ExperimentCommand {

    #[clap(flatten)]
    build: BuildOptions,

    /// number of random queries of each kind
    #[clap(short, long, default_value="1000")]
    num_queries: usize
}

fn main() {
    env_logger::init();

    let opts: Opts = Opts::parse();

    if let Err(err) = run(opts.subcmd) {
        error!("{}", err);
        process::exit(1);
    }
}

fn run(subcmd: SubCommand) -> Result<()> {
    match subcmd {
        SubCommand::ToLabel(command) => {
            let oracle = build_oracle(&command.build)?;
            let result = oracle.distance_to_label(command.vertex, command.label)?;

            match result.witness {
                Some(witness) => println!("{},{}", result.distance, witness),
                None => println!("unreachable"),
            }
        },
        SubCommand::BetweenLabels(command) => {
            let oracle = build_oracle(&command.build)?;
            let result = oracle.distance_between_labels(command.first_label, command.second_label);

            match result.witnesses {
                Some((first, second)) => println!("{},{},{}", result.distance, first, second),
                None => println!("unreachable"),
            }
        },
        SubCommand::RelabelAndQuery(command) => {
            let mut oracle = build_oracle(&command.build)?;
            oracle.set_label(command.vertex, command.label)?;
            let result = oracle.distance_to_label(command.vertex, command.target_label)?;

            match result.witness {
                Some(witness) => println!("{},{}", result.distance, witness),
                None => println!("unreachable"),
            }
        },
        SubCommand::Experiment(command) => {
            let (build_time, oracle) = measure_time(|| build_oracle(&command.build));
            let oracle = oracle?;
            let stats = oracle.stats();

            println!("build,{:?},{},{},{:.2},{}", build_time.as_nanos(), stats.num_nodes, stats.num_portals, stats.average_local_entries, stats.pair_records);

            let mut rng = StdRng::seed_from_u64(command.build.seed);
            let labels = oracle.labels().to_vec();
            let num_nodes = oracle.num_nodes();

            let to_label_queries: Vec<(NodeId, Label)> = (0..command.num_queries)
                .map(|_| (rng.gen_range(0..num_nodes) as NodeId, labels[rng.gen_range(0..num_nodes)]))
                .collect();
            let between_queries: Vec<(Label, Label)> = (0..command.num_queries)
                .map(|_| (labels[rng.gen_range(0..num_nodes)], labels[rng.gen_range(0..num_nodes)]))
                .collect();

            let (to_label_time, reachable) = measure_time(|| {
                let mut reachable = 0;
                for (node, label) in &to_label_queries {
                    if oracle.distance_to_label(*node, *label)?.is_reachable() {
                        reachable += 1;
                    }
                }

                Ok::<usize, labeled_distance_oracle::OracleError>(reachable)
            });
            println!("to_label,{:?},{}", to_label_time.as_nanos() / command.num_queries.max(1) as u128, reachable?);

            let (between_time, reachable) = measure_time(|| {
                between_queries.iter()
                    .filter(|(first, second)| oracle.distance_between_labels(*first, *second).is_reachable())
                    .count()
            });
            println!("between_labels,{:?},{}", between_time.as_nanos() / command.num_queries.max(1) as u128, reachable);
        }
    }

    Ok(())
}

fn build_oracle(options: &BuildOptions) -> Result<LabeledOracle<Weight>> {
    let data = read_graph_data::<Weight>(&Path::new(&options.graph_path))?;
    info!("graph loaded. num_nodes: {}, num_edges: {}", data.num_nodes, data.edges.len());

    let config = OracleConfig {
        portal_count: options.portals,
        seed: options.seed,
        parallel: options.parallel,
    };

    LabeledOracle::from_edges(data.num_nodes, &data.edges, &data.weights, data.labels, &config)
}
