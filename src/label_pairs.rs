use std::collections::{BTreeSet, HashMap};

use log::debug;

use crate::horizon_index::HorizonIndex;
use crate::types::*;

/// `(distance, (vertex of the first label, vertex of the second label))`
pub type PairRecord<W> = (W, (NodeId, NodeId));

/// every cross label distance that some vertex discovered inside its local horizon,
/// grouped by the ordered label pair of the two endpoints at build time
pub struct LabelPairIndex<W: Distance> {
    pairs: HashMap<(Label, Label), BTreeSet<PairRecord<W>>>,
}

impl<W: Distance> LabelPairIndex<W> {

    pub fn build(horizon_index: &HorizonIndex<W>, labels: &[Label]) -> Self {
        let mut pairs: HashMap<(Label, Label), BTreeSet<PairRecord<W>>> = HashMap::new();

        for (node, record) in horizon_index.iter() {
            let node_label = labels[node as usize];

            for (distance, other) in &record.local {
                pairs.entry((node_label, labels[*other as usize]))
                    .or_default()
                    .insert((*distance, (node, *other)));
            }
        }

        let index = LabelPairIndex { pairs };
        debug!("label pair index done, {} label pairs, {} records", index.pairs.len(), index.len());

        index
    }

    /// records of the pair in ascending order
    pub fn records(&self, first: Label, second: Label) -> impl Iterator<Item = &PairRecord<W>> {
        self.pairs.get(&(first, second)).into_iter().flat_map(|records| records.iter())
    }

    pub fn num_pairs(&self) -> usize {
        self.pairs.len()
    }

    pub fn len(&self) -> usize {
        self.pairs.values().map(|records| records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
