use std::collections::HashMap;

use petgraph::prelude::*;

use super::Edge;
use crate::bundle::BundleKey;

/// A satisfying assignment as a graph of bundles and their direct dependencies.
///
/// Edge weights are the order the dependencies were declared in.
#[derive(Debug, Clone)]
pub struct ResolutionDomain {
	graph: StableDiGraph<BundleKey, usize>,
	root: NodeIndex,
}

impl ResolutionDomain {
	pub(crate) fn from_edges(root: &BundleKey, edges: &[Edge]) -> Self {
		let mut graph = StableDiGraph::<BundleKey, usize>::default();
		let mut nodes = HashMap::<BundleKey, NodeIndex>::new();
		let root_node = graph.add_node(root.clone());
		nodes.insert(root.clone(), root_node);

		for (i, edge) in edges.iter().enumerate() {
			let owner = *nodes.entry(edge.owner.clone()).or_insert_with(|| graph.add_node(edge.owner.clone()));
			let target = *nodes.entry(edge.target.clone()).or_insert_with(|| graph.add_node(edge.target.clone()));
			graph.add_edge(owner, target, i);
		}

		Self { graph, root: root_node }
	}

	pub fn root(&self) -> NodeIndex {
		self.root
	}

	pub fn bundle_key(&self, node: NodeIndex) -> Option<&BundleKey> {
		self.graph.node_weight(node)
	}

	/// Direct dependencies of `node` in declaration order.
	pub fn direct_dependencies(&self, node: NodeIndex) -> Vec<NodeIndex> {
		let mut edges: Vec<_> = self.graph.edges_directed(node, Outgoing)
			.map(|e| (*e.weight(), e.target()))
			.collect();
		edges.sort_by_key(|(order, _)| *order);
		edges.into_iter().map(|(_, target)| target).collect()
	}

	pub fn graph(&self) -> &StableDiGraph<BundleKey, usize> {
		&self.graph
	}
}
