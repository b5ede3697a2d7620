mod depth;
mod graph;
mod order;
mod registry;
mod report;
mod trace_parser;

use petgraph::{graph::NodeIndex, visit::EdgeRef, Graph};
use std::{collections::HashSet, io};
use thiserror::Error;

pub use self::depth::critical_path;
pub use self::graph::print_graph;
pub use self::order::topological_order;
pub use self::registry::{ContextRegistry, ProgHandle};
pub use self::report::{InstructionReport, Report};
pub use self::trace_parser::{read_latencies, read_trace};

/// Dependency graph of one analysed trace.
///
/// Built once by [`ProgramContext::analyze`], read-only afterwards. All
/// queries take `&self`, so a context can be shared between readers.
#[derive(Debug)]
pub struct ProgramContext {
	graph: Graph<Node, Dependency>,
	entry: NodeIndex,
	exit: NodeIndex,
	instructions: Vec<NodeIndex>,
}

impl ProgramContext {
	/// Build the RAW dependency graph for `trace`.
	pub fn analyze(latencies: &[Latency], trace: &[Instruction]) -> Result<Self, AnalysisError> {
		graph::build_graph(latencies, trace)
	}

	/// Number of instructions in the analysed trace.
	pub fn len(&self) -> usize {
		self.instructions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.instructions.is_empty()
	}

	/// Cycles instruction `inst` has to wait for its operands, assuming
	/// unlimited execution resources.
	pub fn inst_depth(&self, inst: usize) -> Result<Depth, AnalysisError> {
		let node = self.instruction(inst)?;
		Ok(self.depth_from(node))
	}

	/// Producers of both source operands of `inst`. `None` means the operand
	/// has no producer inside the trace.
	pub fn inst_deps(&self, inst: usize) -> Result<(Option<usize>, Option<usize>), AnalysisError> {
		let node = self.instruction(inst)?;

		let mut deps = (None, None);
		for edge in self.graph.edges(node) {
			let producer = self.graph[edge.target()].sequence.index();
			match edge.weight() {
				Dependency::Src1 => deps.0 = producer,
				Dependency::Src2 => deps.1 = producer,
				Dependency::Live => (),
			}
		}

		Ok(deps)
	}

	/// Length of the critical path through the whole trace.
	pub fn prog_depth(&self) -> Depth {
		self.depth_from(self.exit)
	}

	/// Destroy the graph, returning how many distinct nodes were released.
	pub fn release(self) -> usize {
		// Dedup pass: every node is reachable from the exit sentinel, shared
		// ancestors show up once.
		let reachable = topological_order(&self.graph, self.exit)
			.into_iter()
			.collect::<HashSet<_>>();

		// The arena owns each node exactly once, drop them one by one
		let (nodes, _) = self.graph.into_nodes_edges();
		let mut released = 0;
		for (i, node) in nodes.into_iter().enumerate() {
			if !reachable.contains(&NodeIndex::new(i)) {
				tracing::warn!(sequence = ?node.weight.sequence, "releasing unreachable node");
			}
			drop(node);
			released += 1;
		}

		tracing::debug!(released, reachable = reachable.len(), "released program context");

		released
	}

	/// Underlying arena. Edges point from a consumer to its producers.
	pub fn graph(&self) -> &Graph<Node, Dependency> {
		&self.graph
	}

	/// Arena index of the node with the given sequence.
	pub fn node(&self, sequence: Sequence) -> Option<NodeIndex> {
		match sequence {
			Sequence::Entry => Some(self.entry),
			Sequence::Exit => Some(self.exit),
			Sequence::Inst(i) => self.instructions.get(i).cloned(),
		}
	}

	pub(super) fn instruction(&self, inst: usize) -> Result<NodeIndex, AnalysisError> {
		self.instructions
			.get(inst)
			.cloned()
			.ok_or(AnalysisError::NotFound { index: inst })
	}

	fn depth_from(&self, root: NodeIndex) -> Depth {
		let order = topological_order(&self.graph, root);
		let depths = critical_path(&self.graph, &order);

		// Every path ends in the entry sentinel, which is ordered last
		order
			.last()
			.and_then(|last| depths.get(last))
			.cloned()
			.unwrap_or(0)
	}
}

#[derive(Debug, Error)]
pub enum AnalysisError {
	#[error("instruction {index} is not part of the trace")]
	NotFound { index: usize },

	#[error("program handle {handle} is not valid")]
	InvalidHandle { handle: ProgHandle },

	#[error("instruction {index} uses opcode {opcode} which has no latency")]
	UnknownOpcode { index: usize, opcode: Opcode },
}

#[derive(Debug, Error)]
pub enum TraceError {
	#[error("could not read input: {0}")]
	Io(#[from] io::Error),

	#[error("could not parse line {line}: {content:?}")]
	ParseLine { line: usize, content: String },
}

pub type Register = u32;
pub type Opcode = usize;
pub type Latency = u32;
pub type Depth = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
	pub opcode: Opcode,
	pub src1: Option<Register>,
	pub src2: Option<Register>,
	pub dest: Register,
}

impl Instruction {
	/// Build an instruction from the raw trace encoding, where a negative
	/// source register means the operand is unused.
	pub fn from_raw(opcode: Opcode, src1: i32, src2: i32, dest: Register) -> Self {
		// Non-negative i32 values always fit a register number
		let register = |src: i32| if src < 0 { None } else { Some(src as Register) };

		Instruction {
			opcode,
			src1: register(src1),
			src2: register(src2),
			dest,
		}
	}
}

/// Position of a node in the trace, with the two sentinels at either end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sequence {
	Entry,
	Inst(usize),
	Exit,
}

impl Sequence {
	/// Trace index of an instruction node, `None` for the sentinels.
	pub fn index(self) -> Option<usize> {
		match self {
			Sequence::Inst(i) => Some(i),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
	pub sequence: Sequence,
	pub destination: Option<Register>,
	pub latency: Latency,
}

impl Node {
	fn sentinel(sequence: Sequence) -> Self {
		Node {
			sequence,
			destination: None,
			latency: 0,
		}
	}
}

/// Edge weight. `Src1`/`Src2` link an instruction to the producers of its
/// operands, `Live` links the exit sentinel to values nobody reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependency {
	Src1,
	Src2,
	Live,
}
