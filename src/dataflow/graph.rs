use super::*;
use petgraph::{graph::NodeIndex, visit::EdgeRef, Graph};
use std::{
    collections::{BTreeSet, HashMap},
    io,
};

pub(super) fn build_graph(
    latencies: &[Latency],
    trace: &[Instruction],
) -> Result<ProgramContext, AnalysisError> {
    let mut graph = Graph::with_capacity(trace.len() + 2, 2 * trace.len() + 1);

    let entry = graph.add_node(Node::sentinel(Sequence::Entry));
    let exit = graph.add_node(Node::sentinel(Sequence::Exit));

    // Latest producer of every register written so far
    let mut writers: HashMap<Register, NodeIndex> = HashMap::new();
    // Instructions whose result nobody has read yet
    let mut live = BTreeSet::new();
    let mut instructions = Vec::with_capacity(trace.len());

    for (index, inst) in trace.iter().enumerate() {
        let latency = match latencies.get(inst.opcode) {
            Some(l) => *l,
            None => {
                return Err(AnalysisError::UnknownOpcode {
                    index,
                    opcode: inst.opcode,
                })
            }
        };

        // Resolve operands before this instruction's own write is recorded
        let producers = [
            (Dependency::Src1, resolve(&writers, inst.src1)),
            (Dependency::Src2, resolve(&writers, inst.src2)),
        ];

        let node = graph.add_node(Node {
            sequence: Sequence::Inst(index),
            destination: Some(inst.dest),
            latency,
        });

        for &(kind, producer) in producers.iter() {
            tracing::trace!(index, ?kind, producer = ?producer.map(|p| graph[p].sequence), "resolved operand");

            match producer {
                Some(p) => {
                    graph.add_edge(node, p, kind);
                    live.remove(&p);
                }
                None => {
                    graph.add_edge(node, entry, kind);
                }
            }
        }

        live.insert(node);
        writers.insert(inst.dest, node);
        instructions.push(node);
    }

    graph.add_edge(exit, entry, Dependency::Live);
    for node in live.iter() {
        graph.add_edge(exit, *node, Dependency::Live);
    }

    tracing::debug!(
        instructions = instructions.len(),
        live = live.len(),
        "built dependency graph"
    );

    Ok(ProgramContext {
        graph,
        entry,
        exit,
        instructions,
    })
}

fn resolve(writers: &HashMap<Register, NodeIndex>, src: Option<Register>) -> Option<NodeIndex> {
    src.and_then(|r| writers.get(&r).cloned())
}

/// Write the dependency graph of `ctx` as a Graphviz digraph.
pub fn print_graph<W>(ctx: &ProgramContext, mut writer: W) -> Result<(), io::Error>
where
    W: io::Write,
{
    let graph = ctx.graph();

    writeln!(writer, "digraph dependencies {{")?;

    for index in graph.node_indices() {
        let node = &graph[index];
        match node.sequence {
            Sequence::Entry => writeln!(writer, "  entry [shape=box];")?,
            Sequence::Exit => writeln!(writer, "  exit [shape=box];")?,
            Sequence::Inst(i) => writeln!(
                writer,
                "  i{0:} [label=\"I{0:} ({1:})\"];",
                i, node.latency
            )?,
        }
    }
    writeln!(writer)?;

    for edge in graph.raw_edges().iter() {
        write!(writer, "  {} -> ", dot_name(graph[edge.source()].sequence))?;
        write!(writer, "{} [label=\"", dot_name(graph[edge.target()].sequence))?;
        match edge.weight {
            Dependency::Src1 => write!(writer, "src1")?,
            Dependency::Src2 => write!(writer, "src2")?,
            Dependency::Live => write!(writer, "live")?,
        }
        writeln!(writer, "\"];")?;
    }

    writeln!(writer, "}}")?;

    Ok(())
}

fn dot_name(sequence: Sequence) -> String {
    match sequence {
        Sequence::Entry => "entry".to_owned(),
        Sequence::Exit => "exit".to_owned(),
        Sequence::Inst(i) => format!("i{}", i),
    }
}
