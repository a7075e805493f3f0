//! Evaluation planning: strongly-connected components in topological order.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::graph::{DiGraph, NodeIndex};
use wf_core::EquipId;

use crate::graph::{FlowsheetGraph, PortDirection};

/// One unit of work for the solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalBlock {
    /// Equipment outside any cycle, evaluated once.
    Single(EquipId),
    /// Equipment forming a cycle, iterated to a fixed point.
    /// Members are in evaluation order, see [`FlowsheetGraph::evaluation_plan`].
    Iterative(Vec<EquipId>),
}

impl EvalBlock {
    pub fn members(&self) -> &[EquipId] {
        match self {
            EvalBlock::Single(id) => std::slice::from_ref(id),
            EvalBlock::Iterative(ids) => ids,
        }
    }

    pub fn is_iterative(&self) -> bool {
        matches!(self, EvalBlock::Iterative(_))
    }
}

/// Ordered list of blocks such that every block's producers come first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationPlan {
    pub blocks: Vec<EvalBlock>,
}

impl EvaluationPlan {
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EvalBlock> {
        self.blocks.iter()
    }

    pub fn iterative_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_iterative()).count()
    }
}

impl FlowsheetGraph {
    fn digraph(&self) -> DiGraph<EquipId, ()> {
        let mut g = DiGraph::with_capacity(self.equipment.len(), self.streams.len());
        for node in &self.equipment {
            g.add_node(node.id);
        }
        for s in &self.streams {
            g.add_edge(
                NodeIndex::new(s.source_equipment.idx()),
                NodeIndex::new(s.target_equipment.idx()),
                (),
            );
        }
        g
    }

    /// True if any connection path leads back to where it started.
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.digraph())
    }

    /// Condense the graph into blocks and order them topologically.
    ///
    /// Among blocks that are ready at the same time, the one holding the
    /// smallest external id goes first, so the plan does not depend on
    /// insertion order.
    ///
    /// Members of a cycle are ordered depth-first from the entry member
    /// (the smallest id fed from outside the cycle), children by ascending
    /// id, in reverse postorder. Every simple cycle then has exactly one
    /// stream running against the evaluation order.
    pub fn evaluation_plan(&self) -> EvaluationPlan {
        let g = self.digraph();
        let name = |id: EquipId| self.equipment[id.idx()].name.as_str();

        let mut components: Vec<Vec<EquipId>> = tarjan_scc(&g)
            .into_iter()
            .map(|scc| {
                let mut members: Vec<EquipId> = scc.into_iter().map(|n| g[n]).collect();
                members.sort_by(|a, b| name(*a).cmp(name(*b)));
                members
            })
            .collect();
        components.sort_by(|a, b| name(a[0]).cmp(name(b[0])));

        let mut component_of = vec![0usize; self.equipment.len()];
        for (c, members) in components.iter().enumerate() {
            for m in members {
                component_of[m.idx()] = c;
            }
        }

        // Condensed edges, deduplicated.
        let mut downstream: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); components.len()];
        for s in &self.streams {
            let (from, to) = (
                component_of[s.source_equipment.idx()],
                component_of[s.target_equipment.idx()],
            );
            if from != to {
                downstream[from].insert(to);
            }
        }
        let mut in_degree = vec![0usize; components.len()];
        for targets in &downstream {
            for &t in targets {
                in_degree[t] += 1;
            }
        }

        // Kahn's algorithm; components are pre-sorted by smallest member,
        // so the component index is the tie-break key.
        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0)
            .map(|(c, _)| Reverse(c))
            .collect();
        let mut blocks = Vec::with_capacity(components.len());
        while let Some(Reverse(c)) = ready.pop() {
            for &t in &downstream[c] {
                in_degree[t] -= 1;
                if in_degree[t] == 0 {
                    ready.push(Reverse(t));
                }
            }
            let members = std::mem::take(&mut components[c]);
            blocks.push(if members.len() == 1 {
                EvalBlock::Single(members[0])
            } else {
                EvalBlock::Iterative(self.sequence_cycle(members))
            });
        }

        EvaluationPlan { blocks }
    }

    /// Reorder the members of one cycle (given sorted by id) for
    /// Gauss-Seidel passes.
    fn sequence_cycle(&self, members: Vec<EquipId>) -> Vec<EquipId> {
        let name = |id: EquipId| self.equipment[id.idx()].name.as_str();
        let mut in_cycle = vec![false; self.equipment.len()];
        for m in &members {
            in_cycle[m.idx()] = true;
        }

        let fed_from_outside = |id: EquipId| {
            self.ports_of(id, PortDirection::Inlet).iter().any(|p| {
                p.boundary
                    || p
                        .stream
                        .is_some_and(|s| !in_cycle[self.streams[s.idx()].source_equipment.idx()])
            })
        };
        let entry = members
            .iter()
            .copied()
            .find(|&m| fed_from_outside(m))
            .unwrap_or(members[0]);

        let children = |id: EquipId| {
            let mut next: Vec<EquipId> = self
                .successors(id)
                .into_iter()
                .filter(|s| in_cycle[s.idx()])
                .collect();
            next.sort_by(|a, b| name(*a).cmp(name(*b)));
            next
        };

        let mut visited = vec![false; self.equipment.len()];
        let mut postorder = Vec::with_capacity(members.len());
        visited[entry.idx()] = true;
        let mut stack = vec![(entry, children(entry), 0usize)];
        while let Some((node, next, cursor)) = stack.last_mut() {
            let node = *node;
            let child = next.get(*cursor).copied();
            *cursor += 1;
            match child {
                Some(c) if !visited[c.idx()] => {
                    visited[c.idx()] = true;
                    stack.push((c, children(c), 0));
                }
                Some(_) => {}
                None => {
                    postorder.push(node);
                    stack.pop();
                }
            }
        }
        postorder.reverse();

        // A strongly-connected block is reachable from any member; keep
        // anything missed anyway.
        postorder.extend(members.into_iter().filter(|m| !visited[m.idx()]));
        postorder
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::GraphBuilder;
    use crate::graph::{PortSpec, StreamKind};

    use super::*;

    const RAW: &[StreamKind] = &[StreamKind::Raw];
    const SOURCE: &[PortSpec] = &[PortSpec::outlet("outlet", RAW)];
    const MIXER: &[PortSpec] = &[
        PortSpec::inlet("inlet", RAW),
        PortSpec::inlet("return", RAW).optional(),
        PortSpec::outlet("outlet", RAW),
    ];
    const SPLIT: &[PortSpec] = &[
        PortSpec::inlet("inlet", RAW),
        PortSpec::outlet("outlet", RAW),
        PortSpec::outlet("bleed", RAW),
    ];
    const SINK: &[PortSpec] = &[PortSpec::inlet("inlet", RAW)];

    fn names(g: &FlowsheetGraph, block: &EvalBlock) -> Vec<String> {
        block
            .members()
            .iter()
            .map(|id| g.equipment_node(*id).unwrap().name.clone())
            .collect()
    }

    #[test]
    fn chain_is_all_single_blocks() {
        let mut b = GraphBuilder::new();
        // Insert out of order to check the plan follows connections.
        b.add_equipment("C", "product", SINK).unwrap();
        b.add_equipment("A", "feed_source", SOURCE).unwrap();
        b.add_equipment("B", "splitter", SPLIT).unwrap();
        b.connect("S1", "A", "outlet", "B", "inlet").unwrap();
        b.connect("S2", "B", "outlet", "C", "inlet").unwrap();
        let g = b.build().unwrap();

        assert!(!g.has_cycles());
        let plan = g.evaluation_plan();
        let order: Vec<_> = plan.iter().map(|blk| names(&g, blk)).collect();
        assert_eq!(order, vec![vec!["A"], vec!["B"], vec!["C"]]);
        assert_eq!(plan.iterative_blocks(), 0);
    }

    #[test]
    fn recycle_forms_iterative_block() {
        let mut b = GraphBuilder::new();
        b.add_equipment("FEED", "feed_source", SOURCE).unwrap();
        b.add_equipment("T", "tank", MIXER).unwrap();
        b.add_equipment("SP", "splitter", SPLIT).unwrap();
        b.add_equipment("OUT", "product", SINK).unwrap();
        b.connect("S1", "FEED", "outlet", "T", "inlet").unwrap();
        b.connect("S2", "T", "outlet", "SP", "inlet").unwrap();
        b.connect("S3", "SP", "bleed", "T", "return").unwrap();
        b.connect("S4", "SP", "outlet", "OUT", "inlet").unwrap();
        let g = b.build().unwrap();

        assert!(g.has_cycles());
        let plan = g.evaluation_plan();
        assert_eq!(plan.len(), 3);
        assert_eq!(names(&g, &plan.blocks[0]), vec!["FEED"]);
        assert!(plan.blocks[1].is_iterative());
        // T is where the loop is entered, so it goes first.
        assert_eq!(names(&g, &plan.blocks[1]), vec!["T", "SP"]);
        assert_eq!(names(&g, &plan.blocks[2]), vec!["OUT"]);
    }

    #[test]
    fn cycle_members_follow_the_loop() {
        const PASS: &[PortSpec] = &[PortSpec::inlet("inlet", RAW), PortSpec::outlet("outlet", RAW)];
        let mut b = GraphBuilder::new();
        b.add_equipment("FEED", "feed_source", SOURCE).unwrap();
        b.add_equipment("TK", "tank", MIXER).unwrap();
        b.add_equipment("P1", "pump", PASS).unwrap();
        b.add_equipment("UF", "membrane", SPLIT).unwrap();
        b.add_equipment("SPL", "splitter", SPLIT).unwrap();
        b.add_equipment("OUT", "product", SINK).unwrap();
        b.add_equipment("BLEED", "waste", SINK).unwrap();
        b.connect("S1", "FEED", "outlet", "TK", "inlet").unwrap();
        b.connect("S2", "TK", "outlet", "P1", "inlet").unwrap();
        b.connect("S3", "P1", "outlet", "UF", "inlet").unwrap();
        b.connect("S4", "UF", "outlet", "OUT", "inlet").unwrap();
        b.connect("S5", "UF", "bleed", "SPL", "inlet").unwrap();
        b.connect("S6", "SPL", "outlet", "TK", "return").unwrap();
        b.connect("S7", "SPL", "bleed", "BLEED", "inlet").unwrap();
        let g = b.build().unwrap();

        let plan = g.evaluation_plan();
        let block = plan.iter().find(|blk| blk.is_iterative()).unwrap();
        assert_eq!(names(&g, block), vec!["TK", "P1", "UF", "SPL"]);

        // Only the return stream runs against the order.
        let pos = |id: EquipId| block.members().iter().position(|m| *m == id).unwrap();
        let backwards: Vec<_> = g
            .streams()
            .iter()
            .filter(|s| block.members().contains(&s.source_equipment))
            .filter(|s| block.members().contains(&s.target_equipment))
            .filter(|s| pos(s.target_equipment) <= pos(s.source_equipment))
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(backwards, vec!["S6"]);
    }

    #[test]
    fn independent_blocks_ordered_by_id() {
        let mut b = GraphBuilder::new();
        b.add_equipment("Z", "feed_source", SOURCE).unwrap();
        b.add_equipment("Y", "product", SINK).unwrap();
        b.add_equipment("B", "feed_source", SOURCE).unwrap();
        b.add_equipment("A", "product", SINK).unwrap();
        b.connect("S1", "Z", "outlet", "A", "inlet").unwrap();
        b.connect("S2", "B", "outlet", "Y", "inlet").unwrap();
        let g = b.build().unwrap();

        let order: Vec<_> = g
            .evaluation_plan()
            .iter()
            .flat_map(|blk| names(&g, blk))
            .collect();
        assert_eq!(order, vec!["B", "Y", "Z", "A"]);
    }

    #[test]
    fn empty_graph_has_empty_plan() {
        let g = GraphBuilder::new().build().unwrap();
        assert!(g.evaluation_plan().is_empty());
        assert!(!g.has_cycles());
    }
}
