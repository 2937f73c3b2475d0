//! Owns the root and runs the select/evaluate/expand/backpropagate loop
//! under iteration and wall-clock budgets, then picks the final move and
//! performs tree reuse on the next externally observed move.

use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use crate::config::SearchConfig;
use crate::evaluator::Evaluator;
use crate::game::{GameAdapter, Side};
use crate::mcts::node::{advance_tree, backpropagate, evaluate, expand, select_best_child, NodeRef, SearchNode};

/// How many of the root's children to report in `SearchSummary::top_moves`.
const SUMMARY_TOP_K: usize = 5;

/// Per-search debug/observability summary (spec §6's optional surface). Not
/// consumed by the search itself; purely for the shell to log or print.
#[derive(Debug, Clone)]
pub struct SearchSummary {
    pub iterations_run: u32,
    pub elapsed_s: f64,
    pub tree_size: u32,
    pub root_visits: u32,
    /// `(uci, visits, q, prior)`, sorted by visits descending.
    pub top_moves: Vec<(String, u32, f64, f64)>,
}

impl fmt::Display for SearchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "search: {} iterations in {:.3}s, tree_size={}, root_visits={}",
            self.iterations_run, self.elapsed_s, self.tree_size, self.root_visits
        )?;
        for (uci, visits, q, p) in &self.top_moves {
            writeln!(f, "  {uci}: visits={visits} q={q:.3} p={p:.3}")?;
        }
        Ok(())
    }
}

pub struct SearchDriver<G: GameAdapter, E: Evaluator<G>> {
    root: NodeRef<G>,
    adapter: G,
    evaluator: Option<E>,
    config: SearchConfig,
}

impl<G: GameAdapter, E: Evaluator<G>> SearchDriver<G, E> {
    pub fn new(state: G::Position, adapter: G, evaluator: Option<E>, config: SearchConfig) -> Self {
        SearchDriver {
            root: SearchNode::new_root(state),
            adapter,
            evaluator,
            config,
        }
    }

    pub fn root(&self) -> &NodeRef<G> {
        &self.root
    }

    /// Runs iterations until either budget is exhausted, then returns the
    /// debug summary. Both bounds are checked only between iterations.
    pub fn search(&mut self) -> SearchSummary {
        let start = Instant::now();
        if self.root.borrow().is_terminal(&self.adapter) {
            log::debug!("search: root is terminal, performing zero iterations");
            return self.summary(0, start.elapsed().as_secs_f64());
        }

        let mut iterations_run = 0u32;
        while iterations_run < self.config.max_iterations
            && start.elapsed().as_secs_f64() < self.config.max_seconds
        {
            self.run_one_iteration();
            iterations_run += 1;
        }

        if self.root.borrow().children.iter().all(|c| c.borrow().visits == 0) {
            log::warn!("search exhausted its budget without fully visiting any root child");
        }

        let summary = self.summary(iterations_run, start.elapsed().as_secs_f64());
        log::info!("{summary}");
        summary
    }

    fn run_one_iteration(&mut self) {
        // 1. Select: descend while evaluated, fully expanded, and non-terminal.
        let mut current = Rc::clone(&self.root);
        loop {
            let (evaluated, fully_expanded, terminal) = {
                let mut n = current.borrow_mut();
                let terminal = n.is_terminal(&self.adapter);
                (n.is_evaluated(), n.is_fully_expanded(&self.adapter), terminal)
            };
            if evaluated && fully_expanded && !terminal {
                current = select_best_child(&current, &self.adapter, self.config.cpuct);
            } else {
                break;
            }
        }

        // 2. Evaluate, if not already evaluated.
        let value = if current.borrow().is_evaluated() {
            current.borrow().evaluation.as_ref().unwrap().value
        } else {
            evaluate(&current, &self.adapter, self.evaluator.as_ref())
        };

        // 3. Expand, if evaluated, non-terminal, and not fully expanded.
        let is_terminal = current.borrow().is_terminal(&self.adapter);
        let grew_by_one_node = if is_terminal {
            false
        } else {
            let fully_expanded = current.borrow_mut().is_fully_expanded(&self.adapter);
            if fully_expanded {
                false
            } else {
                expand(&current, &self.adapter);
                true
            }
        };

        // 4. Backpropagate from the evaluated node (not the newly expanded child).
        backpropagate(&current, value, 1, grew_by_one_node);
    }

    /// The root's side-to-move-perspective Q for one of its children, used
    /// both for the final move choice and for the observability summary.
    fn child_q_from_root_perspective(&self, child: &NodeRef<G>) -> f64 {
        let visits = child.borrow().visits;
        if visits == 0 {
            return 0.0;
        }
        let raw = child.borrow().score / visits as f64;
        match self.adapter.side_to_move(&self.root.borrow().state) {
            Side::A => raw,
            Side::B => 1.0 - raw,
        }
    }

    /// Picks the root child with the most visits (ties broken by Q, then by
    /// first occurrence) and returns its `incoming_move`. `None` if the root
    /// has no children - a terminal root or an exhausted zero-budget search.
    pub fn best_move(&self) -> Option<G::Move> {
        let root = self.root.borrow();
        let mut best: Option<(usize, u32, f64)> = None;
        for (index, child) in root.children.iter().enumerate() {
            let visits = child.borrow().visits;
            let q = self.child_q_from_root_perspective(child);
            let is_better = match best {
                None => true,
                Some((_, best_visits, best_q)) => {
                    visits > best_visits || (visits == best_visits && q > best_q)
                }
            };
            if is_better {
                best = Some((index, visits, q));
            }
        }
        let (index, _, _) = best?;
        root.children[index].borrow().incoming_move
    }

    /// Reparents the tree onto the child reached by `mv` (or builds a fresh
    /// root if `mv` was never explored), preserving that subtree's
    /// statistics across searches.
    pub fn advance(&mut self, mv: G::Move) {
        self.root = advance_tree(&self.root, &self.adapter, mv);
    }

    fn summary(&self, iterations_run: u32, elapsed_s: f64) -> SearchSummary {
        let root = self.root.borrow();
        let mut top_moves: Vec<(String, u32, f64, f64)> = root
            .children
            .iter()
            .map(|child| {
                let mv = child.borrow().incoming_move.expect("root children always have an incoming_move");
                let uci = self.adapter.move_to_uci(mv);
                let visits = child.borrow().visits;
                let q = self.child_q_from_root_perspective(child);
                let prior = root.get_prior(mv, &self.adapter);
                (uci, visits, q, prior)
            })
            .collect();
        top_moves.sort_by(|a, b| b.1.cmp(&a.1));
        top_moves.truncate(SUMMARY_TOP_K);
        SearchSummary {
            iterations_run,
            elapsed_s,
            tree_size: root.subtree_size,
            root_visits: root.visits,
            top_moves,
        }
    }
}
