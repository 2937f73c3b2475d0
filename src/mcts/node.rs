//! The MCTS tree node: visit counts, accumulated score, the untried-move
//! queue, children, and the cached evaluation. Generic over `GameAdapter` so
//! the concrete position/move types are known statically - no runtime
//! downcast of an abstract state is needed here.
//!
//! Ownership follows a strict parent-owns-children tree: a node holds
//! `Rc`s to its children, and each child holds only a `Weak` back-reference
//! to its parent, used solely for backpropagation. Dropping a node's last
//! `Rc` drops its whole subtree.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::{Rc, Weak};

use crate::error::SearchError;
use crate::evaluator::{Evaluator, NodeEvaluation};
use crate::game::{GameAdapter, Side};

pub type NodeRef<G> = Rc<RefCell<SearchNode<G>>>;

pub struct SearchNode<G: GameAdapter> {
    pub state: G::Position,
    pub incoming_move: Option<G::Move>,
    parent: Weak<RefCell<SearchNode<G>>>,
    pub children: Vec<NodeRef<G>>,
    untried: VecDeque<G::Move>,
    untried_seeded: bool,
    pub visits: u32,
    pub score: f64,
    pub subtree_size: u32,
    pub evaluation: Option<NodeEvaluation>,
}

impl<G: GameAdapter> SearchNode<G> {
    /// Builds a fresh root with no parent and empty statistics.
    pub fn new_root(state: G::Position) -> NodeRef<G> {
        Rc::new(RefCell::new(SearchNode {
            state,
            incoming_move: None,
            parent: Weak::new(),
            children: Vec::new(),
            untried: VecDeque::new(),
            untried_seeded: false,
            visits: 0,
            score: 0.0,
            subtree_size: 1,
            evaluation: None,
        }))
    }

    fn new_child(state: G::Position, incoming_move: G::Move, parent: &NodeRef<G>) -> NodeRef<G> {
        Rc::new(RefCell::new(SearchNode {
            state,
            incoming_move: Some(incoming_move),
            parent: Rc::downgrade(parent),
            children: Vec::new(),
            untried: VecDeque::new(),
            untried_seeded: false,
            visits: 0,
            score: 0.0,
            subtree_size: 1,
            evaluation: None,
        }))
    }

    fn ensure_untried_seeded(&mut self, adapter: &G) {
        if !self.untried_seeded {
            self.untried = adapter.legal_moves(&self.state).into_iter().collect();
            self.untried_seeded = true;
        }
    }

    pub fn is_terminal(&self, adapter: &G) -> bool {
        adapter.is_terminal(&self.state)
    }

    /// `untried` empty - does not imply evaluated.
    pub fn is_fully_expanded(&mut self, adapter: &G) -> bool {
        self.ensure_untried_seeded(adapter);
        self.untried.is_empty()
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluation.is_some()
    }

    /// Looks up the prior for `mv` in *this* node's own evaluation - callers
    /// evaluating a child's prior must call this on the parent with the
    /// child's `incoming_move` (invariant 6: priors live on the position
    /// where the move is legal, not on the position it leads to).
    pub fn get_prior(&self, mv: G::Move, adapter: &G) -> f64 {
        match &self.evaluation {
            Some(eval) => eval
                .priors
                .get(&adapter.move_to_uci(mv))
                .copied()
                .unwrap_or(0.0),
            None => 0.0,
        }
    }
}

/// Pops one untried move from `node`, applies it, and appends a fresh,
/// unevaluated child. Precondition: `node` has at least one untried move
/// (checked via `is_fully_expanded` by the driver); violating it is a
/// programmer error and panics, matching `SearchError::Invariant`'s role as
/// an internal-bug marker rather than a recoverable `Result`.
pub fn expand<G: GameAdapter>(node: &NodeRef<G>, adapter: &G) -> NodeRef<G> {
    let mv = {
        let mut n = node.borrow_mut();
        n.ensure_untried_seeded(adapter);
        match n.untried.pop_front() {
            Some(mv) => mv,
            None => panic!(
                "{}",
                SearchError::Invariant("expand called with no untried moves".to_string())
            ),
        }
    };
    let child_state = adapter.apply(&node.borrow().state, mv);
    let child = SearchNode::new_child(child_state, mv, node);
    node.borrow_mut().children.push(Rc::clone(&child));
    child
}

/// Evaluates `node` exactly once, returning the SideA-perspective value just
/// stored. Terminal positions get their exact result; otherwise `evaluator`
/// is consulted, falling back to `adapter.rollout` on `None` or on an
/// evaluator failure (spec's recovered `EvaluationError`).
pub fn evaluate<G, E>(node: &NodeRef<G>, adapter: &G, evaluator: Option<&E>) -> f64
where
    G: GameAdapter,
    E: Evaluator<G>,
{
    debug_assert!(
        !node.borrow().is_evaluated(),
        "evaluate called on an already-evaluated node"
    );
    let is_terminal = node.borrow().is_terminal(adapter);
    let evaluation = if is_terminal {
        let result = adapter.terminal_result(&node.borrow().state);
        NodeEvaluation::without_priors(result.side_a_value())
    } else {
        match evaluator {
            Some(ev) => match ev.evaluate(&node.borrow().state) {
                Ok(eval) => eval,
                Err(err) => {
                    log::debug!("evaluator failed ({err}), falling back to rollout");
                    NodeEvaluation::without_priors(adapter.rollout(&node.borrow().state))
                }
            },
            None => NodeEvaluation::without_priors(adapter.rollout(&node.borrow().state)),
        }
    };
    let value = evaluation.value;
    node.borrow_mut().evaluation = Some(evaluation);
    value
}

/// Adds `value` to `score` and `delta_visits` to `visits` at `node` and
/// every ancestor. `grew_by_one_node` additionally bumps `subtree_size`
/// along the same path by one, exactly when this iteration's `expand` call
/// actually added a new child below `node`.
pub fn backpropagate<G: GameAdapter>(
    node: &NodeRef<G>,
    value: f64,
    delta_visits: u32,
    grew_by_one_node: bool,
) {
    let parent = {
        let mut n = node.borrow_mut();
        n.score += value;
        n.visits += delta_visits;
        if grew_by_one_node {
            n.subtree_size += 1;
        }
        n.parent.clone()
    };
    if let Some(parent) = parent.upgrade() {
        backpropagate(&parent, value, delta_visits, grew_by_one_node);
    }
}

/// Selects the child maximizing PUCT score. Precondition: `node` has
/// children and is evaluated - violating it is a programmer error.
pub fn select_best_child<G: GameAdapter>(node: &NodeRef<G>, adapter: &G, cpuct: f64) -> NodeRef<G> {
    let n = node.borrow();
    if n.children.is_empty() {
        panic!(
            "{}",
            SearchError::Invariant("select_best_child called on a node with no children".to_string())
        );
    }
    let side_to_move = adapter.side_to_move(&n.state);
    let parent_visits = n.visits as f64;

    let mut best: Option<(usize, f64)> = None;
    for (index, child) in n.children.iter().enumerate() {
        let c = child.borrow();
        let child_visits = c.visits;
        let q = if child_visits > 0 {
            let raw = c.score / child_visits as f64;
            match side_to_move {
                Side::A => raw,
                Side::B => 1.0 - raw,
            }
        } else {
            0.5
        };
        let prior = c
            .incoming_move
            .map(|mv| n.get_prior(mv, adapter))
            .unwrap_or(0.0);
        let u = if prior > 0.0 {
            cpuct * prior * parent_visits.sqrt() / (1.0 + child_visits as f64)
        } else {
            cpuct * ((parent_visits + 1.0).ln() / (1.0 + child_visits as f64)).sqrt()
        };
        let score = q + u;
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((index, score));
        }
    }
    let (best_index, _) = best.expect("children non-empty, checked above");
    Rc::clone(&n.children[best_index])
}

/// Finds the child reached by `mv`, detaches it (dropping the old root and
/// all siblings), and returns it as the new root. If `mv` was never
/// explored, builds a fresh root from the post-move position instead.
pub fn advance_tree<G: GameAdapter>(root: &NodeRef<G>, adapter: &G, mv: G::Move) -> NodeRef<G> {
    let found = {
        let n = root.borrow();
        n.children
            .iter()
            .find(|child| {
                child
                    .borrow()
                    .incoming_move
                    .map_or(false, |cm| adapter.move_equals(cm, mv))
            })
            .cloned()
    };
    match found {
        Some(child) => {
            child.borrow_mut().parent = Weak::new();
            log::debug!("advance_tree: reused existing child, subtree_size={}", child.borrow().subtree_size);
            child
        }
        None => {
            log::debug!("advance_tree: move not found among explored children, building fresh root");
            let new_state = adapter.apply(&root.borrow().state, mv);
            SearchNode::new_root(new_state)
        }
    }
}
