//! The behavior tree node type and its leaf traits.
//!
//! A tree is a [`Node`] value: composites own their children exclusively and
//! leaves carry payload values (a predicate kind or an action kind) supplied
//! by the embedding crate. Keeping leaves as plain data rather than closures
//! makes trees inspectable and loadable from files.

use std::time::{Duration, Instant};

use crate::Status;

/// A pure check over the decision context.
///
/// Predicates must not mutate the context; any randomness they consume has to
/// be pre-rolled into the context by the caller.
pub trait Predicate<C> {
    fn check(&self, ctx: &C) -> bool;
}

/// A leaf effect evaluated against the mutable context.
///
/// Command-emitting effects write into the context's output slot and return
/// `Success`; long-lived custom leaves may return `Running` to suspend the
/// enclosing sequence until the next tick.
pub trait Effect<C> {
    fn apply(&self, ctx: &mut C) -> Status;
}

/// A behavior tree node, generic over the leaf payload types.
///
/// `P` is the condition payload (implements [`Predicate`] for the context the
/// tree is ticked against) and `E` is the action payload (implements
/// [`Effect`]). Composite nodes own their children; the only mutable per-tick
/// state is `Sequence::resume` and `Cooldown::last_fire`, which is safe
/// because every entity owns its own tree instance.
#[derive(Debug, Clone)]
pub enum Node<P, E> {
    /// Evaluates children in order and returns the first result that is not
    /// `Failure`. An empty selector fails.
    Selector(Vec<Node<P, E>>),

    /// Evaluates children in order, resuming from `resume` after a `Running`
    /// child. `Failure` resets the index and fails; exhausting all children
    /// resets the index and succeeds. An empty sequence succeeds.
    Sequence { children: Vec<Node<P, E>>, resume: usize },

    /// Pure predicate over the context.
    Condition(P),

    /// Leaf effect; the built-in command emitters always succeed.
    Action(E),

    /// Gates its child behind a wall-clock interval.
    ///
    /// Fails without evaluating the child while less than `interval` has
    /// elapsed since the last child `Success`. Wall-clock time (not simulation
    /// delta time) is deliberate inherited behavior; see the crate docs.
    Cooldown {
        child: Box<Node<P, E>>,
        interval: Duration,
        last_fire: Option<Instant>,
    },
}

impl<P, E> Node<P, E> {
    /// Evaluate this node against the given context.
    pub fn tick<C>(&mut self, ctx: &mut C) -> Status
    where
        P: Predicate<C>,
        E: Effect<C>,
    {
        match self {
            Node::Selector(children) => {
                for child in children {
                    match child.tick(ctx) {
                        Status::Failure => continue,
                        other => return other,
                    }
                }
                Status::Failure
            }
            Node::Sequence { children, resume } => {
                while *resume < children.len() {
                    match children[*resume].tick(ctx) {
                        Status::Success => *resume += 1,
                        Status::Running => return Status::Running,
                        Status::Failure => {
                            *resume = 0;
                            return Status::Failure;
                        }
                    }
                }
                *resume = 0;
                Status::Success
            }
            Node::Condition(predicate) => {
                if predicate.check(ctx) {
                    Status::Success
                } else {
                    Status::Failure
                }
            }
            Node::Action(effect) => effect.apply(ctx),
            Node::Cooldown {
                child,
                interval,
                last_fire,
            } => {
                if let Some(fired) = last_fire
                    && fired.elapsed() < *interval
                {
                    return Status::Failure;
                }
                let status = child.tick(ctx);
                if status == Status::Success {
                    *last_fire = Some(Instant::now());
                }
                status
            }
        }
    }

    /// Number of nodes in this tree, including self.
    pub fn size(&self) -> usize {
        match self {
            Node::Selector(children) => 1 + children.iter().map(Node::size).sum::<usize>(),
            Node::Sequence { children, .. } => {
                1 + children.iter().map(Node::size).sum::<usize>()
            }
            Node::Condition(_) | Node::Action(_) => 1,
            Node::Cooldown { child, .. } => 1 + child.size(),
        }
    }

    /// Depth of this tree (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        match self {
            Node::Selector(children) => {
                1 + children.iter().map(Node::depth).max().unwrap_or(0)
            }
            Node::Sequence { children, .. } => {
                1 + children.iter().map(Node::depth).max().unwrap_or(0)
            }
            Node::Condition(_) | Node::Action(_) => 1,
            Node::Cooldown { child, .. } => 1 + child.depth(),
        }
    }
}
