//! Builder utilities for ergonomic behavior tree construction.
//!
//! This module provides helper functions to reduce boilerplate when building
//! behavior trees. Instead of writing out enum variants with their
//! bookkeeping fields, you can use shorter functions like `sequence(vec![...])`.

use std::time::Duration;

use crate::Node;

/// Creates a selector node.
#[inline]
pub fn selector<P, E>(children: Vec<Node<P, E>>) -> Node<P, E> {
    Node::Selector(children)
}

/// Creates a sequence node with its resume index at the start.
#[inline]
pub fn sequence<P, E>(children: Vec<Node<P, E>>) -> Node<P, E> {
    Node::Sequence {
        children,
        resume: 0,
    }
}

/// Creates a condition leaf.
#[inline]
pub fn condition<P, E>(predicate: P) -> Node<P, E> {
    Node::Condition(predicate)
}

/// Creates an action leaf.
#[inline]
pub fn action<P, E>(effect: E) -> Node<P, E> {
    Node::Action(effect)
}

/// Creates a cooldown decorator with no prior firing recorded.
#[inline]
pub fn cooldown<P, E>(child: Node<P, E>, interval: Duration) -> Node<P, E> {
    Node::Cooldown {
        child: Box::new(child),
        interval,
        last_fire: None,
    }
}
