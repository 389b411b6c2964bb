//! Pre-order traversal over [`Thread`] nodes.
//!
//! Both walks use an explicit stack and report the *logical* parent of each
//! node for this walk, which for the start node is whatever the caller passes
//! in (re-walking a sub-thread in isolation usually passes `None`).

use std::fmt::Display;
use std::hash::Hash;

use crate::thread::Thread;

/// Position of a node within one walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visit<Id> {
    /// Pre-order position, starting at 0 for the start node.
    pub index: usize,
    /// Depth relative to the start node.
    pub depth: usize,
    /// Logical parent for this walk.
    pub parent: Option<Id>,
}

/// Visits `start` and then every descendant in pre-order.
pub fn walk<'a, Id, F>(start: &'a dyn Thread<Id = Id>, parent: Option<Id>, mut visit: F)
where
    Id: Copy + Eq + Hash + Display,
    F: FnMut(Visit<Id>, &'a dyn Thread<Id = Id>),
{
    let mut stack: Vec<(usize, Option<Id>, &'a dyn Thread<Id = Id>)> = vec![(0, parent, start)];
    let mut index = 0;
    while let Some((depth, parent, node)) = stack.pop() {
        visit(
            Visit {
                index,
                depth,
                parent,
            },
            node,
        );
        index += 1;
        let id = node.id();
        for child in node.children().iter().rev() {
            stack.push((depth + 1, Some(id), child.as_ref()));
        }
    }
}

/// Mutable counterpart of [`walk`].
pub fn walk_mut<'a, Id, F>(start: &'a mut dyn Thread<Id = Id>, parent: Option<Id>, mut visit: F)
where
    Id: Copy + Eq + Hash + Display,
    F: FnMut(Visit<Id>, &mut dyn Thread<Id = Id>),
{
    let mut stack: Vec<(usize, Option<Id>, &'a mut dyn Thread<Id = Id>)> =
        vec![(0, parent, start)];
    let mut index = 0;
    while let Some((depth, parent, node)) = stack.pop() {
        visit(
            Visit {
                index,
                depth,
                parent,
            },
            &mut *node,
        );
        index += 1;
        let id = node.id();
        for child in node.children_mut().iter_mut().rev() {
            stack.push((depth + 1, Some(id), child.as_mut()));
        }
    }
}

/// Number of nodes in the sub-thread rooted at `start`, including `start`.
pub fn num_nodes<Id: Copy + Eq + Hash + Display>(start: &dyn Thread<Id = Id>) -> usize {
    let mut count = 0;
    walk(start, None, |_, _| count += 1);
    count
}

#[cfg(test)]
pub(crate) mod tests {
    use ratatui::text::Text;

    use super::*;
    use crate::thread::{BoxedThread, ThreadEffect, ThreadMsg};

    /// Bare node used by the crate's unit tests.
    pub(crate) struct Node {
        pub id: u32,
        pub parent: Option<u32>,
        pub children: Vec<BoxedThread<u32>>,
        pub lines: usize,
        pub last_state: Option<crate::thread::DisplayState>,
        /// Misbehaves by answering display messages with an effect.
        pub echo_display: bool,
    }

    impl Node {
        pub fn new(id: u32, parent: Option<u32>, children: Vec<Node>) -> Self {
            Self {
                id,
                parent,
                children: children
                    .into_iter()
                    .map(|child| Box::new(child) as BoxedThread<u32>)
                    .collect(),
                lines: 1,
                last_state: None,
                echo_display: false,
            }
        }

        /// Builds a node and fixes up the parent links of the given children.
        pub fn branch(id: u32, children: Vec<Node>) -> Self {
            let children = children
                .into_iter()
                .map(|mut child| {
                    child.parent = Some(id);
                    child
                })
                .collect();
            Self::new(id, None, children)
        }

        pub fn leaf(id: u32) -> Self {
            Self::new(id, None, Vec::new())
        }

        pub fn with_lines(mut self, lines: usize) -> Self {
            self.lines = lines;
            self
        }
    }

    impl Thread for Node {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }

        fn parent(&self) -> Option<u32> {
            self.parent
        }

        fn children(&self) -> &[BoxedThread<u32>] {
            &self.children
        }

        fn children_mut(&mut self) -> &mut [BoxedThread<u32>] {
            &mut self.children
        }

        fn update(&mut self, msg: &ThreadMsg) -> Option<ThreadEffect> {
            match msg {
                ThreadMsg::Display(state) => {
                    self.last_state = Some(*state);
                    self.echo_display
                        .then(|| ThreadEffect::CopyText(format!("display {}", self.id)))
                }
                ThreadMsg::Copy => Some(ThreadEffect::CopyText(format!("node {}", self.id))),
            }
        }

        fn view(&self) -> Text<'static> {
            let mut text = Text::default();
            for line in 0..self.lines {
                text.push_line(format!("{}:{line}", self.id));
            }
            text
        }
    }

    // 0 -> {1 -> {3, 4}, 2}
    pub(crate) fn sample() -> Node {
        Node::branch(
            0,
            vec![
                Node::branch(1, vec![Node::leaf(3), Node::leaf(4)]),
                Node::leaf(2),
            ],
        )
    }

    #[test]
    fn walks_in_pre_order_with_depth_and_parent() {
        let tree = sample();
        let mut seen = Vec::new();
        walk(&tree, None, |visit, node| {
            seen.push((visit.index, node.id(), visit.depth, visit.parent));
        });

        assert_eq!(
            seen,
            vec![
                (0, 0, 0, None),
                (1, 1, 1, Some(0)),
                (2, 3, 2, Some(1)),
                (3, 4, 2, Some(1)),
                (4, 2, 1, Some(0)),
            ]
        );
    }

    #[test]
    fn sub_thread_walk_uses_logical_parent() {
        let tree = sample();
        let sub = tree.children()[0].as_ref();
        let mut parents = Vec::new();
        walk(sub, None, |visit, node| parents.push((node.id(), visit.parent)));

        assert_eq!(parents, vec![(1, None), (3, Some(1)), (4, Some(1))]);
    }

    #[test]
    fn walk_mut_reaches_every_node() {
        let mut tree = sample();
        let mut order = Vec::new();
        walk_mut(&mut tree, None, |visit, node| {
            node.update(&ThreadMsg::Display(crate::thread::DisplayState {
                depth: visit.depth,
                ..Default::default()
            }));
            order.push(node.id());
        });

        assert_eq!(order, vec![0, 1, 3, 4, 2]);
        let leaf = &tree.children[0].children()[1];
        assert_eq!(leaf.id(), 4);
    }

    #[test]
    fn counts_nodes() {
        let tree = sample();
        assert_eq!(num_nodes(&tree), 5);
        assert_eq!(num_nodes(tree.children()[1].as_ref()), 1);
    }
}
