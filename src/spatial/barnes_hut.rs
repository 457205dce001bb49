//! Barnes-Hut tree for approximating inverse-distance interactions.
//!
//! The tree recursively partitions an axis-aligned square (cube in 3D) into
//! `2^D` equal children. Every tree node keeps the total mass and the
//! mass-weighted center of mass of all bodies below it, updated incrementally
//! on each insertion. During force evaluation a distant subtree is replaced by
//! a single point mass at its center of mass, which turns the all-pairs
//! `O(n²)` interaction into roughly `O(n log n)`.
//!
//! Tree nodes live in one arena (`Vec<TreeNode>`) and refer to each other by
//! index. The children of a subdivided node are allocated contiguously, so a
//! node only needs the index of its first child. The root is always index 0.
//!
//! # Tie-breaking
//!
//! A body whose coordinate equals the splitting plane goes to the upper half
//! on that axis (`coord >= center`), so every body lands in exactly one child.
//! Bodies sharing a position can never be separated; inserting one is
//! rejected before the tree is touched.
//!
//! # References
//!
//! - Barnes & Hut, "A hierarchical O(N log N) force-calculation algorithm" (1986)

use std::collections::VecDeque;
use std::ops::Range;

use crate::error::{LayoutError, Result};
use crate::graph::NodeId;
use crate::math::{VecN, VectorOps};
use crate::physics::PhysicsBody;

/// Arena index of the root node.
pub const ROOT: usize = 0;

/// Maximum subdivision depth before two bodies count as coincident.
pub const MAX_DEPTH: usize = 64;

/// State of a tree node. Promotion is monotonic: `Empty -> Body -> Node`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Empty,
    Body,
    Node,
}

/// Snapshot of a body taken at insertion time.
///
/// Positions do not change while forces are accumulated, so the tree never
/// needs to reach back into the solver's body store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeBody<const D: usize> {
    pub id: NodeId,
    pub position: VecN<D>,
    pub mass: f64,
}

impl<const D: usize> From<&PhysicsBody<D>> for TreeBody<D> {
    fn from(body: &PhysicsBody<D>) -> Self {
        Self {
            id: body.id,
            position: body.position,
            mass: body.mass,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Contents<const D: usize> {
    Empty,
    Body(TreeBody<D>),
    Node { first_child: usize },
}

/// One region of the tree.
#[derive(Debug, Clone)]
pub struct TreeNode<const D: usize> {
    parent: Option<usize>,
    contents: Contents<D>,
    /// Center of this node's bounding square.
    pub center: VecN<D>,
    /// Half the side length of the bounding square.
    pub half_distance: f64,
    /// Mass-weighted average position of every body in the subtree.
    pub center_of_mass: VecN<D>,
    /// Total mass of every body in the subtree.
    pub mass: f64,
}

impl<const D: usize> TreeNode<D> {
    fn new(center: VecN<D>, half_distance: f64, parent: Option<usize>) -> Self {
        Self {
            parent,
            contents: Contents::Empty,
            center,
            half_distance,
            center_of_mass: VecN::zeros(),
            mass: 0.0,
        }
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    pub fn node_type(&self) -> NodeType {
        match self.contents {
            Contents::Empty => NodeType::Empty,
            Contents::Body(_) => NodeType::Body,
            Contents::Node { .. } => NodeType::Node,
        }
    }

    /// The body held directly by a `Body` node.
    pub fn body(&self) -> Option<&TreeBody<D>> {
        match &self.contents {
            Contents::Body(body) => Some(body),
            _ => None,
        }
    }

    /// Arena indices of the children; empty unless the node is subdivided.
    pub fn subnodes(&self) -> Range<usize> {
        match self.contents {
            Contents::Node { first_child } => first_child..first_child + (1 << D),
            _ => 0..0,
        }
    }

    /// Fold `body` into the aggregate: the old center of mass is weighted by
    /// the pre-update mass, then normalized by the new total.
    fn accumulate(&mut self, body: &TreeBody<D>) {
        let total = self.mass + body.mass;
        self.center_of_mass.scale_in_place(self.mass);
        self.center_of_mass += body.position * body.mass;
        if total > 0.0 {
            self.center_of_mass.scale_in_place(1.0 / total);
        }
        self.mass = total;
    }

    fn place(&mut self, body: TreeBody<D>) {
        self.contents = Contents::Body(body);
        self.accumulate(&body);
    }
}

/// Index of the child of a node centered at `center` that contains `position`.
///
/// Bit `axis` is set when the coordinate lies in the upper half on that axis.
#[inline]
fn quadrant_of<const D: usize>(center: &VecN<D>, position: &VecN<D>) -> usize {
    (0..D).fold(0, |index, axis| {
        if position[axis] >= center[axis] {
            index | (1 << axis)
        } else {
            index
        }
    })
}

/// Center of child `quadrant` of a node at `center` with `half_distance`.
#[inline]
fn child_center<const D: usize>(center: &VecN<D>, half_distance: f64, quadrant: usize) -> VecN<D> {
    let mut out = *center;
    for axis in 0..D {
        let sign = if quadrant & (1 << axis) != 0 { 1.0 } else { -1.0 };
        out[axis] += sign * 0.5 * half_distance;
    }
    out
}

/// Arena-backed Barnes-Hut tree. Built fresh every simulation step.
#[derive(Debug, Clone)]
pub struct BarnesHutTree<const D: usize> {
    nodes: Vec<TreeNode<D>>,
}

impl<const D: usize> BarnesHutTree<D> {
    /// Number of children of a subdivided node.
    pub const CHILD_COUNT: usize = 1 << D;

    /// Create an empty tree covering the square `center ± half_distance`.
    pub fn new(center: VecN<D>, half_distance: f64) -> Self {
        Self {
            nodes: vec![TreeNode::new(center, half_distance, None)],
        }
    }

    pub fn root(&self) -> &TreeNode<D> {
        &self.nodes[ROOT]
    }

    pub fn node(&self, index: usize) -> Option<&TreeNode<D>> {
        self.nodes.get(index)
    }

    /// Number of allocated tree nodes (including empty leaves).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when no body has been inserted.
    pub fn is_empty(&self) -> bool {
        self.root().node_type() == NodeType::Empty
    }

    /// Insert every body in order, stopping at the first failure.
    pub fn insert_all(&mut self, bodies: &[PhysicsBody<D>]) -> Result<()> {
        bodies.iter().try_for_each(|body| self.insert(body))
    }

    /// Insert one body.
    ///
    /// Fails with [`LayoutError::OutOfBounds`] when the body lies outside the
    /// root square and with [`LayoutError::CoincidentBodies`] when it cannot be
    /// separated from an already inserted body. The tree is unchanged on error.
    pub fn insert(&mut self, body: &PhysicsBody<D>) -> Result<()> {
        let entry = TreeBody::from(body);
        self.check_insertable(&entry)?;

        let mut index = ROOT;
        loop {
            match self.nodes[index].contents {
                Contents::Empty => {
                    self.nodes[index].place(entry);
                    return Ok(());
                }
                Contents::Body(held) => {
                    let first_child = self.subdivide(index);
                    let quadrant = quadrant_of(&self.nodes[index].center, &held.position);
                    self.nodes[first_child + quadrant].place(held);
                }
                Contents::Node { .. } => {}
            }

            // `index` is a subdivided node on the path to the new body's leaf.
            self.nodes[index].accumulate(&entry);
            index = self.child_containing(index, &entry.position);
        }
    }

    /// Walk the insertion path without mutating, rejecting bodies that would
    /// leave the tree half-updated.
    fn check_insertable(&self, entry: &TreeBody<D>) -> Result<()> {
        let root = self.root();
        if !entry.position.contained_by(&root.center, root.half_distance) {
            return Err(LayoutError::OutOfBounds(entry.id));
        }

        let mut index = ROOT;
        let mut depth = 0;
        loop {
            let node = &self.nodes[index];
            match node.contents {
                Contents::Empty => return Ok(()),
                Contents::Node { .. } => {
                    index = self.child_containing(index, &entry.position);
                    depth += 1;
                }
                Contents::Body(held) => {
                    let mut center = node.center;
                    let mut half_distance = node.half_distance;
                    loop {
                        if depth >= MAX_DEPTH || held.position == entry.position {
                            return Err(LayoutError::CoincidentBodies {
                                first: held.id,
                                second: entry.id,
                            });
                        }
                        let held_quadrant = quadrant_of(&center, &held.position);
                        if held_quadrant != quadrant_of(&center, &entry.position) {
                            return Ok(());
                        }
                        center = child_center(&center, half_distance, held_quadrant);
                        half_distance *= 0.5;
                        depth += 1;
                    }
                }
            }
        }
    }

    /// Allocate `2^D` empty children and promote `index` to `Node`.
    /// Returns the index of the first child.
    fn subdivide(&mut self, index: usize) -> usize {
        let first_child = self.nodes.len();
        let center = self.nodes[index].center;
        let half_distance = self.nodes[index].half_distance;

        for quadrant in 0..Self::CHILD_COUNT {
            self.nodes.push(TreeNode::new(
                child_center(&center, half_distance, quadrant),
                half_distance * 0.5,
                Some(index),
            ));
        }

        self.nodes[index].contents = Contents::Node { first_child };
        first_child
    }

    /// Child of the subdivided node `index` whose region holds `position`.
    fn child_containing(&self, index: usize, position: &VecN<D>) -> usize {
        let node = &self.nodes[index];
        node.subnodes().start + quadrant_of(&node.center, position)
    }

    /// Visit every mass acting on `target`, starting from the root.
    ///
    /// See [`BarnesHutTree::visit_forces_from`].
    pub fn visit_forces_for_body<F>(&self, target: &PhysicsBody<D>, theta: f64, visit: F) -> Result<()>
    where
        F: FnMut(f64, VecN<D>, f64),
    {
        self.visit_forces_from(ROOT, target, theta, visit)
    }

    /// Breadth-first force traversal from tree node `start`, which must be the
    /// root.
    ///
    /// `visit(mass, direction, distance)` is called once per contribution:
    /// - for a `Body` node other than `target` itself, with the exact body
    /// - for a `Node` whose extent over distance (`2·half / d`) is below
    ///   `theta`, with the subtree's aggregate mass at its center of mass
    ///
    /// `direction` is the unit vector from the contributing mass toward
    /// `target`. `target` is excluded by id, never by distance.
    pub fn visit_forces_from<F>(
        &self,
        start: usize,
        target: &PhysicsBody<D>,
        theta: f64,
        mut visit: F,
    ) -> Result<()>
    where
        F: FnMut(f64, VecN<D>, f64),
    {
        if self.nodes.get(start).is_none_or(|node| node.parent.is_some()) {
            return Err(LayoutError::NotRoot(start));
        }

        let mut queue = VecDeque::from([start]);
        while let Some(index) = queue.pop_front() {
            let node = &self.nodes[index];
            match node.contents {
                Contents::Empty => {}
                Contents::Body(body) => {
                    if body.id != target.id {
                        let distance = body.position.distance_from(&target.position);
                        let direction = target.position.normalized_direction_to(&body.position);
                        visit(body.mass, direction, distance);
                    }
                }
                Contents::Node { .. } => {
                    let distance = target.position.distance_from(&node.center_of_mass);
                    if node.half_distance * 2.0 / distance < theta {
                        let direction = target.position.normalized_direction_to(&node.center_of_mass);
                        visit(node.mass, direction, distance);
                    } else {
                        queue.extend(node.subnodes());
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Vec2, Vec3};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn body(id: u32, x: f64, y: f64) -> PhysicsBody<2> {
        PhysicsBody::new(NodeId(id), Vec2::new(x, y))
    }

    /// Recompute mass and center of mass of a subtree from its leaves.
    fn subtree_totals<const D: usize>(tree: &BarnesHutTree<D>, index: usize) -> (f64, VecN<D>) {
        let node = tree.node(index).unwrap();
        match node.node_type() {
            NodeType::Empty => (0.0, VecN::zeros()),
            NodeType::Body => {
                let b = node.body().unwrap();
                (b.mass, b.position * b.mass)
            }
            NodeType::Node => node.subnodes().fold((0.0, VecN::zeros()), |(m, mut w), child| {
                let (cm, cw) = subtree_totals(tree, child);
                w += cw;
                (m + cm, w)
            }),
        }
    }

    #[test]
    fn test_empty_tree() {
        let tree = BarnesHutTree::new(Vec2::zeros(), 240.0);
        assert_eq!(tree.root().node_type(), NodeType::Empty);
        assert!(tree.root().body().is_none());
        assert!(tree.root().parent().is_none());
        assert!(tree.is_empty());
    }

    #[test]
    fn test_single_body_tree() {
        let mut tree = BarnesHutTree::new(Vec2::zeros(), 200.0);
        tree.insert(&body(1, 150.0, 150.0)).unwrap();

        assert_eq!(tree.root().node_type(), NodeType::Body);
        assert!(tree.root().body().is_some());
        assert_eq!(tree.root().subnodes().len(), 0);
        assert_eq!(tree.root().mass, 1.0);
        assert_eq!(tree.root().center_of_mass, Vec2::new(150.0, 150.0));
    }

    #[test]
    fn test_two_bodies_subdivide() {
        let mut tree = BarnesHutTree::new(Vec2::zeros(), 200.0);
        tree.insert(&body(1, 180.0, 180.0)).unwrap();
        tree.insert(&body(2, 185.0, 185.0)).unwrap();

        let root = tree.root();
        assert_eq!(root.node_type(), NodeType::Node);
        assert!(root.body().is_none());
        assert_eq!(root.subnodes().len(), 4);
        assert_eq!(root.mass, 2.0);
        assert_relative_eq!(root.center_of_mass.x, 182.5);
        assert_relative_eq!(root.center_of_mass.y, 182.5);

        for child in root.subnodes() {
            let node = tree.node(child).unwrap();
            assert_eq!(node.parent(), Some(ROOT));
            assert_eq!(node.half_distance, 100.0);
        }
    }

    #[test]
    fn test_octree_has_eight_children() {
        let mut tree = BarnesHutTree::new(Vec3::zeros(), 10.0);
        tree.insert(&PhysicsBody::new(NodeId(1), Vec3::new(-1.0, -1.0, -1.0))).unwrap();
        tree.insert(&PhysicsBody::new(NodeId(2), Vec3::new(1.0, 1.0, 1.0))).unwrap();

        assert_eq!(tree.root().node_type(), NodeType::Node);
        assert_eq!(tree.root().subnodes().len(), 8);
        assert_eq!(BarnesHutTree::<3>::CHILD_COUNT, 8);
    }

    #[test]
    fn test_center_of_mass_independent_of_insertion_order() {
        let bodies = vec![
            body(1, -50.0, 20.0).with_mass(1.0),
            body(2, 30.0, 30.0).with_mass(2.5),
            body(3, 31.0, -70.0).with_mass(0.5),
            body(4, -12.0, -12.0).with_mass(4.0),
        ];
        let orders: [[usize; 4]; 5] = [
            [0, 1, 2, 3],
            [3, 2, 1, 0],
            [1, 3, 0, 2],
            [2, 0, 3, 1],
            [3, 0, 1, 2],
        ];

        let mut reference: Option<(f64, Vec2)> = None;
        for order in orders {
            let mut tree = BarnesHutTree::new(Vec2::zeros(), 100.0);
            for &i in &order {
                tree.insert(&bodies[i]).unwrap();
            }
            let root = tree.root();
            match reference {
                None => reference = Some((root.mass, root.center_of_mass)),
                Some((mass, com)) => {
                    assert_relative_eq!(root.mass, mass, epsilon = 1e-12);
                    assert_abs_diff_eq!(root.center_of_mass.x, com.x, epsilon = 1e-9);
                    assert_abs_diff_eq!(root.center_of_mass.y, com.y, epsilon = 1e-9);
                }
            }
        }

        let (mass, com) = reference.unwrap();
        assert_relative_eq!(mass, 8.0);
        // (-50 + 75 + 15.5 - 48) / 8, (20 + 75 - 35 - 48) / 8
        assert_abs_diff_eq!(com.x, -7.5 / 8.0, epsilon = 1e-9);
        assert_abs_diff_eq!(com.y, 12.0 / 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_every_node_aggregates_its_subtree() {
        let mut tree = BarnesHutTree::new(Vec2::zeros(), 64.0);
        let positions = [
            (1.0, 1.0),
            (2.0, 3.0),
            (-40.0, 10.0),
            (-41.0, 11.0),
            (60.0, -60.0),
            (0.0, 0.0),
            (33.0, 33.0),
        ];
        for (i, &(x, y)) in positions.iter().enumerate() {
            tree.insert(&body(i as u32, x, y).with_mass(1.0 + i as f64)).unwrap();
        }

        for index in 0..tree.len() {
            let node = tree.node(index).unwrap();
            let (mass, weighted) = subtree_totals(&tree, index);
            assert_relative_eq!(node.mass, mass, epsilon = 1e-9);
            if mass > 0.0 {
                let expected = weighted / mass;
                assert_abs_diff_eq!(node.center_of_mass.x, expected.x, epsilon = 1e-9);
                assert_abs_diff_eq!(node.center_of_mass.y, expected.y, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_boundary_body_lands_in_one_child() {
        let mut tree = BarnesHutTree::new(Vec2::zeros(), 10.0);
        tree.insert(&body(1, 0.0, 0.0)).unwrap();
        tree.insert(&body(2, -5.0, -5.0)).unwrap();

        let children: Vec<_> = tree.root().subnodes().collect();
        let masses: f64 = children.iter().map(|&c| tree.node(c).unwrap().mass).sum();
        assert_eq!(masses, 2.0);

        // (0, 0) sits on both splitting lines and goes to the upper quadrant.
        let upper = tree.node(children[3]).unwrap();
        assert_eq!(upper.body().map(|b| b.id), Some(NodeId(1)));
    }

    #[test]
    fn test_out_of_bounds_is_rejected() {
        let mut tree = BarnesHutTree::new(Vec2::zeros(), 10.0);
        tree.insert(&body(1, 1.0, 1.0)).unwrap();

        let err = tree.insert(&body(2, 11.0, 0.0)).unwrap_err();
        assert_eq!(err, LayoutError::OutOfBounds(NodeId(2)));
        assert_eq!(tree.root().mass, 1.0);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_coincident_bodies_are_rejected_without_mutation() {
        let mut tree = BarnesHutTree::new(Vec2::zeros(), 10.0);
        tree.insert(&body(1, 1.0, 1.0)).unwrap();
        tree.insert(&body(2, -3.0, 2.0)).unwrap();
        let len_before = tree.len();

        let err = tree.insert(&body(3, 1.0, 1.0)).unwrap_err();
        assert_eq!(
            err,
            LayoutError::CoincidentBodies {
                first: NodeId(1),
                second: NodeId(3),
            }
        );
        assert_eq!(tree.len(), len_before);
        assert_eq!(tree.root().mass, 2.0);
    }

    #[test]
    fn test_visit_skips_self() {
        let target = body(1, 10.0, 10.0);
        let mut tree = BarnesHutTree::new(Vec2::zeros(), 100.0);
        tree.insert(&target).unwrap();

        let mut visits = 0;
        tree.visit_forces_for_body(&target, 0.5, |_, _, _| visits += 1).unwrap();
        assert_eq!(visits, 0);
    }

    #[test]
    fn test_visit_single_foreign_body() {
        let mut tree = BarnesHutTree::new(Vec2::zeros(), 100.0);
        tree.insert(&body(1, 3.0, 0.0).with_mass(2.0)).unwrap();

        let target = body(2, 0.0, 4.0);
        let mut seen = Vec::new();
        tree.visit_forces_for_body(&target, 0.5, |m, d, r| seen.push((m, d, r))).unwrap();

        assert_eq!(seen.len(), 1);
        let (mass, direction, distance) = seen[0];
        assert_eq!(mass, 2.0);
        assert_relative_eq!(distance, 5.0);
        assert_relative_eq!(direction.x, -0.6, epsilon = 1e-12);
        assert_relative_eq!(direction.y, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_visit_close_pair() {
        let body1 = body(1, 180.0, 180.0);
        let body2 = body(2, 185.0, 185.0);
        let mut tree = BarnesHutTree::new(Vec2::zeros(), 200.0);
        tree.insert(&body1).unwrap();
        tree.insert(&body2).unwrap();

        let half_sqrt = (0.5f64).sqrt();
        for (target, sign) in [(&body1, -1.0), (&body2, 1.0)] {
            let mut seen = Vec::new();
            tree.visit_forces_for_body(target, 0.5, |m, d, r| seen.push((m, d, r))).unwrap();

            assert_eq!(seen.len(), 1, "expecting a single force from the other body");
            let (mass, direction, distance) = seen[0];
            assert_eq!(mass, 1.0);
            assert_relative_eq!(direction.x, sign * half_sqrt, epsilon = 1e-5);
            assert_relative_eq!(direction.y, sign * half_sqrt, epsilon = 1e-5);
            assert_relative_eq!(distance, (50.0f64).sqrt(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_distant_cluster_is_aggregated() {
        let target = body(0, -150.0, -150.0);
        let cluster = [body(1, 150.0, 150.0), body(2, 160.0, 160.0), body(3, 150.0, 160.0)];

        let mut tree = BarnesHutTree::new(Vec2::zeros(), 200.0);
        tree.insert(&target).unwrap();
        tree.insert_all(&cluster).unwrap();

        let mut seen = Vec::new();
        tree.visit_forces_for_body(&target, 1.0, |m, d, r| seen.push((m, d, r))).unwrap();

        assert_eq!(seen.len(), 1);
        let (mass, direction, distance) = seen[0];
        let com = Vec2::new(460.0 / 3.0, 470.0 / 3.0);
        assert_eq!(mass, 3.0);
        assert_relative_eq!(distance, target.position.distance_from(&com), epsilon = 1e-9);
        assert_relative_eq!(direction.norm(), 1.0, epsilon = 1e-12);
        assert!(direction.x < 0.0 && direction.y < 0.0);
    }

    #[test]
    fn test_zero_theta_is_exact() {
        let bodies: Vec<_> = (0..12)
            .map(|i| {
                let angle = i as f64 * 0.5;
                body(i, 40.0 * angle.cos() + i as f64, 40.0 * angle.sin())
            })
            .collect();
        let mut tree = BarnesHutTree::new(Vec2::zeros(), 64.0);
        tree.insert_all(&bodies).unwrap();

        for target in &bodies {
            let mut visits = 0;
            tree.visit_forces_for_body(target, 0.0, |mass, _, _| {
                assert_eq!(mass, 1.0);
                visits += 1;
            })
            .unwrap();
            assert_eq!(visits, bodies.len() - 1);
        }
    }

    #[test]
    fn test_visit_from_non_root_fails() {
        let mut tree = BarnesHutTree::new(Vec2::zeros(), 200.0);
        let body1 = body(1, 180.0, 180.0);
        tree.insert(&body1).unwrap();
        tree.insert(&body(2, -185.0, 185.0)).unwrap();

        let child = tree.root().subnodes().start;
        let err = tree.visit_forces_from(child, &body1, 0.5, |_, _, _| {}).unwrap_err();
        assert_eq!(err, LayoutError::NotRoot(child));
        assert!(tree.visit_forces_from(ROOT, &body1, 0.5, |_, _, _| {}).is_ok());
    }
}
