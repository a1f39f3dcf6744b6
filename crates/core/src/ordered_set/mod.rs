use std::cmp::Ordering;

/// A node slot in the arena. Links are arena indices; `parent` is a
/// non-owning back-reference used only for upward balance propagation.
#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    parent: Option<usize>,
    left: Option<usize>,
    right: Option<usize>,
    /// Height in edges: 0 for a leaf. An absent child counts as -1 when
    /// computing the balance factor.
    height: i32,
}

impl<T> Node<T> {
    fn new(value: T, parent: Option<usize>) -> Self {
        Self {
            value,
            parent,
            left: None,
            right: None,
            height: 0,
        }
    }
}

/// A set of unique, totally ordered values backed by a height-balanced
/// (AVL) binary search tree.
///
/// Membership tests, insertion and removal are all O(log n). Nodes live in
/// an index arena with a free list, so removals recycle slots instead of
/// churning the allocator. Cloning deep-copies the arena.
///
/// The set is not thread-safe; wrap it in external synchronisation if it
/// has to be shared. Iteration borrows the set, so the borrow checker
/// rules out mutation while an iterator is live.
#[derive(Debug, Clone)]
pub struct OrderedSet<T> {
    nodes: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    root: Option<usize>,
    len: usize,
}

impl<T> OrderedSet<T> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }

    /// Returns the number of values currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the set holds no values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every value and releases the arena storage.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    /// Returns a lazy in-order iterator over the stored values. The yielded
    /// sequence is strictly increasing.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    fn node(&self, index: usize) -> &Node<T> {
        self.nodes[index]
            .as_ref()
            .expect("arena slot must hold a live node")
    }

    fn node_mut(&mut self, index: usize) -> &mut Node<T> {
        self.nodes[index]
            .as_mut()
            .expect("arena slot must hold a live node")
    }

    fn allocate(&mut self, node: Node<T>) -> usize {
        match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(node);
                index
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, index: usize) {
        self.nodes[index] = None;
        self.free.push(index);
    }

    fn height_of(&self, index: Option<usize>) -> i32 {
        match index {
            Some(index) => self.node(index).height,
            None => -1,
        }
    }

    fn balance_of(&self, index: usize) -> i32 {
        let node = self.node(index);
        self.height_of(node.right) - self.height_of(node.left)
    }

    fn refresh_height(&mut self, index: usize) {
        let node = self.node(index);
        let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
        self.node_mut(index).height = height;
    }
}

impl<T: Ord> OrderedSet<T> {
    /// Inserts a value, keeping the tree height-balanced. Returns false and
    /// leaves the set untouched if the value is already present.
    pub fn insert(&mut self, value: T) -> bool {
        let mut current = match self.root {
            None => {
                let index = self.allocate(Node::new(value, None));
                self.root = Some(index);
                self.len = 1;
                return true;
            }
            Some(root) => root,
        };

        loop {
            match value.cmp(&self.node(current).value) {
                Ordering::Equal => return false,
                Ordering::Less => match self.node(current).left {
                    Some(child) => current = child,
                    None => {
                        let index = self.allocate(Node::new(value, Some(current)));
                        self.node_mut(current).left = Some(index);
                        break;
                    }
                },
                Ordering::Greater => match self.node(current).right {
                    Some(child) => current = child,
                    None => {
                        let index = self.allocate(Node::new(value, Some(current)));
                        self.node_mut(current).right = Some(index);
                        break;
                    }
                },
            }
        }

        self.len += 1;
        self.rebalance_from(Some(current));
        true
    }

    /// Removes a value. Returns false and leaves the set untouched if the
    /// value is not present; removal of an absent value is not an error.
    pub fn remove(&mut self, value: &T) -> bool {
        let mut cursor = self.root;
        while let Some(index) = cursor {
            match value.cmp(&self.node(index).value) {
                Ordering::Equal => {
                    self.remove_index(index);
                    return true;
                }
                Ordering::Less => cursor = self.node(index).left,
                Ordering::Greater => cursor = self.node(index).right,
            }
        }
        false
    }

    /// Tests whether a value is in the set.
    pub fn contains(&self, value: &T) -> bool {
        let mut cursor = self.root;
        while let Some(index) = cursor {
            match value.cmp(&self.node(index).value) {
                Ordering::Equal => return true,
                Ordering::Less => cursor = self.node(index).left,
                Ordering::Greater => cursor = self.node(index).right,
            }
        }
        false
    }

    fn remove_index(&mut self, mut index: usize) {
        if let (Some(left), Some(_)) = (self.node(index).left, self.node(index).right) {
            // Two children: move the in-order predecessor's value (the
            // rightmost descendant of the left child) into this node, then
            // detach the predecessor, which has at most one child.
            let mut predecessor = left;
            while let Some(next) = self.node(predecessor).right {
                predecessor = next;
            }
            self.swap_values(index, predecessor);
            index = predecessor;
        }

        let parent = self.node(index).parent;
        let child = self.node(index).left.or(self.node(index).right);
        if let Some(child) = child {
            self.node_mut(child).parent = parent;
        }
        match parent {
            None => self.root = child,
            Some(parent) => {
                if self.node(parent).left == Some(index) {
                    self.node_mut(parent).left = child;
                } else {
                    self.node_mut(parent).right = child;
                }
            }
        }

        self.release(index);
        self.len -= 1;
        self.rebalance_from(parent);
    }

    fn swap_values(&mut self, a: usize, b: usize) {
        debug_assert_ne!(a, b);
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.nodes.split_at_mut(high);
        let first = head[low].as_mut().expect("arena slot must hold a live node");
        let second = tail[0].as_mut().expect("arena slot must hold a live node");
        std::mem::swap(&mut first.value, &mut second.value);
    }

    /// Walks from `start` up to the root, refreshing heights and fixing any
    /// node whose balance factor has left {-1, 0, 1}. Rotations are purely
    /// structural; heights are recomputed here, not inside the rotation.
    fn rebalance_from(&mut self, start: Option<usize>) {
        let mut cursor = start;
        while let Some(index) = cursor {
            self.refresh_height(index);
            let subtree_root = match self.balance_of(index) {
                2 => self.fix_right_heavy(index),
                -2 => self.fix_left_heavy(index),
                _ => index,
            };
            cursor = self.node(subtree_root).parent;
        }
    }

    fn fix_right_heavy(&mut self, index: usize) -> usize {
        let right = self
            .node(index)
            .right
            .expect("right-heavy node must have a right child");
        if self.balance_of(right) < 0 {
            // Right-left shape: rotate the right child first.
            let replacement = self.rotate_right(right);
            self.refresh_height(right);
            self.refresh_height(replacement);
        }
        let new_root = self.rotate_left(index);
        self.refresh_height(index);
        self.refresh_height(new_root);
        new_root
    }

    fn fix_left_heavy(&mut self, index: usize) -> usize {
        let left = self
            .node(index)
            .left
            .expect("left-heavy node must have a left child");
        if self.balance_of(left) > 0 {
            // Left-right shape: rotate the left child first.
            let replacement = self.rotate_left(left);
            self.refresh_height(left);
            self.refresh_height(replacement);
        }
        let new_root = self.rotate_right(index);
        self.refresh_height(index);
        self.refresh_height(new_root);
        new_root
    }

    /// Counterclockwise rotation about `pivot`. Returns the new subtree
    /// root and rewires the parent link (or the tree root) on its behalf.
    fn rotate_left(&mut self, pivot: usize) -> usize {
        let new_root = self
            .node(pivot)
            .right
            .expect("left rotation requires a right child");
        let transferred = self.node(new_root).left;
        let parent = self.node(pivot).parent;

        self.node_mut(pivot).right = transferred;
        if let Some(transferred) = transferred {
            self.node_mut(transferred).parent = Some(pivot);
        }
        self.node_mut(new_root).left = Some(pivot);
        self.node_mut(pivot).parent = Some(new_root);
        self.node_mut(new_root).parent = parent;
        self.reattach(parent, pivot, new_root);
        new_root
    }

    /// Clockwise rotation about `pivot`, mirror of [`Self::rotate_left`].
    fn rotate_right(&mut self, pivot: usize) -> usize {
        let new_root = self
            .node(pivot)
            .left
            .expect("right rotation requires a left child");
        let transferred = self.node(new_root).right;
        let parent = self.node(pivot).parent;

        self.node_mut(pivot).left = transferred;
        if let Some(transferred) = transferred {
            self.node_mut(transferred).parent = Some(pivot);
        }
        self.node_mut(new_root).right = Some(pivot);
        self.node_mut(pivot).parent = Some(new_root);
        self.node_mut(new_root).parent = parent;
        self.reattach(parent, pivot, new_root);
        new_root
    }

    fn reattach(&mut self, parent: Option<usize>, old_child: usize, new_child: usize) {
        match parent {
            None => self.root = Some(new_child),
            Some(parent) => {
                if self.node(parent).left == Some(old_child) {
                    self.node_mut(parent).left = Some(new_child);
                } else {
                    self.node_mut(parent).right = Some(new_child);
                }
            }
        }
    }
}

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> Extend<T> for OrderedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T: Ord> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a, T> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator over an [`OrderedSet`]. Keeps the left spine of the
/// remaining subtrees on an explicit stack, so auxiliary space is O(log n).
#[derive(Debug)]
pub struct Iter<'a, T> {
    set: &'a OrderedSet<T>,
    stack: Vec<usize>,
}

impl<'a, T> Iter<'a, T> {
    fn new(set: &'a OrderedSet<T>) -> Self {
        let mut iter = Self {
            set,
            stack: Vec::new(),
        };
        iter.push_left_spine(set.root);
        iter
    }

    fn push_left_spine(&mut self, start: Option<usize>) {
        let mut cursor = start;
        while let Some(index) = cursor {
            self.stack.push(index);
            cursor = self.set.node(index).left;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = self.set.node(index);
        self.push_left_spine(node.right);
        Some(&node.value)
    }
}
