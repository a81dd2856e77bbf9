use compact_str::CompactString;

/// Index into the arena `Vec<FileNode>`. Uses u32 to save memory (supports up to ~4 billion nodes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Leaf/container distinction, pattern-matched instead of dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A file-like node. `category` selects the leaf's color from the palette.
    Leaf { category: u16 },
    /// A folder-like node; its children carry the weight.
    Dir,
}

/// A single node in the file tree, stored in a flat arena.
/// Uses sibling-list representation: each node has `first_child` and `next_sibling`.
#[derive(Debug, Clone)]
pub struct FileNode {
    /// File or directory name (not full path)
    pub name: CompactString,
    /// Size in bytes. For leaves: actual size. For dirs: aggregated sum of children.
    pub size: u64,
    /// Leaf or directory, plus leaf-only payload
    pub kind: NodeKind,
    /// Parent node index (None for root)
    pub parent: Option<NodeId>,
    /// First child node index (None for leaves / empty dirs)
    pub first_child: Option<NodeId>,
    /// Next sibling node index (None if last child)
    pub next_sibling: Option<NodeId>,
    /// Depth in the tree (root = 0)
    pub depth: u16,
}

impl FileNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Dir)
    }

    /// Palette category of a leaf; None for dirs.
    pub fn category(&self) -> Option<u16> {
        match self.kind {
            NodeKind::Leaf { category } => Some(category),
            NodeKind::Dir => None,
        }
    }
}

/// The file tree stored as a flat arena of nodes.
///
/// The layout engine treats this tree as read-only: rectangles live in a
/// parallel per-render map (`layout::Layout`), never on the nodes.
pub struct FileTree {
    /// All nodes in contiguous memory
    pub nodes: Vec<FileNode>,
    /// Root node index
    pub root: NodeId,
}

impl FileTree {
    /// Create an empty tree with a root directory node.
    pub fn new(root_name: &str) -> Self {
        let root_node = FileNode {
            name: CompactString::new(root_name),
            size: 0,
            kind: NodeKind::Dir,
            parent: None,
            first_child: None,
            next_sibling: None,
            depth: 0,
        };

        FileTree {
            nodes: vec![root_node],
            root: NodeId(0),
        }
    }

    /// Add a directory under the given parent. Returns the new node's ID.
    pub fn add_dir(&mut self, parent: NodeId, name: &str) -> NodeId {
        self.add_node(parent, name, 0, NodeKind::Dir)
    }

    /// Add a leaf under the given parent. Returns the new node's ID.
    pub fn add_leaf(&mut self, parent: NodeId, name: &str, size: u64, category: u16) -> NodeId {
        self.add_node(parent, name, size, NodeKind::Leaf { category })
    }

    fn add_node(&mut self, parent: NodeId, name: &str, size: u64, kind: NodeKind) -> NodeId {
        debug_assert!(
            self.nodes[parent.index()].is_dir(),
            "leaves cannot have children"
        );
        let new_id = NodeId(self.nodes.len() as u32);
        let node = FileNode {
            name: CompactString::new(name),
            size,
            kind,
            parent: Some(parent),
            first_child: None,
            // Prepend to parent's child list (O(1)); callers re-order with
            // tree::aggregate::sort_children_by_size before layout.
            next_sibling: self.nodes[parent.index()].first_child,
            depth: self.nodes[parent.index()].depth + 1,
        };
        self.nodes[parent.index()].first_child = Some(new_id);
        self.nodes.push(node);
        new_id
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> &FileNode {
        &self.nodes[id.index()]
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> &mut FileNode {
        &mut self.nodes[id.index()]
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty (only root).
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> ChildIter<'_> {
        ChildIter {
            tree: self,
            current: self.nodes[parent.index()].first_child,
        }
    }

    /// Number of direct children.
    pub fn child_count(&self, parent: NodeId) -> usize {
        self.children(parent).count()
    }
}

/// Iterator over the children of a node.
pub struct ChildIter<'a> {
    tree: &'a FileTree,
    current: Option<NodeId>,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.tree.nodes[id.index()].next_sibling;
        Some(id)
    }
}
