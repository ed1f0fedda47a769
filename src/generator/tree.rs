use std::fmt::Display;

/// A derivation tree. Leaves render to their symbol, inner nodes to the
/// concatenation of their children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree {
    pub symbol: String,
    pub children: Vec<Tree>,
}

impl Tree {
    pub fn leaf(symbol: impl Into<String>) -> Tree {
        Tree {
            symbol: symbol.into(),
            children: Vec::new(),
        }
    }

    pub fn node(symbol: impl Into<String>, children: Vec<Tree>) -> Tree {
        Tree {
            symbol: symbol.into(),
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    // Walks with an explicit stack so deep derivations don't recurse.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            if tree.is_leaf() {
                out.push_str(&tree.symbol);
            } else {
                stack.extend(tree.children.iter().rev());
            }
        }
        out
    }
}

impl Display for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}
