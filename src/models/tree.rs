use serde::{Deserialize, Serialize};

use super::Node;

/// A node with its nested children, used for tree responses.
///
/// The `node` fields (including its `kind` tag) are flattened into the JSON
/// response, with an additional `children` array. Inactive nodes are included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(flatten)]
    pub node: Node,
    pub children: Vec<TreeNode>,
}
