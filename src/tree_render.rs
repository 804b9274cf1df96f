//! ASCII rendering of a project tree with progress.

use crate::models::{Auditable, Progress, TreeNode};

const ACTIVE: char = '●';
const ARCHIVED: char = '✗';

fn status_symbol(node: &TreeNode) -> char {
    if node.node.is_active() {
        ACTIVE
    } else {
        ARCHIVED
    }
}

fn label(node: &TreeNode) -> String {
    format!("{} ({}%)", node.node.title(), node.node.progress())
}

/// Render a project tree as ASCII art.
///
/// Example output:
/// ```text
/// Roadmap (50%)
/// └── ● Expand to EU (50%)
///     └── ● Launch in Germany (50%)
///         └── ● Ship v2 (50%)
///             ├── ● Signups (50%)
///             │   ├── ● Landing page (100%)
///             │   └── ● Ads campaign (0%)
///             └── ✗ Churn (80%)
/// ```
pub fn render_tree(root: &TreeNode) -> String {
    let mut output = String::new();
    output.push_str(&label(root));
    output.push('\n');
    render_children(&mut output, root, "");
    output
}

fn render_children(output: &mut String, node: &TreeNode, prefix: &str) {
    for (i, child) in node.children.iter().enumerate() {
        let is_last = i == node.children.len() - 1;
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(prefix);
        output.push_str(branch);
        output.push(status_symbol(child));
        output.push(' ');
        output.push_str(&label(child));
        output.push('\n');

        let continuation = if is_last { "    " } else { "│   " };
        render_children(output, child, &format!("{}{}", prefix, continuation));
    }
}
