//! Pure view layer: forest + view state in, display description out.
//!
//! `CommentsView` is consumed by two renderers: [`markup`] for HTML and
//! [`rows`] for the terminal list.

pub mod markup;
pub mod rows;

use crate::api::{CommentId, CommentNode};
use crate::controller::ClientViewState;
use crate::tree;

/// Default cap for the visual nesting level.
pub const DEFAULT_MAX_INDENT_DEPTH: usize = 3;

/// Per-render context handed down the recursion.
#[derive(Debug, Clone, Copy)]
pub struct ViewContext<'a> {
    pub reply_target: Option<&'a CommentId>,
    pub max_indent_depth: usize,
}

impl Default for ViewContext<'_> {
    fn default() -> Self {
        Self {
            reply_target: None,
            max_indent_depth: DEFAULT_MAX_INDENT_DEPTH,
        }
    }
}

/// 1ノード分の表示記述（返信は常に展開済み）
#[derive(Debug, Clone)]
pub struct NodeView<'a> {
    pub node: &'a CommentNode,
    pub depth: usize,
    /// `min(depth, max_indent_depth)`; the tree itself is never truncated
    pub indent_level: usize,
    pub show_actions: bool,
    pub reply_form_open: bool,
    pub replies: Vec<NodeView<'a>>,
}

impl<'a> NodeView<'a> {
    pub fn build(node: &'a CommentNode, depth: usize, ctx: &ViewContext<'_>) -> Self {
        Self {
            node,
            depth,
            indent_level: depth.min(ctx.max_indent_depth),
            show_actions: !node.deleted,
            reply_form_open: ctx.reply_target == Some(&node.id),
            replies: node
                .replies
                .iter()
                .map(|reply| NodeView::build(reply, depth + 1, ctx))
                .collect(),
        }
    }

    /// このノード自身を含むサブツリーのノード数
    pub fn subtree_len(&self) -> usize {
        1 + self.replies.iter().map(NodeView::subtree_len).sum::<usize>()
    }
}

/// コメント一覧全体の表示記述
#[derive(Debug, Clone)]
pub struct CommentsView<'a> {
    pub nodes: Vec<NodeView<'a>>,
    pub total_count: usize,
    pub top_level_count: usize,
    pub count_label: String,
    pub show_load_more: bool,
}

impl<'a> CommentsView<'a> {
    pub fn build(
        forest: &'a [CommentNode],
        state: &ClientViewState,
        max_indent_depth: usize,
    ) -> Self {
        let ctx = ViewContext {
            reply_target: state.reply_target.as_ref().map(|target| &target.id),
            max_indent_depth,
        };
        let visible = state.visible_top_level_count;
        let total_count = tree::count_total(forest);

        Self {
            nodes: forest
                .iter()
                .take(visible)
                .map(|node| NodeView::build(node, 0, &ctx))
                .collect(),
            total_count,
            top_level_count: forest.len(),
            count_label: count_label(total_count),
            show_load_more: visible < forest.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top_level_count == 0
    }

    /// 未表示のトップレベルコメント数
    pub fn remaining(&self) -> usize {
        self.top_level_count.saturating_sub(self.nodes.len())
    }

    /// 描画されるノード数（返信込み）
    pub fn rendered_len(&self) -> usize {
        self.nodes.iter().map(NodeView::subtree_len).sum()
    }
}

/// "1 comment" / "N comments"
pub fn count_label(total: usize) -> String {
    format!("{} comment{}", total, if total == 1 { "" } else { "s" })
}
