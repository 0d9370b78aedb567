//! Pre-order flattening of a view into list rows for the terminal UI.

use std::collections::HashSet;

use super::{CommentsView, NodeView};
use crate::api::{CommentId, CommentNode};

/// One comment line group in the list.
#[derive(Debug, Clone, Copy)]
pub struct CommentRow<'a> {
    pub node: &'a CommentNode,
    pub depth: usize,
    pub indent_level: usize,
    pub show_actions: bool,
    pub reply_form_open: bool,
    pub reply_count: usize,
    /// 返信セクションが折りたたまれている（子の行は出さない）
    pub collapsed: bool,
}

#[derive(Debug, Clone, Copy)]
pub enum ListRow<'a> {
    Comment(CommentRow<'a>),
    LoadMore { remaining: usize },
}

impl<'a> ListRow<'a> {
    pub fn comment(&self) -> Option<&CommentRow<'a>> {
        match self {
            ListRow::Comment(row) => Some(row),
            ListRow::LoadMore { .. } => None,
        }
    }

    pub fn is_load_more(&self) -> bool {
        matches!(self, ListRow::LoadMore { .. })
    }
}

/// Flatten in pre-order, skipping the replies of nodes listed in `collapsed`.
///
/// A collapsed node keeps its row and its reply count.
pub fn flatten<'a>(view: &CommentsView<'a>, collapsed: &HashSet<CommentId>) -> Vec<ListRow<'a>> {
    let mut rows = Vec::with_capacity(view.rendered_len() + 1);
    for node in &view.nodes {
        push_rows(node, collapsed, &mut rows);
    }
    if view.show_load_more {
        rows.push(ListRow::LoadMore {
            remaining: view.remaining(),
        });
    }
    rows
}

fn push_rows<'a>(view: &NodeView<'a>, collapsed: &HashSet<CommentId>, rows: &mut Vec<ListRow<'a>>) {
    let is_collapsed = !view.replies.is_empty() && collapsed.contains(&view.node.id);
    rows.push(ListRow::Comment(CommentRow {
        node: view.node,
        depth: view.depth,
        indent_level: view.indent_level,
        show_actions: view.show_actions,
        reply_form_open: view.reply_form_open,
        reply_count: view.replies.len(),
        collapsed: is_collapsed,
    }));
    if is_collapsed {
        return;
    }
    for reply in &view.replies {
        push_rows(reply, collapsed, rows);
    }
}

/// `id` を持つ行の位置
pub fn position_of(rows: &[ListRow<'_>], id: &CommentId) -> Option<usize> {
    rows.iter()
        .position(|row| row.comment().is_some_and(|c| &c.node.id == id))
}
