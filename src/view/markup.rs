//! HTML rendering of a comment view.
//!
//! Mirrors the widget markup served by the web front end so the output can be
//! dropped into `#commentsContainer` unchanged. All text is escaped by maud.

use maud::{html, Markup};

use super::{CommentsView, NodeView, ViewContext};
use crate::api::CommentNode;

/// 空のフォレストで表示するプレースホルダ
pub fn empty_placeholder() -> Markup {
    html! {
        div class="no-comments text-center py-4" {
            p class="text-muted" { "No comments yet. Be the first to share your thoughts!" }
        }
    }
}

/// `node` とその返信すべてを `depth` から描画する
pub fn render_node(node: &CommentNode, depth: usize, ctx: &ViewContext<'_>) -> String {
    node_markup(&NodeView::build(node, depth, ctx)).into_string()
}

/// 一覧全体（件数ラベル・コメント・"load more"）を描画する
pub fn render_view(view: &CommentsView<'_>) -> String {
    view_markup(view).into_string()
}

pub fn view_markup(view: &CommentsView<'_>) -> Markup {
    html! {
        div class="comments-header" {
            span class="comments-count" id="commentsCount" { (view.count_label) }
        }
        div class="comments-container" id="commentsContainer" {
            @if view.is_empty() {
                (empty_placeholder())
            } @else {
                @for node in &view.nodes {
                    (node_markup(node))
                }
            }
        }
        @if view.show_load_more {
            button type="button" class="btn btn-outline-primary load-more" id="loadMoreComments" {
                "Load more (" (view.remaining()) " remaining)"
            }
        }
    }
}

fn item_class(view: &NodeView<'_>) -> String {
    if view.depth > 0 {
        format!("comment-item reply reply-level-{}", view.indent_level)
    } else {
        "comment-item".to_string()
    }
}

pub fn node_markup(view: &NodeView<'_>) -> Markup {
    let node = view.node;
    let id = node.id.as_str();

    html! {
        div class=(item_class(view)) data-comment-id=(id) {
            div class="comment-header" {
                div class="comment-author-info" {
                    div class="comment-author" {
                        (node.name)
                        @if node.deleted {
                            " "
                            span class="badge bg-secondary comment-badge" { "Deleted" }
                        }
                    }
                    div class="comment-meta" {
                        span class="comment-time" { (node.timestamp()) }
                    }
                }
                div class="comment-actions" {
                    @if view.show_actions {
                        button class="comment-action-btn reply-btn" data-comment-id=(id) data-author=(node.name) { "Reply" }
                        button class="comment-action-btn delete-btn" data-comment-id=(id) { "Delete" }
                    }
                }
            }
            div class="comment-body" {
                p {
                    @for (i, line) in node.comment.split('\n').enumerate() {
                        @if i > 0 { br; }
                        (line)
                    }
                }
            }
            @if !view.replies.is_empty() {
                div class="replies-section" {
                    div class="replies-header" data-comment-id=(id) {
                        span { "Replies" }
                        " "
                        span class="replies-count" { (view.replies.len()) }
                    }
                    div class="replies-container" id={ "replies-" (id) } {
                        @for reply in &view.replies {
                            (node_markup(reply))
                        }
                    }
                }
            }
            div class=(if view.reply_form_open { "reply-form active" } else { "reply-form" }) id={ "reply-form-" (id) } {
                div class="reply-form-header" {
                    h6 { "Reply to " (node.name) }
                }
                div class="reply-to-info" {
                    "Replying to: " strong { (node.name) }
                }
                form class="reply-form-inner" {
                    input type="hidden" name="parent_id" value=(id);
                    input type="text" class="form-control form-control-sm" placeholder="Your Name" required;
                    textarea class="form-control form-control-sm" placeholder="Your reply..." rows="2" required {}
                    div class="reply-form-actions" {
                        button type="button" class="btn btn-sm btn-secondary cancel-reply-btn" data-comment-id=(id) { "Cancel" }
                        button type="submit" class="btn btn-sm btn-primary" { "Submit Reply" }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::CommentId;
    use crate::controller::{ClientViewState, ReplyTarget};
    use crate::tree::test_support::*;
    use crate::view::DEFAULT_MAX_INDENT_DEPTH;

    fn view_state(visible: usize) -> ClientViewState {
        ClientViewState {
            visible_top_level_count: visible,
            reply_target: None,
        }
    }

    #[test]
    fn test_single_comment_markup() {
        let forest = vec![node("1", "A", vec![])];
        let view = CommentsView::build(&forest, &view_state(5), DEFAULT_MAX_INDENT_DEPTH);
        let html = render_view(&view);

        assert_eq!(html.matches("class=\"comment-item").count(), 1);
        assert!(html.contains(">1 comment<"));
        assert!(!html.contains("replies-section"));
        assert!(!html.contains("loadMoreComments"));
        assert!(html.contains("data-comment-id=\"1\""));
        assert!(html.contains("2024-05-01 at 12:00"));
    }

    #[test]
    fn test_empty_forest_renders_placeholder() {
        let view = CommentsView::build(&[], &view_state(5), DEFAULT_MAX_INDENT_DEPTH);
        let html = render_view(&view);
        assert!(html.contains("no-comments"));
        assert!(html.contains(">0 comments<"));
        assert!(!html.contains("loadMoreComments"));
    }

    #[test]
    fn test_load_more_button_shows_remaining() {
        let forest = flat_forest(8);
        let view = CommentsView::build(&forest, &view_state(5), DEFAULT_MAX_INDENT_DEPTH);
        let html = render_view(&view);
        assert_eq!(html.matches("class=\"comment-item").count(), 5);
        assert!(html.contains("Load more (3 remaining)"));
    }

    #[test]
    fn test_text_is_escaped_and_newlines_become_breaks() {
        let mut comment = node("1", "<b>eve</b>", vec![]);
        comment.comment = "line one\n<script>alert(1)</script>".to_string();
        let html = render_node(&comment, 0, &ViewContext::default());

        assert!(html.contains("&lt;b&gt;eve&lt;/b&gt;"));
        assert!(html.contains("line one<br>&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_nesting_class_caps_at_max_depth() {
        let html = render_node(&chain(5), 0, &ViewContext::default());
        assert_eq!(html.matches("reply-level-1\"").count(), 1);
        assert_eq!(html.matches("reply-level-2\"").count(), 1);
        assert_eq!(html.matches("reply-level-3\"").count(), 3);
        assert!(!html.contains("reply-level-4"));
        // 深い返信も切り捨てない
        assert!(html.contains("data-comment-id=\"d5\""));
    }

    #[test]
    fn test_pre_order_and_server_reply_order() {
        let tree = node(
            "p",
            "P",
            vec![node("c2", "B", vec![node("g", "G", vec![])]), node("c1", "C", vec![])],
        );
        let html = render_node(&tree, 0, &ViewContext::default());
        let pos = |id: &str| html.find(&format!("data-comment-id=\"{}\"", id)).unwrap();
        assert!(pos("p") < pos("c2"));
        assert!(pos("c2") < pos("g"));
        assert!(pos("g") < pos("c1"));
        assert!(html.contains("<span class=\"replies-count\">2</span>"));
    }

    #[test]
    fn test_deleted_node_has_badge_but_no_actions() {
        let mut gone = deleted("1", vec![node("2", "B", vec![])]);
        gone.comment = "This comment has been deleted".to_string();
        let html = render_node(&gone, 0, &ViewContext::default());

        assert!(html.contains("comment-badge\">Deleted</span>"));
        assert!(html.contains("This comment has been deleted"));
        assert_eq!(html.matches("comment-action-btn reply-btn").count(), 1);
        assert_eq!(html.matches("delete-btn").count(), 1);
        assert!(html.contains("class=\"comment-action-btn reply-btn\" data-comment-id=\"2\""));
    }

    #[test]
    fn test_only_reply_target_form_is_active() {
        let forest = vec![node("1", "A", vec![node("2", "B", vec![])]), node("3", "C", vec![])];
        let state = ClientViewState {
            visible_top_level_count: 5,
            reply_target: Some(ReplyTarget {
                id: CommentId::from("2"),
                author: "B".to_string(),
            }),
        };
        let view = CommentsView::build(&forest, &state, DEFAULT_MAX_INDENT_DEPTH);
        let html = render_view(&view);

        assert_eq!(html.matches("class=\"reply-form active\"").count(), 1);
        assert!(html.contains("class=\"reply-form active\" id=\"reply-form-2\""));
        assert!(html.contains("class=\"reply-form\" id=\"reply-form-1\""));
    }
}
