//! The feed page and the inline message banners.
use std::fmt::Write;

use mathgram_core::{ElementIds, HOST_SCRIPT, Renderer, escape};
use mathgram_store::{CommentView, PostView, Session, Store};

const STYLE: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Roboto', sans-serif; max-width: 860px; margin: 0 auto; padding: 1rem; }
.main-header { text-align: center; color: #1f77b4; font-size: 2.5rem; font-weight: bold; margin-bottom: 2rem; }
.post-card { border: 1px solid #ddd; border-radius: 10px; padding: 1.5rem; margin: 1rem 0; box-shadow: 0 2px 4px rgba(0,0,0,0.1); }
.post-header { display: flex; align-items: center; margin-bottom: 1rem; }
.avatar { width: 40px; height: 40px; border-radius: 50%; margin-right: 10px; }
.post-meta { color: #666; font-size: 0.9rem; }
.post-title { font-size: 1.3rem; font-weight: bold; margin: 0.5rem 0; }
.likes { margin-left: auto; font-size: 1.2rem; }
.comment-section { margin-top: 1rem; padding-top: 1rem; border-top: 1px solid #ddd; }
.comment { padding: 0.8rem; margin: 0.5rem 0; border-radius: 5px; border-left: 3px solid #1f77b4; background: #f5f5f5; }
.comment-header { display: flex; align-items: center; margin-bottom: 0.5rem; }
.comment-header img { width: 24px; height: 24px; border-radius: 50%; margin-right: 8px; }
.comment-date { color: #666; margin-left: 8px; font-size: 0.8rem; }
.error-message { color: #ff4444; background: #ffe6e6; padding: 0.8rem; border-radius: 5px; border-left: 4px solid #ff4444; }
.success-message { color: #00aa00; background: #e6ffe6; padding: 0.8rem; border-radius: 5px; border-left: 4px solid #00aa00; }
"#;

/// An inline message shown after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Success(String),
    Error(String),
}

impl Banner {
    pub fn message(&self) -> &str {
        match self {
            Banner::Success(msg) | Banner::Error(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Banner::Error(_))
    }

    pub fn to_html(&self) -> String {
        let class = if self.is_error() {
            "error-message"
        } else {
            "success-message"
        };
        format!("<div class=\"{class}\">{}</div>", escape(self.message()))
    }
}

/// Renders the feed: every post with its math fragment, like count and comments.
///
/// With a session, the like icon shows whether that user liked each post.
pub fn render_feed<S: Store + ?Sized>(
    store: &S,
    renderer: &Renderer,
    session: Option<&Session>,
    banner: Option<&Banner>,
) -> String {
    let mut ids = ElementIds::new();
    let mut out = String::with_capacity(8192);

    out.push_str("<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>Mathgram</title>\n<style>");
    out.push_str(STYLE);
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str("<h1 class=\"main-header\">📐 Mathgram</h1>\n");
    if let Some(session) = session {
        let _ = writeln!(
            out,
            "<p class=\"greeting\">👋 Olá, <strong>{}</strong>!</p>",
            escape(&session.name)
        );
    }
    if let Some(banner) = banner {
        out.push_str(&banner.to_html());
        out.push('\n');
    }

    let posts = store.list_posts();
    if posts.is_empty() {
        out.push_str("<p class=\"empty\">Nenhum post ainda. Seja o primeiro a postar!</p>\n");
    }
    for post in &posts {
        let liked = session.is_some_and(|s| s.has_liked(store, post.id));
        let comments = store.list_comments(post.id);
        let element_id = ids.keyed("post", post.id);
        render_post(&mut out, renderer, post, &element_id, liked, &comments);
    }

    out.push_str(HOST_SCRIPT);
    out.push_str("\n</body>\n</html>\n");
    out
}

fn render_post(
    out: &mut String,
    renderer: &Renderer,
    post: &PostView,
    element_id: &str,
    liked: bool,
    comments: &[CommentView],
) {
    let _ = writeln!(out, "<div class=\"post-card\" data-post=\"{}\">", post.id);
    out.push_str("<div class=\"post-header\">");
    let _ = write!(
        out,
        "<img src=\"{}\" class=\"avatar\" alt=\"\">",
        escape(&post.avatar_url)
    );
    let _ = write!(
        out,
        "<div><div class=\"post-title\">{}</div><div class=\"post-meta\">Por {} • {}</div></div>",
        escape(&post.title),
        escape(&post.author_name),
        post.created_at.format_long()
    );
    let icon = if liked { "❤️" } else { "🤍" };
    let _ = writeln!(out, "<span class=\"likes\">{icon} {}</span></div>", post.likes);

    out.push_str(&renderer.render(&post.content, element_id).to_iframe_html());
    out.push('\n');

    out.push_str("<div class=\"comment-section\">\n");
    let _ = writeln!(
        out,
        "<details><summary>💬 Comentários ({})</summary>",
        comments.len()
    );
    for comment in comments {
        render_comment(out, comment);
    }
    out.push_str("</details>\n</div>\n</div>\n");
}

fn render_comment(out: &mut String, comment: &CommentView) {
    out.push_str("<div class=\"comment\"><div class=\"comment-header\">");
    let _ = write!(
        out,
        "<img src=\"{}\" alt=\"\"><strong>{}</strong><span class=\"comment-date\">{}</span>",
        escape(&comment.avatar_url),
        escape(&comment.author_name),
        comment.created_at.format_short()
    );
    let _ = writeln!(out, "</div><div>{}</div></div>", escape(&comment.content));
}
