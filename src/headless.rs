use anyhow::Result;
use serde::Serialize;

use crate::api::{CommentNode, CommentsApi};
use crate::controller::{CommentTreeController, ControllerOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderFormat {
    #[default]
    Html,
    Json,
}

/// JSON output of `ctree render --json`
#[derive(Debug, Serialize)]
struct RenderJsonOutput<'a> {
    total_count: usize,
    count_label: &'a str,
    top_level_count: usize,
    visible_top_level_count: usize,
    has_more: bool,
    comments: &'a [CommentNode],
}

/// Fetch the forest once and print it to stdout (no TUI).
///
/// Progress goes to stderr so stdout stays pipeable. A failed fetch is an error
/// carrying the same message the TUI would show.
pub async fn run_render(
    api: &dyn CommentsApi,
    options: ControllerOptions,
    visible: Option<usize>,
    format: RenderFormat,
) -> Result<()> {
    let mut controller = CommentTreeController::new(options);
    if let Some(count) = visible {
        controller.set_visible_count(count);
    }

    eprintln!("[Headless] Fetching comments...");
    if !controller.load_all(api).await {
        let message = controller
            .notification()
            .map(|n| n.message.clone())
            .unwrap_or_else(|| "Failed to load comments".to_string());
        anyhow::bail!(message);
    }
    eprintln!(
        "[Headless] Loaded {} comments ({} top-level)",
        controller.total_count(),
        controller.forest().len()
    );

    let output = render_output(&controller, format)?;
    write_stdout(&output);
    Ok(())
}

/// Render the loaded controller in the requested format (pure for testability).
pub fn render_output(controller: &CommentTreeController, format: RenderFormat) -> Result<String> {
    match format {
        RenderFormat::Html => Ok(controller.render_markup()),
        RenderFormat::Json => {
            let view = controller.view();
            let visible = controller.visible_count();
            let output = RenderJsonOutput {
                total_count: view.total_count,
                count_label: &view.count_label,
                top_level_count: view.top_level_count,
                visible_top_level_count: visible,
                has_more: view.show_load_more,
                comments: &controller.forest()[..visible],
            };
            Ok(serde_json::to_string_pretty(&output)?)
        }
    }
}

/// Write to stdout with flush guarantee and broken pipe safety.
fn write_stdout(output: &str) {
    use std::io::Write;
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    let _ = writeln!(handle, "{}", output);
    let _ = handle.flush();
}
