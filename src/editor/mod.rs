use anyhow::Result;
use std::borrow::Cow;
use std::env;
use std::fs;
use std::process::Command;
use tempfile::NamedTempFile;

/// エディタのテンプレート設定
struct EditorTemplate<'a> {
    header: Cow<'a, str>,
    initial_content: Option<Cow<'a, str>>,
}

impl EditorTemplate<'_> {
    fn render(&self) -> String {
        match &self.initial_content {
            Some(initial) => format!("{}\n\n{}", self.header, initial),
            None => format!("{}\n\n", self.header),
        }
    }
}

/// Check whether a command can be found in PATH and is executable.
fn command_found_in_path(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Editor candidates in priority order: config → $VISUAL → $EDITOR → vi
fn editor_candidates(configured: Option<&str>) -> Vec<String> {
    [
        configured
            .filter(|s| !s.trim().is_empty())
            .map(String::from),
        env::var("VISUAL").ok().filter(|s| !s.trim().is_empty()),
        env::var("EDITOR").ok().filter(|s| !s.trim().is_empty()),
        Some("vi".to_string()),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Resolve the editor command and split it into program + arguments.
///
/// The first candidate found in PATH wins. When none is found the first
/// candidate is returned so the launch fails with a readable error.
/// Quoted arguments (`emacsclient -c -a ""`) are handled by `shell_words`.
fn resolve_and_split_editor(configured: Option<&str>) -> Result<(String, Vec<String>)> {
    let mut first_parsed: Option<(String, Vec<String>)> = None;
    let mut skipped: Vec<String> = Vec::new();

    for raw in editor_candidates(configured) {
        let parts = shell_words::split(&raw)?;
        let Some((cmd, args)) = parts.split_first() else {
            continue;
        };
        let parsed = (cmd.clone(), args.to_vec());

        if command_found_in_path(cmd) {
            if !skipped.is_empty() {
                tracing::warn!(
                    skipped_editors = ?skipped,
                    resolved_editor = %cmd,
                    "editor candidate not found in PATH, falling back"
                );
            }
            return Ok(parsed);
        }

        first_parsed.get_or_insert(parsed);
        skipped.push(cmd.clone());
    }

    Ok(first_parsed.unwrap_or_else(|| ("vi".to_string(), vec![])))
}

/// Run a `Command`, converting `NotFound` into a user-friendly error message.
fn run_editor_command(cmd: &str, mut command: Command) -> Result<std::process::ExitStatus> {
    command.status().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::anyhow!(
                "Editor '{}' not found (also checked $VISUAL and $EDITOR). \
                 Set 'editor' in ~/.config/commentree/config.toml to an installed editor.",
                cmd
            )
        } else {
            anyhow::anyhow!("Failed to launch editor '{}': {}", cmd, e)
        }
    })
}

/// 一時ファイルを編集させ、コメント行を除いた本文を返す
///
/// 一時ファイルはどの経路でも drop 時に削除される。
fn open_editor_internal(
    editor: Option<&str>,
    template: EditorTemplate<'_>,
) -> Result<Option<String>> {
    let temp_file = NamedTempFile::new()?;
    fs::write(temp_file.path(), template.render())?;

    let (cmd, args) = resolve_and_split_editor(editor)?;
    let mut command = Command::new(&cmd);
    command.args(&args).arg(temp_file.path());
    let status = run_editor_command(&cmd, command)?;

    if !status.success() {
        tracing::debug!(%cmd, ?status, "editor exited with failure, discarding");
        return Ok(None);
    }

    let content = fs::read_to_string(temp_file.path())?;
    let body = extract_comment_body(&content);

    if body.is_empty() {
        Ok(None)
    } else {
        Ok(Some(body))
    }
}

fn comment_header(reply_to: Option<&str>) -> String {
    let target = match reply_to {
        Some(author) => format!("<!-- Reply to {} -->\n", author),
        None => String::new(),
    };
    format!(
        "<!-- commentree: Enter your comment below -->\n\
         {}<!-- Save and close to submit, delete all content to cancel -->",
        target
    )
}

/// Compose a comment body in the external editor.
///
/// `initial` pre-fills the buffer with the current draft. Returns `None` when
/// the editor fails or the result is empty.
/// The caller is responsible for suspending/restoring the TUI terminal.
pub fn open_comment_editor(
    editor: Option<&str>,
    reply_to: Option<&str>,
    initial: &str,
) -> Result<Option<String>> {
    open_editor_internal(
        editor,
        EditorTemplate {
            header: Cow::Owned(comment_header(reply_to)),
            initial_content: (!initial.trim().is_empty()).then_some(Cow::Borrowed(initial)),
        },
    )
}

fn extract_comment_body(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim().starts_with("<!--"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
