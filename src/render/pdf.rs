//! PDF output for standup reports.
//!
//! The primary path converts the HTML rendering with an external
//! layout+print engine. When that engine fails for any reason, the
//! fallback draws an equivalent document directly: text blocks, colored
//! category labels, manual pagination. No corpus crate covers PDF output,
//! so the fallback emits the object graph itself (uncompressed streams,
//! built-in Helvetica).

use crate::error::{Error, Result};
use crate::jira::types::{CategorizedIssue, StandupReport};
use crate::render::html::{percent, render_html};
use std::future::Future;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;

/// Converts rendered HTML into PDF bytes. Seam for tests and for swapping
/// the converter binary.
pub trait HtmlPdfEngine {
  fn convert(&self, html: &str) -> impl Future<Output = Result<Vec<u8>>>;
}

/// Engine that pipes HTML through an external converter command
/// (wkhtmltopdf-style: HTML on stdin, PDF on stdout).
pub struct CommandEngine {
  program: String,
  args: Vec<String>,
}

impl CommandEngine {
  pub fn new(program: &str, args: &[&str]) -> Self {
    Self {
      program: program.to_string(),
      args: args.iter().map(|a| a.to_string()).collect(),
    }
  }
}

impl Default for CommandEngine {
  fn default() -> Self {
    Self::new("wkhtmltopdf", &["--quiet", "-", "-"])
  }
}

impl HtmlPdfEngine for CommandEngine {
  async fn convert(&self, html: &str) -> Result<Vec<u8>> {
    let mut child = tokio::process::Command::new(&self.program)
      .args(&self.args)
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::null())
      .spawn()
      .map_err(|e| Error::Internal(format!("failed to spawn {}: {}", self.program, e)))?;

    if let Some(mut stdin) = child.stdin.take() {
      stdin
        .write_all(html.as_bytes())
        .await
        .map_err(|e| Error::Internal(format!("failed to feed {}: {}", self.program, e)))?;
    }

    let output = child
      .wait_with_output()
      .await
      .map_err(|e| Error::Internal(format!("{} did not finish: {}", self.program, e)))?;

    if !output.status.success() || output.stdout.is_empty() {
      return Err(Error::Internal(format!(
        "{} exited with {}",
        self.program, output.status
      )));
    }

    Ok(output.stdout)
  }
}

/// Which path produced the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPath {
  Engine,
  Fallback,
}

/// Render the report to PDF, falling back to direct drawing when the
/// engine fails. Both paths consume the same report data.
pub async fn render_pdf<E: HtmlPdfEngine>(
  report: &StandupReport,
  engine: &E,
  preview_rows: usize,
) -> (Vec<u8>, RenderPath) {
  let html = render_html(report, preview_rows);
  match engine.convert(&html).await {
    Ok(bytes) => (bytes, RenderPath::Engine),
    Err(e) => {
      tracing::warn!(error = %e, "PDF engine failed, using fallback renderer");
      (render_fallback_pdf(report, preview_rows), RenderPath::Fallback)
    }
  }
}

// ============================================================================
// Fallback renderer
// ============================================================================

const PAGE_WIDTH: f64 = 612.0;
const PAGE_HEIGHT: f64 = 792.0;
const MARGIN_LEFT: f64 = 54.0;
const TOP_Y: f64 = 740.0;
const BOTTOM_Y: f64 = 56.0;

struct Line {
  text: String,
  size: f64,
  color: (f64, f64, f64),
  indent: f64,
  gap_before: f64,
}

impl Line {
  fn plain(text: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      size: 10.0,
      color: (0.09, 0.17, 0.3),
      indent: 0.0,
      gap_before: 0.0,
    }
  }

  fn heading(text: impl Into<String>, color: (f64, f64, f64)) -> Self {
    Self {
      text: text.into(),
      size: 13.0,
      color,
      indent: 0.0,
      gap_before: 10.0,
    }
  }

  fn row(text: impl Into<String>) -> Self {
    Self {
      indent: 14.0,
      ..Self::plain(text)
    }
  }

  fn muted(text: impl Into<String>) -> Self {
    Self {
      color: (0.42, 0.46, 0.55),
      indent: 14.0,
      size: 9.0,
      ..Self::plain(text)
    }
  }
}

const STALE_COLOR: (f64, f64, f64) = (1.0, 0.55, 0.0);
const OVERDUE_COLOR: (f64, f64, f64) = (0.87, 0.21, 0.04);
const UNASSIGNED_COLOR: (f64, f64, f64) = (0.4, 0.33, 0.75);
const BLOCKED_COLOR: (f64, f64, f64) = (0.04, 0.12, 0.26);
const HEADING_COLOR: (f64, f64, f64) = (0.03, 0.08, 0.18);

/// Draw the report without an HTML engine: one line at a time, new page
/// when the cursor passes the bottom margin.
pub fn render_fallback_pdf(report: &StandupReport, preview_rows: usize) -> Vec<u8> {
  let lines = report_lines(report, preview_rows);
  let pages = paginate(&lines);
  assemble(&pages)
}

fn report_lines(report: &StandupReport, preview_rows: usize) -> Vec<Line> {
  let s = &report.summary;
  let mut lines = vec![
    Line {
      size: 17.0,
      ..Line::heading(
        format!("Daily Standup - {} ({})", report.sprint_name, report.date),
        HEADING_COLOR,
      )
    },
    Line::plain(format!(
      "{} issues: {} completed ({}%), {} in progress ({}%), {} to do ({}%)",
      s.total_sprint_issues,
      s.completed_issues,
      percent(s.completed_issues, s.total_sprint_issues),
      s.in_progress_issues,
      percent(s.in_progress_issues, s.total_sprint_issues),
      s.todo_issues,
      percent(s.todo_issues, s.total_sprint_issues),
    )),
  ];
  if s.project_filtered {
    lines.push(Line::muted(format!(
      "Filtered to project {}",
      s.project_key.as_deref().unwrap_or("?")
    )));
  }

  category_lines(&mut lines, "Stale", STALE_COLOR, &report.stale_issues, preview_rows);
  category_lines(&mut lines, "Overdue", OVERDUE_COLOR, &report.overdue_issues, preview_rows);
  category_lines(
    &mut lines,
    "Unassigned",
    UNASSIGNED_COLOR,
    &report.unassigned_issues,
    preview_rows,
  );
  category_lines(&mut lines, "Blocked", BLOCKED_COLOR, &report.blocked_issues, preview_rows);

  lines.push(Line::heading("By assignee", HEADING_COLOR));
  for assignee in report.by_assignee.values() {
    lines.push(Line::row(format!(
      "{}: {} issues, {} stale, {} overdue",
      assignee.name,
      assignee.issues.len(),
      assignee.stale_count,
      assignee.overdue_count,
    )));
  }

  lines
}

fn category_lines(
  lines: &mut Vec<Line>,
  title: &str,
  color: (f64, f64, f64),
  issues: &[CategorizedIssue],
  preview_rows: usize,
) {
  lines.push(Line::heading(format!("{} ({})", title, issues.len()), color));
  if issues.is_empty() {
    lines.push(Line::muted("None"));
    return;
  }
  for issue in issues.iter().take(preview_rows) {
    let due = issue
      .duedate
      .as_deref()
      .map(|d| format!(", due {}", d))
      .unwrap_or_default();
    lines.push(Line::row(format!(
      "{}  {} [{}] - {} days idle{}",
      issue.key,
      issue.summary,
      issue.assignee.as_deref().unwrap_or("unassigned"),
      issue.days_since_update,
      due,
    )));
  }
  if issues.len() > preview_rows {
    lines.push(Line::muted(format!("... and {} more", issues.len() - preview_rows)));
  }
}

fn paginate(lines: &[Line]) -> Vec<String> {
  let mut pages = Vec::new();
  let mut content = String::new();
  let mut y = TOP_Y;

  for line in lines {
    let advance = line.size + 5.0 + line.gap_before;
    if y - advance < BOTTOM_Y {
      pages.push(std::mem::take(&mut content));
      y = TOP_Y;
    }
    y -= advance;

    let (r, g, b) = line.color;
    content.push_str(&format!(
      "{:.2} {:.2} {:.2} rg BT /F1 {:.1} Tf {:.1} {:.1} Td ({}) Tj ET\n",
      r,
      g,
      b,
      line.size,
      MARGIN_LEFT + line.indent,
      y,
      escape_pdf_text(&line.text),
    ));
  }
  if !content.is_empty() || pages.is_empty() {
    pages.push(content);
  }
  pages
}

/// Escape the PDF string delimiters and force ASCII; Helvetica with the
/// standard encoding cannot render arbitrary Unicode anyway.
fn escape_pdf_text(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for ch in text.chars() {
    match ch {
      '(' => out.push_str("\\("),
      ')' => out.push_str("\\)"),
      '\\' => out.push_str("\\\\"),
      c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
      _ => out.push('?'),
    }
  }
  out
}

/// Write the PDF object graph: catalog, page tree, font, then a page and
/// content stream per rendered page, with a correct xref table.
fn assemble(pages: &[String]) -> Vec<u8> {
  let mut body: Vec<u8> = Vec::new();
  let mut offsets: Vec<usize> = Vec::new();
  body.extend_from_slice(b"%PDF-1.4\n");

  let page_count = pages.len();
  let first_page_obj = 4;
  let kids: Vec<String> = (0..page_count)
    .map(|i| format!("{} 0 R", first_page_obj + 2 * i))
    .collect();

  let push_obj = |body: &mut Vec<u8>, offsets: &mut Vec<usize>, id: usize, content: String| {
    offsets.push(body.len());
    body.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", id, content).as_bytes());
  };

  push_obj(&mut body, &mut offsets, 1, "<< /Type /Catalog /Pages 2 0 R >>".to_string());
  push_obj(
    &mut body,
    &mut offsets,
    2,
    format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), page_count),
  );
  push_obj(
    &mut body,
    &mut offsets,
    3,
    "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
  );

  for (i, content) in pages.iter().enumerate() {
    let page_id = first_page_obj + 2 * i;
    let content_id = page_id + 1;
    push_obj(
      &mut body,
      &mut offsets,
      page_id,
      format!(
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
         /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
        PAGE_WIDTH, PAGE_HEIGHT, content_id
      ),
    );
    push_obj(
      &mut body,
      &mut offsets,
      content_id,
      format!("<< /Length {} >>\nstream\n{}endstream", content.len(), content),
    );
  }

  let xref_start = body.len();
  let object_count = offsets.len() + 1;
  body.extend_from_slice(format!("xref\n0 {}\n", object_count).as_bytes());
  body.extend_from_slice(b"0000000000 65535 f \n");
  for offset in &offsets {
    body.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
  }
  body.extend_from_slice(
    format!(
      "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
      object_count, xref_start
    )
    .as_bytes(),
  );

  body
}
