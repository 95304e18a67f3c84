//! Semantic HTML for a standup report.
//!
//! This is the primary rendering path: the markup produced here is handed
//! to a layout+print engine for PDF conversion. The renderer only reads the
//! report; it never mutates it.

use crate::jira::types::{CategorizedIssue, StandupReport};
use std::fmt::Write;

const STYLE: &str = "\
body { font-family: Helvetica, Arial, sans-serif; margin: 32px; color: #172b4d; }\n\
h1 { font-size: 22px; } h2 { font-size: 15px; margin-top: 24px; }\n\
table { border-collapse: collapse; width: 100%; font-size: 12px; }\n\
th, td { border: 1px solid #dfe1e6; padding: 4px 8px; text-align: left; }\n\
th { background: #f4f5f7; }\n\
.summary span { display: inline-block; margin-right: 18px; }\n\
.label { padding: 1px 6px; border-radius: 3px; color: #fff; font-size: 11px; }\n\
.stale { background: #ff8b00; } .overdue { background: #de350b; }\n\
.unassigned { background: #6554c0; } .blocked { background: #091e42; }\n\
.overflow { font-size: 11px; color: #6b778c; margin: 4px 0 0; }\n";

/// Render the whole report as a standalone HTML document.
pub fn render_html(report: &StandupReport, preview_rows: usize) -> String {
  let mut out = String::with_capacity(8 * 1024);
  let s = &report.summary;

  let _ = write!(
    out,
    "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
     <title>Daily Standup — {name}</title>\n<style>\n{STYLE}</style>\n</head>\n<body>\n\
     <h1>Daily Standup — {name} ({date})</h1>\n",
    name = escape(&report.sprint_name),
    date = escape(&report.date),
  );

  let _ = write!(
    out,
    "<div class=\"summary\">\
     <span><b>{total}</b> issues</span>\
     <span><b>{done}</b> completed ({done_pct}%)</span>\
     <span><b>{progress}</b> in progress ({progress_pct}%)</span>\
     <span><b>{todo}</b> to do ({todo_pct}%)</span>\
     </div>\n",
    total = s.total_sprint_issues,
    done = s.completed_issues,
    done_pct = percent(s.completed_issues, s.total_sprint_issues),
    progress = s.in_progress_issues,
    progress_pct = percent(s.in_progress_issues, s.total_sprint_issues),
    todo = s.todo_issues,
    todo_pct = percent(s.todo_issues, s.total_sprint_issues),
  );

  if s.project_filtered {
    let _ = write!(
      out,
      "<p class=\"overflow\">Filtered to project {}</p>\n",
      escape(s.project_key.as_deref().unwrap_or("?"))
    );
  }

  category_table(&mut out, "Stale issues", "stale", &report.stale_issues, preview_rows);
  category_table(&mut out, "Overdue issues", "overdue", &report.overdue_issues, preview_rows);
  category_table(
    &mut out,
    "Unassigned issues",
    "unassigned",
    &report.unassigned_issues,
    preview_rows,
  );
  category_table(&mut out, "Blocked issues", "blocked", &report.blocked_issues, preview_rows);

  out.push_str("<h2>By assignee</h2>\n<table>\n<tr><th>Assignee</th><th>Issues</th><th>Stale</th><th>Overdue</th></tr>\n");
  for assignee in report.by_assignee.values() {
    let _ = write!(
      out,
      "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
      escape(&assignee.name),
      assignee.issues.len(),
      assignee.stale_count,
      assignee.overdue_count,
    );
  }
  out.push_str("</table>\n</body>\n</html>\n");

  out
}

fn category_table(
  out: &mut String,
  title: &str,
  label_class: &str,
  issues: &[CategorizedIssue],
  preview_rows: usize,
) {
  let _ = write!(
    out,
    "<h2>{} <span class=\"label {}\">{}</span></h2>\n",
    escape(title),
    label_class,
    issues.len()
  );

  if issues.is_empty() {
    out.push_str("<p class=\"overflow\">None</p>\n");
    return;
  }

  out.push_str("<table>\n<tr><th>Key</th><th>Summary</th><th>Assignee</th><th>Status</th><th>Days idle</th><th>Due</th></tr>\n");
  for issue in issues.iter().take(preview_rows) {
    let _ = write!(
      out,
      "<tr><td><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
      escape(&issue.url),
      escape(&issue.key),
      escape(&issue.summary),
      escape(issue.assignee.as_deref().unwrap_or("—")),
      escape(&issue.status),
      issue.days_since_update,
      escape(issue.duedate.as_deref().unwrap_or("")),
    );
  }
  out.push_str("</table>\n");

  if issues.len() > preview_rows {
    let _ = write!(
      out,
      "<p class=\"overflow\">… and {} more</p>\n",
      issues.len() - preview_rows
    );
  }
}

pub(crate) fn percent(part: usize, total: usize) -> usize {
  if total == 0 {
    0
  } else {
    part * 100 / total
  }
}

fn escape(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for ch in text.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      c => out.push(c),
    }
  }
  out
}
