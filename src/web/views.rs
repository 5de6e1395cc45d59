//! Server-rendered HTML pages.

use axum::response::Html;
use std::fmt::Write;

use crate::crm::{CrmObject, MeasureOption};

use super::form::RecordForm;

pub const LIST_TITLE: &str = "Custom Objects | HubSpot APIs";
pub const FORM_TITLE: &str = "Update Custom Object Form | Integrating With HubSpot I Practicum";
pub const ERROR_TITLE: &str = "Error | HubSpot APIs";

/// Escape text for use in HTML element content and quoted attributes
pub fn escape(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  for c in input.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(c),
    }
  }
  out
}

fn layout(title: &str, body: &str) -> Html<String> {
  Html(format!(
    r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="/css/style.css">
</head>
<body>
    <main>
{body}
    </main>
</body>
</html>"#,
    title = escape(title),
    body = body,
  ))
}

fn cell(value: Option<&str>) -> String {
  escape(value.unwrap_or(""))
}

/// Listing page: one table row per record.
pub fn record_list(records: &[CrmObject]) -> Html<String> {
  let mut body = String::new();
  body.push_str("        <h1>Custom Objects</h1>\n");
  body.push_str("        <p><a href=\"/update-cobj\">Add a new record</a></p>\n");

  if records.is_empty() {
    body.push_str("        <p class=\"empty\">No records yet.</p>\n");
    return layout(LIST_TITLE, &body);
  }

  body.push_str(
    "        <table>\n            <thead>\n                <tr><th>Name</th><th>Institution</th><th>Time taken</th><th>Time measure</th><th>Created</th></tr>\n            </thead>\n            <tbody>\n",
  );

  for record in records {
    let props = &record.properties;
    let created = record
      .created_at
      .map(|at| at.format("%Y-%m-%d").to_string())
      .unwrap_or_default();

    let _ = writeln!(
      body,
      "                <tr data-id=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
      escape(&record.id),
      cell(props.name.as_deref()),
      cell(props.institution.as_deref()),
      cell(props.time_taken.as_deref()),
      cell(props.time_measure.as_deref()),
      created,
    );
  }

  body.push_str("            </tbody>\n        </table>\n");
  layout(LIST_TITLE, &body)
}

/// Everything the creation form needs to render
#[derive(Debug, Default)]
pub struct FormPage<'a> {
  pub options: &'a [MeasureOption],
  /// Inline message above the form (validation failures)
  pub message: Option<&'a str>,
  /// Values to refill after a failed submission
  pub values: Option<&'a RecordForm>,
}

fn text_input(label: &str, field: &str, value: Option<&str>) -> String {
  format!(
    "            <label for=\"{field}\">{label}</label>\n            <input type=\"text\" id=\"{field}\" name=\"{field}\" value=\"{value}\">\n",
    field = field,
    label = escape(label),
    value = escape(value.unwrap_or("")),
  )
}

/// Creation form with the `time_measure` dropdown.
pub fn record_form(page: &FormPage<'_>) -> Html<String> {
  let values = page.values.cloned().unwrap_or_default();

  let mut body = String::new();
  body.push_str("        <h1>Update Custom Object Form</h1>\n");

  if let Some(message) = page.message {
    let _ = writeln!(body, "        <p class=\"message\">{}</p>", escape(message));
  }

  body.push_str("        <form method=\"POST\" action=\"/update-cobj\">\n");
  body.push_str(&text_input("Name", "name", values.name.as_deref()));
  body.push_str(&text_input(
    "Institution",
    "institution",
    values.institution.as_deref(),
  ));
  body.push_str(&text_input(
    "Time taken",
    "time_taken",
    values.time_taken.as_deref(),
  ));

  body.push_str("            <label for=\"time_measure\">Time measure</label>\n");
  body.push_str("            <select id=\"time_measure\" name=\"time_measure\">\n");
  body.push_str("                <option value=\"\">Select a measure</option>\n");
  for option in page.options {
    let selected = if values.time_measure.as_deref() == Some(option.value.as_str()) {
      " selected"
    } else {
      ""
    };
    let _ = writeln!(
      body,
      "                <option value=\"{}\"{}>{}</option>",
      escape(&option.value),
      selected,
      escape(&option.label),
    );
  }
  body.push_str("            </select>\n");

  body.push_str("            <button type=\"submit\">Save</button>\n");
  body.push_str("        </form>\n");
  body.push_str("        <p><a href=\"/\">Back to the list</a></p>\n");

  layout(FORM_TITLE, &body)
}

/// Generic error view.
pub fn error_page(message: &str) -> Html<String> {
  let body = format!(
    "        <h1>Something went wrong</h1>\n        <p class=\"message\">{}</p>\n        <p><a href=\"/\">Back to the list</a></p>\n",
    escape(message)
  );
  layout(ERROR_TITLE, &body)
}
