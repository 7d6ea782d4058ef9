use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, Local};
use regex::Regex;
use serde_json::Value;

use crate::config::{AppConfig, JiraConfig, ResponseMode};
use crate::domain::issue::{Issue, NamedField, UserRef, resolve_field_path};
use crate::domain::reply::{Reply, ReplyField};

const DESCRIPTION_LIMIT: usize = 1000;
const NO_DESCRIPTION: &str = "Ticket does not contain a description";

/// Which secondary field the issue-list commands show next to the key.
#[derive(Debug, Clone, Copy)]
pub enum ListField {
    Status,
    Priority,
}

/// Build the attachment describing one issue. `Full` adds the structured
/// field grid; the minimal mode stops at title, link and description.
pub fn format_issue(issue: &Issue, mode: ResponseMode, config: &AppConfig) -> Reply {
    format_issue_at(issue, mode, config, Local::now().fixed_offset())
}

pub fn format_issue_at(
    issue: &Issue,
    mode: ResponseMode,
    config: &AppConfig,
    now: DateTime<FixedOffset>,
) -> Reply {
    let summary = issue
        .fields
        .summary
        .clone()
        .unwrap_or_else(|| format!("No summary found for {}", issue.key));

    let mut reply = Reply {
        fallback: summary.clone(),
        text: Some(format_description(issue.fields.description.as_deref())),
        mrkdwn_in: vec!["text".to_string()],
        pretext: Some(format!("Here is some information on {}", issue.key)),
        title: Some(summary),
        title_link: Some(build_issue_link(&config.jira, &issue.key)),
        footer: Some(format!(
            "jirabot {} - {}",
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_HOMEPAGE")
        )),
        fields: Vec::new(),
    };

    if mode != ResponseMode::Full {
        return reply;
    }

    reply.fields.push(ReplyField::short(
        "Created",
        calendar_date(issue.fields.created.as_deref().unwrap_or_default(), now),
    ));
    reply.fields.push(ReplyField::short(
        "Updated",
        calendar_date(issue.fields.updated.as_deref().unwrap_or_default(), now),
    ));
    reply.fields.push(ReplyField::short(
        "Status",
        field_name(&issue.fields.status),
    ));
    reply.fields.push(ReplyField::short(
        "Priority",
        field_name(&issue.fields.priority),
    ));
    reply.fields.push(ReplyField::short(
        "Reporter",
        issue
            .fields
            .reporter
            .as_ref()
            .map(|user| format_user(&config.usermap, user))
            .unwrap_or_else(|| "Unknown".to_string()),
    ));
    reply.fields.push(ReplyField::short(
        "Assignee",
        issue
            .fields
            .assignee
            .as_ref()
            .map(|user| format_user(&config.usermap, user))
            .unwrap_or_else(|| "Unassigned".to_string()),
    ));

    if let Some(sprint_field) = &config.jira.sprint_field {
        let descriptors: Vec<String> = issue
            .fields
            .extra
            .get(sprint_field)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default();
        let name = parse_sprint(&descriptors);
        let value = if name.is_empty() {
            "Not Assigned".to_string()
        } else {
            name
        };
        reply.fields.push(ReplyField::long("Sprint", value));
    }

    if !config.jira.custom_fields.is_empty() {
        let tree = issue.fields.as_value();
        for (path, label) in &config.jira.custom_fields {
            reply
                .fields
                .push(ReplyField::long(label, custom_field_value(&tree, path)));
        }
    }

    reply
}

/// `protocol://host:port[/base]/browse/<key>`, base stripped of leading
/// and trailing slashes before insertion.
pub fn build_issue_link(jira: &JiraConfig, key: &str) -> String {
    let mut base = String::from("/browse/");
    if let Some(configured) = jira.base.as_deref() {
        let trimmed = configured.trim_matches('/');
        if !trimmed.is_empty() {
            base = format!("/{trimmed}{base}");
        }
    }
    format!(
        "{}://{}:{}{}{}",
        jira.protocol, jira.host, jira.port, base, key
    )
}

/// Convert Jira wiki markup to Slack mrkdwn and cap the length. A missing
/// description gets a fixed placeholder.
pub fn format_description(description: Option<&str>) -> String {
    let raw = match description {
        Some(text) if !text.trim().is_empty() => text,
        _ => return NO_DESCRIPTION.to_string(),
    };
    let converted = jira_markup_to_mrkdwn(raw);
    if converted.chars().count() > DESCRIPTION_LIMIT {
        converted.chars().take(DESCRIPTION_LIMIT).collect()
    } else {
        converted
    }
}

fn jira_markup_to_mrkdwn(input: &str) -> String {
    static CODE_RE: OnceLock<Regex> = OnceLock::new();
    static HEADING_RE: OnceLock<Regex> = OnceLock::new();
    static LINK_RE: OnceLock<Regex> = OnceLock::new();

    let code = CODE_RE.get_or_init(|| Regex::new(r"\{code(?::[^}]*)?\}|\{noformat\}|\{quote\}").unwrap());
    let heading = HEADING_RE.get_or_init(|| Regex::new(r"(?m)^h[1-6]\.\s*(.+)$").unwrap());
    let link = LINK_RE.get_or_init(|| Regex::new(r"\[([^|\]]+)\|([^\]]+)\]").unwrap());

    let out = code.replace_all(input, "```");
    let out = heading.replace_all(&out, "*${1}*");
    link.replace_all(&out, "<${2}|${1}>").into_owned()
}

/// Pull the sprint name out of the raw greenhopper descriptors. A ticket
/// in several sprints takes the last one, which is the most recently
/// added.
pub fn parse_sprint(descriptors: &[String]) -> String {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    let re = NAME_RE.get_or_init(|| Regex::new(r",name=([^,]+),").unwrap());

    descriptors
        .last()
        .and_then(|descriptor| re.captures(descriptor))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Resolve a configured dotted field path against the issue's field tree.
/// Paths with shell-style metacharacters are refused outright; anything
/// unresolvable or empty gets a readable placeholder instead of an error.
pub fn custom_field_value(fields: &Value, path: &str) -> String {
    if path
        .chars()
        .any(|c| matches!(c, ';' | '&' | '|' | '(' | ')'))
    {
        return format!("Invalid characters in {path}");
    }
    match resolve_field_path(fields, path).map(render_value) {
        Some(value) if !value.is_empty() => value,
        _ => format!("Unable to read {path}"),
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// One line per issue, one tab-indented line per subtask:
/// `*KEY*: *<field>* - <summary>`.
pub fn issue_list_body(issues: &[Issue], field: ListField) -> String {
    let mut body = String::new();
    for issue in issues {
        let (status, priority) = (&issue.fields.status, &issue.fields.priority);
        body.push_str(&format!(
            "*{}*: *{}* - {}\n",
            issue.key,
            pick_field(field, status, priority),
            issue.fields.summary.as_deref().unwrap_or_default()
        ));
        for subtask in &issue.fields.subtasks {
            body.push_str(&format!(
                "\t*{}*: *{}* - {}\n",
                subtask.key,
                pick_field(field, &subtask.fields.status, &subtask.fields.priority),
                subtask.fields.summary.as_deref().unwrap_or_default()
            ));
        }
    }
    body
}

fn pick_field<'a>(
    field: ListField,
    status: &'a Option<NamedField>,
    priority: &'a Option<NamedField>,
) -> &'a str {
    let chosen = match field {
        ListField::Status => status,
        ListField::Priority => priority,
    };
    chosen.as_ref().map(|f| f.name.as_str()).unwrap_or("None")
}

fn field_name(field: &Option<NamedField>) -> String {
    field
        .as_ref()
        .map(|f| f.name.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn format_user(usermap: &HashMap<String, String>, user: &UserRef) -> String {
    user.name
        .as_deref()
        .and_then(|name| usermap.get(name))
        .map(|handle| format!("@{handle}"))
        .or_else(|| user.display_name.clone())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Calendar-style relative date: today and yesterday by name, the last
/// week by weekday, anything older as a plain date. Unparseable input is
/// shown as-is.
pub fn calendar_date(raw: &str, now: DateTime<FixedOffset>) -> String {
    let Some(parsed) = parse_jira_datetime(raw) else {
        return raw.to_string();
    };
    let local = parsed.with_timezone(now.offset());
    let time = local.format("%-I:%M %p");
    let days = now
        .date_naive()
        .signed_duration_since(local.date_naive())
        .num_days();

    match days {
        0 => format!("Today at {time}"),
        1 => format!("Yesterday at {time}"),
        2..=6 => format!("Last {} at {time}", local.format("%A")),
        _ => local.format("%m/%d/%Y").to_string(),
    }
}

fn parse_jira_datetime(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.3f%z")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok())
}
