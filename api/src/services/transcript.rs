//! Renders a stored transcript snapshot into a portable HTML document.
//!
//! The snapshot is trusted JSON produced by the engine, but every field that
//! originated as user input is HTML-escaped on interpolation; ticket bodies
//! and subjects must never be able to inject markup into the document.

use serde_json::Value;

/// Escapes a string for safe interpolation into HTML text or attributes.
pub fn escape_html(input: &str) -> String {
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

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Renders the snapshot JSON into a standalone HTML document.
pub fn render_html(snapshot: &Value) -> String {
    let ticket = snapshot.get("ticket").cloned().unwrap_or(Value::Null);
    let public_id = escape_html(str_field(&ticket, "public_id"));
    let subject = escape_html(str_field(&ticket, "subject"));
    let generated_at = escape_html(str_field(snapshot, "generated_at"));

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>Ticket {public_id}</title>\n"));
    html.push_str("<style>body{font-family:sans-serif;max-width:48rem;margin:2rem auto;}");
    html.push_str(".msg{border:1px solid #ddd;border-radius:4px;padding:.5rem 1rem;margin:.5rem 0;}");
    html.push_str(".meta{color:#666;font-size:.85rem;}</style>\n</head>\n<body>\n");
    html.push_str(&format!("<h1>Ticket {public_id}: {subject}</h1>\n"));
    html.push_str(&format!("<p class=\"meta\">Generated at {generated_at}</p>\n"));

    html.push_str("<h2>Messages</h2>\n");
    if let Some(messages) = snapshot.get("messages").and_then(Value::as_array) {
        for message in messages {
            let author_type = escape_html(str_field(message, "author_type"));
            let created_at = escape_html(str_field(message, "created_at"));
            let body = escape_html(str_field(message, "body"));
            html.push_str("<div class=\"msg\">\n");
            html.push_str(&format!(
                "<p class=\"meta\">{author_type} &middot; {created_at}</p>\n"
            ));
            html.push_str(&format!("<p>{body}</p>\n"));

            if let Some(attachments) = message.get("attachments").and_then(Value::as_array) {
                if !attachments.is_empty() {
                    html.push_str("<ul>\n");
                    for attachment in attachments {
                        let filename = escape_html(str_field(attachment, "filename"));
                        let size = attachment
                            .get("size_bytes")
                            .and_then(Value::as_i64)
                            .unwrap_or(0);
                        html.push_str(&format!("<li>{filename} ({size} bytes)</li>\n"));
                    }
                    html.push_str("</ul>\n");
                }
            }
            html.push_str("</div>\n");
        }
    }

    html.push_str("<h2>Claim history</h2>\n<ul>\n");
    if let Some(claims) = snapshot.get("claims").and_then(Value::as_array) {
        for claim in claims {
            let action = escape_html(str_field(claim, "action"));
            let staff_id = claim.get("staff_id").and_then(Value::as_i64).unwrap_or(0);
            let created_at = escape_html(str_field(claim, "created_at"));
            html.push_str(&format!(
                "<li>{action} by staff #{staff_id} at {created_at}</li>\n"
            ));
        }
    }
    html.push_str("</ul>\n");

    html.push_str("<h2>Audit trail</h2>\n<ul>\n");
    if let Some(audit) = snapshot.get("audit").and_then(Value::as_array) {
        for entry in audit {
            let action = escape_html(str_field(entry, "action"));
            let created_at = escape_html(str_field(entry, "created_at"));
            html.push_str(&format!("<li>{action} at {created_at}</li>\n"));
        }
    }
    html.push_str("</ul>\n</body>\n</html>\n");

    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn escape_html_covers_the_dangerous_characters() {
        assert_eq!(
            escape_html(r#"<script>alert("x&y")</script>"#),
            "&lt;script&gt;alert(&quot;x&amp;y&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("it's"), "it&#39;s");
    }

    #[test]
    fn render_escapes_every_interpolated_field() {
        let snapshot = json!({
            "generated_at": "2026-01-01T00:00:00Z",
            "ticket": { "public_id": "a1b2c3d4", "subject": "<img src=x>" },
            "messages": [{
                "author_type": "user",
                "created_at": "2026-01-01T00:00:00Z",
                "body": "<script>steal()</script>",
                "attachments": [{ "filename": "\"><b>bold.txt", "size_bytes": 12 }]
            }],
            "claims": [],
            "audit": []
        });

        let html = render_html(&snapshot);
        assert!(!html.contains("<script>steal()"));
        assert!(html.contains("&lt;script&gt;steal()&lt;/script&gt;"));
        assert!(!html.contains("<img src=x>"));
        assert!(html.contains("&quot;&gt;&lt;b&gt;bold.txt"));
    }

    #[test]
    fn render_tolerates_a_minimal_snapshot() {
        let html = render_html(&json!({}));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }
}
