//! HTML bodies for maintenance notifications.

use std::fmt::Write;

/// Fields shown in the owner notification.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnerNotice {
    pub house_id: String,
    pub tenant_name: Option<String>,
    pub issue_category: String,
    pub issue: String,
    pub urgency: String,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub entry_permission: bool,
}

const ROW_STYLE: &str = "padding: 8px; border-bottom: 1px solid #dddddd;";
const SHADED: &str = " background-color: #f2f2f2;";

/// Escape text for interpolation into HTML.
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

/// Colour for an urgency label. Anything other than high or medium renders green.
pub fn urgency_colour(urgency: &str) -> &'static str {
    match urgency.trim().to_ascii_lowercase().as_str() {
        "high" => "#e53935",
        "medium" => "#ff9800",
        _ => "#4caf50",
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn push_row(html: &mut String, label: &str, value: &str, shaded: bool) {
    let shade = if shaded { SHADED } else { "" };
    let _ = write!(
        html,
        r#"<tr><td style="{ROW_STYLE} font-weight: bold; width: 40%;{shade}">{label}:</td><td style="{ROW_STYLE}{shade}">{value}</td></tr>"#
    );
}

/// Owner notification for a new maintenance request.
pub fn render_owner_notice(notice: &OwnerNotice) -> String {
    let urgency = capitalize(&notice.urgency);
    let mut html = String::new();

    html.push_str(r#"<div style="font-family: Arial, sans-serif; line-height: 1.6; color: #333333; max-width: 600px; margin: 0 auto; padding: 20px;">"#);
    html.push_str(r#"<div style="background-color: #f7f7f7; padding: 20px; border-radius: 5px; border-left: 4px solid #4a6fa5;">"#);
    html.push_str(r#"<h1 style="color: #4a6fa5; margin-top: 0;">New Maintenance Request</h1>"#);
    html.push_str(r#"<p style="margin-bottom: 20px;">A new maintenance request has been submitted for your property. Please review the details below:</p>"#);
    html.push_str(r#"<table style="width: 100%; border-collapse: collapse; margin-bottom: 20px;">"#);

    let mut rows: Vec<(&str, String)> = vec![("Property ID", escape_html(&notice.house_id))];
    if let Some(name) = notice.tenant_name.as_deref().filter(|n| !n.trim().is_empty()) {
        rows.push(("Tenant", escape_html(name)));
    }
    rows.push(("Issue Category", escape_html(&notice.issue_category)));
    rows.push(("Description", escape_html(&notice.issue)));
    rows.push((
        "Urgency",
        format!(
            r#"<span style="color: {}; font-weight: bold;">{}</span>"#,
            urgency_colour(&urgency),
            escape_html(&urgency)
        ),
    ));
    rows.push((
        "Preferred Date",
        escape_html(notice.preferred_date.as_deref().unwrap_or("Not specified")),
    ));
    rows.push((
        "Preferred Time",
        escape_html(notice.preferred_time.as_deref().unwrap_or("Not specified")),
    ));
    rows.push((
        "Entry Permission",
        if notice.entry_permission { "Granted" } else { "Not Granted" }.to_string(),
    ));

    for (i, (label, value)) in rows.iter().enumerate() {
        push_row(&mut html, label, value, i % 2 == 1);
    }
    html.push_str("</table>");

    html.push_str(r#"<div style="background-color: #e8f0fe; padding: 15px; border-radius: 4px; margin-bottom: 20px;">"#);
    html.push_str(r#"<p style="margin: 0; font-weight: bold;">Next Steps:</p>"#);
    html.push_str(r#"<ol style="margin-top: 10px; margin-bottom: 0; padding-left: 20px;">"#);
    html.push_str("<li>Review the request details</li>");
    html.push_str("<li>Schedule a service appointment</li>");
    html.push_str("<li>Contact the tenant to confirm the appointment</li>");
    html.push_str("</ol></div>");
    html.push_str(r#"<p style="margin-top: 30px; font-size: 12px; color: #777777; text-align: center;">This is an automated message. Please do not reply directly to this email.</p>"#);
    html.push_str("</div></div>");
    html
}

/// Acknowledgement sent back to the tenant.
pub fn render_tenant_copy(notice: &OwnerNotice) -> String {
    let greeting = match notice.tenant_name.as_deref().filter(|n| !n.trim().is_empty()) {
        Some(name) => format!("Hello {},", escape_html(name)),
        None => "Hello,".to_string(),
    };
    format!(
        concat!(
            r#"<div style="font-family: Arial, sans-serif; line-height: 1.6; color: #333333; max-width: 600px; margin: 0 auto; padding: 20px;">"#,
            "<p>{greeting}</p>",
            "<p>Your maintenance request for property <strong>{house}</strong> has been forwarded to the owner.</p>",
            "<p><strong>Issue Category:</strong> {category}<br><strong>Urgency:</strong> {urgency}</p>",
            "<p>{issue}</p>",
            r#"<p style="font-size: 12px; color: #777777;">This is an automated message. Please do not reply directly to this email.</p>"#,
            "</div>"
        ),
        greeting = greeting,
        house = escape_html(&notice.house_id),
        category = escape_html(&notice.issue_category),
        urgency = escape_html(&capitalize(&notice.urgency)),
        issue = escape_html(&notice.issue),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice() -> OwnerNotice {
        OwnerNotice {
            house_id: "H-1001".into(),
            tenant_name: Some("Asha".into()),
            issue_category: "plumbing, other: balcony door".into(),
            issue: "Kitchen sink <leaks>".into(),
            urgency: "high".into(),
            preferred_date: Some("2026-11-02".into()),
            preferred_time: None,
            entry_permission: true,
        }
    }

    #[test]
    fn test_owner_notice_fields() {
        let html = render_owner_notice(&notice());
        assert!(html.contains("H-1001"));
        assert!(html.contains("#e53935"));
        assert!(html.contains(">High<"));
        assert!(html.contains("Granted"));
        assert!(!html.contains("Not Granted"));
        assert!(html.contains("Not specified"));
        assert!(html.contains("Kitchen sink &lt;leaks&gt;"));
    }

    #[test]
    fn test_urgency_colours() {
        assert_eq!(urgency_colour("High"), "#e53935");
        assert_eq!(urgency_colour("medium"), "#ff9800");
        assert_eq!(urgency_colour("Low"), "#4caf50");
        assert_eq!(urgency_colour(""), "#4caf50");
    }

    #[test]
    fn test_entry_denied() {
        let mut n = notice();
        n.entry_permission = false;
        assert!(render_owner_notice(&n).contains("Not Granted"));
    }

    #[test]
    fn test_tenant_copy_greets_by_name() {
        let html = render_tenant_copy(&notice());
        assert!(html.contains("Hello Asha,"));
        assert!(html.contains("H-1001"));
    }
}
