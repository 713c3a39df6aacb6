use crate::types::EmailMessage;

/// A message template using `{{variable}}` placeholders.
#[derive(Debug, Clone)]
pub struct Template {
    pub subject: String,
    pub body: String,
    pub html_body: Option<String>,
}

impl Template {
    /// Renders the template. Values substituted into the HTML body are
    /// escaped.
    pub fn render(&self, from: &str, to: &str, vars: &[(&str, &str)]) -> EmailMessage {
        EmailMessage {
            from: from.to_string(),
            to: to.to_string(),
            subject: render_string(&self.subject, vars, false),
            body: render_string(&self.body, vars, false),
            html_body: self
                .html_body
                .as_ref()
                .map(|html| render_string(html, vars, true)),
        }
    }
}

fn render_string(template: &str, vars: &[(&str, &str)], html: bool) -> String {
    let mut result = template.to_string();

    for (key, value) in vars {
        let placeholder = format!("{{{{{}}}}}", key);
        let replacement = if html {
            escape_html(value)
        } else {
            (*value).to_string()
        };
        result = result.replace(&placeholder, &replacement);
    }

    result
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
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

const VERIFICATION_BODY: &str = "\
Hello,

Use the link below to finish signing in:

{{url}}

The link can be used once and expires shortly. If you did not request it, you can ignore this email.
";

const VERIFICATION_HTML: &str = "\
<p>Hello,</p>
<p>Use the link below to finish signing in:</p>
<p><a href=\"{{url}}\">Sign in</a></p>
<p>The link can be used once and expires shortly. If you did not request it, you can ignore this email.</p>
";

/// Template of the email carrying a verification link.
pub fn verification_template(subject: &str) -> Template {
    Template {
        subject: subject.to_string(),
        body: VERIFICATION_BODY.to_string(),
        html_body: Some(VERIFICATION_HTML.to_string()),
    }
}

/// Renders the email sent to `recipient` with the verification `url`.
pub fn verification_email(recipient: &str, sender: &str, subject: &str, url: &str) -> EmailMessage {
    verification_template(subject).render(sender, recipient, &[("url", url)])
}
