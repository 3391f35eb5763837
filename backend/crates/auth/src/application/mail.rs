//! Outgoing Mail Bodies

use crate::application::config::AuthConfig;

pub struct MailMessage {
    pub subject: &'static str,
    pub html_body: String,
}

pub fn verification_mail(config: &AuthConfig, username: &str, token: &str) -> MailMessage {
    let username = escape_html(username);
    let link = config.verification_link(token);
    let minutes = config.verification_token_ttl.num_minutes();
    MailMessage {
        subject: "Verify your email address",
        html_body: format!(
            "<p>Hi {username},</p>\
             <p>Confirm your email address by opening the link below. \
             It expires in {minutes} minutes.</p>\
             <p><a href=\"{link}\">{link}</a></p>"
        ),
    }
}

pub fn password_reset_mail(config: &AuthConfig, username: &str, token: &str) -> MailMessage {
    let username = escape_html(username);
    let link = config.reset_link(token);
    let minutes = config.reset_token_ttl.num_minutes();
    MailMessage {
        subject: "Reset your password",
        html_body: format!(
            "<p>Hi {username},</p>\
             <p>Someone asked to reset the password of your account. \
             The link below is valid for {minutes} minutes. \
             If this wasn't you, ignore this email.</p>\
             <p><a href=\"{link}\">{link}</a></p>"
        ),
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
