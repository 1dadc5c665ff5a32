//! Email copy.
//!
//! Each function returns `(subject, html)`. Interpolated values are escaped.

use crate::domain::foundation::Timestamp;

/// Escapes text for inclusion in HTML.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

pub fn invitation(requester: &str, paper_title: Option<&str>, registration_url: &str) -> (String, String) {
    let about = match paper_title {
        Some(title) => format!(" about your paper <em>{}</em>", escape(title)),
        None => String::new(),
    };
    let subject = "Consultation request from a reader of your research".to_string();
    let html = format!(
        "<p>Hello,</p>\
         <p>{requester} would like to book a paid consultation with you{about}.</p>\
         <p>To accept, create your researcher profile here:<br>\
         <a href=\"{url}\">{url}</a></p>\
         <p>This link is personal and expires in 14 days.</p>",
        requester = escape(requester),
        about = about,
        url = escape(registration_url),
    );
    (subject, html)
}

pub fn outreach_accepted(researcher_email: &str) -> (String, String) {
    (
        "Your consultation request was accepted".to_string(),
        format!(
            "<p>Good news: {} accepted your consultation request.</p>\
             <p>You can now book a session from your dashboard.</p>",
            escape(researcher_email)
        ),
    )
}

/// What happened to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionNotice {
    Scheduled,
    Rescheduled,
    Canceled,
    Completed,
}

impl SessionNotice {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionNotice::Scheduled => "scheduled",
            SessionNotice::Rescheduled => "rescheduled",
            SessionNotice::Canceled => "canceled",
            SessionNotice::Completed => "completed",
        }
    }
}

pub fn session_notice(
    notice: SessionNotice,
    recipient: &str,
    counterpart: &str,
    start_time: Timestamp,
    meeting_link: Option<&str>,
) -> (String, String) {
    let when = start_time.to_display_string();
    let subject = match notice {
        SessionNotice::Scheduled => format!("Consultation scheduled for {}", when),
        SessionNotice::Rescheduled => format!("Consultation moved to {}", when),
        SessionNotice::Canceled => format!("Consultation on {} canceled", when),
        SessionNotice::Completed => "Consultation completed".to_string(),
    };

    let body = match notice {
        SessionNotice::Scheduled | SessionNotice::Rescheduled => {
            let link = match meeting_link {
                Some(link) => format!(
                    "<p>Join the video call: <a href=\"{0}\">{0}</a></p>",
                    escape(link)
                ),
                None => "<p>A video link will be shared separately.</p>".to_string(),
            };
            format!(
                "<p>Your consultation with {} is {} for {}.</p>{}",
                escape(counterpart),
                notice.as_str(),
                escape(&when),
                link
            )
        }
        SessionNotice::Canceled => format!(
            "<p>Your consultation with {} on {} has been canceled.</p>",
            escape(counterpart),
            escape(&when)
        ),
        SessionNotice::Completed => format!(
            "<p>Your consultation with {} is complete. Thank you!</p>",
            escape(counterpart)
        ),
    };

    (subject, format!("<p>Hi {},</p>{}", escape(recipient), body))
}

pub fn subscription_confirmed(end_date: Timestamp, price_cents: i64) -> (String, String) {
    (
        "Your consulting subscription is active".to_string(),
        format!(
            "<p>Thanks for subscribing (${}.{:02}).</p><p>Your access runs until {}.</p>",
            price_cents / 100,
            price_cents % 100,
            escape(&end_date.to_display_string())
        ),
    )
}
