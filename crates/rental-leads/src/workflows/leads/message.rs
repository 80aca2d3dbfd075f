use chrono::{DateTime, FixedOffset, TimeZone, Utc};

use super::domain::LeadSubmission;

pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y, %H:%M";

/// Render the operator notification for a lead, stamped at `received_at`
/// converted into `offset`.
pub fn format_notification<Tz: TimeZone>(
    lead: &LeadSubmission,
    received_at: &DateTime<Tz>,
    offset: FixedOffset,
) -> String {
    let timestamp = received_at.with_timezone(&offset).format(TIMESTAMP_FORMAT);
    format!(
        "🏠 *Новая заявка с сайта*\n\n\
         👤 *Имя:* {}\n\
         📞 *Телефон:* {}\n\
         🕐 *Время:* {}",
        escape_markdown(lead.name()),
        escape_markdown(lead.phone()),
        timestamp
    )
}

pub fn format_notification_now(lead: &LeadSubmission, offset: FixedOffset) -> String {
    format_notification(lead, &Utc::now(), offset)
}

/// Escape the control characters of Telegram's legacy Markdown mode.
pub fn escape_markdown(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::leads::domain::ContactRequest;

    fn lead(name: &str, phone: &str) -> LeadSubmission {
        LeadSubmission::try_from(ContactRequest::new(name, phone)).expect("valid lead")
    }

    #[test]
    fn renders_fields_and_local_timestamp() {
        let received = Utc.with_ymd_and_hms(2026, 3, 7, 21, 5, 42).unwrap();
        let offset = FixedOffset::east_opt(3 * 3600).unwrap();
        let text = format_notification(&lead("Иван", "+79001234567"), &received, offset);

        assert!(text.starts_with("🏠 *Новая заявка с сайта*"));
        assert!(text.contains("👤 *Имя:* Иван"));
        assert!(text.contains("📞 *Телефон:* +79001234567"));
        assert!(text.ends_with("🕐 *Время:* 08.03.2026, 00:05"));
    }

    #[test]
    fn escapes_markdown_in_user_fields() {
        assert_eq!(escape_markdown("a_b*c`d[e]"), "a\\_b\\*c\\`d\\[e]");

        let received = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let text = format_notification(
            &lead("*bold*", "8 900"),
            &received,
            FixedOffset::east_opt(0).unwrap(),
        );
        assert!(text.contains("*Имя:* \\*bold\\*"));
    }

    #[test]
    fn underscored_names_are_sent_escaped() {
        let received = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let text = format_notification(
            &lead("Анна_Мария", "+7 (900) 123-45-67"),
            &received,
            FixedOffset::east_opt(0).unwrap(),
        );

        // Telegram renders `\_` as a literal underscore in Markdown mode.
        assert!(text.contains("👤 *Имя:* Анна\\_Мария\n"));
        assert!(!text.contains("Анна_Мария"));
        assert!(text.contains("📞 *Телефон:* +7 (900) 123-45-67"));
    }
}
