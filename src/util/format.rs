use chrono::{Datelike, NaiveDate};

use crate::models::EventCategory;

/// Free events render as "Free" everywhere a price is shown; everything else
/// is a rupee amount.
pub fn format_price(price: u64) -> String {
    if price == 0 {
        "Free".to_string()
    } else {
        format!("₹{price}")
    }
}

/// "June 15, 2025" style dates for display.
pub fn format_date(date: NaiveDate) -> String {
    format!("{} {}, {}", date.format("%B"), date.day(), date.year())
}

/// The empty-state copy for the event list. A non-empty search string is
/// quoted back verbatim.
pub fn empty_state_message(query: &str, category: Option<EventCategory>) -> String {
    let query = query.trim();
    if !query.is_empty() {
        format!("No events match your search for \"{query}\". Try adjusting your filters.")
    } else {
        match category {
            Some(c) => format!(
                "No {} events are currently available. Try adjusting your filters.",
                c.as_str()
            ),
            None => "No events are currently available. Try adjusting your filters.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_price_renders_free() {
        assert_eq!(format_price(0), "Free");
        assert_eq!(format_price(500), "₹500");
    }

    #[test]
    fn dates_render_long_form() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        assert_eq!(format_date(date), "June 15, 2025");
        let date = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(format_date(date), "March 5, 2025");
    }

    #[test]
    fn empty_state_quotes_the_search_verbatim() {
        let msg = empty_state_message("robot olympics", Some(EventCategory::Milan));
        assert!(msg.contains("\"robot olympics\""));

        let msg = empty_state_message("  ", Some(EventCategory::Milan));
        assert!(msg.contains("No milan events"));

        let msg = empty_state_message("", None);
        assert!(msg.starts_with("No events are currently available"));
    }
}
