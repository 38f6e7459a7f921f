use std::io::Cursor;

use chrono::NaiveDate;
use image::{ImageFormat, Luma};
use qrcode::{Color, QrCode};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Event, Ticket};

/// Target edge length of the rendered symbol, before rounding to a whole
/// number of pixels per module.
const TARGET_PX: u32 = 200;
/// Quiet margin around the symbol, in modules.
const QUIET_MODULES: u32 = 2;

/// The fields serialized into the QR symbol. Nothing in the system ever
/// decodes this; it exists to be scanned at the venue.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketQrPayload<'a> {
    pub ticket_id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub event_title: &'a str,
    pub attendee: &'a str,
    pub date: NaiveDate,
    pub venue: &'a str,
}

impl<'a> TicketQrPayload<'a> {
    pub fn new(ticket: &'a Ticket, event: &'a Event) -> Self {
        Self {
            ticket_id: ticket.id,
            event_id: ticket.event_id,
            user_id: ticket.user_id,
            event_title: &event.title,
            attendee: &ticket.user_name,
            date: event.date,
            venue: &event.venue,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QrRenderError {
    #[error("failed to serialize ticket payload")]
    Payload(#[from] serde_json::Error),
    #[error("failed to encode QR symbol")]
    Encode(#[from] qrcode::types::QrError),
    #[error("failed to write PNG")]
    Png(#[from] image::ImageError),
}

/// Render a ticket's QR code as a grayscale PNG, roughly `TARGET_PX` wide
/// with a quiet margin.
pub fn ticket_qr_png(ticket: &Ticket, event: &Event) -> Result<Vec<u8>, QrRenderError> {
    let payload = serde_json::to_string(&TicketQrPayload::new(ticket, event))?;
    let code = QrCode::new(payload.as_bytes())?;

    let modules = code.width() as u32 + 2 * QUIET_MODULES;
    let scale = (TARGET_PX / modules).max(1);
    let size = modules * scale;

    let mut img = image::GrayImage::from_pixel(size, size, Luma([255u8]));
    let colors = code.to_colors();
    let width = code.width();
    for (i, color) in colors.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let mx = (i % width) as u32 + QUIET_MODULES;
        let my = (i / width) as u32 + QUIET_MODULES;
        for dy in 0..scale {
            for dx in 0..scale {
                img.put_pixel(mx * scale + dx, my * scale + dy, Luma([0u8]));
            }
        }
    }

    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::{AttendeeDetails, issue_ticket};
    use crate::store::sample_events;

    fn ticket_and_event() -> (Ticket, Event) {
        let event = sample_events().remove(0);
        let attendee = AttendeeDetails {
            name: "Priya Sharma".to_string(),
            email: "priya@srmist.edu.in".to_string(),
            phone: "9876543210".to_string(),
            department: "CSE".to_string(),
            quantity: 1,
        };
        let ticket = issue_ticket(&event, &attendee, Uuid::new_v4());
        (ticket, event)
    }

    #[test]
    fn payload_carries_the_fixed_field_set() {
        let (ticket, event) = ticket_and_event();
        let json = serde_json::to_value(TicketQrPayload::new(&ticket, &event)).unwrap();
        assert_eq!(json["ticketId"], ticket.id.to_string());
        assert_eq!(json["eventTitle"], "Hackathon 2025");
        assert_eq!(json["attendee"], "Priya Sharma");
        assert_eq!(json["venue"], "Tech Building, Block 5");
        assert_eq!(json["date"], "2025-06-15");
    }

    #[test]
    fn renders_a_valid_png() {
        let (ticket, event) = ticket_and_event();
        let png = ticket_qr_png(&ticket, &event).unwrap();
        // PNG magic bytes.
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
        let img = image::load_from_memory(&png).unwrap();
        assert!(img.width() >= TARGET_PX / 2);
        assert_eq!(img.width(), img.height());
    }
}
