//! Presentation helpers shared by every front end.
//!
//! Nothing here touches the store; these are pure functions over the
//! snapshot types.

use crate::types::{Event, Money, Order};
use chrono::{DateTime, FixedOffset};

/// Ticket quantity chooser on the detail screen
///
/// Starts at one and stays between one and the event's availability. A
/// sold-out event has nothing to pick, so its picker holds zero tickets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuantityPicker {
    quantity: u32,
    available: u32,
    unit_price: Money,
}

impl QuantityPicker {
    /// Picker for `event`, starting at one ticket if any are left
    #[must_use]
    pub const fn for_event(event: &Event) -> Self {
        Self {
            quantity: if event.tickets_available == 0 { 0 } else { 1 },
            available: event.tickets_available,
            unit_price: event.price,
        }
    }

    /// Selected quantity
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Add a ticket if more are available; returns whether it changed
    pub const fn increase(&mut self) -> bool {
        if self.quantity < self.available {
            self.quantity += 1;
            true
        } else {
            false
        }
    }

    /// Remove a ticket, never going below one; returns whether it changed
    pub const fn decrease(&mut self) -> bool {
        if self.quantity > 1 {
            self.quantity -= 1;
            true
        } else {
            false
        }
    }

    /// Price preview for the selected quantity
    #[must_use]
    pub const fn total(&self) -> Money {
        self.unit_price.saturating_multiply(self.quantity)
    }

    /// False when the event is sold out
    #[must_use]
    pub const fn can_purchase(&self) -> bool {
        self.available > 0
    }
}

/// `"Jun 01, 2025 · 7:30 PM"`, as shown in the catalog list
#[must_use]
pub fn list_date(event: &Event) -> String {
    format_date(event, "%b %d, %Y · %-I:%M %p")
}

/// `"Sunday, June 01, 2025"`, as shown on the detail screen
#[must_use]
pub fn long_date(date: &str) -> String {
    format_raw(date, "%A, %B %d, %Y")
}

/// `"7:30 PM"`
#[must_use]
pub fn time_of_day(date: &str) -> String {
    format_raw(date, "%-I:%M %p")
}

/// `"150 tickets available"` or `"SOLD OUT"`
#[must_use]
pub fn availability(event: &Event) -> String {
    if event.is_sold_out() {
        "SOLD OUT".to_string()
    } else {
        format!("{} tickets available", event.tickets_available)
    }
}

/// Multi-line catalog entry
#[must_use]
pub fn render_list_item(event: &Event) -> String {
    format!(
        "[{}] {}\n    {}\n    {}\n    {} · {}",
        event.id,
        event.name,
        list_date(event),
        event.location,
        event.price,
        availability(event)
    )
}

/// Detail screen text for `event`
#[must_use]
pub fn render_detail(event: &Event) -> String {
    format!(
        "{}\n\nDate: {}\nTime: {}\nLocation: {}\nPrice: {} per ticket\n{}\n\n{}",
        event.name,
        long_date(&event.date),
        time_of_day(&event.date),
        event.location,
        event.price,
        availability(event),
        event.description
    )
}

/// Confirmation screen text for `order`
#[must_use]
pub fn render_confirmation(order_number: &str, order: &Order) -> String {
    format!(
        "Purchase Successful!\n\nOrder: {order_number}\nEvent: {}\nDate: {}\nTime: {}\nTickets: {}\nTotal: {}\nPurchased: {}",
        order.event_name,
        long_date(&order.event_date),
        time_of_day(&order.event_date),
        order.quantity,
        order.total_price,
        order.purchase_date.format("%b %d, %Y · %-I:%M %p"),
    )
}

fn format_date(event: &Event, pattern: &str) -> String {
    event
        .parsed_date()
        .map_or_else(|| event.date.clone(), |date| date.format(pattern).to_string())
}

fn format_raw(date: &str, pattern: &str) -> String {
    DateTime::<FixedOffset>::parse_from_rfc3339(date)
        .map_or_else(|_| date.to_string(), |parsed| parsed.format(pattern).to_string())
}
