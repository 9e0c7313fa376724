//! Output formatting utilities for the CLI

use tabled::{
    settings::{Style, Width},
    Table, Tabled,
};

use gw_protocol::{GuestRecord, GuestStats};

/// Format the guest collection as an ASCII table.
///
/// The detailed view adds contact and invitation-progress columns.
pub fn format_guests(guests: &[GuestRecord], detailed: bool) -> String {
    if guests.is_empty() {
        return "No guests".to_string();
    }

    #[derive(Tabled)]
    struct GuestRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "RSVP")]
        rsvp: String,
        #[tabled(rename = "HEADCOUNT")]
        headcount: u32,
        #[tabled(rename = "TABLE")]
        table: String,
        #[tabled(rename = "SEAT")]
        seat: String,
    }

    #[derive(Tabled)]
    struct GuestRowDetailed {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "NAME")]
        name: String,
        #[tabled(rename = "PHONE")]
        phone: String,
        #[tabled(rename = "INVITED")]
        invited: String,
        #[tabled(rename = "DELIVERED")]
        delivered: String,
        #[tabled(rename = "RSVP")]
        rsvp: String,
        #[tabled(rename = "HEADCOUNT")]
        headcount: u32,
        #[tabled(rename = "TABLE")]
        table: String,
        #[tabled(rename = "SEAT")]
        seat: String,
    }

    if detailed {
        let rows: Vec<GuestRowDetailed> = guests
            .iter()
            .map(|g| GuestRowDetailed {
                id: truncate(g.invitation_id.as_str(), 12),
                name: g.name.clone(),
                phone: g.phone.clone().unwrap_or_else(|| "-".to_string()),
                invited: yes_no(g.invited),
                delivered: yes_no(g.invitation_delivered),
                rsvp: g.rsvp_status().to_string(),
                headcount: g.participation,
                table: assignment(g.table_number),
                seat: assignment(g.table_position),
            })
            .collect();

        Table::new(rows)
            .with(Style::rounded())
            .with(Width::wrap(120))
            .to_string()
    } else {
        let rows: Vec<GuestRow> = guests
            .iter()
            .map(|g| GuestRow {
                id: truncate(g.invitation_id.as_str(), 12),
                name: g.name.clone(),
                rsvp: g.rsvp_status().to_string(),
                headcount: g.participation,
                table: assignment(g.table_number),
                seat: assignment(g.table_position),
            })
            .collect();

        Table::new(rows).with(Style::rounded()).to_string()
    }
}

/// Format one record as a multi-line detail view
pub fn format_guest(guest: &GuestRecord) -> String {
    let mut output = String::new();
    output.push_str(&format!("Invitation: {}\n", guest.invitation_id));
    output.push_str(&format!("Name: {}\n", guest.name));
    if let Some(phone) = &guest.phone {
        output.push_str(&format!("Phone: {}\n", phone));
    }
    output.push_str(&format!("Invited: {}\n", yes_no(guest.invited)));
    output.push_str(&format!(
        "Delivered: {}\n",
        yes_no(guest.invitation_delivered)
    ));
    output.push_str(&format!("RSVP: {}\n", guest.rsvp_status()));
    output.push_str(&format!("Headcount: {}\n", guest.participation));
    output.push_str(&format!("Table: {}\n", assignment(guest.table_number)));
    output.push_str(&format!("Seat: {}\n", assignment(guest.table_position)));
    output
}

/// Format the aggregate counters as a one-screen summary
pub fn format_stats(stats: &GuestStats) -> String {
    format!(
        "{} guests · {} accepted ({} heads) · {} declined · {} awaiting response · {} invitations to deliver",
        stats.total,
        stats.accepted,
        stats.confirmed_headcount,
        stats.declined,
        stats.delivered.saturating_sub(stats.responded),
        stats.undelivered,
    )
}

fn yes_no(value: bool) -> String {
    (if value { "yes" } else { "no" }).to_string()
}

fn assignment(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Truncate a string with ellipsis if too long
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print("✓ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an error message in red with an X prefix
pub fn print_error(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Red),
        Print("✗ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a warning message in yellow with a warning symbol prefix
pub fn print_warning(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stderr = std::io::stderr();
    let _ = crossterm::execute!(
        stderr,
        SetForegroundColor(Color::Yellow),
        Print("⚠ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print an informational message in cyan with an info symbol prefix
pub fn print_info(msg: &str) {
    use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};

    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print("ℹ "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_strings_untouched() {
        assert_eq!(truncate("inv-1", 12), "inv-1");
    }

    #[test]
    fn test_truncate_long_strings_get_ellipsis() {
        let out = truncate("a-very-long-invitation-id", 12);
        assert_eq!(out.len(), 12);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_stats_line_mentions_every_counter() {
        let mut accepted = GuestRecord::new("inv-1", "Ana");
        accepted.invited = true;
        accepted.invitation_delivered = true;
        accepted.invitation_response = true;
        accepted.participation = 2;
        let stats = GuestStats::from_records([&accepted]);

        let line = format_stats(&stats);
        assert!(line.contains("1 guests"));
        assert!(line.contains("1 accepted (2 heads)"));
    }

    #[test]
    fn test_empty_collection_renders_placeholder() {
        assert_eq!(format_guests(&[], false), "No guests");
    }
}
