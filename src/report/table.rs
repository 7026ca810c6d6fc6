//! Terminal table rendering for store listings.
//!
//! One block per game, archives oldest first, with a per-game total.

use chrono::{DateTime, Local};

use super::GameListing;
use crate::util::format_bytes;

pub fn render(listings: &[GameListing]) -> String {
    if listings.is_empty() {
        return String::from("No games configured.\n");
    }

    let mut output = String::new();

    for listing in listings {
        output.push_str(&format!("\n{} ({})\n", listing.name, listing.store.display()));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        if listing.entries.is_empty() {
            output.push_str("  no backups yet\n");
            continue;
        }

        for entry in &listing.entries {
            let created: DateTime<Local> = entry.created.into();
            output.push_str(&format!(
                "  {:40} {:>16} {:>10}\n",
                truncate(&entry.file_name(), 40),
                created.format("%Y-%m-%d %H:%M"),
                format_bytes(entry.size_bytes)
            ));
        }

        let total: u64 = listing.entries.iter().map(|e| e.size_bytes).sum();
        output.push_str(&format!(
            "  {:40} {:>16} {:>10}\n",
            format!("{} archives", listing.entries.len()),
            "",
            format_bytes(total)
        ));
    }

    output
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}
