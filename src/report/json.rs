//! JSON output for store listings.
//!
//! Serializes GameListing values for scripting and piping.

use super::GameListing;

pub fn render(listings: &[GameListing]) -> String {
    serde_json::to_string_pretty(listings).unwrap_or_else(|_| String::from("[]"))
}
