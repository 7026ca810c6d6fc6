pub mod json;
pub mod markdown;
pub mod table;

use std::path::PathBuf;

use serde::Serialize;

use crate::store::StoreEntry;

/// A game's store contents, as shown by `savekeep list`.
#[derive(Debug, Clone, Serialize)]
pub struct GameListing {
    pub name: String,
    pub slug: String,
    pub store: PathBuf,
    pub entries: Vec<StoreEntry>,
}

pub fn print(listings: &[GameListing], json_output: bool) {
    if json_output {
        println!("{}", json::render(listings));
    } else {
        print!("{}", table::render(listings));
    }
}
