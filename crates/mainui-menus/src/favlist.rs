// favlist.rs -- favorite and history server lists
//
// File format: one server per line, "<address> <protocol>".

use mainui_common::common::com_dprintf;
use mainui_common::q_shared::com_parse;

use crate::error::{BrowserError, Result};
use crate::host::MenuHost;

pub const FAVORITES_FILE: &str = "favorite_servers.lst";
pub const HISTORY_FILE: &str = "history_servers.lst";

/// Default number of servers kept in the history list.
pub const MAX_HISTORY: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavListEntry {
    pub sadr: String,
    pub prot: String,
    /// Only favorited entries are written back to disk.
    pub favorited: bool,
}

impl FavListEntry {
    pub fn new(sadr: &str, prot: &str, favorited: bool) -> Self {
        Self { sadr: sadr.to_string(), prot: prot.to_string(), favorited }
    }
}

/// Ordered list of remembered servers, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerList {
    entries: Vec<FavListEntry>,
}

impl ServerList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FavListEntry> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn push(&mut self, entry: FavListEntry) {
        self.entries.push(entry);
    }

    /// Append, evicting the oldest entries so the list never exceeds `limit`.
    pub fn push_capped(&mut self, entry: FavListEntry, limit: usize) {
        let keep = limit.saturating_sub(1);
        if self.entries.len() > keep {
            let excess = self.entries.len() - keep;
            self.entries.drain(..excess);
        }
        if limit > 0 {
            self.entries.push(entry);
        }
    }

    pub fn contains_address(&self, sadr: &str) -> bool {
        self.entries.iter().any(|e| e.sadr == sadr)
    }

    /// Remove the first entry with exactly this address.
    pub fn remove_address(&mut self, sadr: &str) -> bool {
        match self.entries.iter().position(|e| e.sadr == sadr) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }
}

impl<'a> IntoIterator for &'a ServerList {
    type Item = &'a FavListEntry;
    type IntoIter = std::slice::Iter<'a, FavListEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Read address/protocol token pairs. A dangling address without protocol
/// ends the list.
pub fn parse_server_list(text: &str) -> ServerList {
    let mut list = ServerList::new();
    let mut rest = text;

    loop {
        let Some((sadr, after)) = com_parse(rest) else { break };
        let Some((prot, after)) = com_parse(after) else { break };
        list.push(FavListEntry::new(&sadr, &prot, true));
        rest = after;
    }

    list
}

/// Text written for a list, favorited entries only.
pub fn serialize_server_list(list: &ServerList) -> String {
    let mut s = String::new();
    for entry in list.iter().filter(|e| e.favorited) {
        s.push_str(&entry.sadr);
        s.push(' ');
        s.push_str(&entry.prot);
        s.push('\n');
    }
    s
}

/// Load a list file. A missing file reads as an empty list.
pub fn load_server_list(host: &dyn MenuHost, filename: &str) -> Result<ServerList> {
    let data = host
        .load_file(filename)
        .ok_or_else(|| BrowserError::PersistenceMiss(filename.to_string()))?;
    Ok(parse_server_list(&String::from_utf8_lossy(&data)))
}

/// Same as `load_server_list`, but a missing file is not an error.
pub fn load_server_list_or_empty(host: &dyn MenuHost, filename: &str) -> ServerList {
    match load_server_list(host, filename) {
        Ok(list) => list,
        Err(e) => {
            com_dprintf(&format!("{}\n", e));
            ServerList::new()
        }
    }
}

/// Write a list file. When there is nothing to write the file is removed
/// instead of being left empty.
pub fn save_server_list(host: &mut dyn MenuHost, filename: &str, list: &ServerList) -> Result<()> {
    let text = serialize_server_list(list);

    if text.is_empty() {
        host.delete_file(filename);
        return Ok(());
    }

    if !host.save_file(filename, text.as_bytes()) {
        return Err(BrowserError::Io(filename.to_string()));
    }
    Ok(())
}
