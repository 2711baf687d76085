// game_list.rs -- table model behind the server browser list

use mainui_common::net::{net_compare_adr, NetAdr};

use crate::error::{BrowserError, Result};
use crate::server::{ServerRecord, SortField};

pub const ART_BANNER_LOCK: &str = "gfx/shell/lock";
pub const ART_BANNER_FAVORITE: &str = "gfx/shell/favorite";

/// Table columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Password,
    Favorite,
    Name,
    Map,
    Players,
    Ping,
    Ip,
}

pub const COLUMN_LAST: usize = 7;

impl Column {
    pub const ALL: [Column; COLUMN_LAST] = [
        Column::Password,
        Column::Favorite,
        Column::Name,
        Column::Map,
        Column::Players,
        Column::Ping,
        Column::Ip,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Comparator used when the user sorts by this column. Icon columns
    /// can't be sorted.
    pub fn sort_field(self) -> Option<SortField> {
        match self {
            Column::Password | Column::Favorite => None,
            Column::Name => Some(SortField::Name),
            Column::Map => Some(SortField::Map),
            Column::Players => Some(SortField::Clients),
            Column::Ping => Some(SortField::Ping),
            Column::Ip => Some(SortField::Address),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellType {
    Text,
    ImageAdditive,
}

/// Colour override for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellColor {
    /// 0xAARRGGBB
    pub color: u32,
    /// Ignore colour escapes in the cell text.
    pub force: bool,
}

#[derive(Debug, Default)]
pub struct GameListModel {
    servers: Vec<ServerRecord>,
    /// Engine time of the last flush; pings are measured from here.
    pub servers_refresh_time: f64,
    sorting: Option<(Column, bool)>,
}

impl GameListModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    pub fn servers(&self) -> &[ServerRecord] {
        &self.servers
    }

    pub fn get(&self, line: usize) -> Option<&ServerRecord> {
        self.servers.get(line)
    }

    pub fn get_mut(&mut self, line: usize) -> Option<&mut ServerRecord> {
        self.servers.get_mut(line)
    }

    pub fn sorting(&self) -> Option<(Column, bool)> {
        self.sorting
    }

    pub fn flush(&mut self, now: f64) {
        self.servers.clear();
        self.servers_refresh_time = now;
    }

    pub fn reset_ping(&mut self, now: f64) {
        self.servers_refresh_time = now;
    }

    /// Insert a discovery reply. Rejected when the address or the exact
    /// descriptor is already listed, unless the listed row is a placeholder
    /// for that address; the reply then takes its place.
    pub fn add_server_to_list(&mut self, adr: NetAdr, info: &str, is_favorite: bool, now: f64) -> Result<()> {
        let placeholder = self
            .servers
            .iter()
            .position(|s| s.placeholder && net_compare_adr(&s.adr, &adr));

        if placeholder.is_none()
            && self.servers.iter().any(|s| net_compare_adr(&s.adr, &adr) || s.info == info)
        {
            return Err(BrowserError::DuplicateDiscovery);
        }

        let mut server = ServerRecord::new(adr, info, is_favorite);
        server.update_data();
        server.set_ping((now - self.servers_refresh_time) as f32);

        match placeholder {
            Some(line) => self.servers[line] = server,
            None => self.servers.push(server),
        }
        self.resort();
        Ok(())
    }

    /// Append a record as is, skipping duplicate checks and sorting.
    pub fn push_server(&mut self, server: ServerRecord) {
        self.servers.push(server);
    }

    /// Sort by `column` and remember it for later insertions. Returns false
    /// when the column can't be sorted.
    pub fn sort(&mut self, column: Column, ascend: bool) -> bool {
        let Some(field) = column.sort_field() else {
            self.disable_sorting();
            return false;
        };
        self.sorting = Some((column, ascend));
        self.servers.sort_by(|a, b| a.compare(b, field, ascend));
        true
    }

    pub fn disable_sorting(&mut self) {
        self.sorting = None;
    }

    fn resort(&mut self) {
        if let Some((column, ascend)) = self.sorting {
            self.sort(column, ascend);
        }
    }

    /// Rebuild every row from its descriptor and reapply the sort.
    /// Returns true when the table has rows.
    pub fn update(&mut self) -> bool {
        for server in &mut self.servers {
            server.update_data();
        }

        if self.servers.is_empty() {
            return false;
        }
        self.resort();
        true
    }

    pub fn cell_type(&self, _line: usize, column: Column) -> CellType {
        match column {
            Column::Password | Column::Favorite => CellType::ImageAdditive,
            _ => CellType::Text,
        }
    }

    /// Text for a text cell, image path for an icon cell.
    pub fn cell_text(&self, line: usize, column: Column) -> Option<&str> {
        let s = self.servers.get(line)?;
        match column {
            Column::Password => s.have_password.then_some(ART_BANNER_LOCK),
            Column::Favorite => s.favorite.then_some(ART_BANNER_FAVORITE),
            Column::Name => Some(s.name.as_str()),
            Column::Map => Some(s.mapname.as_str()),
            Column::Players => Some(s.clientsstr.as_str()),
            Column::Ping => Some(s.pingstr.as_str()),
            Column::Ip => Some(s.ipstr.as_str()),
        }
    }

    /// Legacy servers are drawn at half opacity of `prompt_color`. Colour
    /// escapes survive only in the name column.
    pub fn cell_colors(&self, line: usize, column: Column, prompt_color: u32) -> Option<CellColor> {
        let s = self.servers.get(line)?;
        if !s.is_legacy {
            return None;
        }

        let alpha = (prompt_color >> 24) / 2;
        Some(CellColor {
            color: (prompt_color & 0x00ff_ffff) | (alpha << 24),
            force: column != Column::Name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adr(last: u8) -> NetAdr {
        NetAdr::ipv4([10, 0, 0, last], 27015)
    }

    fn info(name: &str, numcl: i32) -> String {
        format!("\\host\\{}\\map\\crossfire\\numcl\\{}\\maxcl\\16\\gamedir\\valve", name, numcl)
    }

    #[test]
    fn test_duplicate_address_rejected() {
        let mut m = GameListModel::new();
        m.add_server_to_list(adr(1), &info("a", 1), false, 0.1).unwrap();
        let err = m.add_server_to_list(adr(1), &info("b", 2), false, 0.2);
        assert!(matches!(err, Err(BrowserError::DuplicateDiscovery)));
        assert_eq!(m.rows(), 1);
    }

    #[test]
    fn test_duplicate_descriptor_rejected() {
        let mut m = GameListModel::new();
        m.add_server_to_list(adr(1), &info("a", 1), false, 0.1).unwrap();
        assert!(m.add_server_to_list(adr(2), &info("a", 1), false, 0.1).is_err());
        // same text in another case is a different descriptor
        assert!(m.add_server_to_list(adr(3), &info("A", 1), false, 0.1).is_ok());
        assert_eq!(m.rows(), 2);
    }

    #[test]
    fn test_at_most_one_per_address_and_descriptor() {
        let mut m = GameListModel::new();
        let replies = [(1, "x", 1), (2, "y", 2), (1, "x", 1), (3, "x", 1), (2, "z", 5), (4, "w", 0)];
        for (a, name, n) in replies {
            let _ = m.add_server_to_list(adr(a), &info(name, n), false, 0.0);
        }
        let servers = m.servers();
        for (i, a) in servers.iter().enumerate() {
            for b in &servers[i + 1..] {
                assert_ne!(a.adr, b.adr);
                assert_ne!(a.info, b.info);
            }
        }
        assert_eq!(m.rows(), 3);
    }

    #[test]
    fn test_reply_replaces_placeholder() {
        let mut m = GameListModel::new();
        m.sort(Column::Ping, true);
        m.add_server_to_list(adr(2), &info("other", 1), false, 0.3).unwrap();

        let mut stub = ServerRecord::new(adr(1), "\\host\\10.0.0.1:27015\\map\\unknown", false);
        stub.update_data();
        stub.set_ping(crate::server::MAX_PING);
        stub.placeholder = true;
        m.push_server(stub);

        m.add_server_to_list(adr(1), &info("real", 7), false, 0.05).unwrap();
        assert_eq!(m.rows(), 2);

        let row = m.get(0).unwrap();
        assert_eq!(row.adr, adr(1));
        assert_eq!(row.name, "real");
        assert_eq!(row.mapname, "crossfire");
        assert_eq!(row.pingstr, "50 ms");
        assert!(!row.placeholder);

        // once replaced, the address is an ordinary duplicate again
        let again = m.add_server_to_list(adr(1), &info("again", 2), false, 0.1);
        assert!(matches!(again, Err(BrowserError::DuplicateDiscovery)));
    }

    #[test]
    fn test_ping_measured_from_flush() {
        let mut m = GameListModel::new();
        m.flush(10.0);
        m.add_server_to_list(adr(1), &info("a", 1), false, 10.25).unwrap();
        assert!((m.get(0).unwrap().ping - 0.25).abs() < 1e-4);

        m.reset_ping(20.0);
        m.add_server_to_list(adr(2), &info("b", 1), false, 20.5).unwrap();
        assert!((m.get(1).unwrap().ping - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_flush_clears() {
        let mut m = GameListModel::new();
        m.add_server_to_list(adr(1), &info("a", 1), false, 0.0).unwrap();
        m.flush(3.0);
        assert!(m.is_empty());
        assert_eq!(m.servers_refresh_time, 3.0);
    }

    #[test]
    fn test_sort_keeps_new_rows_sorted() {
        let mut m = GameListModel::new();
        assert!(m.sort(Column::Players, false));
        for (a, n) in [(1, 3), (2, 9), (3, 1)] {
            m.add_server_to_list(adr(a), &info(&format!("s{}", a), n), false, 0.0).unwrap();
        }
        let counts: Vec<i32> = m.servers().iter().map(|s| s.numcl).collect();
        assert_eq!(counts, vec![9, 3, 1]);
    }

    #[test]
    fn test_password_column_not_sortable() {
        let mut m = GameListModel::new();
        assert!(m.sort(Column::Ip, true));
        assert_eq!(m.sorting(), Some((Column::Ip, true)));
        assert!(!m.sort(Column::Password, true));
        assert_eq!(m.sorting(), None);
        assert!(!m.sort(Column::Favorite, true));
        assert_eq!(m.sorting(), None);
    }

    #[test]
    fn test_legacy_sorted_last_both_directions() {
        let mut m = GameListModel::new();
        m.add_server_to_list(adr(1), "\\host\\a\\numcl\\1\\legacy\\1", false, 0.0).unwrap();
        m.add_server_to_list(adr(2), "\\host\\b\\numcl\\5", false, 0.0).unwrap();
        m.add_server_to_list(adr(3), "\\host\\c\\numcl\\50\\legacy\\1", false, 0.0).unwrap();
        m.add_server_to_list(adr(4), "\\host\\d\\numcl\\2", false, 0.0).unwrap();

        for ascend in [true, false] {
            m.sort(Column::Players, ascend);
            let legacy: Vec<bool> = m.servers().iter().map(|s| s.is_legacy).collect();
            assert_eq!(legacy, vec![false, false, true, true], "ascend={}", ascend);
        }

        m.sort(Column::Players, true);
        let names: Vec<&str> = m.servers().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["d", "b", "a", "c"]);
    }

    #[test]
    fn test_update_rederives_and_resorts() {
        let mut m = GameListModel::new();
        assert!(!m.update());
        m.sort(Column::Name, true);
        m.add_server_to_list(adr(1), &info("b", 1), false, 0.0).unwrap();
        m.add_server_to_list(adr(2), &info("c", 1), false, 0.0).unwrap();

        m.get_mut(1).unwrap().info = info("a", 7);
        assert!(m.update());
        assert_eq!(m.get(0).unwrap().name, "a");
        assert_eq!(m.get(0).unwrap().clientsstr, "7\\16");
    }

    #[test]
    fn test_cells() {
        let mut m = GameListModel::new();
        m.add_server_to_list(adr(1), "\\host\\^1Red\\map\\c1a0\\numcl\\5\\maxcl\\10\\password\\1", true, 0.0)
            .unwrap();
        assert_eq!(m.cell_type(0, Column::Password), CellType::ImageAdditive);
        assert_eq!(m.cell_type(0, Column::Name), CellType::Text);
        assert_eq!(m.cell_text(0, Column::Password), Some(ART_BANNER_LOCK));
        assert_eq!(m.cell_text(0, Column::Favorite), Some(ART_BANNER_FAVORITE));
        assert_eq!(m.cell_text(0, Column::Name), Some("^1Red"));
        assert_eq!(m.cell_text(0, Column::Players), Some("5\\10"));
        assert_eq!(m.cell_text(0, Column::Ip), Some("10.0.0.1:27015"));
        assert_eq!(m.cell_text(1, Column::Name), None);
    }

    #[test]
    fn test_cell_colors_legacy_only() {
        let mut m = GameListModel::new();
        m.add_server_to_list(adr(1), "\\host\\new", false, 0.0).unwrap();
        m.add_server_to_list(adr(2), "\\host\\old\\legacy\\1", false, 0.0).unwrap();
        let prompt = 0xFF_C0_B0_A0;

        let new_row = m.servers().iter().position(|s| !s.is_legacy).unwrap();
        let old_row = m.servers().iter().position(|s| s.is_legacy).unwrap();

        assert_eq!(m.cell_colors(new_row, Column::Name, prompt), None);

        let name = m.cell_colors(old_row, Column::Name, prompt).unwrap();
        assert_eq!(name.color, 0x7F_C0_B0_A0);
        assert!(!name.force);

        for column in [Column::Map, Column::Players, Column::Ping, Column::Ip] {
            assert!(m.cell_colors(old_row, column, prompt).unwrap().force);
        }
    }
}
