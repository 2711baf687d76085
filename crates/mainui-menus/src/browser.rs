// browser.rs -- internet/LAN game browser menu
//
// Owns the server table, the favorites and history lists and every widget
// of the browser page. Discovery replies come in through
// `add_server_to_list`; everything the menu asks of the engine goes out
// through the `MenuHost` passed to each call.

use mainui_common::common::{com_dprintf, com_printf};
use mainui_common::net::{net_adr_to_string, NetAdr};
use mainui_common::q_shared::{info_set_value_for_key, info_value_for_key};

use crate::error::{BrowserError, Result};
use crate::favlist::{
    load_server_list_or_empty, save_server_list, FavListEntry, ServerList, FAVORITES_FILE,
    HISTORY_FILE, MAX_HISTORY,
};
use crate::game_list::{Column, GameListModel};
use crate::host::MenuHost;
use crate::qmenu::{MenuAction, MenuField, MenuFlags, MenuSpinControl, MenuSwitch, MenuTable, MessageBox};
use crate::server::{Protocol, ServerRecord, MAX_PING};

pub const CVAR_NAT: &str = "cl_nat";
pub const CVAR_PASSWORD: &str = "password";
pub const CVAR_PUBLIC: &str = "public";
pub const CVAR_BACKGROUND: &str = "cl_background";

/// Longest password the dialog accepts.
pub const MAX_PASSWORD: usize = 16;

/// Names of the add-server protocol choices, indexed like `Protocol::from_index`.
pub const PROTOCOL_NAMES: [&str; 3] = ["Xash3D 49 (New)", "Xash3D 48 (Old)", "GoldSource 48"];

pub const TAB_NAMES: [&str; 4] = ["Direct", "NAT", "Favorites", "History"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserTab {
    Direct,
    Nat,
    Favorites,
    History,
}

impl BrowserTab {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(BrowserTab::Direct),
            1 => Some(BrowserTab::Nat),
            2 => Some(BrowserTab::Favorites),
            3 => Some(BrowserTab::History),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowserState {
    #[default]
    Idle,
    AwaitingDiscoveryReplies,
    AwaitingPassword,
    Connecting,
}

/// Buttons of the browser page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserButton {
    JoinGame,
    CreateGame,
    ViewGameInfo,
    Favorite,
    Refresh,
    AddServer,
    Done,
}

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Game directory of the running game. Replies from other games are
    /// dropped unless `all_servers` is set.
    pub game_folder: String,
    pub singleplayer_only: bool,
    pub all_servers: bool,
    pub history_limit: usize,
    /// Automatic refresh period.
    pub refresh_interval_ms: i32,
    /// Minimum gap between two queries.
    pub query_timeout_ms: i32,
    /// Same, while NAT mode is on.
    pub nat_query_timeout_ms: i32,
    /// Delay before the first query after the video mode is set up.
    pub initial_delay_ms: i32,
    /// Automatic refresh is held off this long after a connect.
    pub connect_cooldown_ms: i32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            game_folder: "valve".to_string(),
            singleplayer_only: false,
            all_servers: cfg!(feature = "all-servers"),
            history_limit: MAX_HISTORY,
            refresh_interval_ms: 20000,
            query_timeout_ms: 1000,
            nat_query_timeout_ms: 4000,
            initial_delay_ms: 500,
            connect_cooldown_ms: 999999,
        }
    }
}

pub struct ServerBrowser {
    pub config: BrowserConfig,

    pub join_game: MenuAction,
    pub create_game: MenuAction,
    pub view_game_info: MenuAction,
    pub favorite: MenuAction,
    pub refresh: MenuAction,
    pub add_server: MenuAction,
    pub done: MenuAction,
    pub tab_switch: MenuSwitch,

    /// "leave the current game?" confirmation before joining
    pub msg_box: MessageBox,
    /// transient notices such as a bad typed address
    pub notice_box: MessageBox,

    pub game_list: MenuTable,
    pub game_list_model: GameListModel,

    pub ask_password: MessageBox,
    pub password: MenuField,

    pub add_server_box: MessageBox,
    pub address_field: MenuField,
    pub server_protocol: MenuSpinControl,

    pub favorites_list: ServerList,
    pub history_list: ServerList,

    refresh_time: i32,
    refresh_time2: i32,
    lan_only: bool,
    initialized: bool,
    visible: bool,
    state: BrowserState,
    /// Server waiting for its password.
    pending: Option<ServerRecord>,
}

impl ServerBrowser {
    pub fn new(config: BrowserConfig) -> Self {
        let mut game_list = MenuTable::default();
        game_list.allow_sorting = true;
        game_list.setup_column(Column::Password.index(), None, 32.0, true);
        game_list.setup_column(Column::Favorite.index(), None, 32.0, true);
        game_list.setup_column(Column::Name.index(), Some("Name"), 0.40, false);
        game_list.setup_column(Column::Map.index(), Some("Map"), 0.25, false);
        game_list.setup_column(Column::Players.index(), Some("Players"), 100.0, true);
        game_list.setup_column(Column::Ping.index(), Some("Ping"), 120.0, true);
        // hidden until 'i' is pressed
        game_list.setup_column(Column::Ip.index(), Some("IP"), 0.0, true);

        Self {
            config,
            join_game: MenuAction::new("Join game", MenuFlags::GRAYED),
            create_game: MenuAction::new("Create game", MenuFlags::empty()),
            view_game_info: MenuAction::new("View game info", MenuFlags::GRAYED),
            favorite: MenuAction::new("Favorite", MenuFlags::empty()),
            refresh: MenuAction::new("Refresh", MenuFlags::empty()),
            add_server: MenuAction::new("Add server", MenuFlags::empty()),
            done: MenuAction::new("Done", MenuFlags::empty()),
            tab_switch: MenuSwitch::new(&TAB_NAMES),
            msg_box: MessageBox::new("Join a network game will exit any current game, OK to exit?"),
            notice_box: MessageBox::default(),
            game_list,
            game_list_model: GameListModel::new(),
            ask_password: MessageBox::new("Enter server password to continue:"),
            password: MenuField::new("Password", MAX_PASSWORD, MenuFlags::HIDE_INPUT),
            add_server_box: MessageBox::new("Enter server Internet address\n(e.g. 209.255.10.255:27015)"),
            address_field: MenuField::new("Address", 0, MenuFlags::LEFT_JUSTIFY),
            server_protocol: MenuSpinControl::new(&PROTOCOL_NAMES),
            favorites_list: ServerList::new(),
            history_list: ServerList::new(),
            refresh_time: 0,
            refresh_time2: 0,
            lan_only: false,
            initialized: false,
            visible: false,
            state: BrowserState::Idle,
            pending: None,
        }
    }

    pub fn state(&self) -> BrowserState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_lan_only(&self) -> bool {
        self.lan_only
    }

    pub fn set_lan_only(&mut self, lan_only: bool) {
        self.lan_only = lan_only;
    }

    pub fn refresh_time(&self) -> i32 {
        self.refresh_time
    }

    pub fn refresh_time2(&self) -> i32 {
        self.refresh_time2
    }

    pub fn pending_server(&self) -> Option<&ServerRecord> {
        self.pending.as_ref()
    }

    pub fn current_tab(&self) -> BrowserTab {
        BrowserTab::from_index(self.tab_switch.state()).unwrap_or(BrowserTab::Direct)
    }

    /// Row under the cursor, if it points at a listed server.
    pub fn selected_index(&self) -> Option<usize> {
        self.game_list.current_index().filter(|&i| i < self.game_list_model.rows())
    }

    pub fn selected_server(&self) -> Option<&ServerRecord> {
        self.selected_index().and_then(|i| self.game_list_model.get(i))
    }

    // ============================================================
    // Lifecycle
    // ============================================================

    pub fn init(&mut self, host: &mut dyn MenuHost) {
        // no server library, only remote games can be joined
        self.create_game.generic.set_grayed(!host.check_game_dll());
        self.initialized = true;
        self.vid_init(host);
    }

    pub fn vid_init(&mut self, host: &mut dyn MenuHost) {
        let now = host.realtime();
        self.refresh_time = now.saturating_add(self.config.initial_delay_ms);
        self.refresh_time2 = now.saturating_add(self.config.initial_delay_ms);
    }

    pub fn show(&mut self, host: &mut dyn MenuHost) {
        self.visible = true;

        if self.lan_only {
            self.favorite.generic.hide();
            self.add_server.generic.hide();
            self.tab_switch.generic.hide();
        } else {
            self.favorite.generic.show();
            self.add_server.generic.show();
            self.tab_switch.generic.show();

            self.favorites_list = load_server_list_or_empty(host, FAVORITES_FILE);
            self.history_list = load_server_list_or_empty(host, HISTORY_FILE);
        }

        self.pending = None;
        self.ask_password.hide();
        self.state = BrowserState::Idle;

        self.game_list_model.flush(host.double_time());
        self.game_list.set_current_index(None);
        self.game_list_model.sort(Column::Ping, true);

        self.join_game.generic.set_grayed(true);
        self.view_game_info.generic.set_grayed(true);
        self.favorite.generic.set_grayed(true);
    }

    pub fn hide(&mut self, host: &mut dyn MenuHost) {
        self.save_lists(host);
        self.visible = false;
        self.pending = None;
        self.state = BrowserState::Idle;
        self.game_list_model.flush(host.double_time());
        self.game_list.set_current_index(None);
    }

    /// Per-frame tick.
    pub fn draw(&mut self, host: &mut dyn MenuHost) {
        let now = host.realtime();

        if now > self.refresh_time {
            self.refresh_list(host);
            self.refresh_time = now.saturating_add(self.config.refresh_interval_ms);
        }

        if now > self.refresh_time2 {
            self.refresh.generic.set_grayed(false);
        }

        self.update_list(host);
    }

    /// Rebuild rows from their descriptors.
    fn update_list(&mut self, host: &mut dyn MenuHost) {
        if self.game_list_model.update() {
            self.join_game.generic.set_grayed(false);
            self.maybe_enable_favorite_button(host);
            self.on_change_selected_server();
        }
        self.game_list.clamp_current(self.game_list_model.rows());
    }

    // ============================================================
    // Querying
    // ============================================================

    pub fn clear_list(&mut self, host: &mut dyn MenuHost) {
        self.game_list_model.flush(host.double_time());
        self.game_list.set_current_index(None);
        self.join_game.generic.set_grayed(true);
        self.view_game_info.generic.set_grayed(true);
        self.favorite.generic.set_grayed(true);
    }

    /// Flush the table and send a new query, unless the last one went out
    /// less than the query timeout ago.
    pub fn refresh_list(&mut self, host: &mut dyn MenuHost) {
        self.clear_list(host);
        let now = host.realtime();

        if self.lan_only {
            host.client_cmd("localservers");
        } else if now > self.refresh_time2 {
            match self.current_tab() {
                BrowserTab::Favorites => self.query_server_list(host, false),
                BrowserTab::History => self.query_server_list(host, true),
                BrowserTab::Direct | BrowserTab::Nat => host.client_cmd("internetservers"),
            }

            let timeout = if host.cvar_value(CVAR_NAT) != 0.0 {
                self.config.nat_query_timeout_ms
            } else {
                self.config.query_timeout_ms
            };
            self.refresh_time2 = now.saturating_add(timeout);
            self.refresh.generic.set_grayed(true);

            let next = now.saturating_add(self.config.refresh_interval_ms);
            if next < self.refresh_time {
                self.refresh_time = next;
            }
        } else {
            com_dprintf("server list refresh throttled\n");
            return;
        }

        if self.state != BrowserState::AwaitingPassword {
            self.state = BrowserState::AwaitingDiscoveryReplies;
        }
    }

    fn query_server_list(&mut self, host: &mut dyn MenuHost, history: bool) {
        let list = if history { &self.history_list } else { &self.favorites_list };
        for entry in list {
            host.client_cmd(&format!("queryserver \"{}\" \"{}\"", entry.sadr, entry.prot));
        }
        self.game_list_model.reset_ping(host.double_time());
    }

    pub fn on_tab_switch(&mut self, host: &mut dyn MenuHost, tab: BrowserTab) {
        self.tab_switch.set_state(tab.index());

        match tab {
            BrowserTab::Direct | BrowserTab::Nat => host.cvar_set_value(CVAR_NAT, tab.index() as f32),
            BrowserTab::Favorites | BrowserTab::History => host.cvar_set_value(CVAR_NAT, 0.0),
        }

        self.clear_list(host);
        self.refresh_list(host);

        // a throttled query still leaves the new tab waiting for replies
        if self.state != BrowserState::AwaitingPassword {
            self.state = BrowserState::AwaitingDiscoveryReplies;
        }
    }

    /// Discovery reply from the engine.
    pub fn add_server_to_list(&mut self, host: &mut dyn MenuHost, adr: NetAdr, info: &str) -> Result<()> {
        if !self.config.all_servers {
            let gamedir = info_value_for_key(info, "gamedir");
            if !gamedir.eq_ignore_ascii_case(&self.config.game_folder) {
                return Err(BrowserError::ForeignGameFolder(gamedir));
            }
        }

        if !self.initialized || !self.visible {
            return Err(BrowserError::StaleViewState);
        }

        let is_favorite = self.favorites_list.contains_address(&net_adr_to_string(&adr));
        self.game_list_model.add_server_to_list(adr, info, is_favorite, host.double_time())?;

        if self.game_list.current_index().is_none() {
            self.game_list.set_current_index(Some(0));
        }

        self.join_game.generic.set_grayed(false);
        self.view_game_info.generic.set_grayed(false);
        self.maybe_enable_favorite_button(host);
        self.on_change_selected_server();
        Ok(())
    }

    pub fn reset_ping(&mut self, host: &dyn MenuHost) {
        self.game_list_model.reset_ping(host.double_time());
    }

    // ============================================================
    // Joining
    // ============================================================

    pub fn join_game(&mut self, host: &mut dyn MenuHost) {
        self.msg_box.hide();
        if let Some(server) = self.selected_server().cloned() {
            self.connect(host, server);
        }
    }

    /// Connect to `server`, asking for a password first when it has one.
    /// A second call for the same server while the dialog is up means the
    /// password has been entered.
    pub fn connect(&mut self, host: &mut dyn MenuHost, server: ServerRecord) {
        let now = host.realtime();
        self.refresh_time = now.saturating_add(self.config.connect_cooldown_ms);

        if server.have_password {
            let answered = self.state == BrowserState::AwaitingPassword
                && self.pending.as_ref().is_some_and(|p| p.adr == server.adr);

            if !answered {
                self.pending = Some(server);
                self.state = BrowserState::AwaitingPassword;
                self.password.clear();
                self.ask_password.show();
                return;
            }
        } else {
            host.cvar_set_string(CVAR_PASSWORD, "");
        }

        self.pending = None;
        self.ask_password.hide();

        let sadr = net_adr_to_string(&server.adr);
        let prot = server.to_protocol();

        if !self.lan_only {
            self.history_list
                .push_capped(FavListEntry::new(&sadr, prot, true), self.config.history_limit);
            self.save_lists(host);
        }

        com_printf(&format!("Connecting to {} ({})\n", sadr, server.name));
        host.client_cmd(&format!("connect \"{}\" \"{}\"", sadr, prot));
        self.state = BrowserState::Connecting;
        host.connection_progress();
    }

    /// Password dialog accepted.
    pub fn submit_password(&mut self, host: &mut dyn MenuHost, password: &str) {
        self.password.set_buffer(password);
        host.cvar_set_string(CVAR_PASSWORD, &self.password.buffer);
        self.password.clear();

        if let Some(server) = self.pending.clone() {
            self.connect(host, server);
        } else {
            self.ask_password.hide();
        }
    }

    pub fn cancel_password(&mut self, host: &mut dyn MenuHost) {
        host.cvar_set_string(CVAR_PASSWORD, "");
        self.password.clear();
        self.ask_password.hide();
        self.pending = None;
        self.state = if self.visible { BrowserState::AwaitingDiscoveryReplies } else { BrowserState::Idle };
    }

    // ============================================================
    // Favorites
    // ============================================================

    /// Toggle the favorite mark of the selected server.
    pub fn favorite_server(&mut self, host: &mut dyn MenuHost) {
        let Some(server) = self.selected_index().and_then(|i| self.game_list_model.get_mut(i)) else {
            return;
        };

        server.favorite = !server.favorite;
        let favorite = server.favorite;
        let sadr = net_adr_to_string(&server.adr);
        let prot = server.to_protocol();

        if favorite {
            self.favorites_list.push(FavListEntry::new(&sadr, prot, true));
            com_printf(&format!("Added {} to favorites.\n", sadr));
        } else {
            self.favorites_list.remove_address(&sadr);
            com_printf(&format!("Removed {} from favorites.\n", sadr));
        }

        self.toggle_favorite_button(!favorite);
        self.save_lists(host);
    }

    /// Sync the favorite button label with the selected row.
    pub fn on_change_selected_server(&mut self) {
        if let Some(favorite) = self.selected_server().map(|s| s.favorite) {
            self.toggle_favorite_button(!favorite);
        }
    }

    fn toggle_favorite_button(&mut self, add: bool) {
        self.favorite.generic.name = if add { "Favorite" } else { "Unfavorite" }.to_string();
    }

    /// NAT servers can't be remembered.
    pub fn maybe_enable_favorite_button(&mut self, host: &dyn MenuHost) {
        self.favorite.generic.set_grayed(host.cvar_value(CVAR_NAT) > 0.0);
    }

    // ============================================================
    // Custom servers
    // ============================================================

    pub fn show_add_server_box(&mut self) {
        self.address_field.clear();
        self.add_server_box.show();
    }

    /// Add the server typed into the address box. It is listed at once
    /// with placeholder data and queried along with the favorites.
    pub fn add_server(&mut self, host: &mut dyn MenuHost) -> Result<()> {
        self.add_server_box.hide();

        let text = self.address_field.buffer.trim().to_string();
        let Some(adr) = host.string_to_adr(&text) else {
            com_printf(&format!("Invalid server address \"{}\"\n", text));
            self.notice_box.message = "Invalid server address".to_string();
            self.notice_box.show();
            return Err(BrowserError::MalformedAddress(text));
        };

        let protocol = Protocol::from_index(self.server_protocol.curvalue).unwrap_or(Protocol::Current);
        let mut info = String::new();
        info_set_value_for_key(&mut info, "host", &text);
        info_set_value_for_key(&mut info, "gamedir", &self.config.game_folder);
        info_set_value_for_key(&mut info, "map", "unknown");
        info_set_value_for_key(&mut info, "numcl", "0");
        info_set_value_for_key(&mut info, "maxcl", "0");
        for (key, value) in protocol.info_keys() {
            info_set_value_for_key(&mut info, key, value);
        }

        let mut server = ServerRecord::new(adr, &info, false);
        server.update_data();
        server.set_ping(MAX_PING);
        server.placeholder = true;

        self.favorites_list.push(FavListEntry::new(&text, server.to_protocol(), false));
        self.tab_switch.set_state(BrowserTab::Favorites.index());

        // query right away, then show the placeholder until the reply lands
        self.refresh_time2 = host.realtime().saturating_sub(1);
        self.refresh_list(host);

        self.game_list_model.push_server(server);
        self.game_list.set_current_index(Some(self.game_list_model.rows() - 1));
        self.join_game.generic.set_grayed(false);
        self.view_game_info.generic.set_grayed(false);
        Ok(())
    }

    // ============================================================
    // Other pages
    // ============================================================

    pub fn view_game_info(&mut self, host: &mut dyn MenuHost) {
        if let Some(server) = self.selected_server() {
            let (adr, name, legacy) = (server.adr, server.name.clone(), server.is_legacy);
            host.open_server_info(&adr, &name, legacy);
        }
    }

    pub fn create_game(&mut self, host: &mut dyn MenuHost) {
        host.cvar_set_value(CVAR_PUBLIC, if self.lan_only { 0.0 } else { 1.0 });
        host.open_create_game();
    }

    /// Returns true when the key was used.
    pub fn key_up(&mut self, host: &mut dyn MenuHost, key: i32) -> bool {
        if key == b'i' as i32 {
            self.game_list.set_column_width(Column::Ip.index(), 300.0, true);
            self.update_list(host);
            return true;
        }
        false
    }

    /// Handle a button press. Grayed or hidden buttons do nothing.
    pub fn activate(&mut self, host: &mut dyn MenuHost, button: BrowserButton) -> bool {
        let item = match button {
            BrowserButton::JoinGame => &self.join_game,
            BrowserButton::CreateGame => &self.create_game,
            BrowserButton::ViewGameInfo => &self.view_game_info,
            BrowserButton::Favorite => &self.favorite,
            BrowserButton::Refresh => &self.refresh,
            BrowserButton::AddServer => &self.add_server,
            BrowserButton::Done => &self.done,
        };
        if !item.generic.is_active() {
            return false;
        }

        match button {
            BrowserButton::JoinGame => {
                if host.client_active() {
                    self.msg_box.show();
                } else {
                    self.join_game(host);
                }
            }
            BrowserButton::CreateGame => self.create_game(host),
            BrowserButton::ViewGameInfo => self.view_game_info(host),
            BrowserButton::Favorite => self.favorite_server(host),
            BrowserButton::Refresh => self.refresh_list(host),
            BrowserButton::AddServer => self.show_add_server_box(),
            BrowserButton::Done => self.hide(host),
        }
        true
    }

    // ============================================================
    // Persistence
    // ============================================================

    pub fn save_lists(&mut self, host: &mut dyn MenuHost) {
        if self.lan_only {
            return;
        }

        for (file, list) in [(FAVORITES_FILE, &self.favorites_list), (HISTORY_FILE, &self.history_list)] {
            if let Err(e) = save_server_list(host, file, list) {
                com_printf(&format!("{}\n", e));
            }
        }
    }
}

impl Default for ServerBrowser {
    fn default() -> Self {
        Self::new(BrowserConfig::default())
    }
}
