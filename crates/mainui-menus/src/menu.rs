// menu.rs -- engine entry points for the game browser menus

use std::sync::LazyLock;

use parking_lot::Mutex;

use mainui_common::common::{com_dprintf, com_printf};
use mainui_common::net::NetAdr;

use crate::browser::{BrowserConfig, ServerBrowser, CVAR_BACKGROUND};
use crate::host::MenuHost;

/// The single browser page shared by the internet and LAN menus.
pub static BROWSER: LazyLock<Mutex<ServerBrowser>> = LazyLock::new(|| Mutex::new(ServerBrowser::default()));

/// Replace the browser settings. Takes effect on the next open.
pub fn ui_browser_configure(config: BrowserConfig) {
    BROWSER.lock().config = config;
}

fn ui_server_browser_menu(host: &mut dyn MenuHost, lan_only: bool) {
    let mut browser = BROWSER.lock();

    if browser.config.singleplayer_only {
        com_dprintf("multiplayer menus are disabled\n");
        return;
    }

    // stop the demo playing in the background
    if host.demo_playback() && host.cvar_value(CVAR_BACKGROUND) != 0.0 {
        host.client_cmd("stop");
    }

    browser.set_lan_only(lan_only);
    if !browser.is_initialized() {
        browser.init(host);
    }
    browser.show(host);
}

pub fn ui_internet_games_menu(host: &mut dyn MenuHost) {
    ui_server_browser_menu(host, false);
}

pub fn ui_lan_game_menu(host: &mut dyn MenuHost) {
    ui_server_browser_menu(host, true);
}

/// Discovery reply callback. Replies the browser doesn't want are dropped.
pub fn ui_add_server_to_list(host: &mut dyn MenuHost, adr: NetAdr, info: &str) {
    if let Err(e) = BROWSER.lock().add_server_to_list(host, adr, info) {
        com_dprintf(&format!("{}: {}\n", adr, e));
    }
}

/// Restart ping measurement, sent by the engine right before it queries
/// a batch of servers.
pub fn ui_menu_reset_ping_f(host: &dyn MenuHost) {
    BROWSER.lock().reset_ping(host);
}

/// Print the server list.
pub fn ui_serverlist_f() {
    let browser = BROWSER.lock();
    let servers = browser.game_list_model.servers();

    if servers.is_empty() {
        com_printf("No servers found.\n");
        return;
    }

    com_printf(&format!("--- Server List ({} servers) ---\n", servers.len()));
    com_printf("  Ping     Players  Map              Name\n");
    com_printf("  ----     -------  ---              ----\n");

    for server in servers {
        let fav = if server.favorite { "*" } else { " " };
        let lock = if server.have_password { "!" } else { " " };
        com_printf(&format!(
            "{}{}{:>7}  {:>7}  {:<16} {} [{}]\n",
            fav,
            lock,
            server.pingstr,
            server.clientsstr,
            server.mapname.chars().take(16).collect::<String>(),
            server.name.chars().take(40).collect::<String>(),
            server.ipstr,
        ));
    }
}

/// Run a menu console command: `menu_internetgames`, `menu_langame`,
/// `menu_resetping` or `serverlist`. Returns false for anything else.
pub fn ui_execute_command(host: &mut dyn MenuHost, cmd: &str) -> bool {
    match cmd {
        "menu_internetgames" => ui_internet_games_menu(host),
        "menu_langame" => ui_lan_game_menu(host),
        "menu_resetping" => ui_menu_reset_ping_f(host),
        "serverlist" => ui_serverlist_f(),
        _ => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::BrowserState;
    use crate::host::test_host::MockHost;
    use mainui_common::common::{com_begin_redirect, com_end_redirect};

    // The global is shared, so everything touching it runs in one test.
    #[test]
    fn test_global_browser() {
        let mut host = MockHost::new();

        ui_browser_configure(BrowserConfig { singleplayer_only: true, ..Default::default() });
        ui_internet_games_menu(&mut host);
        assert!(!BROWSER.lock().is_visible());

        ui_browser_configure(BrowserConfig { all_servers: false, ..Default::default() });
        host.demo = true;
        host.cvars.insert(CVAR_BACKGROUND.into(), "1".into());
        assert!(ui_execute_command(&mut host, "menu_internetgames"));
        assert_eq!(host.take_commands(), vec!["stop"]);
        assert!(BROWSER.lock().is_visible());
        assert!(!BROWSER.lock().is_lan_only());
        host.demo = false;

        host.advance(501);
        BROWSER.lock().draw(&mut host);
        assert_eq!(host.take_commands(), vec!["internetservers"]);
        assert_eq!(BROWSER.lock().state(), BrowserState::AwaitingDiscoveryReplies);

        host.advance(40);
        assert!(ui_execute_command(&mut host, "menu_resetping"));
        assert_eq!(BROWSER.lock().game_list_model.servers_refresh_time, host.double_time);

        let adr = NetAdr::ipv4([192, 0, 2, 7], 27015);
        host.advance(60);
        ui_add_server_to_list(&mut host, adr, "\\host\\Crossfire\\map\\crossfire\\numcl\\4\\maxcl\\12\\gamedir\\valve");
        // duplicates and foreign games are dropped quietly
        ui_add_server_to_list(&mut host, adr, "\\host\\Again\\gamedir\\valve");
        ui_add_server_to_list(&mut host, NetAdr::ipv4([192, 0, 2, 8], 27015), "\\host\\cs\\gamedir\\cstrike");
        assert_eq!(BROWSER.lock().game_list_model.rows(), 1);
        assert_eq!(BROWSER.lock().game_list_model.get(0).unwrap().pingstr, "60 ms");

        com_begin_redirect();
        assert!(ui_execute_command(&mut host, "serverlist"));
        let out = com_end_redirect().unwrap_or_default();
        assert!(out.contains("1 servers"));
        assert!(out.contains("Crossfire"));
        assert!(out.contains("4\\12"));
        assert!(out.contains("192.0.2.7:27015"));

        assert!(!ui_execute_command(&mut host, "bogus"));

        ui_lan_game_menu(&mut host);
        assert!(BROWSER.lock().is_lan_only());
        assert!(BROWSER.lock().game_list_model.is_empty());

        BROWSER.lock().hide(&mut host);
        com_begin_redirect();
        ui_serverlist_f();
        let out = com_end_redirect().unwrap_or_default();
        assert!(out.contains("No servers found."));
    }
}
