// host.rs -- services the engine provides to the menus
//
// The menus never touch sockets, cvars or the game filesystem directly.
// Everything goes through `MenuHost`, handed to each operation the same
// way a renderer is handed to widget drawing code.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mainui_common::common::com_dprintf;
use mainui_common::net::{net_string_to_adr, NetAdr};

/// Engine callbacks used by the server browser.
pub trait MenuHost {
    /// Queue a console command. The host terminates the line.
    fn client_cmd(&mut self, text: &str);

    fn cvar_value(&self, name: &str) -> f32;
    fn cvar_string(&self, name: &str) -> String;
    fn cvar_set_value(&mut self, name: &str, value: f32);
    fn cvar_set_string(&mut self, name: &str, value: &str);

    /// Read a file from the game directory. `None` if it does not exist.
    fn load_file(&self, name: &str) -> Option<Vec<u8>>;
    /// Write a file into the game directory.
    fn save_file(&mut self, name: &str, data: &[u8]) -> bool;
    fn delete_file(&mut self, name: &str);

    /// UI clock in milliseconds, sampled once per frame.
    fn realtime(&self) -> i32;
    /// Engine clock in seconds.
    fn double_time(&self) -> f64;

    fn string_to_adr(&self, text: &str) -> Option<NetAdr> {
        net_string_to_adr(text)
    }

    /// False when the server library is missing and only remote games work.
    fn check_game_dll(&self) -> bool {
        true
    }

    fn demo_playback(&self) -> bool {
        false
    }

    /// True while connected to a game; joining another one asks first.
    fn client_active(&self) -> bool {
        false
    }

    fn open_server_info(&mut self, _adr: &NetAdr, _name: &str, _legacy: bool) {}

    fn open_create_game(&mut self) {}

    /// Called right after a connect command went out.
    fn connection_progress(&mut self) {}
}

// ============================================================
// Directory-backed list storage
// ============================================================

/// File access rooted at one game directory. Hosts that keep the menu list
/// files on disk can forward their `load_file`/`save_file`/`delete_file` here.
#[derive(Debug, Clone)]
pub struct DirStorage {
    gamedir: PathBuf,
}

impl DirStorage {
    pub fn new(gamedir: impl Into<PathBuf>) -> Self {
        Self { gamedir: gamedir.into() }
    }

    pub fn gamedir(&self) -> &Path {
        &self.gamedir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.gamedir.join(name)
    }

    pub fn load_file(&self, name: &str) -> Option<Vec<u8>> {
        fs::read(self.path(name)).ok()
    }

    pub fn save_file(&self, name: &str, data: &[u8]) -> io::Result<()> {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)
    }

    pub fn delete_file(&self, name: &str) {
        if let Err(e) = fs::remove_file(self.path(name)) {
            if e.kind() != io::ErrorKind::NotFound {
                com_dprintf(&format!("couldn't delete {}: {}\n", name, e));
            }
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).is_file()
    }
}

// ============================================================
// In-memory host for tests
// ============================================================


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DirStorage::new(dir.path());

        assert!(storage.load_file("favorite_servers.lst").is_none());

        storage.save_file("favorite_servers.lst", b"1.2.3.4:27015 49\n").unwrap();
        assert!(storage.exists("favorite_servers.lst"));
        assert_eq!(
            storage.load_file("favorite_servers.lst").unwrap(),
            b"1.2.3.4:27015 49\n".to_vec()
        );

        storage.delete_file("favorite_servers.lst");
        assert!(!storage.exists("favorite_servers.lst"));

        // deleting twice is harmless
        storage.delete_file("favorite_servers.lst");
    }

    #[test]
    fn test_dir_storage_creates_subdirs() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DirStorage::new(dir.path().join("valve"));
        storage.save_file("lists/history_servers.lst", b"x 49\n").unwrap();
        assert!(storage.exists("lists/history_servers.lst"));
    }
}
