// common.rs -- console output shared by every menu

use std::sync::atomic::{AtomicI32, Ordering};

use parking_lot::Mutex;

pub const MAXPRINTMSG: usize = 4096;

// ============================================================
// Redirect buffer for Com_Printf
// ============================================================

static RD_BUFFER: Mutex<Option<String>> = Mutex::new(None);

/// Developer level; `com_dprintf` is silent while this is 0.
static DEVELOPER: AtomicI32 = AtomicI32::new(0);

/// Begin redirecting printf output into a buffer.
pub fn com_begin_redirect() {
    *RD_BUFFER.lock() = Some(String::new());
}

/// End redirect and return the captured output.
pub fn com_end_redirect() -> Option<String> {
    RD_BUFFER.lock().take()
}

/// Mirror of the engine's "developer" cvar.
pub fn com_set_developer(level: i32) {
    DEVELOPER.store(level, Ordering::Relaxed);
}

pub fn com_developer() -> i32 {
    DEVELOPER.load(Ordering::Relaxed)
}

// ============================================================
// Com_Printf / Com_DPrintf
// ============================================================

/// General-purpose print function. Goes to the redirect buffer if one is
/// active, otherwise to the `console` log target.
pub fn com_printf(msg: &str) {
    let msg = truncate_msg(msg);

    {
        let mut buf = RD_BUFFER.lock();
        if let Some(ref mut s) = *buf {
            s.push_str(msg);
            return;
        }
    }

    log::info!(target: "console", "{}", msg.trim_end_matches('\n'));
}

/// Developer-only print.
pub fn com_dprintf(msg: &str) {
    if com_developer() == 0 {
        log::debug!(target: "console", "{}", truncate_msg(msg).trim_end_matches('\n'));
        return;
    }
    com_printf(msg);
}

fn truncate_msg(msg: &str) -> &str {
    if msg.len() < MAXPRINTMSG {
        return msg;
    }
    let mut end = MAXPRINTMSG - 1;
    while !msg.is_char_boundary(end) {
        end -= 1;
    }
    &msg[..end]
}

// ============================================================
// Tests
// ============================================================
