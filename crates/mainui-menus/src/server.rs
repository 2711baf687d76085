// server.rs -- one discovered game server
//
// The info string received from discovery is the only source of truth;
// every display field is derived from it again on each update.

use std::cmp::Ordering;

use mainui_common::net::{net_adr_to_string, NetAdr};
use mainui_common::q_shared::{colorstricmp, info_value_for_key, q_stricmp};

/// Upper bound for a measured ping, in seconds.
pub const MAX_PING: f32 = 9.999;

/// Offset that keeps legacy servers below current ones in every sort.
const RANK_BONUS: i32 = 100;

/// Wire protocol a server speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Xash3D 49
    Current,
    /// Xash3D 48
    Legacy,
    /// GoldSource 48
    GoldSrc,
}

impl Protocol {
    /// Tag used in `connect`/`queryserver` commands and in the list files.
    pub fn tag(self) -> &'static str {
        match self {
            Protocol::Current => "49",
            Protocol::Legacy => "48",
            Protocol::GoldSrc => "gs",
        }
    }

    /// Index of the protocol in the add-server spin control.
    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Protocol::Current),
            1 => Some(Protocol::Legacy),
            2 => Some(Protocol::GoldSrc),
            _ => None,
        }
    }

    /// Info keys a hand-added server of this protocol gets.
    pub fn info_keys(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Protocol::Current => &[("p", "49")],
            Protocol::Legacy => &[("p", "48"), ("legacy", "1")],
            Protocol::GoldSrc => &[("p", "48"), ("gs", "1")],
        }
    }
}

/// Field a server list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Address,
    Map,
    Clients,
    Ping,
}

#[derive(Debug, Clone)]
pub struct ServerRecord {
    pub adr: NetAdr,
    /// Raw `\key\value` descriptor.
    pub info: String,
    /// Seconds, see `set_ping`.
    pub ping: f32,
    pub numcl: i32,
    pub maxcl: i32,
    pub name: String,
    pub mapname: String,
    pub clientsstr: String,
    pub pingstr: String,
    pub ipstr: String,
    pub favorite: bool,
    pub have_password: bool,
    pub is_legacy: bool,
    pub is_gold_src: bool,
    /// Hand-added row shown until the server's own reply replaces it.
    pub placeholder: bool,
}

impl ServerRecord {
    pub fn new(adr: NetAdr, info: &str, is_favorite: bool) -> Self {
        Self {
            adr,
            info: info.to_string(),
            ping: 0.0,
            numcl: 0,
            maxcl: 0,
            name: String::new(),
            mapname: String::new(),
            clientsstr: String::new(),
            pingstr: String::new(),
            ipstr: String::new(),
            favorite: is_favorite,
            have_password: false,
            is_legacy: false,
            is_gold_src: false,
            placeholder: false,
        }
    }

    /// Re-derive the display fields from the descriptor.
    pub fn update_data(&mut self) {
        let info = self.info.as_str();
        self.name = info_value_for_key(info, "host");
        self.mapname = info_value_for_key(info, "map");
        self.ipstr = net_adr_to_string(&self.adr);
        self.numcl = atoi(&info_value_for_key(info, "numcl"));
        self.maxcl = atoi(&info_value_for_key(info, "maxcl"));
        self.clientsstr = format!("{}\\{}", self.numcl, self.maxcl);
        self.have_password = info_value_for_key(info, "password") == "1";
        self.is_gold_src = info_value_for_key(info, "gs") == "1";
        self.is_legacy = info_value_for_key(info, "legacy") == "1";
    }

    /// Store a measured ping. Legacy servers answer through an extra round
    /// trip, so their value is halved after clamping.
    pub fn set_ping(&mut self, ping: f32) {
        let mut ping = if ping.is_nan() { 0.0 } else { ping.clamp(0.0, MAX_PING) };

        if self.is_legacy {
            ping /= 2.0;
        }

        self.ping = ping;
        self.pingstr = format!("{:.0} ms", ping * 1000.0);
    }

    pub fn protocol(&self) -> Protocol {
        if self.is_legacy {
            Protocol::Legacy
        } else if self.is_gold_src {
            Protocol::GoldSrc
        } else {
            Protocol::Current
        }
    }

    pub fn to_protocol(&self) -> &'static str {
        self.protocol().tag()
    }

    fn rank(&self, other: &Self) -> i32 {
        match self.is_legacy.cmp(&other.is_legacy) {
            Ordering::Greater => RANK_BONUS,
            Ordering::Less => -RANK_BONUS,
            Ordering::Equal => 0,
        }
    }

    fn field_cmp(&self, other: &Self, field: SortField) -> i32 {
        let ord = match field {
            SortField::Name => colorstricmp(&self.name, &other.name),
            SortField::Address => self.adr.cmp(&other.adr),
            SortField::Map => q_stricmp(&self.mapname, &other.mapname),
            SortField::Clients => self.numcl.cmp(&other.numcl),
            SortField::Ping => self.ping.partial_cmp(&other.ping).unwrap_or(Ordering::Equal),
        };
        ord as i32
    }

    /// Rank bonus plus the field comparison, with the field operands swapped
    /// for a descending sort. Only the sign of the sum matters, and the bonus
    /// is never flipped, so legacy servers always land last.
    pub fn compare(&self, other: &Self, field: SortField, ascend: bool) -> Ordering {
        let field_result = if ascend {
            self.field_cmp(other, field)
        } else {
            other.field_cmp(self, field)
        };
        (self.rank(other) + field_result).cmp(&0)
    }
}

/// C-style integer parse: leading whitespace, optional sign, digits, and
/// whatever follows is ignored.
fn atoi(s: &str) -> i32 {
    let s = s.trim_start();
    let (neg, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut value: i32 = 0;
    for c in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add((c - b'0') as i32);
    }
    if neg { -value } else { value }
}
