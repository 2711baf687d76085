// qmenu.rs -- menu widget state
//
// Only the state the menus reason about lives here: labels, grayed/hidden
// flags, field buffers, the selected table row. Drawing is the renderer's
// business.

use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct MenuFlags: u32 {
        const LEFT_JUSTIFY = 0x01;
        const GRAYED       = 0x02;
        const NUMBERSONLY  = 0x04;
        const HIDDEN       = 0x08;
        const HIDE_INPUT   = 0x10;
    }
}

#[derive(Debug, Clone, Default)]
pub struct MenuCommon {
    pub name: String,
    pub flags: MenuFlags,
}

impl MenuCommon {
    pub fn new(name: &str, flags: MenuFlags) -> Self {
        Self { name: name.to_string(), flags }
    }

    pub fn set_grayed(&mut self, grayed: bool) {
        self.flags.set(MenuFlags::GRAYED, grayed);
    }

    pub fn is_grayed(&self) -> bool {
        self.flags.contains(MenuFlags::GRAYED)
    }

    pub fn show(&mut self) {
        self.flags.remove(MenuFlags::HIDDEN);
    }

    pub fn hide(&mut self) {
        self.flags.insert(MenuFlags::HIDDEN);
    }

    pub fn is_visible(&self) -> bool {
        !self.flags.contains(MenuFlags::HIDDEN)
    }

    /// Grayed or hidden items do not react to activation.
    pub fn is_active(&self) -> bool {
        self.is_visible() && !self.is_grayed()
    }
}

/// Push button.
#[derive(Debug, Clone, Default)]
pub struct MenuAction {
    pub generic: MenuCommon,
}

impl MenuAction {
    pub fn new(name: &str, flags: MenuFlags) -> Self {
        Self { generic: MenuCommon::new(name, flags) }
    }
}

/// Single-line text input.
#[derive(Debug, Clone, Default)]
pub struct MenuField {
    pub generic: MenuCommon,
    pub buffer: String,
    /// 0 = unlimited
    pub max_length: usize,
}

impl MenuField {
    pub fn new(name: &str, max_length: usize, flags: MenuFlags) -> Self {
        Self { generic: MenuCommon::new(name, flags), buffer: String::new(), max_length }
    }

    pub fn set_buffer(&mut self, text: &str) {
        let mut text = text.to_string();
        if self.max_length > 0 && text.chars().count() > self.max_length {
            text = text.chars().take(self.max_length).collect();
        }
        if self.generic.flags.contains(MenuFlags::NUMBERSONLY) {
            text.retain(|c| c.is_ascii_digit());
        }
        self.buffer = text;
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Cycles through a fixed list of names.
#[derive(Debug, Clone, Default)]
pub struct MenuSpinControl {
    pub generic: MenuCommon,
    pub curvalue: usize,
    pub itemnames: Vec<String>,
}

impl MenuSpinControl {
    pub fn new(items: &[&str]) -> Self {
        Self {
            generic: MenuCommon::default(),
            curvalue: 0,
            itemnames: items.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn set_current_value(&mut self, value: usize) {
        if value < self.itemnames.len() {
            self.curvalue = value;
        }
    }
}

/// Row of mutually exclusive toggles.
#[derive(Debug, Clone, Default)]
pub struct MenuSwitch {
    pub generic: MenuCommon,
    pub names: Vec<String>,
    state: usize,
}

impl MenuSwitch {
    pub fn new(names: &[&str]) -> Self {
        Self {
            generic: MenuCommon::default(),
            names: names.iter().map(|s| s.to_string()).collect(),
            state: 0,
        }
    }

    pub fn state(&self) -> usize {
        self.state
    }

    /// Returns true if the state changed.
    pub fn set_state(&mut self, state: usize) -> bool {
        if state >= self.names.len() || state == self.state {
            return false;
        }
        self.state = state;
        true
    }
}

/// Modal yes/no dialog.
#[derive(Debug, Clone, Default)]
pub struct MessageBox {
    pub message: String,
    visible: bool,
}

impl MessageBox {
    pub fn new(message: &str) -> Self {
        Self { message: message.to_string(), visible: false }
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub title: Option<String>,
    /// Fractions of the table width below 1.0, pixels otherwise.
    pub width: f32,
    pub fixed: bool,
}

impl TableColumn {
    pub fn is_hidden(&self) -> bool {
        self.width <= 0.0
    }
}

/// Selection and column layout of a table widget.
#[derive(Debug, Clone, Default)]
pub struct MenuTable {
    pub columns: Vec<TableColumn>,
    cur_index: Option<usize>,
    pub allow_sorting: bool,
}

impl MenuTable {
    pub fn setup_column(&mut self, idx: usize, title: Option<&str>, width: f32, fixed: bool) {
        if self.columns.len() <= idx {
            self.columns.resize(idx + 1, TableColumn { title: None, width: 0.0, fixed: false });
        }
        self.columns[idx] = TableColumn { title: title.map(str::to_string), width, fixed };
    }

    pub fn set_column_width(&mut self, idx: usize, width: f32, fixed: bool) {
        if let Some(col) = self.columns.get_mut(idx) {
            col.width = width;
            col.fixed = fixed;
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        self.cur_index
    }

    pub fn set_current_index(&mut self, idx: Option<usize>) {
        self.cur_index = idx;
    }

    /// Keep the selection inside `rows`.
    pub fn clamp_current(&mut self, rows: usize) {
        self.cur_index = match self.cur_index {
            _ if rows == 0 => None,
            Some(i) if i >= rows => Some(rows - 1),
            other => other,
        };
    }
}
