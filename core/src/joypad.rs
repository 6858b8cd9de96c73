/// The eight console buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Right,
    Left,
    Up,
    Down,
    A,
    B,
    Select,
    Start,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::Right,
        Button::Left,
        Button::Up,
        Button::Down,
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
    ];

    /// P1 selection bit that must be low for this button to be visible.
    fn group_select_mask(self) -> u8 {
        match self {
            Button::Right | Button::Left | Button::Up | Button::Down => 0x10,
            Button::A | Button::B | Button::Select | Button::Start => 0x20,
        }
    }

    /// Low-nibble bit this button drives when its group is selected.
    fn line_mask(self) -> u8 {
        match self {
            Button::Right | Button::A => 0b0001,
            Button::Left | Button::B => 0b0010,
            Button::Up | Button::Select => 0b0100,
            Button::Down | Button::Start => 0b1000,
        }
    }
}

/// Represents the state of the buttons.
/// True = pressed, False = released (internal representation)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JoypadState {
    pub right: bool,
    pub left: bool,
    pub up: bool,
    pub down: bool,
    pub a: bool,
    pub b: bool,
    pub select: bool,
    pub start: bool,
}

impl JoypadState {
    pub fn is_pressed(&self, button: Button) -> bool {
        match button {
            Button::Right => self.right,
            Button::Left => self.left,
            Button::Up => self.up,
            Button::Down => self.down,
            Button::A => self.a,
            Button::B => self.b,
            Button::Select => self.select,
            Button::Start => self.start,
        }
    }

    fn slot(&mut self, button: Button) -> &mut bool {
        match button {
            Button::Right => &mut self.right,
            Button::Left => &mut self.left,
            Button::Up => &mut self.up,
            Button::Down => &mut self.down,
            Button::A => &mut self.a,
            Button::B => &mut self.b,
            Button::Select => &mut self.select,
            Button::Start => &mut self.start,
        }
    }
}

/// Manages Joypad state and interaction with the P1 register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Joypad {
    state: JoypadState,
    // Bits 4 and 5 as last written by the game; low = group selected
    p1_register_selection: u8,
}

impl Default for Joypad {
    fn default() -> Self {
        Self::new()
    }
}

impl Joypad {
    pub fn new() -> Self {
        Joypad {
            state: JoypadState::default(),
            p1_register_selection: 0x30, // no group selected
        }
    }

    /// Reads P1: the selected groups' lines in the low nibble (0 = pressed),
    /// upper nibble all ones.
    pub fn read_p1(&self) -> u8 {
        let mut lines = 0x0F;
        for button in Button::ALL {
            if self.is_visible(button) && self.state.is_pressed(button) {
                lines &= !button.line_mask();
            }
        }
        0xF0 | lines
    }

    /// Writes to the P1 (Joypad) register (only bits 4, 5 are writable).
    pub fn write_p1(&mut self, value: u8) {
        self.p1_register_selection = value & 0x30;
    }

    /// Updates one button. Returns true if a Joypad interrupt should be requested:
    /// the button went from released to pressed while its group is selected.
    pub fn set_button(&mut self, button: Button, pressed: bool) -> bool {
        let slot = self.state.slot(button);
        let newly_pressed = pressed && !*slot;
        *slot = pressed;
        newly_pressed && self.is_visible(button)
    }

    pub fn get_state(&self) -> &JoypadState {
        &self.state
    }

    fn is_visible(&self, button: Button) -> bool {
        self.p1_register_selection & button.group_select_mask() == 0
    }
}
