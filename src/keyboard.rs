pub const NUM_KEYS: usize = 16;

/// Key's variants are the 16 keys from the CHIP-8's hexadecimal keyboard.
/// The recommended key mapping is:
///
/// Keypad                   Keyboard
/// +-+-+-+-+                +-+-+-+-+
/// |1|2|3|C|                |1|2|3|4|
/// +-+-+-+-+                +-+-+-+-+
/// |4|5|6|D|                |Q|W|E|R|
/// +-+-+-+-+       =>       +-+-+-+-+
/// |7|8|9|E|                |A|S|D|F|
/// +-+-+-+-+                +-+-+-+-+
/// |A|0|B|F|                |Z|X|C|V|
/// +-+-+-+-+                +-+-+-+-+
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Key {
    Key1,
    Key2,
    Key3,
    C,
    Key4,
    Key5,
    Key6,
    D,
    Key7,
    Key8,
    Key9,
    E,
    A,
    Key0,
    B,
    F,
}

impl Key {
    /// The hex value of the key, which is also its index in the keypad latch
    pub fn index(self) -> usize {
        match self {
            Key::Key0 => 0x0,
            Key::Key1 => 0x1,
            Key::Key2 => 0x2,
            Key::Key3 => 0x3,
            Key::Key4 => 0x4,
            Key::Key5 => 0x5,
            Key::Key6 => 0x6,
            Key::Key7 => 0x7,
            Key::Key8 => 0x8,
            Key::Key9 => 0x9,
            Key::A => 0xA,
            Key::B => 0xB,
            Key::C => 0xC,
            Key::D => 0xD,
            Key::E => 0xE,
            Key::F => 0xF,
        }
    }

    pub fn from_index(idx: usize) -> Option<Key> {
        let key = match idx {
            0x0 => Key::Key0,
            0x1 => Key::Key1,
            0x2 => Key::Key2,
            0x3 => Key::Key3,
            0x4 => Key::Key4,
            0x5 => Key::Key5,
            0x6 => Key::Key6,
            0x7 => Key::Key7,
            0x8 => Key::Key8,
            0x9 => Key::Key9,
            0xA => Key::A,
            0xB => Key::B,
            0xC => Key::C,
            0xD => Key::D,
            0xE => Key::E,
            0xF => Key::F,
            _ => return None,
        };
        Some(key)
    }
}

/// Implemented by hosts that poll their input device rather than forward key events.
/// `Emulator::handle_key_input` asks it for every key currently held down
pub trait AsKeyboard {
    fn keys_down(&self) -> Vec<Key>;
}

/// Where the FX0A wait is at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyWait {
    Idle,
    /// blocked on FX0A, which will store the pressed key in this register
    Waiting { register: u8 },
}

/// Contains the state (up or down) of the CHIP-8's 16 keys, as well as any
/// state related to keyboard input
#[derive(Debug, Clone, PartialEq)]
pub struct Keyboard {
    key_input: [bool; NUM_KEYS],
    // only meaningful while waiting on FX0A
    previous_key_input: [bool; NUM_KEYS],
    wait: KeyWait,
}

impl Default for Keyboard {
    fn default() -> Self {
        Keyboard::new()
    }
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard {
            key_input: [false; NUM_KEYS],
            previous_key_input: [false; NUM_KEYS],
            wait: KeyWait::Idle,
        }
    }

    /// Handle the key down event for one of the 16 possible keys
    pub fn handle_key_down(&mut self, k: Key) {
        self.set_key_state(k.index(), true);
    }

    /// Handle the key up event for one of the 16 possible keys
    pub fn handle_key_up(&mut self, k: Key) {
        self.set_key_state(k.index(), false);
    }

    /// Set the key at `idx` up or down. Returns false, changing nothing, if `idx` isn't
    /// one of the 16 keys
    pub fn set_key_state(&mut self, idx: usize, down: bool) -> bool {
        match self.key_input.get_mut(idx) {
            Some(state) => {
                *state = down;
                true
            }
            None => false,
        }
    }

    /// Given the keys held down on the host keyboard, fire the appropriate key_up and
    /// key_down handlers
    pub fn update_keyboard_with_keys(&mut self, keys: &[Key]) {
        let mut down = [false; NUM_KEYS];
        for k in keys {
            down[k.index()] = true;
        }

        // check each of the 16 keys to see which have changed from up to down or vice versa
        for (i, &system_key_is_down) in down.iter().enumerate() {
            if system_key_is_down != self.key_input[i] {
                self.set_key_state(i, system_key_is_down);
            }
        }
    }

    /// Return true if the key at the given index is down. Indexes past the keypad are up
    pub fn get_key_state(&self, idx: usize) -> bool {
        self.key_input.get(idx).copied().unwrap_or(false)
    }

    pub fn key_states(&self) -> [bool; NUM_KEYS] {
        self.key_input
    }

    /// Called when FX0A first executes. Remembers which keys are already down so only a
    /// fresh press will end the wait
    pub fn block(&mut self, reg: u8) {
        self.previous_key_input = self.key_input;
        self.wait = KeyWait::Waiting { register: reg };
    }

    /// Called on every cycle spent on FX0A after the first. Looks for the lowest key that
    /// went from up to down since the last call. If there is one, the wait ends and we
    /// return (register, key). Otherwise the current keys become the new baseline
    pub fn poll_key_press(&mut self) -> Option<(u8, u8)> {
        let register = match self.wait {
            KeyWait::Waiting { register } => register,
            KeyWait::Idle => return None,
        };

        let pressed = (0..NUM_KEYS).find(|&i| !self.previous_key_input[i] && self.key_input[i]);

        match pressed {
            Some(key) => {
                self.wait = KeyWait::Idle;
                Some((register, key as u8))
            }
            None => {
                self.previous_key_input = self.key_input;
                None
            }
        }
    }

    /// Returns true if the we're waiting on keyboard input because of a FX0A instruction,
    /// and false otherwise
    pub fn is_blocking(&self) -> bool {
        self.wait != KeyWait::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_index_round_trip() {
        for idx in 0..NUM_KEYS {
            assert_eq!(Key::from_index(idx).unwrap().index(), idx);
        }
        assert_eq!(Key::from_index(NUM_KEYS), None);
    }

    #[test]
    fn key_down_and_up() {
        let mut keyboard = Keyboard::new();

        keyboard.handle_key_down(Key::C);
        assert!(keyboard.get_key_state(0xC));

        keyboard.handle_key_up(Key::C);
        assert!(!keyboard.get_key_state(0xC));
    }

    #[test]
    fn reject_out_of_range_key() {
        let mut keyboard = Keyboard::new();

        assert!(!keyboard.set_key_state(16, true));
        assert!(!keyboard.get_key_state(16));
        assert_eq!(keyboard.key_states(), [false; NUM_KEYS]);
    }

    #[test]
    fn update_with_keys() {
        let mut keyboard = Keyboard::new();
        keyboard.handle_key_down(Key::Key0);

        keyboard.update_keyboard_with_keys(&[Key::Key1, Key::F]);

        assert!(!keyboard.get_key_state(0x0));
        assert!(keyboard.get_key_state(0x1));
        assert!(keyboard.get_key_state(0xF));
    }

    #[test]
    fn block_waits_for_an_edge() {
        let mut keyboard = Keyboard::new();

        // held before the wait started, so it doesn't count
        keyboard.handle_key_down(Key::Key5);
        keyboard.block(3);
        assert!(keyboard.is_blocking());
        assert_eq!(keyboard.poll_key_press(), None);

        keyboard.handle_key_down(Key::Key9);
        assert_eq!(keyboard.poll_key_press(), Some((3, 9)));
        assert!(!keyboard.is_blocking());

        // nothing left to report once unblocked
        assert_eq!(keyboard.poll_key_press(), None);
    }

    #[test]
    fn release_then_press_is_an_edge() {
        let mut keyboard = Keyboard::new();
        keyboard.handle_key_down(Key::Key5);
        keyboard.block(0);

        keyboard.handle_key_up(Key::Key5);
        assert_eq!(keyboard.poll_key_press(), None);

        keyboard.handle_key_down(Key::Key5);
        assert_eq!(keyboard.poll_key_press(), Some((0, 5)));
    }

    #[test]
    fn lowest_new_key_wins() {
        let mut keyboard = Keyboard::new();
        keyboard.block(1);

        keyboard.handle_key_down(Key::B);
        keyboard.handle_key_down(Key::Key2);
        assert_eq!(keyboard.poll_key_press(), Some((1, 2)));
    }
}
