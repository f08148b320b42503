// Copyright 2025 the Dpad Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping raw remote/keyboard codes to navigation inputs.

use hashbrown::HashMap;

use dpad_resolver::Direction;

/// A navigation input.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Input {
    /// A directional press.
    Direction(Direction),
    /// The confirm/OK button.
    Enter,
}

/// Raw key code → [`Input`] table.
///
/// Defaults to the DOM arrow and enter codes (37–40, 13). Several codes may
/// map to the same input, which is how remotes with extra OK or D-pad codes
/// are supported.
///
/// ```rust
/// use dpad_dispatcher::{Input, KeyMap};
/// use dpad_resolver::Direction;
///
/// let mut keys = KeyMap::default();
/// // A remote that also reports OK as 23.
/// keys.bind(23, Input::Enter);
/// assert_eq!(keys.input_for(23), Some(Input::Enter));
/// assert_eq!(keys.input_for(39), Some(Input::Direction(Direction::Right)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyMap {
    bindings: HashMap<u32, Input>,
}

impl KeyMap {
    /// DOM key code for the left arrow.
    pub const LEFT: u32 = 37;
    /// DOM key code for the up arrow.
    pub const UP: u32 = 38;
    /// DOM key code for the right arrow.
    pub const RIGHT: u32 = 39;
    /// DOM key code for the down arrow.
    pub const DOWN: u32 = 40;
    /// DOM key code for enter.
    pub const ENTER: u32 = 13;

    /// A map with no bindings.
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind `code` to `input`, replacing any previous binding of that code.
    pub fn bind(&mut self, code: u32, input: Input) -> &mut Self {
        self.bindings.insert(code, input);
        self
    }

    /// Remove the binding of `code`.
    pub fn unbind(&mut self, code: u32) -> Option<Input> {
        self.bindings.remove(&code)
    }

    /// Remove every code bound to `input`.
    pub fn unbind_input(&mut self, input: Input) {
        self.bindings.retain(|_, bound| *bound != input);
    }

    /// The input bound to `code`.
    pub fn input_for(&self, code: u32) -> Option<Input> {
        self.bindings.get(&code).copied()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        let mut map = Self::empty();
        map.bind(Self::LEFT, Input::Direction(Direction::Left))
            .bind(Self::UP, Input::Direction(Direction::Up))
            .bind(Self::RIGHT, Input::Direction(Direction::Right))
            .bind(Self::DOWN, Input::Direction(Direction::Down))
            .bind(Self::ENTER, Input::Enter);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings() {
        let keys = KeyMap::default();
        assert_eq!(keys.input_for(37), Some(Input::Direction(Direction::Left)));
        assert_eq!(keys.input_for(38), Some(Input::Direction(Direction::Up)));
        assert_eq!(keys.input_for(40), Some(Input::Direction(Direction::Down)));
        assert_eq!(keys.input_for(13), Some(Input::Enter));
        assert_eq!(keys.input_for(65), None);
    }

    #[test]
    fn rebinding_and_unbinding() {
        let mut keys = KeyMap::default();
        // WASD-style extra left.
        keys.bind(65, Input::Direction(Direction::Left));
        assert_eq!(keys.input_for(65), Some(Input::Direction(Direction::Left)));

        keys.unbind_input(Input::Direction(Direction::Left));
        assert_eq!(keys.input_for(65), None);
        assert_eq!(keys.input_for(KeyMap::LEFT), None);

        assert_eq!(keys.unbind(KeyMap::ENTER), Some(Input::Enter));
        assert_eq!(keys.input_for(KeyMap::ENTER), None);
        assert_eq!(KeyMap::empty().input_for(KeyMap::UP), None);
    }
}
