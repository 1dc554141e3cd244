//! Hierarchical command menu driven by five navigation events.
//!
//! The tree is built once with [`MenuItem`]s and only borrowed afterwards.
//! [`MenuNavigator`] keeps a short history of screens so `Exit` returns to the
//! previous one. The history holds [`MAX_SCREENS`] entries and wraps: after
//! the last slot, the next screen reuses slot 1 and slot 0 stays the root.

use klimper_synth::ParamId;

use crate::display::Display;
use crate::error::ControlError;
use crate::surface::ControlSurface;

/// Number of screens remembered for `Exit`.
pub const MAX_SCREENS: usize = 10;

/// Navigation input, from buttons, a rotary encoder or keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuEvent {
    /// Activate the highlighted item.
    Enter,
    /// Back to the previous screen.
    Exit,
    /// Back to the root menu.
    Home,
    /// Encoder clockwise: next item or larger value.
    Increase,
    /// Encoder counter-clockwise: previous item or smaller value.
    Decrease,
}

impl MenuEvent {
    /// Map a console key.
    ///
    /// | key | event |
    /// |---|---|
    /// | `e`, `>` | Enter |
    /// | `x`, `<` | Exit |
    /// | `h` | Home |
    /// | `+`, `=`, `d` | Increase |
    /// | `-`, `a` | Decrease |
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'e' | '>' => Some(MenuEvent::Enter),
            'x' | '<' => Some(MenuEvent::Exit),
            'h' => Some(MenuEvent::Home),
            '+' | '=' | 'd' => Some(MenuEvent::Increase),
            '-' | 'a' => Some(MenuEvent::Decrease),
            _ => None,
        }
    }
}

/// What a command does when entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Open an edit screen for a parameter.
    Edit(ParamId),
    /// Start the sequencer.
    StartSequencer,
    /// Stop the sequencer.
    StopSequencer,
    /// Release every voice.
    AllNotesOff,
}

/// A node of the menu tree.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuItem {
    /// Leaf that performs an action.
    Command {
        /// Label shown in the menu.
        name: &'static str,
        /// Action performed on `Enter`.
        action: MenuAction,
    },
    /// Nested menu.
    SubMenu {
        /// Label shown in the menu.
        name: &'static str,
        /// Children, in display order.
        items: Vec<MenuItem>,
    },
}

impl MenuItem {
    /// Command leaf.
    pub const fn command(name: &'static str, action: MenuAction) -> Self {
        MenuItem::Command { name, action }
    }

    /// Parameter edit leaf, labelled like the parameter.
    pub fn param(id: ParamId) -> Self {
        MenuItem::Command {
            name: id.info().name,
            action: MenuAction::Edit(id),
        }
    }

    /// Nested menu.
    pub fn sub_menu(name: &'static str, items: Vec<MenuItem>) -> Self {
        MenuItem::SubMenu { name, items }
    }

    /// Label shown in the menu.
    pub fn name(&self) -> &'static str {
        match self {
            MenuItem::Command { name, .. } | MenuItem::SubMenu { name, .. } => name,
        }
    }
}

/// The standard klimper menu.
pub fn default_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::sub_menu(
            "Sequencer",
            vec![
                MenuItem::command("Start", MenuAction::StartSequencer),
                MenuItem::command("Stop", MenuAction::StopSequencer),
                MenuItem::param(ParamId::Bpm),
            ],
        ),
        MenuItem::param(ParamId::Volume),
        MenuItem::sub_menu(
            "Amp Envelope",
            vec![
                MenuItem::param(ParamId::CarrierAttack),
                MenuItem::param(ParamId::CarrierPeak),
                MenuItem::param(ParamId::CarrierDecay),
                MenuItem::param(ParamId::CarrierSustain),
                MenuItem::param(ParamId::CarrierRelease),
            ],
        ),
        MenuItem::sub_menu(
            "FM Envelope",
            vec![
                MenuItem::param(ParamId::ModulatorAttack),
                MenuItem::param(ParamId::ModulatorPeak),
                MenuItem::param(ParamId::ModulatorDecay),
                MenuItem::param(ParamId::ModulatorSustain),
                MenuItem::param(ParamId::ModulatorRelease),
            ],
        ),
        MenuItem::command("All Notes Off", MenuAction::AllNotesOff),
    ]
}

/// One entry of the navigation history.
#[derive(Debug, Clone, Copy)]
pub enum Screen<'m> {
    /// A menu with the highlighted row.
    Menu {
        /// Items of the menu.
        items: &'m [MenuItem],
        /// Index of the highlighted item.
        selection: usize,
    },
    /// A parameter being edited.
    Param(ParamId),
}

/// Menu state machine.
///
/// ```rust
/// use std::sync::Arc;
/// use klimper_platform::{ControlSurface, MenuEvent, MenuNavigator, Screen, default_menu};
/// use klimper_synth::{ParamId, Sequencer, SharedParams, Synth, SynthSettings};
///
/// let synth = Synth::new(SynthSettings::default()).unwrap();
/// let seq = Sequencer::new(44100.0, &[60], 80, 1).unwrap();
/// let (surface, _events) =
///     ControlSurface::new(Arc::new(SharedParams::capture(&synth, &seq)), 8);
///
/// let menu = default_menu();
/// let mut nav = MenuNavigator::new(&menu, surface);
/// nav.handle(MenuEvent::Increase).unwrap(); // highlight "Volume"
/// nav.handle(MenuEvent::Enter).unwrap();
/// assert!(matches!(nav.screen(), Screen::Param(ParamId::Volume)));
/// ```
#[derive(Debug)]
pub struct MenuNavigator<'m> {
    history: [Screen<'m>; MAX_SCREENS],
    index: usize,
    surface: ControlSurface,
}

impl<'m> MenuNavigator<'m> {
    /// Start at the top of `root`.
    pub fn new(root: &'m [MenuItem], surface: ControlSurface) -> Self {
        Self {
            history: [Screen::Menu {
                items: root,
                selection: 0,
            }; MAX_SCREENS],
            index: 0,
            surface,
        }
    }

    /// The visible screen.
    pub fn screen(&self) -> Screen<'m> {
        self.history[self.index]
    }

    /// Position in the history, 0 being the root menu.
    pub fn depth(&self) -> usize {
        self.index
    }

    /// The surface commands act on.
    pub fn surface(&self) -> &ControlSurface {
        &self.surface
    }

    /// Apply one event. Returns whether the display needs a refresh.
    pub fn handle(&mut self, event: MenuEvent) -> Result<bool, ControlError> {
        tracing::trace!(?event, depth = self.index, "menu event");
        match event {
            MenuEvent::Enter => match self.screen() {
                Screen::Menu { items, selection } => match items.get(selection) {
                    Some(item) => self.activate(item),
                    None => Ok(false),
                },
                Screen::Param(_) => Ok(false),
            },
            MenuEvent::Exit => {
                if self.index == 0 {
                    return Ok(false);
                }
                self.index -= 1;
                Ok(true)
            }
            MenuEvent::Home => {
                self.index = 0;
                Ok(true)
            }
            MenuEvent::Increase => self.step(1),
            MenuEvent::Decrease => self.step(-1),
        }
    }

    /// Run `item` directly, as a dedicated hardware button would.
    pub fn activate(&mut self, item: &'m MenuItem) -> Result<bool, ControlError> {
        match item {
            MenuItem::Command { action, .. } => match *action {
                MenuAction::Edit(id) => {
                    self.push(Screen::Param(id));
                    Ok(true)
                }
                MenuAction::StartSequencer => {
                    self.surface.set_running(true);
                    Ok(true)
                }
                MenuAction::StopSequencer => {
                    self.surface.set_running(false);
                    Ok(true)
                }
                MenuAction::AllNotesOff => {
                    self.surface.all_notes_off()?;
                    Ok(true)
                }
            },
            MenuItem::SubMenu { items, .. } if !items.is_empty() => {
                self.push(Screen::Menu {
                    items: items.as_slice(),
                    selection: 0,
                });
                Ok(true)
            }
            MenuItem::SubMenu { .. } => Ok(false),
        }
    }

    /// Draw the visible screen.
    pub fn show(&self, display: &mut dyn Display) -> std::io::Result<()> {
        match self.screen() {
            Screen::Menu { items, selection } => display.show_menu(items, selection),
            Screen::Param(id) => display.show_param(id.info().name, self.surface.param(id)),
        }
    }

    fn push(&mut self, screen: Screen<'m>) {
        if self.index >= MAX_SCREENS - 1 {
            self.index = 0;
        }
        self.index += 1;
        self.history[self.index] = screen;
        tracing::debug!(depth = self.index, "menu screen opened");
    }

    fn step(&mut self, direction: i32) -> Result<bool, ControlError> {
        match &mut self.history[self.index] {
            Screen::Menu { items, selection } => {
                let n = items.len();
                if n == 0 {
                    return Ok(false);
                }
                *selection = if direction > 0 {
                    (*selection + 1) % n
                } else {
                    (*selection + n - 1) % n
                };
                Ok(true)
            }
            Screen::Param(id) => {
                let id = *id;
                let info = id.info();
                let current = self.surface.param(id);
                let next = if direction > 0 {
                    if current >= info.max {
                        return Ok(false);
                    }
                    (current + info.step).min(info.max)
                } else {
                    if current <= info.min {
                        return Ok(false);
                    }
                    (current - info.step).max(info.min)
                };
                self.surface.set_param(id, next)?;
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use klimper_synth::{Sequencer, SharedParams, Synth, SynthSettings};

    fn surface() -> ControlSurface {
        let synth = Synth::new(SynthSettings::default()).unwrap();
        let seq = Sequencer::new(44100.0, &[60], 80, 1).unwrap();
        ControlSurface::new(Arc::new(SharedParams::capture(&synth, &seq)), 8).0
    }

    fn selection(nav: &MenuNavigator<'_>) -> usize {
        match nav.screen() {
            Screen::Menu { selection, .. } => selection,
            Screen::Param(_) => panic!("not on a menu"),
        }
    }

    #[test]
    fn test_selection_wraps_both_ways() {
        let menu = default_menu();
        let mut nav = MenuNavigator::new(&menu, surface());

        assert!(nav.handle(MenuEvent::Decrease).unwrap());
        assert_eq!(selection(&nav), menu.len() - 1);
        assert!(nav.handle(MenuEvent::Increase).unwrap());
        assert_eq!(selection(&nav), 0);
    }

    #[test]
    fn test_exit_at_root_is_noop() {
        let menu = default_menu();
        let mut nav = MenuNavigator::new(&menu, surface());
        assert!(!nav.handle(MenuEvent::Exit).unwrap());
        assert_eq!(nav.depth(), 0);
    }

    #[test]
    fn test_exit_restores_selection() {
        let menu = default_menu();
        let mut nav = MenuNavigator::new(&menu, surface());
        nav.handle(MenuEvent::Increase).unwrap();
        nav.handle(MenuEvent::Increase).unwrap(); // Amp Envelope
        nav.handle(MenuEvent::Enter).unwrap();
        assert_eq!(nav.depth(), 1);

        nav.handle(MenuEvent::Exit).unwrap();
        assert_eq!(selection(&nav), 2);
    }

    #[test]
    fn test_param_clamped_at_max() {
        let menu = vec![MenuItem::param(ParamId::Volume)];
        let s = surface();
        s.set_volume(0.98).unwrap();
        let mut nav = MenuNavigator::new(&menu, s.clone());
        nav.handle(MenuEvent::Enter).unwrap();

        assert!(nav.handle(MenuEvent::Increase).unwrap());
        assert_eq!(s.param(ParamId::Volume), 1.0);
        assert!(!nav.handle(MenuEvent::Increase).unwrap());
        assert_eq!(s.param(ParamId::Volume), 1.0);
    }

    #[test]
    fn test_param_clamped_at_min() {
        let menu = vec![MenuItem::param(ParamId::Bpm)];
        let s = surface();
        s.set_bpm(2).unwrap();
        let mut nav = MenuNavigator::new(&menu, s.clone());
        nav.handle(MenuEvent::Enter).unwrap();

        assert!(nav.handle(MenuEvent::Decrease).unwrap());
        assert_eq!(s.param(ParamId::Bpm), 1.0);
        assert!(!nav.handle(MenuEvent::Decrease).unwrap());
    }

    #[test]
    fn test_enter_on_param_screen_is_noop() {
        let menu = vec![MenuItem::param(ParamId::Volume)];
        let mut nav = MenuNavigator::new(&menu, surface());
        nav.handle(MenuEvent::Enter).unwrap();
        assert!(!nav.handle(MenuEvent::Enter).unwrap());
        assert_eq!(nav.depth(), 1);
    }

    #[test]
    fn test_empty_sub_menu_not_entered() {
        let menu = vec![MenuItem::sub_menu("Empty", Vec::new())];
        let mut nav = MenuNavigator::new(&menu, surface());
        assert!(!nav.handle(MenuEvent::Enter).unwrap());
        assert_eq!(nav.depth(), 0);
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(MenuEvent::from_key('E'), Some(MenuEvent::Enter));
        assert_eq!(MenuEvent::from_key('<'), Some(MenuEvent::Exit));
        assert_eq!(MenuEvent::from_key('h'), Some(MenuEvent::Home));
        assert_eq!(MenuEvent::from_key('+'), Some(MenuEvent::Increase));
        assert_eq!(MenuEvent::from_key('-'), Some(MenuEvent::Decrease));
        assert_eq!(MenuEvent::from_key('z'), None);
    }
}
