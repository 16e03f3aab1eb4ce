//! Operator input: raw controller sources and the logical triggers and axes built on them.

use alloc::rc::Rc;
use core::cell::RefCell;

use hashbrown::HashMap;

use crate::{command::button::Trigger, CommandScheduler};

/// Analog trigger travel past which the trigger counts as pressed.
pub const TRIGGER_THRESHOLD: f64 = 0.5;

/// Digital buttons, named after the Xbox layout. PlayStation controllers map
/// cross, circle, square and triangle onto `A`, `B`, `X` and `Y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    X,
    Y,
    LeftBumper,
    RightBumper,
    Back,
    Start,
    LeftStick,
    RightStick,
    Touchpad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    LeftTrigger,
    RightTrigger,
}

/// Directional pad positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pov {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
}

/// A raw controller sample source. Reads always reflect the latest sample.
pub trait ControllerInput {
    fn button(&self, button: Button) -> bool;
    /// Stick axes in `[-1, 1]`, trigger axes in `[0, 1]`.
    fn axis(&self, axis: Axis) -> f64;
    /// `None` when no direction is pressed.
    fn pov(&self) -> Option<Pov>;
}

/// Logical triggers and axes for one controller.
#[derive(Clone)]
pub struct CommandController {
    scheduler: CommandScheduler,
    input: Rc<dyn ControllerInput>,
}

impl CommandController {
    pub fn new(scheduler: &CommandScheduler, input: Rc<dyn ControllerInput>) -> Self {
        Self {
            scheduler: scheduler.clone(),
            input,
        }
    }

    pub fn button(&self, button: Button) -> Trigger {
        let input = self.input.clone();
        Trigger::new(&self.scheduler, move || input.button(button))
    }

    pub fn a(&self) -> Trigger {
        self.button(Button::A)
    }

    pub fn b(&self) -> Trigger {
        self.button(Button::B)
    }

    pub fn x(&self) -> Trigger {
        self.button(Button::X)
    }

    pub fn y(&self) -> Trigger {
        self.button(Button::Y)
    }

    pub fn left_bumper(&self) -> Trigger {
        self.button(Button::LeftBumper)
    }

    pub fn right_bumper(&self) -> Trigger {
        self.button(Button::RightBumper)
    }

    pub fn touchpad(&self) -> Trigger {
        self.button(Button::Touchpad)
    }

    /// True while `axis` reads strictly greater than `threshold`.
    pub fn axis_greater_than(&self, axis: Axis, threshold: f64) -> Trigger {
        let input = self.input.clone();
        Trigger::new(&self.scheduler, move || input.axis(axis) > threshold)
    }

    pub fn left_trigger(&self) -> Trigger {
        self.axis_greater_than(Axis::LeftTrigger, TRIGGER_THRESHOLD)
    }

    pub fn right_trigger(&self) -> Trigger {
        self.axis_greater_than(Axis::RightTrigger, TRIGGER_THRESHOLD)
    }

    pub fn pov(&self, direction: Pov) -> Trigger {
        let input = self.input.clone();
        Trigger::new(&self.scheduler, move || input.pov() == Some(direction))
    }

    pub fn pov_up(&self) -> Trigger {
        self.pov(Pov::Up)
    }

    pub fn pov_down(&self) -> Trigger {
        self.pov(Pov::Down)
    }

    /// True while no direction is pressed.
    pub fn pov_center(&self) -> Trigger {
        let input = self.input.clone();
        Trigger::new(&self.scheduler, move || input.pov().is_none())
    }

    /// Reads `axis`, clamped to `[-1, 1]`.
    pub fn axis(&self, axis: Axis) -> f64 {
        self.input.axis(axis).clamp(-1.0, 1.0)
    }

    pub fn left_x(&self) -> f64 {
        self.axis(Axis::LeftX)
    }

    pub fn left_y(&self) -> f64 {
        self.axis(Axis::LeftY)
    }

    pub fn right_x(&self) -> f64 {
        self.axis(Axis::RightX)
    }

    pub fn right_y(&self) -> f64 {
        self.axis(Axis::RightY)
    }

    pub fn input(&self) -> &Rc<dyn ControllerInput> {
        &self.input
    }
}

#[derive(Debug, Default)]
struct SimControllerState {
    buttons: HashMap<Button, bool>,
    axes: HashMap<Axis, f64>,
    pov: Option<Pov>,
}

/// A controller whose sample is set by hand, for simulation and tests.
#[derive(Debug, Clone, Default)]
pub struct SimController {
    state: Rc<RefCell<SimControllerState>>,
}

impl SimController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_button(&self, button: Button, pressed: bool) {
        self.state.borrow_mut().buttons.insert(button, pressed);
    }

    pub fn set_axis(&self, axis: Axis, value: f64) {
        self.state.borrow_mut().axes.insert(axis, value);
    }

    pub fn set_pov(&self, pov: Option<Pov>) {
        self.state.borrow_mut().pov = pov;
    }

    /// Releases every button, centres every axis and the POV.
    pub fn reset(&self) {
        *self.state.borrow_mut() = SimControllerState::default();
    }
}

impl ControllerInput for SimController {
    fn button(&self, button: Button) -> bool {
        self.state.borrow().buttons.get(&button).copied().unwrap_or(false)
    }

    fn axis(&self, axis: Axis) -> f64 {
        self.state.borrow().axes.get(&axis).copied().unwrap_or(0.0)
    }

    fn pov(&self) -> Option<Pov> {
        self.state.borrow().pov
    }
}

/// The POV direction held on a four-arrow pad. Opposite arrows cancel.
pub fn pov_from_arrows(up: bool, down: bool, left: bool, right: bool) -> Option<Pov> {
    let vertical = (up as i8) - (down as i8);
    let horizontal = (right as i8) - (left as i8);
    match (vertical, horizontal) {
        (1, 0) => Some(Pov::Up),
        (1, 1) => Some(Pov::UpRight),
        (0, 1) => Some(Pov::Right),
        (-1, 1) => Some(Pov::DownRight),
        (-1, 0) => Some(Pov::Down),
        (-1, -1) => Some(Pov::DownLeft),
        (0, -1) => Some(Pov::Left),
        (1, -1) => Some(Pov::UpLeft),
        _ => None,
    }
}

/// The V5 controller. Bumpers are L1/R1, triggers are L2/R2 read as fully pressed or
/// released, and the arrow buttons form the POV. Stick Y axes are inverted so pushing
/// forward reads negative, as on the gamepads the bindings are written for. A failed read
/// counts as released or centred.
#[cfg(target_os = "vexos")]
mod v5 {
    use pros::devices::{
        controller::{ControllerButton, JoystickAxis},
        Controller,
    };
    use tracing::debug;

    use super::{pov_from_arrows, Axis, Button, ControllerInput, Pov};

    fn pressed(controller: &Controller, button: ControllerButton) -> bool {
        controller.button(button).unwrap_or_else(|error| {
            debug!(?error, "controller button read failed");
            false
        })
    }

    fn stick(controller: &Controller, axis: JoystickAxis) -> f64 {
        match controller.joystick_axis(axis) {
            Ok(value) => f64::from(value),
            Err(error) => {
                debug!(?error, "controller axis read failed");
                0.0
            }
        }
    }

    impl ControllerInput for Controller {
        fn button(&self, button: Button) -> bool {
            let button = match button {
                Button::A => ControllerButton::A,
                Button::B => ControllerButton::B,
                Button::X => ControllerButton::X,
                Button::Y => ControllerButton::Y,
                Button::LeftBumper => ControllerButton::LeftTrigger1,
                Button::RightBumper => ControllerButton::RightTrigger1,
                // Not on a V5 controller.
                Button::Back
                | Button::Start
                | Button::LeftStick
                | Button::RightStick
                | Button::Touchpad => return false,
            };
            pressed(self, button)
        }

        fn axis(&self, axis: Axis) -> f64 {
            let trigger = |button| if pressed(self, button) { 1.0 } else { 0.0 };
            match axis {
                Axis::LeftX => stick(self, JoystickAxis::LeftX),
                Axis::LeftY => -stick(self, JoystickAxis::LeftY),
                Axis::RightX => stick(self, JoystickAxis::RightX),
                Axis::RightY => -stick(self, JoystickAxis::RightY),
                Axis::LeftTrigger => trigger(ControllerButton::LeftTrigger2),
                Axis::RightTrigger => trigger(ControllerButton::RightTrigger2),
            }
        }

        fn pov(&self) -> Option<Pov> {
            pov_from_arrows(
                pressed(self, ControllerButton::Up),
                pressed(self, ControllerButton::Down),
                pressed(self, ControllerButton::Left),
                pressed(self, ControllerButton::Right),
            )
        }
    }
}
