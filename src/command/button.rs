use alloc::rc::Rc;
use core::cell::RefCell;

use super::{CommandRefExt, IntoCommand};
use crate::{event::EventLoop, CommandScheduler};

/// A condition that schedules and cancels commands on its edges.
///
/// Bindings are sampled once per scheduler run by the scheduler's button loop.
#[derive(Clone)]
pub struct Trigger {
    scheduler: CommandScheduler,
    event_loop: Rc<RefCell<EventLoop>>,
    condition: Rc<dyn Fn() -> bool>,
}

impl Trigger {
    pub fn new_with_loop(
        scheduler: &CommandScheduler,
        event_loop: Rc<RefCell<EventLoop>>,
        condition: impl Fn() -> bool + 'static,
    ) -> Self {
        Self {
            scheduler: scheduler.clone(),
            event_loop,
            condition: Rc::new(condition),
        }
    }

    pub fn new(scheduler: &CommandScheduler, condition: impl Fn() -> bool + 'static) -> Self {
        Self::new_with_loop(scheduler, scheduler.button_event_loop(), condition)
    }

    /// Schedules `command` when the condition changes to true.
    pub fn on_true(self, command: impl IntoCommand) -> Self {
        let command = command.into_command(&self.scheduler);
        let scheduler = self.scheduler.clone();
        let condition = self.condition.clone();
        let mut pressed_last = condition();
        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if !pressed_last && pressed {
                command.schedule(&scheduler)?;
            }
            pressed_last = pressed;
            Ok(())
        });
        self
    }

    /// Schedules `command` when the condition changes to false.
    pub fn on_false(self, command: impl IntoCommand) -> Self {
        let command = command.into_command(&self.scheduler);
        let scheduler = self.scheduler.clone();
        let condition = self.condition.clone();
        let mut pressed_last = condition();
        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if pressed_last && !pressed {
                command.schedule(&scheduler)?;
            }
            pressed_last = pressed;
            Ok(())
        });
        self
    }

    /// Schedules `command` when the condition changes to true and cancels it when the
    /// condition changes back to false.
    pub fn while_true(self, command: impl IntoCommand) -> Self {
        let command = command.into_command(&self.scheduler);
        let scheduler = self.scheduler.clone();
        let condition = self.condition.clone();
        let mut pressed_last = condition();

        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if !pressed_last && pressed {
                command.schedule(&scheduler)?;
            } else if pressed_last && !pressed {
                command.cancel(&scheduler)?;
            }
            pressed_last = pressed;
            Ok(())
        });
        self
    }

    pub fn while_false(self, command: impl IntoCommand) -> Self {
        let command = command.into_command(&self.scheduler);
        let scheduler = self.scheduler.clone();
        let condition = self.condition.clone();
        let mut pressed_last = condition();

        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if pressed_last && !pressed {
                command.schedule(&scheduler)?;
            } else if !pressed_last && pressed {
                command.cancel(&scheduler)?;
            }
            pressed_last = pressed;
            Ok(())
        });
        self
    }

    pub fn toggle_on_true(self, command: impl IntoCommand) -> Self {
        let command = command.into_command(&self.scheduler);
        let scheduler = self.scheduler.clone();
        let condition = self.condition.clone();
        let mut pressed_last = condition();

        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if !pressed_last && pressed {
                if command.is_scheduled(&scheduler) {
                    command.cancel(&scheduler)?;
                } else {
                    command.schedule(&scheduler)?;
                }
            }
            pressed_last = pressed;
            Ok(())
        });
        self
    }

    pub fn toggle_on_false(self, command: impl IntoCommand) -> Self {
        let command = command.into_command(&self.scheduler);
        let scheduler = self.scheduler.clone();
        let condition = self.condition.clone();
        let mut pressed_last = condition();

        self.event_loop.borrow_mut().bind(move || {
            let pressed = condition();
            if pressed_last && !pressed {
                if command.is_scheduled(&scheduler) {
                    command.cancel(&scheduler)?;
                } else {
                    command.schedule(&scheduler)?;
                }
            }
            pressed_last = pressed;
            Ok(())
        });
        self
    }

    pub fn is_active(&self) -> bool {
        (self.condition)()
    }

    pub fn and(&self, other: &Self) -> Self {
        let condition = self.condition.clone();
        let other_condition = other.condition.clone();
        Self::new_with_loop(&self.scheduler, self.event_loop.clone(), move || {
            condition() && other_condition()
        })
    }

    pub fn or(&self, other: &Self) -> Self {
        let condition = self.condition.clone();
        let other_condition = other.condition.clone();
        Self::new_with_loop(&self.scheduler, self.event_loop.clone(), move || {
            condition() || other_condition()
        })
    }

    pub fn negate(&self) -> Self {
        let condition = self.condition.clone();
        Self::new_with_loop(&self.scheduler, self.event_loop.clone(), move || !condition())
    }
}

#[cfg(test)]
mod tests {
    use alloc::{rc::Rc, vec::Vec};
    use core::cell::{Cell, RefCell};

    use super::*;
    use crate::{
        command::{Action, FunctionalCommand},
        time::ManualClock,
    };

    fn scheduler() -> CommandScheduler {
        let scheduler = CommandScheduler::new(Rc::new(ManualClock::new()));
        scheduler.set_enabled(true);
        scheduler
    }

    fn counter(count: &Rc<Cell<u32>>) -> Action {
        let count = count.clone();
        Action::instant("count", move || {
            count.set(count.get() + 1);
            Ok(())
        })
    }

    #[test]
    fn on_true_and_on_false_fire_once_per_edge() {
        let scheduler = scheduler();
        let button = Rc::new(Cell::new(false));
        let pressed = Rc::new(Cell::new(0));
        let released = Rc::new(Cell::new(0));

        let input = button.clone();
        Trigger::new(&scheduler, move || input.get())
            .on_true(counter(&pressed))
            .on_false(counter(&released));

        button.set(true);
        for _ in 0..5 {
            scheduler.run().unwrap();
        }
        assert_eq!((pressed.get(), released.get()), (1, 0));

        button.set(false);
        for _ in 0..5 {
            scheduler.run().unwrap();
        }
        assert_eq!((pressed.get(), released.get()), (1, 1));
    }

    #[test]
    fn while_true_cancels_on_release() {
        let scheduler = scheduler();
        let button = Rc::new(Cell::new(false));
        let ends = Rc::new(RefCell::new(Vec::new()));

        let on_end = ends.clone();
        let held = FunctionalCommand::new(
            || Ok(()),
            || Ok(()),
            move |interrupted| {
                on_end.borrow_mut().push(interrupted);
                Ok(())
            },
            || Ok(false),
            Vec::new(),
        );
        let command = held.into_command(&scheduler);

        let input = button.clone();
        Trigger::new(&scheduler, move || input.get()).while_true(command.clone());

        button.set(true);
        scheduler.run().unwrap();
        assert!(scheduler.is_scheduled(&command));

        button.set(false);
        scheduler.run().unwrap();
        scheduler.run().unwrap();
        assert!(!scheduler.is_scheduled(&command));
        assert_eq!(*ends.borrow(), [true]);
    }

    #[test]
    fn toggle_on_true_alternates() {
        let scheduler = scheduler();
        let button = Rc::new(Cell::new(false));
        let command = crate::run!({ Ok(()) }).into_command(&scheduler);

        let input = button.clone();
        Trigger::new(&scheduler, move || input.get()).toggle_on_true(command.clone());

        for expected in [true, false, true] {
            button.set(true);
            scheduler.run().unwrap();
            button.set(false);
            scheduler.run().unwrap();
            assert_eq!(scheduler.is_scheduled(&command), expected);
        }
    }

    #[test]
    fn while_false_runs_only_while_released() {
        let scheduler = scheduler();
        let button = Rc::new(Cell::new(true));
        let command = crate::run!({ Ok(()) }).into_command(&scheduler);

        let input = button.clone();
        Trigger::new(&scheduler, move || input.get()).while_false(command.clone());

        scheduler.run().unwrap();
        assert!(!scheduler.is_scheduled(&command));

        button.set(false);
        scheduler.run().unwrap();
        scheduler.run().unwrap();
        assert!(scheduler.is_scheduled(&command));

        button.set(true);
        scheduler.run().unwrap();
        assert!(!scheduler.is_scheduled(&command));
    }

    #[test]
    fn toggle_on_false_alternates_on_release() {
        let scheduler = scheduler();
        let button = Rc::new(Cell::new(false));
        let command = crate::run!({ Ok(()) }).into_command(&scheduler);

        let input = button.clone();
        Trigger::new(&scheduler, move || input.get()).toggle_on_false(command.clone());

        button.set(true);
        scheduler.run().unwrap();
        assert!(!scheduler.is_scheduled(&command));

        for expected in [true, false, true] {
            button.set(false);
            scheduler.run().unwrap();
            assert_eq!(scheduler.is_scheduled(&command), expected);
            button.set(true);
            scheduler.run().unwrap();
            assert_eq!(scheduler.is_scheduled(&command), expected);
        }
    }

    #[test]
    fn combinators_follow_boolean_logic() {
        let scheduler = scheduler();
        let a = Rc::new(Cell::new(false));
        let b = Rc::new(Cell::new(true));

        let (input_a, input_b) = (a.clone(), b.clone());
        let trigger_a = Trigger::new(&scheduler, move || input_a.get());
        let trigger_b = Trigger::new(&scheduler, move || input_b.get());

        assert!(!trigger_a.and(&trigger_b).is_active());
        assert!(trigger_a.or(&trigger_b).is_active());
        assert!(trigger_a.negate().is_active());

        a.set(true);
        assert!(trigger_a.and(&trigger_b).is_active());
    }
}
