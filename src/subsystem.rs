use alloc::rc::Rc;
use core::{cell::RefCell, fmt::Debug};

use crate::{
    command::FunctionalCommand, run, run_end, run_once, start_end, CommandScheduler, Result,
    SubsystemRef,
};

/// A collection of robot parts and other hardware that act together as a whole.
pub trait Subsystem: Debug {
    /// This method will be called once per scheduler run
    fn periodic(&mut self) -> Result {
        Ok(())
    }
    /// This method will be called once per scheduler run, but only during simulation
    fn sim_periodic(&mut self) -> Result {
        Ok(())
    }

    fn register(self, scheduler: &CommandScheduler) -> Rc<RefCell<Self>>
    where
        Self: Sized + 'static,
    {
        scheduler.register(self)
    }
}

/// Command factories on a registered subsystem. Every command built here requires the
/// subsystem, and its closures get mutable access to it.
pub trait SubsystemRefExt<T> {
    fn run_once(&self, action: impl FnMut(&mut T) -> Result + 'static) -> FunctionalCommand;
    fn run(&self, action: impl FnMut(&mut T) -> Result + 'static) -> FunctionalCommand;
    fn start_end(
        &self,
        start: impl FnMut(&mut T) -> Result + 'static,
        end: impl FnMut(&mut T) -> Result + 'static,
    ) -> FunctionalCommand;
    fn run_end(
        &self,
        run: impl FnMut(&mut T) -> Result + 'static,
        end: impl FnMut(&mut T) -> Result + 'static,
    ) -> FunctionalCommand;
}

impl<T> SubsystemRefExt<T> for Rc<RefCell<T>>
where
    T: Subsystem + 'static,
{
    fn run_once(&self, mut action: impl FnMut(&mut T) -> Result + 'static) -> FunctionalCommand {
        let subsystem = self.clone();
        run_once!({ action(&mut subsystem.borrow_mut()) }, SubsystemRef::of(self))
    }

    fn run(&self, mut action: impl FnMut(&mut T) -> Result + 'static) -> FunctionalCommand {
        let subsystem = self.clone();
        run!({ action(&mut subsystem.borrow_mut()) }, SubsystemRef::of(self))
    }

    fn start_end(
        &self,
        mut start: impl FnMut(&mut T) -> Result + 'static,
        mut end: impl FnMut(&mut T) -> Result + 'static,
    ) -> FunctionalCommand {
        let (on_start, on_end) = (self.clone(), self.clone());
        start_end!(
            { start(&mut on_start.borrow_mut()) },
            { end(&mut on_end.borrow_mut()) },
            SubsystemRef::of(self)
        )
    }

    fn run_end(
        &self,
        mut run: impl FnMut(&mut T) -> Result + 'static,
        mut end: impl FnMut(&mut T) -> Result + 'static,
    ) -> FunctionalCommand {
        let (on_run, on_end) = (self.clone(), self.clone());
        run_end!(
            { run(&mut on_run.borrow_mut()) },
            { end(&mut on_end.borrow_mut()) },
            SubsystemRef::of(self)
        )
    }
}
