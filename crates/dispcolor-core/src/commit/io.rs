//! Register I/O boundary

use tracing::trace;

use super::CommitPlan;
use crate::error::{HardwareIoError, Result};
use crate::regs::{Reg, RegWrite};

/// MMIO access to the display block
///
/// Reads take `&mut self`: reading an index/data pair's data register
/// advances the hardware index when auto-increment is on.
pub trait RegisterIo {
    fn read(&mut self, reg: Reg) -> std::result::Result<u32, HardwareIoError>;
    fn write(&mut self, reg: Reg, value: u32) -> std::result::Result<(), HardwareIoError>;
}

impl<T: RegisterIo + ?Sized> RegisterIo for &mut T {
    fn read(&mut self, reg: Reg) -> std::result::Result<u32, HardwareIoError> {
        (**self).read(reg)
    }

    fn write(&mut self, reg: Reg, value: u32) -> std::result::Result<(), HardwareIoError> {
        (**self).write(reg, value)
    }
}

fn write_one(io: &mut impl RegisterIo, w: &RegWrite) -> Result<()> {
    let value = match w.mask {
        Some(_) => w.apply(io.read(w.reg)?),
        None => w.value,
    };
    io.write(w.reg, value)?;
    Ok(())
}

/// Run a plan's writes in order
///
/// Stops at the first failing access; the error is passed through
/// unchanged.
pub fn execute(plan: &CommitPlan, io: &mut impl RegisterIo) -> Result<()> {
    for (i, group) in plan.groups.iter().enumerate() {
        trace!(
            group = i,
            phase = ?group.phase,
            atomic = group.atomic,
            writes = group.writes.len(),
            "executing write group"
        );
        for w in &group.writes {
            write_one(io, w)?;
        }
    }
    Ok(())
}
