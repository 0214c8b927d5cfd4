//! Simulated display register file
//!
//! Plain registers are stored as written. The three index/data pairs
//! (precision palette, pre-CSC degamma, multi-segment superfine) are backed
//! by real tables with the hardware's index and auto-increment behaviour, so
//! a plan that forgets to set or reset an index lands its data in the wrong
//! place.

use std::collections::HashMap;

use dispcolor_core::regs::{PAL_PREC_AUTO_INCREMENT, PRE_CSC_GAMC_AUTO_INCREMENT};
use dispcolor_core::{HardwareIoError, Pipe, Reg, RegisterIo};

/// Tables hidden behind an index/data register pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    PrecPalette,
    PreCscDegamma,
    MultiSegment,
}

impl Table {
    fn size(self) -> usize {
        match self {
            Self::PrecPalette => 1024,
            Self::PreCscDegamma => 35,
            Self::MultiSegment => 18,
        }
    }

    fn index_mask(self) -> u32 {
        match self {
            Self::PrecPalette => 0x3ff,
            Self::PreCscDegamma => 0xff,
            Self::MultiSegment => 0x1f,
        }
    }

    fn auto_increment_bit(self) -> u32 {
        match self {
            Self::PreCscDegamma => PRE_CSC_GAMC_AUTO_INCREMENT,
            _ => PAL_PREC_AUTO_INCREMENT,
        }
    }

    fn for_index(reg: Reg) -> Option<(Pipe, Table)> {
        match reg {
            Reg::PrecPalIndex(pipe) => Some((pipe, Self::PrecPalette)),
            Reg::PreCscGamcIndex(pipe) => Some((pipe, Self::PreCscDegamma)),
            Reg::PrecPalMultiSegIndex(pipe) => Some((pipe, Self::MultiSegment)),
            _ => None,
        }
    }

    fn for_data(reg: Reg) -> Option<(Pipe, Table)> {
        match reg {
            Reg::PrecPalData(pipe) => Some((pipe, Self::PrecPalette)),
            Reg::PreCscGamcData(pipe) => Some((pipe, Self::PreCscDegamma)),
            Reg::PrecPalMultiSegData(pipe) => Some((pipe, Self::MultiSegment)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct IndexedTable {
    index: u32,
    auto_increment: bool,
    data: Vec<u32>,
}

impl IndexedTable {
    fn new(table: Table) -> Self {
        Self {
            index: 0,
            auto_increment: false,
            data: vec![0; table.size()],
        }
    }

    fn slot(&self) -> usize {
        self.index as usize % self.data.len()
    }

    fn advance(&mut self) {
        if self.auto_increment {
            self.index = (self.index + 1) % self.data.len() as u32;
        }
    }
}

/// In-memory MMIO for a whole display block
#[derive(Debug, Clone, Default)]
pub struct RegisterFile {
    regs: HashMap<Reg, u32>,
    tables: HashMap<(Pipe, Table), IndexedTable>,
    writes: Vec<(Reg, u32)>,
    fail_on: Option<Reg>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every access to `reg` fail
    pub fn with_failure(mut self, reg: Reg) -> Self {
        self.fail_on = Some(reg);
        self
    }

    /// Preset a plain register (e.g. other PIPECONF bits)
    pub fn set(&mut self, reg: Reg, value: u32) {
        self.regs.insert(reg, value);
    }

    /// Current value of a plain register, 0 if never written
    pub fn get(&self, reg: Reg) -> u32 {
        self.regs.get(&reg).copied().unwrap_or(0)
    }

    /// Contents of an indexed table
    pub fn table(&self, pipe: Pipe, table: Table) -> Vec<u32> {
        self.tables
            .get(&(pipe, table))
            .map(|t| t.data.clone())
            .unwrap_or_else(|| vec![0; table.size()])
    }

    /// Current index of an indexed table
    pub fn table_index(&self, pipe: Pipe, table: Table) -> u32 {
        self.tables.get(&(pipe, table)).map_or(0, |t| t.index)
    }

    /// Every write in order
    pub fn writes(&self) -> &[(Reg, u32)] {
        &self.writes
    }

    fn table_mut(&mut self, pipe: Pipe, table: Table) -> &mut IndexedTable {
        self.tables
            .entry((pipe, table))
            .or_insert_with(|| IndexedTable::new(table))
    }

    fn check(&self, reg: Reg) -> Result<(), HardwareIoError> {
        if self.fail_on == Some(reg) {
            return Err(HardwareIoError {
                reg,
                reason: "simulated bus error".into(),
            });
        }
        Ok(())
    }
}

impl RegisterIo for RegisterFile {
    fn read(&mut self, reg: Reg) -> Result<u32, HardwareIoError> {
        self.check(reg)?;

        if let Some((pipe, table)) = Table::for_data(reg) {
            let t = self.table_mut(pipe, table);
            let value = t.data[t.slot()];
            t.advance();
            return Ok(value);
        }

        Ok(self.get(reg))
    }

    fn write(&mut self, reg: Reg, value: u32) -> Result<(), HardwareIoError> {
        self.check(reg)?;
        self.writes.push((reg, value));

        if let Some((pipe, table)) = Table::for_index(reg) {
            let t = self.table_mut(pipe, table);
            t.index = value & table.index_mask();
            t.auto_increment = value & table.auto_increment_bit() != 0;
        } else if let Some((pipe, table)) = Table::for_data(reg) {
            let t = self.table_mut(pipe, table);
            let slot = t.slot();
            t.data[slot] = value;
            t.advance();
            return Ok(());
        }

        self.regs.insert(reg, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_increment() {
        let mut rf = RegisterFile::new();
        rf.write(Reg::PrecPalIndex(Pipe::A), PAL_PREC_AUTO_INCREMENT | 510)
            .unwrap();
        for v in [1, 2, 3] {
            rf.write(Reg::PrecPalData(Pipe::A), v).unwrap();
        }
        let t = rf.table(Pipe::A, Table::PrecPalette);
        assert_eq!(&t[510..513], &[1, 2, 3]);
        assert_eq!(rf.table_index(Pipe::A, Table::PrecPalette), 513);
    }

    #[test]
    fn test_explicit_index() {
        let mut rf = RegisterFile::new();
        rf.write(Reg::PrecPalIndex(Pipe::B), 7).unwrap();
        rf.write(Reg::PrecPalData(Pipe::B), 0xaa).unwrap();
        rf.write(Reg::PrecPalData(Pipe::B), 0xbb).unwrap();
        // No auto-increment: both writes hit entry 7
        assert_eq!(rf.table(Pipe::B, Table::PrecPalette)[7], 0xbb);
    }

    #[test]
    fn test_failure_injection() {
        let mut rf = RegisterFile::new().with_failure(Reg::GammaMode(Pipe::A));
        assert!(rf.write(Reg::GammaMode(Pipe::A), 0).is_err());
        assert!(rf.writes().is_empty());
    }
}
