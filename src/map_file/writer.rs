use std::fmt;
use std::io::{self, Write};

use crate::atom::AtomId;

use super::{MapEmitter, MapFile};

impl fmt::Display for MapFile {
    /// The `bond/react` map layout: a comment, the header counts, then
    /// one section per non-empty id list.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.comment)?;
        writeln!(f)?;
        writeln!(f, "{} equivalences", self.equivalences.len())?;
        if !self.edge_ids.is_empty() {
            writeln!(f, "{} edgeIDs", self.edge_ids.len())?;
        }
        if !self.delete_ids.is_empty() {
            writeln!(f, "{} deleteIDs", self.delete_ids.len())?;
        }

        write_ids(f, "InitiatorIDs", &self.initiators)?;
        write_ids(f, "EdgeIDs", &self.edge_ids)?;
        write_ids(f, "DeleteIDs", &self.delete_ids)?;

        writeln!(f)?;
        writeln!(f, "Equivalences")?;
        writeln!(f)?;
        for (pre, post) in &self.equivalences {
            writeln!(f, "{pre}\t{post}")?;
        }
        Ok(())
    }
}

fn write_ids(f: &mut fmt::Formatter<'_>, section: &str, ids: &[AtomId]) -> fmt::Result {
    if ids.is_empty() {
        return Ok(());
    }
    writeln!(f)?;
    writeln!(f, "{section}")?;
    writeln!(f)?;
    for id in ids {
        writeln!(f, "{id}")?;
    }
    Ok(())
}

/// Writes map files in the LAMMPS `bond/react` layout to any byte sink.
pub struct LammpsMapWriter<W: Write> {
    out: W,
}

impl<W: Write> LammpsMapWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MapEmitter for LammpsMapWriter<W> {
    type Error = io::Error;

    fn emit(&mut self, map: &MapFile) -> Result<(), io::Error> {
        write!(self.out, "{map}")?;
        self.out.flush()
    }
}
