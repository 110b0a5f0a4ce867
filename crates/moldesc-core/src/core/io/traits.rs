use crate::core::models::molecule::Molecule;
use std::convert::Infallible;
use std::error::Error;

/// Destination for finished molecules, written one at a time in emission order.
pub trait MoleculeSink {
    /// The error type for write operations.
    type Error: Error + Send + Sync + 'static;

    /// Serializes one molecule.
    ///
    /// # Errors
    ///
    /// Returns an error if the molecule cannot be represented in the target
    /// format or the underlying writer fails. The sink must remain usable for
    /// subsequent molecules after a representation error.
    fn write(&mut self, mol: &Molecule) -> Result<(), Self::Error>;

    /// Flushes buffered output. Called once after the last molecule.
    fn finish(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Collects molecules in memory.
impl MoleculeSink for Vec<Molecule> {
    type Error = Infallible;

    fn write(&mut self, mol: &Molecule) -> Result<(), Self::Error> {
        self.push(mol.clone());
        Ok(())
    }
}

impl<S: MoleculeSink + ?Sized> MoleculeSink for &mut S {
    type Error = S::Error;

    fn write(&mut self, mol: &Molecule) -> Result<(), Self::Error> {
        (**self).write(mol)
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        (**self).finish()
    }
}
