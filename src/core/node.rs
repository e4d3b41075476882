use super::Tendrils;
use anyhow::Result;

/// Contract every processing node implements.
///
/// A host drives a node through three stages, strictly in order and never
/// concurrently: [`declare_params`](Self::declare_params) once,
/// [`configure`](Self::configure) once, then [`process`](Self::process) any
/// number of times. `engine::ManagedNode` enforces the ordering.
pub trait ProcessingNode: Send {
    /// Declare every parameter with its type, doc string and default.
    fn declare_params(&mut self, _params: &mut Tendrils) -> Result<()> {
        Ok(())
    }

    /// Read parameter values into private state and declare the input and
    /// output slots used by `process`.
    fn configure(
        &mut self,
        _params: &Tendrils,
        _inputs: &mut Tendrils,
        _outputs: &mut Tendrils,
    ) -> Result<()> {
        Ok(())
    }

    /// One unit of work. Outputs are mutated in place.
    fn process(&mut self, params: &Tendrils, inputs: &Tendrils, outputs: &mut Tendrils)
        -> Result<()>;
}
