//! Presentation hook.

use algoverse_core::StepRecord;

/// Receives the step under the cursor after every cursor change, including
/// the initial load.
///
/// Sinks only read the step; the controller keeps ownership.
pub trait RenderSink {
    fn render(&mut self, step: &StepRecord);
}

impl<F> RenderSink for F
where
    F: FnMut(&StepRecord),
{
    fn render(&mut self, step: &StepRecord) {
        self(step)
    }
}
