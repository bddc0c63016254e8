/// Common trait for single-sample filters
///
/// Every filter family (FIR, IIR, adaptive, bypass, designed cascades)
/// consumes one sample and returns one sample, keeping its own history.
pub trait Filter {
    /// Process a single sample through the filter
    fn process(&mut self, sample: f32) -> f32;

    /// Clear all history so the next sample sees a zero state
    fn reset(&mut self);

    /// Process a buffer of samples in-place
    fn process_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }
}
