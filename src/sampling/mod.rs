pub mod capture;
pub mod clock;
pub mod convert;
pub mod handoff;

pub use capture::{CaptureBuffer, CaptureRecord, PushStatus};
pub use clock::{ClockSource, MonotonicClock, SampleClock, SimulatedClock};
pub use convert::{AdcScale, InputRange, OutputQuantizer};
pub use handoff::{CaptureProducer, FilterWorker};
