//! Clock adapters.
//!
//! - `SystemClock` - wall-clock time
//! - `ManualClock` - time that only moves when told to, for tests

mod manual_clock;
mod system_clock;

pub use manual_clock::ManualClock;
pub use system_clock::SystemClock;
