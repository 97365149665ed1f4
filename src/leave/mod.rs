pub mod engine;
pub mod overlap;
pub mod sweeper;

use crate::clock::SystemClock;
use crate::store::mysql::MySqlLeaveStore;

/// Concrete engine wiring used by the HTTP layer.
pub type AppService = engine::LeaveService<MySqlLeaveStore, SystemClock>;
