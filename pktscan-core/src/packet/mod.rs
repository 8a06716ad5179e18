//! Scan output: header records, per-packet state and header views.

mod record;
mod state;
mod view;

pub use record::{HeaderFlags, HeaderRecord};
pub use state::{FrameMeta, PacketState, RecordHandle, MAX_HEADERS};
pub use view::HeaderView;
