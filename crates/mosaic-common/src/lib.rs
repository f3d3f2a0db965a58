pub mod clock;
pub mod errors;
pub mod id;
pub mod record;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{MosaicError, StoreError};
pub use id::{new_id, WindowId};
pub use record::WindowRecord;
pub use types::Rect;

pub type Result<T> = std::result::Result<T, MosaicError>;
