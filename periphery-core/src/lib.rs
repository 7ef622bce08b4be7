pub mod condition;
pub mod scene;
pub mod staircase;
pub mod stimulus;
pub mod trial;

pub use condition::{Condition, Direction, LETTER_SIZES_DEG};
pub use scene::{Rgba, Scene, TextItem};
pub use staircase::StaircaseState;
pub use stimulus::{LetterArray, ResponseKey, DEFAULT_ALPHABET};
pub use trial::{ResultRecord, TrialOutcome};
