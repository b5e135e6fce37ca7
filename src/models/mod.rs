pub mod event;
pub mod movie;
pub mod profile;
pub mod taste_card;

pub use event::{Event, EventType};
pub use movie::{Metrics, MetricsSource, NormalizedMovie, RawMovie};
pub use profile::{ArchetypeRef, Review, UserProfile, UserStats};
pub use taste_card::{CardMetrics, TasteCard, TasteComparison, TASTE_CARD_VERSION};
