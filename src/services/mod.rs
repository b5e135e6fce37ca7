pub mod archetype;
pub mod decision;
pub mod dna;
pub mod metrics;
pub mod providers;
pub mod regret;
pub mod semantic;
pub mod taste;
pub mod trends;

pub use archetype::{classify, ArchetypeId, ArchetypeResult};
pub use decision::{DecisionEngine, DecisionOptions, RankedMovie};
pub use providers::{HttpTextGenerator, TextGenerator};
pub use regret::{estimate_risk, RegretRisk};
pub use trends::{compute_trends, weekly_aggregates, EventLog, TrendReport};
