use serde::{Deserialize, Serialize};

use super::coerce::Coercion;
use super::quality::{Dedup, FindMode};
use super::resolve::Resolution;

/// Policies shared by every engine entry point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineOptions {
    pub resolution: Resolution,
    pub coercion: Coercion,
    pub dedup: Dedup,
    pub find_mode: FindMode,
}
