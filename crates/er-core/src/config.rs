//! Planner settings (the detour budget) and the relaxable range budget.
//!
//! Typically loaded from a TOML file by the host and handed to the planner.
//! Every field has a default, so an empty file is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

// ── PathCheck ─────────────────────────────────────────────────────────────────

/// How the final proximity stage verifies the detour, and whether a range
/// failure may be retried with a wider budget.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathCheck {
    /// Region reachability only; out-of-range items are dropped immediately.
    Vanilla,
    /// Region reachability; out-of-range items are retried at wider ranges.
    #[default]
    Default,
    /// Path-cost oracle (region reachability when no oracle is configured);
    /// out-of-range items are retried at wider ranges.
    Pathfinding,
}

impl PathCheck {
    /// `true` when a range failure must be escalated to a hard failure.
    #[inline]
    pub fn range_fail_is_fatal(self) -> bool {
        matches!(self, PathCheck::Vanilla)
    }

    /// `true` when the final stage should use the path-cost oracle.
    #[inline]
    pub fn uses_path_cost(self) -> bool {
        matches!(self, PathCheck::Pathfinding)
    }
}

// ── GroupKindFilter ───────────────────────────────────────────────────────────

/// Allow/deny filter over storage group kinds: open-area stockpiles versus
/// dedicated storage buildings (optionally denied by building def name).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupKindFilter {
    pub stockpiles: bool,
    pub buildings: bool,
    /// Building defs that are never used even when `buildings` is on.
    pub denied_buildings: Vec<String>,
}

impl Default for GroupKindFilter {
    fn default() -> Self {
        Self { stockpiles: true, buildings: true, denied_buildings: Vec::new() }
    }
}

impl GroupKindFilter {
    #[inline]
    pub fn allows_stockpile(&self) -> bool {
        self.stockpiles
    }

    pub fn allows_building(&self, def: &str) -> bool {
        self.buildings && !self.denied_buildings.iter().any(|d| d == def)
    }
}

// ── PlannerSettings ───────────────────────────────────────────────────────────

/// The detour budget and feature switches.  Read-only to the planner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    /// Master switch for opportunistic hauls.
    pub enabled: bool,

    pub path_check: PathCheck,

    // ── Cheap range pre-filters (relaxed by expansion) ────────────────────
    pub max_start_to_item: f32,
    pub max_start_to_item_pct_orig_trip: f32,
    pub max_store_to_job: f32,
    pub max_store_to_job_pct_orig_trip: f32,

    // ── Trip budget ───────────────────────────────────────────────────────
    pub max_total_trip_pct_orig_trip: f32,
    pub max_new_legs_pct_orig_trip: f32,

    // ── Region reachability depth ─────────────────────────────────────────
    pub max_start_to_item_region_look_count: u32,
    pub max_store_to_job_region_look_count: u32,

    // ── Expansion search ──────────────────────────────────────────────────
    /// `MaxRanges` multiplier applied each time the cursor wraps.
    pub heuristic_expand_factor: f32,
    /// Hard cap on expansions within one plan.
    pub max_expansions: u32,

    /// No opportunity is planned when the agent is closer than this to the job.
    pub min_orig_trip: f32,
    /// Ticks after an opportunity finished during which no new one starts.
    pub opportunity_debounce_ticks: u64,

    pub opportunity_filter: GroupKindFilter,

    // ── Before-carry ──────────────────────────────────────────────────────
    pub before_carry_enabled: bool,
    pub before_carry_filter: GroupKindFilter,

    /// Use the inventory-batch detour variants when that extension is present.
    pub inventory_batch: bool,

    /// Seed for the accurate-search sampling fraction.
    pub seed: u64,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            enabled:                             true,
            path_check:                          PathCheck::Default,
            max_start_to_item:                   30.0,
            max_start_to_item_pct_orig_trip:     0.5,
            max_store_to_job:                    50.0,
            max_store_to_job_pct_orig_trip:      0.6,
            max_total_trip_pct_orig_trip:        1.7,
            max_new_legs_pct_orig_trip:          1.0,
            max_start_to_item_region_look_count: 25,
            max_store_to_job_region_look_count:  25,
            heuristic_expand_factor:             2.0,
            max_expansions:                      16,
            min_orig_trip:                       3.0,
            opportunity_debounce_ticks:          5,
            opportunity_filter:                  GroupKindFilter::default(),
            before_carry_enabled:                true,
            before_carry_filter:                 GroupKindFilter::default(),
            inventory_batch:                     true,
            seed:                                0,
        }
    }
}

impl PlannerSettings {
    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(text: &str) -> CoreResult<Self> {
        let settings: PlannerSettings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read, parse and validate a TOML settings file.
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject budgets the planner cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        let positive = [
            ("max_start_to_item", self.max_start_to_item),
            ("max_start_to_item_pct_orig_trip", self.max_start_to_item_pct_orig_trip),
            ("max_store_to_job", self.max_store_to_job),
            ("max_store_to_job_pct_orig_trip", self.max_store_to_job_pct_orig_trip),
            ("max_total_trip_pct_orig_trip", self.max_total_trip_pct_orig_trip),
            ("max_new_legs_pct_orig_trip", self.max_new_legs_pct_orig_trip),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(CoreError::Config(format!("{name} must be positive, got {value}")));
            }
        }
        if !(self.heuristic_expand_factor > 1.0) {
            return Err(CoreError::Config(format!(
                "heuristic_expand_factor must be greater than 1, got {}",
                self.heuristic_expand_factor
            )));
        }
        if self.min_orig_trip < 0.0 {
            return Err(CoreError::Config("min_orig_trip must not be negative".into()));
        }
        Ok(())
    }
}

// ── MaxRanges ─────────────────────────────────────────────────────────────────

/// The relaxable part of the budget: the cheap range caps.
///
/// Shared across all candidates of one plan.  Values only ever grow.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MaxRanges {
    pub start_to_item: f32,
    pub start_to_item_pct_orig_trip: f32,
    pub store_to_job: f32,
    pub store_to_job_pct_orig_trip: f32,
    /// Number of expansions applied so far.
    pub expand_count: u32,
}

impl MaxRanges {
    /// The starting budget from settings.
    pub fn from_settings(settings: &PlannerSettings) -> Self {
        Self {
            start_to_item:               settings.max_start_to_item,
            start_to_item_pct_orig_trip: settings.max_start_to_item_pct_orig_trip,
            store_to_job:                settings.max_store_to_job,
            store_to_job_pct_orig_trip:  settings.max_store_to_job_pct_orig_trip,
            expand_count:                0,
        }
    }

    /// Multiply every cap by `factor` (expected > 1) and count the expansion.
    pub fn expand(&mut self, factor: f32) {
        let factor = factor.max(1.0);
        self.start_to_item               *= factor;
        self.start_to_item_pct_orig_trip *= factor;
        self.store_to_job                *= factor;
        self.store_to_job_pct_orig_trip  *= factor;
        self.expand_count += 1;
    }
}
