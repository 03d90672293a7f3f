//! Combat logging
//!
//! Records combat events for post-run analysis. Damage entries carry
//! structured data so totals can be aggregated per action without parsing
//! messages.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::time::SimTime;

/// A single entry in the combat log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatLogEntry {
    /// Simulation time of the event
    pub timestamp: SimTime,
    /// The type of event
    pub event_type: CombatLogEventType,
    /// Human-readable description of the event
    pub message: String,
    /// Structured payload for damage events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<DamageRecord>,
}

/// Structured data attached to damage entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageRecord {
    pub action: String,
    pub target: String,
    pub amount: f64,
    pub is_critical: bool,
}

/// Types of combat log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatLogEventType {
    /// Damage dealt (direct or periodic)
    Damage,
    /// Action executed
    AbilityUsed,
    /// Proc gained or consumed (icicles, Fingers of Frost, Brain Freeze)
    Proc,
    /// Debuff applied to a target
    AuraApplied,
    /// Debuff or stored proc removed
    AuraRemoved,
    /// Ignite spread from one target to another
    Spread,
    /// Burn phase started or stopped
    PhaseChange,
    /// Run event (start, end, target death)
    MatchEvent,
}

/// The combat log storing all events
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CombatLog {
    /// All log entries in chronological order
    pub entries: Vec<CombatLogEntry>,
}

impl CombatLog {
    /// Add a new entry to the log
    pub fn log(&mut self, timestamp: SimTime, event_type: CombatLogEventType, message: String) {
        self.entries.push(CombatLogEntry {
            timestamp,
            event_type,
            message,
            damage: None,
        });
    }

    /// Add a damage entry with structured data
    pub fn log_damage(
        &mut self,
        timestamp: SimTime,
        action: &str,
        target: &str,
        amount: f64,
        is_critical: bool,
    ) {
        let message = format!(
            "{} hits {} for {:.0}{}",
            action,
            target,
            amount,
            if is_critical { " (crit)" } else { "" }
        );
        self.entries.push(CombatLogEntry {
            timestamp,
            event_type: CombatLogEventType::Damage,
            message,
            damage: Some(DamageRecord {
                action: action.to_string(),
                target: target.to_string(),
                amount,
                is_critical,
            }),
        });
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: CombatLogEventType) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Total damage per action name
    pub fn damage_by_action(&self) -> HashMap<String, f64> {
        let mut totals = HashMap::new();
        for record in self.entries.iter().filter_map(|e| e.damage.as_ref()) {
            *totals.entry(record.action.clone()).or_insert(0.0) += record.amount;
        }
        totals
    }

    /// Number of damage events per action name
    pub fn hits_by_action(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for record in self.entries.iter().filter_map(|e| e.damage.as_ref()) {
            *counts.entry(record.action.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Total damage across all actions
    pub fn total_damage(&self) -> f64 {
        self.entries
            .iter()
            .filter_map(|e| e.damage.as_ref())
            .map(|d| d.amount)
            .sum()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&CombatLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }
}
