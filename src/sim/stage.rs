//! Growth stages
//!
//! Ordered catalog of token stages. Index 0 is the smallest; the last index is
//! the terminal stage whose merges vanish instead of growing.

use serde::{Deserialize, Serialize};

/// Fraction of the drawn size used for the physics body
pub const BODY_SCALE: f32 = 0.9;

/// A single growth stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDef {
    /// Display name
    pub name: String,
    /// Drawn diameter
    pub size: f32,
    /// Points awarded when a merge produces this stage
    pub score: u32,
}

impl StageDef {
    pub fn new(name: &str, size: f32, score: u32) -> Self {
        Self {
            name: name.to_string(),
            size,
            score,
        }
    }

    /// Physics radius (slightly smaller than the drawn body)
    #[inline]
    pub fn radius(&self) -> f32 {
        self.size * BODY_SCALE / 2.0
    }
}

/// Stage catalog, indexed by stage number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageTable {
    stages: Vec<StageDef>,
}

impl Default for StageTable {
    fn default() -> Self {
        Self::new(vec![
            StageDef::new("Egg", 30.0, 1),
            StageDef::new("Chick", 45.0, 3),
            StageDef::new("Kid", 60.0, 6),
            StageDef::new("Pentaro", 80.0, 10),
            StageDef::new("Big", 100.0, 15),
            StageDef::new("King", 130.0, 21),
            StageDef::new("Emperor", 160.0, 28),
        ])
    }
}

impl StageTable {
    pub fn new(stages: Vec<StageDef>) -> Self {
        Self { stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage definition. Panics on an out-of-range index; the table is
    /// validated before a session starts and tokens only hold valid stages.
    #[inline]
    pub fn get(&self, stage: u8) -> &StageDef {
        &self.stages[stage as usize]
    }

    #[inline]
    pub fn radius(&self, stage: u8) -> f32 {
        self.get(stage).radius()
    }

    /// Index of the terminal stage
    #[inline]
    pub fn terminal(&self) -> u8 {
        self.stages.len().saturating_sub(1) as u8
    }

    #[inline]
    pub fn is_terminal(&self, stage: u8) -> bool {
        stage == self.terminal()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageDef> {
        self.stages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_table() {
        let table = StageTable::default();
        assert_eq!(table.len(), 7);
        assert_eq!(table.terminal(), 6);
        assert!(table.is_terminal(6));
        assert!(!table.is_terminal(5));
        assert_eq!(table.get(1).score, 3);
    }

    #[test]
    fn test_radius_uses_body_scale() {
        let table = StageTable::default();
        // Egg: 30 * 0.9 / 2
        assert!((table.radius(0) - 13.5).abs() < 1e-5);
        assert!((table.radius(6) - 72.0).abs() < 1e-5);
    }

    #[test]
    fn test_serde_transparent() {
        let table = StageTable::new(vec![StageDef::new("A", 10.0, 1)]);
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.starts_with('['));
        let back: StageTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
