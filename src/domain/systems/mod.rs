// Per-tick simulation systems. The world runs them in a fixed order:
// movement, combat (AI targeting + autoattacks), vision. Ability casts and
// shop transactions resolve on command arrival, between ticks.

pub mod abilities;
pub mod ai;
pub mod combat;
pub mod movement;
pub mod shop;
pub mod vision;
