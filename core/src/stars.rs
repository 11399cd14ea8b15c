//! Bedwars star level calculation.
//!
//! Levels are bought with experience. The first four levels after every
//! 100-level prestige are discounted; every other level costs a flat
//! 5000 exp. The fractional part of the returned star encodes progress
//! toward the next level, measured against that level's own cost.

const LEVELS_PER_PRESTIGE: u64 = 100;
const LEVEL_COST: u64 = 5000;
const EASY_LEVEL_COSTS: [u64; 4] = [500, 1000, 2000, 3500];
const EASY_EXP: u64 = 500 + 1000 + 2000 + 3500;
const PRESTIGE_EXP: u64 = EASY_EXP + (LEVELS_PER_PRESTIGE - 4) * LEVEL_COST;

/// Convert raw Bedwars experience into a fractional star level.
pub fn bedwars_level_from_exp(exp: u64) -> f64 {
    let mut levels = (exp / PRESTIGE_EXP) * LEVELS_PER_PRESTIGE;
    let mut exp = exp % PRESTIGE_EXP;

    for cost in EASY_LEVEL_COSTS {
        if exp >= cost {
            levels += 1;
            exp -= cost;
        } else {
            break;
        }
    }

    levels += exp / LEVEL_COST;
    exp %= LEVEL_COST;

    let next_level = (levels + 1) % LEVELS_PER_PRESTIGE;
    let next_level_cost = match next_level {
        1..=4 => EASY_LEVEL_COSTS[next_level as usize - 1],
        _ => LEVEL_COST,
    };

    levels as f64 + exp as f64 / next_level_cost as f64
}
