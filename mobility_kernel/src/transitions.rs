/// Mobility Kernel — Transition Resolution
///
/// Decides one cell's next state. Precedence is fixed, first match wins:
///
///   1. stochastic override   (randomness enabled, draw < probability)
///   2. inheritance           (modifiers enabled)
///   3. intervention          (modifiers enabled)
///   4. rule table lookup
///
/// Random draws happen before any other check. With randomness
/// disabled no draw is consumed at all.

use rand::Rng;

use crate::config::{RandomnessConfig, SimulationConfig};
use crate::domain::{Neighborhood, State, Transition, TransitionCause};
use crate::rules::RuleTable;

/// Resolve the next state of the cell at the center of `neighborhood`.
pub fn resolve<R: Rng + ?Sized>(
    neighborhood: Neighborhood,
    table: &RuleTable,
    config: &SimulationConfig,
    rng: &mut R,
) -> Transition {
    if let Some(state) = stochastic_override(&config.randomness, rng) {
        return Transition {
            state,
            cause: TransitionCause::Random,
        };
    }

    if config.modifiers_enabled {
        if let Some(transition) = apply_modifiers(neighborhood) {
            return transition;
        }
    }

    Transition {
        state: table.lookup(neighborhood),
        cause: TransitionCause::Rule,
    }
}

/// One uniform draw against the configured probability; when it fires,
/// a second draw picks the replacement state uniformly.
fn stochastic_override<R: Rng + ?Sized>(
    randomness: &RandomnessConfig,
    rng: &mut R,
) -> Option<State> {
    if !randomness.enabled {
        return None;
    }
    if rng.random::<f64>() < randomness.probability {
        Some(State::ALL[rng.random_range(0..State::ALL.len())])
    } else {
        None
    }
}

/// Inheritance is checked before intervention. The two triggers need
/// opposite values on both sides, so at most one can hold.
fn apply_modifiers(n: Neighborhood) -> Option<Transition> {
    if inheritance_applies(n) {
        return Some(Transition {
            state: n.center.rise(),
            cause: TransitionCause::Inheritance,
        });
    }
    if intervention_applies(n) {
        return Some(Transition {
            state: n.center.fall(),
            cause: TransitionCause::Intervention,
        });
    }
    None
}

/// Both sides Thriving and the center not yet Thriving.
pub fn inheritance_applies(n: Neighborhood) -> bool {
    let thriving_sides = [n.left, n.right]
        .iter()
        .filter(|s| **s == State::Thriving)
        .count();
    thriving_sides >= 2 && n.center != State::Thriving
}

/// Both sides Struggling and the center not already Struggling.
pub fn intervention_applies(n: Neighborhood) -> bool {
    n.left == State::Struggling && n.right == State::Struggling && n.center != State::Struggling
}
