//! Human-readable dump of a model: parameters, current state and a sketch of
//! the intersection. Informational only.

use std::fmt;

use crate::direction::Direction;
use crate::intersection::IntersectionModel;

const DIAGRAM: &str = concat!(
    "            |  N  |\n",
    "            | | ^ |\n",
    "            | v | |\n",
    "  ----------+     +----------\n",
    "     <---               <---  E\n",
    "  W  --->               --->\n",
    "  ----------+     +----------\n",
    "            | | ^ |\n",
    "            | v | |\n",
    "            |  S  |\n",
);

/// ASCII sketch of the four-way intersection.
pub fn topology_diagram() -> &'static str {
    DIAGRAM
}

impl fmt::Display for IntersectionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = self.params();
        let state = self.get_state();

        writeln!(f, "Intersection parameters")?;
        writeln!(f, "-----------------------")?;
        for dir in Direction::ALL {
            let i = dir.index();
            writeln!(
                f,
                "  {dir}: alpha = {:<10} density = {}",
                params.rate_coefficients[i], state[i]
            )?;
        }
        match params.velocity_mps {
            Some(v) => writeln!(f, "  velocity: {v} m/s")?,
            None => writeln!(f, "  velocity: -")?,
        }
        if let Some(rates) = params.turn_rates {
            writeln!(
                f,
                "  straight rate: {}  turn rate: {}",
                rates.straight, rates.turn
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Topology")?;
        writeln!(f, "--------")?;
        f.write_str(DIAGRAM)
    }
}
