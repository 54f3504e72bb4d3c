use crate::model::{Agent, Population};

/// Whether the position of `agt` lies strictly inside the contact box of `other`.
///
/// Only `other`'s extent is used, so the relation is not symmetric when
/// extents differ.
pub fn touches(agt: &Agent, other: &Agent) -> bool {
    let (pos, box_pos, ext) = (agt.pos, other.pos, other.extent);
    pos.x > box_pos.x - ext
        && pos.x < box_pos.x + ext
        && pos.y > box_pos.y - ext
        && pos.y < box_pos.y + ext
}

/// Indices of the live agents in contact with agent `i_agt`, in index order.
///
/// Yields nothing if `i_agt` is not a live agent.
pub fn contacts(pop: &Population, i_agt: usize) -> impl Iterator<Item = usize> + '_ {
    let agt = pop.get(i_agt);
    pop.iter()
        .filter(move |&(j_agt, other)| j_agt != i_agt && agt.is_some_and(|agt| touches(agt, other)))
        .map(|(j_agt, _)| j_agt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Position;

    fn agent_at(x: f64, y: f64, extent: f64) -> Agent {
        Agent::new(Position::new(x, y), extent)
    }

    #[test]
    fn excludes_self_and_distant_agents() {
        let pop = Population::new(vec![
            agent_at(0.0, 0.0, 20.0),
            agent_at(10.0, -10.0, 20.0),
            agent_at(100.0, 0.0, 20.0),
        ]);
        assert_eq!(contacts(&pop, 0).collect::<Vec<_>>(), [1]);
        assert_eq!(contacts(&pop, 2).count(), 0);
    }

    #[test]
    fn box_edges_are_exclusive() {
        let pop = Population::new(vec![agent_at(0.0, 0.0, 20.0), agent_at(20.0, 0.0, 20.0)]);
        assert_eq!(contacts(&pop, 0).count(), 0);
    }

    #[test]
    fn containment_is_asymmetric() {
        let small = agent_at(0.0, 0.0, 5.0);
        let large = agent_at(10.0, 0.0, 20.0);
        assert!(touches(&small, &large));
        assert!(!touches(&large, &small));
    }

    #[test]
    fn skips_tombstoned_slots() {
        let mut pop = Population::new(vec![
            agent_at(0.0, 0.0, 20.0),
            agent_at(1.0, 1.0, 20.0),
            agent_at(2.0, 2.0, 20.0),
        ]);
        pop.resize(2, || agent_at(0.0, 0.0, 20.0), |_| {});
        assert_eq!(contacts(&pop, 0).collect::<Vec<_>>(), [1]);
        assert_eq!(contacts(&pop, 2).count(), 0);
    }
}
