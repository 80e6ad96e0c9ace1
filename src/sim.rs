//! Force-directed layout. The simulation owns positions and velocities in an
//! origin-centered world space; each `step` applies repulsion, link springs,
//! centering, and collision pushes, scaled by a geometrically decaying alpha.
//! Once alpha falls below its floor (or the step cap is hit) the
//! simulation declares itself stable and stops moving until reheated.

use eframe::egui::{Vec2, vec2};

const GOLDEN_ANGLE: f32 = 0.618_034 * std::f32::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimConfig {
    pub link_distance: f32,
    pub link_strength: f32,
    pub charge: f32,
    pub center_strength: f32,
    pub collide_padding: f32,
    /// Fraction of velocity removed each step.
    pub velocity_decay: f32,
    pub alpha_decay: f32,
    pub alpha_min: f32,
    /// Alpha restored when an interaction perturbs a stable layout.
    pub reheat_alpha: f32,
    /// Hard bound so degenerate graphs still reach Stable in finite time.
    pub max_steps: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            link_distance: 95.0,
            link_strength: 0.08,
            charge: 2400.0,
            center_strength: 0.03,
            collide_padding: 4.0,
            velocity_decay: 0.4,
            alpha_decay: 0.02,
            alpha_min: 0.001,
            reheat_alpha: 0.5,
            max_steps: 600,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimPhase {
    Running,
    Stable,
}

#[derive(Clone, Debug)]
pub struct SimNode {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Drag pin. While set the node tracks the pin exactly and ignores
    /// integration, but still pushes and pulls its neighbors.
    pub fixed: Option<Vec2>,
}

pub struct Simulation {
    nodes: Vec<SimNode>,
    edges: Vec<(usize, usize)>,
    config: SimConfig,
    alpha: f32,
    steps: u32,
    phase: SimPhase,
    forces: Vec<Vec2>,
}

impl Simulation {
    /// Nodes without a carried-over position are scattered on a golden-angle
    /// spiral around the origin so the first frames are deterministic and
    /// overlap-free.
    pub fn new(
        seeds: Vec<(Option<Vec2>, f32)>,
        edges: Vec<(usize, usize)>,
        config: SimConfig,
    ) -> Self {
        let count = seeds.len();
        let nodes = seeds
            .into_iter()
            .enumerate()
            .map(|(index, (carried, radius))| SimNode {
                pos: carried.unwrap_or_else(|| spiral_seed(index)),
                vel: Vec2::ZERO,
                radius,
                fixed: None,
            })
            .collect();

        let phase = if count == 0 {
            SimPhase::Stable
        } else {
            SimPhase::Running
        };

        Self {
            nodes,
            edges,
            config,
            alpha: 1.0,
            steps: 0,
            phase,
            forces: vec![Vec2::ZERO; count],
        }
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    pub fn config_mut(&mut self) -> &mut SimConfig {
        &mut self.config
    }

    pub fn pin(&mut self, index: usize, pos: Vec2) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.fixed = Some(pos);
            node.vel = Vec2::ZERO;
        }
    }

    pub fn release(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.fixed = None;
        }
    }

    /// Re-enters Running from Stable with a fresh step allowance.
    pub fn reheat(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        self.alpha = self.alpha.max(self.config.reheat_alpha);
        self.steps = 0;
        self.phase = SimPhase::Running;
    }

    /// One integration tick. Pure with respect to everything outside the
    /// simulation: no clocks, no randomness, no rendering surface.
    pub fn step(&mut self) -> SimPhase {
        if self.phase == SimPhase::Stable {
            return SimPhase::Stable;
        }

        let count = self.nodes.len();
        for node in &mut self.nodes {
            if let Some(pin) = node.fixed {
                node.pos = pin;
                node.vel = Vec2::ZERO;
            }
        }

        self.forces.resize(count, Vec2::ZERO);
        self.forces.fill(Vec2::ZERO);

        // Dense graphs get weaker charge so they do not explode outward.
        let charge = if count > 20 {
            self.config.charge * 0.55
        } else {
            self.config.charge
        };

        for a in 0..count {
            for b in (a + 1)..count {
                let delta = self.nodes[a].pos - self.nodes[b].pos;
                let raw_distance = delta.length();
                // Direction comes from the unclamped delta; coincident nodes
                // fall back to a deterministic split so they can separate.
                let direction = if raw_distance > 0.0001 {
                    delta / raw_distance
                } else {
                    separation_direction(a, b)
                };
                let distance = raw_distance.max(1.0);
                let distance_sq = distance * distance;

                let push = direction * (charge / distance_sq);
                self.forces[a] += push;
                self.forces[b] -= push;

                let min_distance =
                    self.nodes[a].radius + self.nodes[b].radius + self.config.collide_padding;
                if distance < min_distance {
                    let overlap = direction * (min_distance - distance) * 0.5;
                    self.forces[a] += overlap;
                    self.forces[b] -= overlap;
                }
            }
        }

        for &(from, to) in &self.edges {
            if from >= count || to >= count || from == to {
                continue;
            }
            let delta = self.nodes[to].pos - self.nodes[from].pos;
            let distance = delta.length().max(0.0001);
            let direction = delta / distance;
            let stretch = (distance - self.config.link_distance) * self.config.link_strength;
            self.forces[from] += direction * stretch;
            self.forces[to] -= direction * stretch;
        }

        for (node, force) in self.nodes.iter().zip(self.forces.iter_mut()) {
            *force -= node.pos * self.config.center_strength;
        }

        let damping = 1.0 - self.config.velocity_decay;
        for (node, force) in self.nodes.iter_mut().zip(self.forces.iter()) {
            if node.fixed.is_some() {
                continue;
            }
            node.vel = (node.vel + *force * self.alpha) * damping;
            node.pos += node.vel;
        }

        self.alpha *= 1.0 - self.config.alpha_decay;
        self.steps += 1;
        if self.alpha < self.config.alpha_min || self.steps >= self.config.max_steps {
            self.phase = SimPhase::Stable;
            for node in &mut self.nodes {
                node.vel = Vec2::ZERO;
            }
        }

        self.phase
    }
}

fn spiral_seed(index: usize) -> Vec2 {
    let angle = index as f32 * GOLDEN_ANGLE;
    let radius = 40.0 * (index as f32 + 1.0).sqrt();
    vec2(angle.cos(), angle.sin()) * radius
}

fn separation_direction(a: usize, b: usize) -> Vec2 {
    let angle = (a as f32 * 0.618_034 + b as f32 * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair_sim() -> Simulation {
        Simulation::new(
            vec![(None, 15.0), (None, 15.0)],
            vec![(0, 1)],
            SimConfig::default(),
        )
    }

    fn run_to_stable(sim: &mut Simulation) -> u32 {
        let max = sim.config.max_steps;
        for step in 1..=max {
            if sim.step() == SimPhase::Stable {
                return step;
            }
        }
        panic!("simulation never stabilized within {max} steps");
    }

    #[test]
    fn empty_graph_is_stable_without_stepping() {
        let mut sim = Simulation::new(Vec::new(), Vec::new(), SimConfig::default());
        assert_eq!(sim.phase(), SimPhase::Stable);
        assert_eq!(sim.step(), SimPhase::Stable);
    }

    #[test]
    fn stabilizes_within_step_cap() {
        let seeds = (0..12).map(|_| (None, 15.0)).collect::<Vec<_>>();
        let edges = (0..11).map(|i| (i, i + 1)).collect();
        let mut sim = Simulation::new(seeds, edges, SimConfig::default());

        let steps = run_to_stable(&mut sim);
        assert!(steps <= sim.config.max_steps);

        // Stable means stable: further stepping does not move anything.
        let frozen: Vec<Vec2> = sim.nodes().iter().map(|n| n.pos).collect();
        sim.step();
        for (node, before) in sim.nodes().iter().zip(frozen) {
            assert_eq!(node.pos, before);
        }
    }

    #[test]
    fn coincident_nodes_are_pushed_apart() {
        // Carried positions can land two nodes on the same spot; the zero
        // delta must not zero out the repulsion and collision pushes.
        let spot = vec2(10.0, 10.0);
        let mut sim = Simulation::new(
            vec![(Some(spot), 15.0), (Some(spot), 15.0)],
            Vec::new(),
            SimConfig::default(),
        );
        run_to_stable(&mut sim);

        let distance = (sim.nodes()[0].pos - sim.nodes()[1].pos).length();
        assert!(distance > 1.0, "nodes stayed superimposed at {distance}");
    }

    #[test]
    fn connected_nodes_end_up_separated() {
        let mut sim = pair_sim();
        run_to_stable(&mut sim);

        let distance = (sim.nodes()[0].pos - sim.nodes()[1].pos).length();
        let radii = sim.nodes()[0].radius + sim.nodes()[1].radius;
        assert!(distance > radii, "nodes still overlap at {distance}");
    }

    #[test]
    fn pinned_node_ignores_forces_but_anchors_others() {
        let mut sim = pair_sim();
        let pin = vec2(200.0, 0.0);
        sim.pin(0, pin);

        for _ in 0..40 {
            sim.step();
        }

        assert_eq!(sim.nodes()[0].pos, pin);
        assert_eq!(sim.nodes()[0].fixed, Some(pin));
        // The free node is pulled toward the pinned side of the world.
        assert!(sim.nodes()[1].pos.x > 0.0);
    }

    #[test]
    fn release_clears_pin_and_reheat_resumes() {
        let mut sim = pair_sim();
        run_to_stable(&mut sim);

        sim.pin(0, vec2(300.0, 300.0));
        sim.release(0);
        assert_eq!(sim.nodes()[0].fixed, None);

        sim.reheat();
        assert_eq!(sim.phase(), SimPhase::Running);
        let steps = run_to_stable(&mut sim);
        assert!(steps <= sim.config.max_steps);
    }

    #[test]
    fn carried_positions_are_preserved_at_start() {
        let carried = vec2(17.0, -4.0);
        let sim = Simulation::new(
            vec![(Some(carried), 15.0), (None, 15.0)],
            Vec::new(),
            SimConfig::default(),
        );
        assert_eq!(sim.nodes()[0].pos, carried);
        assert_ne!(sim.nodes()[1].pos, Vec2::ZERO);
    }
}
