//! Immutable body descriptor tree.
//!
//! A `BodyNode` describes one body (star, planet or moon) and owns its satellites. The tree is
//! built once from the catalog, validated with [`validate_tree`], and then shared by reference
//! (`Arc`) with the live orbital system for the rest of the session.

use std::collections::HashSet;
use std::sync::Arc;

use bevy::prelude::*;
use thiserror::Error;

/// Deepest hierarchy accepted: star → planet → moon.
pub const MAX_TREE_DEPTH: usize = 3;

/// Construction-time invariant violations in a body tree.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BodyError {
    #[error("body '{name}' has a negative radius ({radius})")]
    NegativeRadius { name: String, radius: f32 },

    #[error("body '{name}' has a non-finite {field}")]
    NonFinite { name: String, field: &'static str },

    #[error("body '{name}' has a negative orbit radius ({radius})")]
    NegativeOrbitRadius { name: String, radius: f32 },

    #[error("root body '{name}' must not orbit anything")]
    RootHasOrbit { name: String },

    #[error("satellite '{name}' has no orbit")]
    MissingOrbit { name: String },

    #[error("body name '{name}' appears more than once")]
    DuplicateName { name: String },

    #[error("bodies '{first}' and '{second}' are both light sources")]
    MultipleLights { first: String, second: String },

    #[error("body '{name}' sits at depth {depth}, deeper than {max}", max = MAX_TREE_DEPTH)]
    TooDeep { name: String, depth: usize },

    #[error("body '{name}' has a malformed ring ({inner_radius}..{outer_radius})")]
    InvalidRing {
        name:         String,
        inner_radius: f32,
        outer_radius: f32,
    },
}

/// Planetary ring, drawn as a flat annulus in the body's equatorial plane.
#[derive(Debug, Clone, PartialEq)]
pub struct RingDescriptor {
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub texture:      Option<String>,
}

/// Circular orbit around the parent body.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitDescriptor {
    pub radius:       f32,
    /// Radians, applied about the parent's Z axis.
    pub inclination:  f32,
    /// Radians per unit of time step.
    pub angular_rate: f32,
    pub path_color:   Color,
}

/// Static description of one body and its satellites.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyNode {
    pub name:           String,
    pub color:          Color,
    pub texture:        Option<String>,
    pub albedo:         f32,
    pub ring:           Option<RingDescriptor>,
    pub radius:         f32,
    /// Radians.
    pub axial_tilt:     f32,
    /// Signed spin rate, radians per unit of time step. Negative spins retrograde.
    pub spin_rate:      f32,
    pub orbit:          Option<OrbitDescriptor>,
    pub is_light:       bool,
    /// Keeps one face turned toward the primary.
    pub tidally_locked: bool,
    pub satellites:     Vec<Arc<BodyNode>>,
}

impl BodyNode {
    pub fn builder(name: impl Into<String>, radius: f32) -> BodyBuilder { BodyBuilder::new(name, radius) }

    /// Depth-first search for a body by name, including `self`.
    pub fn find(&self, name: &str) -> Option<&Self> {
        if self.name == name {
            return Some(self);
        }
        self.satellites.iter().find_map(|satellite| satellite.find(name))
    }

    /// Number of bodies in this subtree.
    pub fn body_count(&self) -> usize {
        1 + self.satellites.iter().map(|s| s.body_count()).sum::<usize>()
    }
}

/// Builder for `BodyNode`. Fields default to a plain white, non-rotating body.
pub struct BodyBuilder {
    node: BodyNode,
}

impl BodyBuilder {
    pub fn new(name: impl Into<String>, radius: f32) -> Self {
        Self {
            node: BodyNode {
                name: name.into(),
                color: Color::WHITE,
                texture: None,
                albedo: 0.0,
                ring: None,
                radius,
                axial_tilt: 0.0,
                spin_rate: 0.0,
                orbit: None,
                is_light: false,
                tidally_locked: false,
                satellites: Vec::new(),
            },
        }
    }

    pub fn color(mut self, color: Color) -> Self {
        self.node.color = color;
        self
    }

    pub fn texture(mut self, texture: impl Into<String>) -> Self {
        self.node.texture = Some(texture.into());
        self
    }

    pub const fn albedo(mut self, albedo: f32) -> Self {
        self.node.albedo = albedo;
        self
    }

    pub fn ring(mut self, ring: RingDescriptor) -> Self {
        self.node.ring = Some(ring);
        self
    }

    pub const fn axial_tilt(mut self, radians: f32) -> Self {
        self.node.axial_tilt = radians;
        self
    }

    pub const fn spin_rate(mut self, rate: f32) -> Self {
        self.node.spin_rate = rate;
        self
    }

    pub fn orbit(mut self, orbit: OrbitDescriptor) -> Self {
        self.node.orbit = Some(orbit);
        self
    }

    pub const fn light(mut self) -> Self {
        self.node.is_light = true;
        self
    }

    pub const fn tidally_locked(mut self) -> Self {
        self.node.tidally_locked = true;
        self
    }

    pub fn satellite(mut self, satellite: BodyNode) -> Self {
        self.node.satellites.push(Arc::new(satellite));
        self
    }

    pub fn build(self) -> BodyNode { self.node }
}

/// Checks every construction-time invariant of a body tree rooted at `root`.
pub fn validate_tree(root: &BodyNode) -> Result<(), BodyError> {
    if root.orbit.is_some() {
        return Err(BodyError::RootHasOrbit {
            name: root.name.clone(),
        });
    }

    let mut names = HashSet::new();
    let mut light: Option<&str> = None;
    validate_node(root, 1, &mut names, &mut light)
}

fn validate_node<'a>(
    node: &'a BodyNode,
    depth: usize,
    names: &mut HashSet<&'a str>,
    light: &mut Option<&'a str>,
) -> Result<(), BodyError> {
    let name = || node.name.clone();

    if depth > MAX_TREE_DEPTH {
        return Err(BodyError::TooDeep { name: name(), depth });
    }
    if !names.insert(node.name.as_str()) {
        return Err(BodyError::DuplicateName { name: name() });
    }

    check_finite(node, node.radius, "radius")?;
    if node.radius < 0.0 {
        return Err(BodyError::NegativeRadius {
            name:   name(),
            radius: node.radius,
        });
    }
    check_finite(node, node.axial_tilt, "axial tilt")?;
    check_finite(node, node.spin_rate, "spin rate")?;
    check_finite(node, node.albedo, "albedo")?;

    if depth > 1 {
        let Some(orbit) = &node.orbit else {
            return Err(BodyError::MissingOrbit { name: name() });
        };
        check_finite(node, orbit.radius, "orbit radius")?;
        check_finite(node, orbit.inclination, "orbital inclination")?;
        check_finite(node, orbit.angular_rate, "orbital angular rate")?;
        if orbit.radius < 0.0 {
            return Err(BodyError::NegativeOrbitRadius {
                name:   name(),
                radius: orbit.radius,
            });
        }
    }

    if let Some(ring) = &node.ring {
        let well_formed = ring.inner_radius.is_finite()
            && ring.outer_radius.is_finite()
            && ring.inner_radius >= 0.0
            && ring.inner_radius <= ring.outer_radius;
        if !well_formed {
            return Err(BodyError::InvalidRing {
                name:         name(),
                inner_radius: ring.inner_radius,
                outer_radius: ring.outer_radius,
            });
        }
    }

    if node.is_light {
        if let Some(first) = light {
            return Err(BodyError::MultipleLights {
                first:  (*first).to_string(),
                second: name(),
            });
        }
        *light = Some(node.name.as_str());
    }

    for satellite in &node.satellites {
        validate_node(satellite, depth + 1, names, light)?;
    }
    Ok(())
}

fn check_finite(node: &BodyNode, value: f32, field: &'static str) -> Result<(), BodyError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(BodyError::NonFinite {
            name: node.name.clone(),
            field,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orbit(radius: f32, angular_rate: f32) -> OrbitDescriptor {
        OrbitDescriptor {
            radius,
            inclination: 0.0,
            angular_rate,
            path_color: Color::WHITE,
        }
    }

    fn small_system() -> BodyNode {
        BodyNode::builder("Star", 10.0)
            .light()
            .satellite(
                BodyNode::builder("Planet", 1.0)
                    .orbit(orbit(100.0, 0.1))
                    .satellite(
                        BodyNode::builder("Moon", 0.2)
                            .orbit(orbit(5.0, 0.5))
                            .tidally_locked()
                            .build(),
                    )
                    .build(),
            )
            .build()
    }

    #[test]
    fn accepts_well_formed_tree() {
        let root = small_system();
        assert_eq!(validate_tree(&root), Ok(()));
        assert_eq!(root.body_count(), 3);
        assert!(root.find("Moon").is_some_and(|moon| moon.tidally_locked));
        assert!(root.find("Comet").is_none());
    }

    #[test]
    fn rejects_negative_radius() {
        let root = BodyNode::builder("Star", 10.0)
            .satellite(BodyNode::builder("Bad", -1.0).orbit(orbit(10.0, 0.1)).build())
            .build();
        assert_eq!(
            validate_tree(&root),
            Err(BodyError::NegativeRadius {
                name:   "Bad".into(),
                radius: -1.0,
            })
        );
    }

    #[test]
    fn rejects_non_finite_angular_rates() {
        let root = BodyNode::builder("Star", 10.0)
            .satellite(
                BodyNode::builder("Spinner", 1.0)
                    .orbit(orbit(10.0, 0.1))
                    .spin_rate(f32::NAN)
                    .build(),
            )
            .build();
        assert!(matches!(
            validate_tree(&root),
            Err(BodyError::NonFinite { field: "spin rate", .. })
        ));

        let root = BodyNode::builder("Star", 10.0)
            .satellite(
                BodyNode::builder("Drifter", 1.0)
                    .orbit(orbit(10.0, f32::INFINITY))
                    .build(),
            )
            .build();
        assert!(matches!(
            validate_tree(&root),
            Err(BodyError::NonFinite {
                field: "orbital angular rate",
                ..
            })
        ));
    }

    #[test]
    fn rejects_structural_violations() {
        let orbiting_root = BodyNode::builder("Star", 10.0).orbit(orbit(1.0, 0.1)).build();
        assert!(matches!(
            validate_tree(&orbiting_root),
            Err(BodyError::RootHasOrbit { .. })
        ));

        let no_orbit = BodyNode::builder("Star", 10.0)
            .satellite(BodyNode::builder("Lost", 1.0).build())
            .build();
        assert!(matches!(
            validate_tree(&no_orbit),
            Err(BodyError::MissingOrbit { .. })
        ));

        let duplicate = BodyNode::builder("Star", 10.0)
            .satellite(BodyNode::builder("Twin", 1.0).orbit(orbit(10.0, 0.1)).build())
            .satellite(BodyNode::builder("Twin", 1.0).orbit(orbit(20.0, 0.1)).build())
            .build();
        assert!(matches!(
            validate_tree(&duplicate),
            Err(BodyError::DuplicateName { .. })
        ));

        let two_suns = BodyNode::builder("Star", 10.0)
            .light()
            .satellite(
                BodyNode::builder("Companion", 5.0)
                    .light()
                    .orbit(orbit(50.0, 0.1))
                    .build(),
            )
            .build();
        assert!(matches!(
            validate_tree(&two_suns),
            Err(BodyError::MultipleLights { .. })
        ));
    }

    #[test]
    fn rejects_trees_deeper_than_star_planet_moon() {
        let root = BodyNode::builder("Star", 10.0)
            .satellite(
                BodyNode::builder("Planet", 1.0)
                    .orbit(orbit(100.0, 0.1))
                    .satellite(
                        BodyNode::builder("Moon", 0.5)
                            .orbit(orbit(5.0, 0.1))
                            .satellite(
                                BodyNode::builder("Moonlet", 0.1)
                                    .orbit(orbit(1.0, 0.1))
                                    .build(),
                            )
                            .build(),
                    )
                    .build(),
            )
            .build();
        assert_eq!(
            validate_tree(&root),
            Err(BodyError::TooDeep {
                name:  "Moonlet".into(),
                depth: 4,
            })
        );
    }

    #[test]
    fn rejects_inverted_ring() {
        let root = BodyNode::builder("Star", 10.0)
            .ring(RingDescriptor {
                inner_radius: 20.0,
                outer_radius: 15.0,
                texture:      None,
            })
            .build();
        assert!(matches!(
            validate_tree(&root),
            Err(BodyError::InvalidRing { .. })
        ));
    }
}
