//! Built-in solar system catalog.
//!
//! Physical constants come from the NASA planetary fact sheet
//! (<https://nssdc.gsfc.nasa.gov/planetary/factsheet/>). The catalog is turned into a validated
//! `BodyNode` tree at either toon or actual scale.

use std::f32::consts::TAU;
use std::sync::Arc;

use bevy::prelude::*;

use crate::body::BodyError;
use crate::body::BodyNode;
use crate::body::OrbitDescriptor;
use crate::body::RingDescriptor;
use crate::body::validate_tree;

// ============================================================================
// Scale
// ============================================================================

/// Star radius multiplier at toon scale.
const TOON_STAR_SCALE: f32 = 0.1;
/// Planet and moon radius multiplier at toon scale.
const TOON_BODY_SCALE: f32 = 0.5;
/// World units per 10^6 km of distance from the sun at toon scale.
const TOON_ORBIT_SCALE: f32 = 250.0;
/// World units per km of distance from a planet at toon scale.
const TOON_SATELLITE_ORBIT_SCALE: f32 = 0.025;
const KM_PER_MILLION_KM: f32 = 1_000_000.0;
const HOURS_PER_DAY: f32 = 24.0;

/// How catalog distances and sizes are mapped into world units (kilometres at actual scale).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum BodyScale {
    /// Compressed distances and inflated planets so the whole system fits on screen.
    #[default]
    Toon,
    /// True kilometres for every size and distance.
    Actual,
}

impl BodyScale {
    pub const fn from_actual_scale(actual_scale: bool) -> Self {
        if actual_scale { Self::Actual } else { Self::Toon }
    }

    /// Body radius in world units.
    pub fn body_radius(self, diameter_km: f32, is_star: bool) -> f32 {
        let radius_km = diameter_km * 0.5;
        match self {
            Self::Actual => radius_km,
            Self::Toon if is_star => radius_km * TOON_STAR_SCALE,
            Self::Toon => radius_km * TOON_BODY_SCALE,
        }
    }

    /// Orbit radius in world units for a body circling the star.
    pub fn orbit_radius(self, distance_million_km: f32, star_diameter_km: f32) -> f32 {
        match self {
            Self::Actual => distance_million_km * KM_PER_MILLION_KM,
            // Offset by the star's diameter so inner planets clear its surface.
            Self::Toon => {
                self.body_radius(star_diameter_km, true)
                    .mul_add(2.0, distance_million_km * TOON_ORBIT_SCALE)
            },
        }
    }

    /// Orbit radius in world units for a moon circling its planet.
    pub fn satellite_orbit_radius(self, distance_km: f32) -> f32 {
        match self {
            Self::Actual => distance_km,
            Self::Toon => distance_km * TOON_SATELLITE_ORBIT_SCALE,
        }
    }

    /// Ring radius in world units.
    pub fn ring_radius(self, radius_km: f32) -> f32 {
        match self {
            Self::Actual => radius_km,
            Self::Toon => radius_km * TOON_BODY_SCALE,
        }
    }
}

/// Spin rate in radians per simulated hour. Negative periods spin retrograde.
pub fn spin_rate(rotation_period_hours: f32) -> f32 { TAU / rotation_period_hours }

/// Orbital angular rate in radians per simulated hour.
pub fn orbital_rate(orbital_period_days: f32) -> f32 { TAU / (orbital_period_days * HOURS_PER_DAY) }

// ============================================================================
// Table
// ============================================================================

struct BodyRecord {
    name:                &'static str,
    is_light:            bool,
    color:               u32,
    orbit_color:         u32,
    albedo:              f32,
    /// km
    diameter:            f32,
    /// hours
    rotation_period:     f32,
    /// degrees
    axial_tilt:          f32,
    /// 10^6 km for planets, km for moons
    distance:            f32,
    /// days
    orbital_period:      f32,
    /// degrees
    orbital_inclination: f32,
}

struct RingRecord {
    body:         &'static str,
    /// km
    inner_radius: f32,
    /// km
    outer_radius: f32,
}

const SUN: BodyRecord = BodyRecord {
    name:                "Sun",
    is_light:            true,
    color:               0xfd_fb_d3,
    orbit_color:         0xfd_fb_d3,
    albedo:              0.0,
    diameter:            1_392_700.0,
    rotation_period:     587.3,
    axial_tilt:          0.0,
    distance:            0.0,
    orbital_period:      1.0,
    orbital_inclination: 0.0,
};

const PLANETS: [BodyRecord; 9] = [
    BodyRecord {
        name:                "Mercury",
        is_light:            false,
        color:               0x1a_1a_1a,
        orbit_color:         0xf5_85_36,
        albedo:              0.142,
        diameter:            4879.0,
        rotation_period:     1407.6,
        axial_tilt:          0.034,
        distance:            57.9,
        orbital_period:      88.0,
        orbital_inclination: 7.0,
    },
    BodyRecord {
        name:                "Venus",
        is_light:            false,
        color:               0xe6_e6_e6,
        orbit_color:         0xc3_5f_ed,
        albedo:              0.689,
        diameter:            12104.0,
        rotation_period:     -5832.5,
        axial_tilt:          177.4,
        distance:            108.2,
        orbital_period:      224.7,
        orbital_inclination: 3.4,
    },
    BodyRecord {
        name:                "Earth",
        is_light:            false,
        color:               0x2f_6a_69,
        orbit_color:         0x1f_d1_37,
        albedo:              0.434,
        diameter:            12756.0,
        rotation_period:     23.9,
        axial_tilt:          23.4,
        distance:            149.6,
        orbital_period:      365.2,
        orbital_inclination: 0.0,
    },
    BodyRecord {
        name:                "Mars",
        is_light:            false,
        color:               0x99_3d_00,
        orbit_color:         0xe8_4f_25,
        albedo:              0.170,
        diameter:            6792.0,
        rotation_period:     24.6,
        axial_tilt:          25.2,
        distance:            228.0,
        orbital_period:      687.0,
        orbital_inclination: 1.8,
    },
    BodyRecord {
        name:                "Jupiter",
        is_light:            false,
        color:               0xb0_7f_35,
        orbit_color:         0xed_ab_47,
        albedo:              0.538,
        diameter:            142_984.0,
        rotation_period:     9.9,
        axial_tilt:          3.1,
        distance:            778.5,
        orbital_period:      4331.0,
        orbital_inclination: 1.3,
    },
    BodyRecord {
        name:                "Saturn",
        is_light:            false,
        color:               0xb0_8f_36,
        orbit_color:         0xed_d0_5a,
        albedo:              0.499,
        diameter:            120_536.0,
        rotation_period:     10.7,
        axial_tilt:          26.7,
        distance:            1432.0,
        orbital_period:      10747.0,
        orbital_inclination: 2.5,
    },
    BodyRecord {
        name:                "Uranus",
        is_light:            false,
        color:               0x55_80_aa,
        orbit_color:         0x9d_dc_f5,
        albedo:              0.488,
        diameter:            51118.0,
        rotation_period:     -17.2,
        axial_tilt:          97.8,
        distance:            2867.0,
        orbital_period:      30589.0,
        orbital_inclination: 0.8,
    },
    BodyRecord {
        name:                "Neptune",
        is_light:            false,
        color:               0x36_68_96,
        orbit_color:         0x31_79_de,
        albedo:              0.442,
        diameter:            49528.0,
        rotation_period:     16.1,
        axial_tilt:          28.3,
        distance:            4515.0,
        orbital_period:      59800.0,
        orbital_inclination: 1.8,
    },
    BodyRecord {
        name:                "Pluto",
        is_light:            false,
        color:               0xda_d7_ce,
        orbit_color:         0xa1_91_81,
        albedo:              0.52,
        diameter:            2376.0,
        rotation_period:     -153.3,
        axial_tilt:          122.5,
        distance:            5906.4,
        orbital_period:      90560.0,
        orbital_inclination: 17.2,
    },
];

/// The Moon orbits Earth. Its rotation period equals its orbital period.
const MOON: BodyRecord = BodyRecord {
    name:                "Moon",
    is_light:            false,
    color:               0x8c_8c_8c,
    orbit_color:         0xff_ff_ff,
    albedo:              0.12,
    diameter:            3475.0,
    rotation_period:     655.7,
    axial_tilt:          6.7,
    distance:            384_400.0,
    orbital_period:      27.3,
    orbital_inclination: 5.1,
};

const MOON_PRIMARY: &str = "Earth";

const SATURN_RING: RingRecord = RingRecord {
    body:         "Saturn",
    inner_radius: 74_500.0,
    outer_radius: 140_220.0,
};

/// Names of every catalog body in display order (star, planets by distance, moons).
pub fn body_names() -> impl Iterator<Item = &'static str> {
    std::iter::once(SUN.name)
        .chain(PLANETS.iter().map(|planet| planet.name))
        .chain(std::iter::once(MOON.name))
}

fn hex_color(hex: u32) -> Color {
    let [_, r, g, b] = hex.to_be_bytes();
    Color::srgb_u8(r, g, b)
}

fn base_node(record: &BodyRecord, scale: BodyScale) -> crate::body::BodyBuilder {
    let mut builder = BodyNode::builder(record.name, scale.body_radius(record.diameter, record.is_light))
        .color(hex_color(record.color))
        .albedo(record.albedo)
        .axial_tilt(record.axial_tilt.to_radians())
        .spin_rate(spin_rate(record.rotation_period));
    if record.is_light {
        builder = builder.light();
    }
    builder
}

fn orbit(record: &BodyRecord, radius: f32) -> OrbitDescriptor {
    OrbitDescriptor {
        radius,
        inclination: record.orbital_inclination.to_radians(),
        angular_rate: orbital_rate(record.orbital_period),
        path_color: hex_color(record.orbit_color),
    }
}

/// Builds and validates the catalog tree at `scale`.
pub fn root_body(scale: BodyScale) -> Result<Arc<BodyNode>, BodyError> {
    let mut sun = base_node(&SUN, scale);

    for record in &PLANETS {
        let mut planet = base_node(record, scale)
            .orbit(orbit(record, scale.orbit_radius(record.distance, SUN.diameter)));

        if record.name == SATURN_RING.body {
            planet = planet.ring(RingDescriptor {
                inner_radius: scale.ring_radius(SATURN_RING.inner_radius),
                outer_radius: scale.ring_radius(SATURN_RING.outer_radius),
                texture:      None,
            });
        }

        if record.name == MOON_PRIMARY {
            let moon = base_node(&MOON, scale)
                .orbit(orbit(&MOON, scale.satellite_orbit_radius(MOON.distance)))
                .tidally_locked()
                .build();
            planet = planet.satellite(moon);
        }

        sun = sun.satellite(planet.build());
    }

    let root = sun.build();
    validate_tree(&root)?;
    Ok(Arc::new(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_builds_at_both_scales() {
        for scale in [BodyScale::Toon, BodyScale::Actual] {
            let root = root_body(scale).expect("catalog should validate");
            assert_eq!(root.name, "Sun");
            assert!(root.is_light);
            assert!(root.orbit.is_none());
            assert_eq!(root.satellites.len(), PLANETS.len());
            assert_eq!(root.body_count(), body_names().count());
        }
    }

    #[test]
    fn moon_orbits_earth_and_is_tidally_locked() {
        let root = root_body(BodyScale::Toon).unwrap();
        let earth = root.find("Earth").unwrap();
        assert_eq!(earth.satellites.len(), 1);
        assert_eq!(earth.satellites[0].name, "Moon");
        assert!(earth.satellites[0].tidally_locked);
        assert!(!earth.tidally_locked);
    }

    #[test]
    fn only_saturn_has_a_ring() {
        let root = root_body(BodyScale::Actual).unwrap();
        let ringed: Vec<_> = root
            .satellites
            .iter()
            .filter(|planet| planet.ring.is_some())
            .map(|planet| planet.name.as_str())
            .collect();
        assert_eq!(ringed, ["Saturn"]);
        let ring = root.find("Saturn").unwrap().ring.as_ref().unwrap();
        assert!((ring.inner_radius - 74_500.0).abs() < f32::EPSILON);
    }

    #[test]
    fn actual_scale_uses_kilometres() {
        let root = root_body(BodyScale::Actual).unwrap();
        let earth = root.find("Earth").unwrap();
        assert!((earth.radius - 6378.0).abs() < 1e-3);
        let orbit = earth.orbit.as_ref().unwrap();
        assert!((orbit.radius - 149.6e6).abs() / 149.6e6 < 1e-6);
    }

    #[test]
    fn toon_orbits_clear_the_sun() {
        let root = root_body(BodyScale::Toon).unwrap();
        for planet in &root.satellites {
            let orbit = planet.orbit.as_ref().unwrap();
            assert!(
                orbit.radius - planet.radius > root.radius,
                "{} intersects the sun",
                planet.name
            );
        }
    }

    #[test]
    fn retrograde_rotation_has_negative_spin() {
        let root = root_body(BodyScale::Toon).unwrap();
        assert!(root.find("Venus").unwrap().spin_rate < 0.0);
        assert!(root.find("Uranus").unwrap().spin_rate < 0.0);
        assert!(root.find("Earth").unwrap().spin_rate > 0.0);
    }

    #[test]
    fn earth_spins_once_per_day_and_orbits_once_per_year() {
        let earth_spin = spin_rate(23.9);
        assert!((earth_spin * 23.9 - TAU).abs() < 1e-4);
        let earth_orbit = orbital_rate(365.2);
        assert!((earth_orbit * 365.2 * 24.0 - TAU).abs() < 1e-4);
    }
}
