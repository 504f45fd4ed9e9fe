// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

use windcon::controller::prelude::*;
use windcon::estimators::prelude::*;
use windcon::power_manager::{builder::PowerManagerBuilder, PowerCeiling};
use windcon::tables::{LookupTable2D, SurfaceSource};

use stormath::{
    type_aliases::Float,
    consts::PI,
};

const ROTOR: RotorProperties = RotorProperties { radius: 10.0, air_density: 1.0 };

/// Constant tip-speed ratio of 8
fn tip_speed_ratio_surface() -> SurfaceSource {
    SurfaceSource::Inline {
        x: vec![0.0, 30.0],
        y: vec![0.0, 1.0],
        z: vec![8.0, 8.0, 8.0, 8.0],
    }
}

/// Constant thrust ceiling of 100 kN around the mooring
fn thrust_surface() -> LookupTable2D {
    LookupTable2D::new(&[-50.0, 50.0], &[-50.0, 50.0], &[100.0; 4]).unwrap()
}

/// Minimum pitch of `12 - Ct/λ²`, in degrees
fn minimum_pitch_surface() -> SurfaceSource {
    SurfaceSource::Inline {
        x: vec![0.0, 15.0],
        y: vec![0.0, 10.0],
        z: vec![12.0, 12.0, 2.0, 2.0],
    }
}

fn controller(thrust_surface: SurfaceSource) -> Controller {
    ControllerBuilder {
        power_manager: PowerManagerBuilder {
            ceiling: PowerCeiling::RatedPower { rated_power: 1.0e4, efficiency: 1.0 },
            ..Default::default()
        },
        thrust_limitation: Some(ThrustLimitationBuilder {
            tip_speed_ratio_estimator: TipSpeedRatioEstimatorBuilder::new(
                ROTOR, tip_speed_ratio_surface()
            ),
            thrust_limit_estimator: ThrustLimitEstimatorBuilder {
                maximum_thrust_surface: thrust_surface,
                scale_factor: 1.0,
                safety_margin: 1.0,
            },
            thrust_limiter: ThrustLimiterBuilder {
                rotor: ROTOR,
                minimum_pitch_surface: minimum_pitch_surface(),
            },
        }),
        ..Default::default()
    }.build().unwrap()
}

fn assert_close(value: Result<Float, SignalError>, expected: Float) {
    let value = value.unwrap();

    assert!((value - expected).abs() < 1e-9, "{} vs {}", value, expected);
}

fn inline_thrust_surface() -> SurfaceSource {
    let surface = thrust_surface();

    SurfaceSource::Inline {
        x: surface.x_values().to_vec(),
        y: surface.y_values().to_vec(),
        z: vec![100.0; 4],
    }
}

#[test]
fn thrust_ceiling_raises_the_minimum_pitch() {
    let mut controller = controller(inline_thrust_surface());

    let input = ControllerInput {
        generator_speed: 1.0,
        generator_torque: 10.0,
        maximum_speed: 1.2,
        turret_x: 3.0,
        turret_y: -4.0,
        external_maximum_thrust: 50.0,
        ..Default::default()
    };

    // ½·ρ·π·R²·(ω·R)² with ω = 1 rad/s
    let thrust_coefficient_ratio: Float = 50.0 * 1000.0 / (5000.0 * PI);
    let expected_pitch = 12.0 - thrust_coefficient_ratio;

    for _ in 0..10 {
        let output = controller.step(&input);

        assert!((output.collective_pitch_demand - expected_pitch).abs() < 1e-9);
        assert_eq!(output.state, OperatingState::BelowRated);
    }

    assert_close(controller.get_output("tip-speed ratio"), 8.0);
    assert_eq!(controller.get_output("thrust limit"), Ok(50.0));
    assert_close(controller.get_output("thrust limit estimator>maximum thrust"), 100.0);
    assert_eq!(controller.get_output("tip-speed ratio estimator>rotor speed"), Ok(1.0));

    let from_limiter = controller.get_output("minimum pitch from thrust limiter").unwrap();

    assert!((from_limiter - expected_pitch).abs() < 1e-9);
    assert_eq!(controller.get_output("minimum pitch"), Ok(from_limiter));
    assert_eq!(
        controller.get_output("thrust limiter>minimum pitch"),
        Ok(from_limiter)
    );
}

#[test]
fn estimated_ceiling_wins_when_lower_than_external() {
    let mut controller = controller(inline_thrust_surface());

    controller.step(&ControllerInput {
        generator_speed: 1.0,
        maximum_speed: 1.2,
        ..Default::default()
    });

    assert_close(controller.get_output("thrust limit"), 100.0);
    assert_close(controller.get_output("thrust limiter>maximum thrust"), 100.0);
}

#[test]
fn stopped_rotor_leaves_external_minimum_pitch() {
    let mut controller = controller(inline_thrust_surface());

    let output = controller.step(&ControllerInput {
        generator_speed: 0.0,
        maximum_speed: 1.2,
        external_minimum_pitch: 2.0,
        external_maximum_thrust: 50.0,
        ..Default::default()
    });

    assert_eq!(
        controller.get_output("minimum pitch from thrust limiter"),
        Ok(Float::NEG_INFINITY)
    );
    assert_eq!(controller.get_output("minimum pitch"), Ok(2.0));
    assert_eq!(output.collective_pitch_demand, 2.0);
}

#[test]
fn thrust_surface_from_binary_file() {
    let path = std::env::temp_dir().join("windcon_floating_cascade_thrust_surface.bin");

    std::fs::write(&path, thrust_surface().to_bytes()).unwrap();

    let mut controller = controller(SurfaceSource::File(path.to_string_lossy().to_string()));

    controller.step(&ControllerInput {
        generator_speed: 1.0,
        maximum_speed: 1.2,
        turret_x: 10.0,
        nacelle_yaw: 0.5 * PI,
        ..Default::default()
    });

    assert_close(controller.get_output("thrust limit estimator>maximum thrust"), 100.0);

    std::fs::remove_file(&path).unwrap();
}
