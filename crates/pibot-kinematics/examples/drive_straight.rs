use pibot_kinematics::*;

fn main() {
    let wheel_diameter = 0.03;
    let axis_length = 0.14;
    let kinematics_result = DifferentialDrive::new(wheel_diameter, axis_length);

    let mut current_pose = Pose::new(2.5, 4.5, -core::f64::consts::FRAC_PI_2);
    let wheel_speeds = WheelSpeeds::new(0.083 * 50.0, 0.083 * 50.0); // both wheels at 50%
    let dt = 0.1; // Time step in seconds
    let num_steps = 10;

    match kinematics_result {
        Ok(kinematics) => {
            println!("Initializing simulation...");
            println!("  Differential Drive Parameters:");
            println!("    Wheel Diameter: {} m", kinematics.wheel_diameter());
            println!("    Axis Length:    {} m", kinematics.axis_length());
            println!("  Initial State:");
            println!("    Pose:           {}", current_pose);
            println!("    Wheel Speeds:   {}", wheel_speeds);
            println!("  Simulation Settings:");
            println!("    Time Step:      {} s", dt);
            println!("    Num Steps:      {}", num_steps);
            println!("\nSimulating...");

            for i in 0..num_steps {
                match kinematics.wheel_travel(wheel_speeds, dt) {
                    Ok(travel) => {
                        current_pose = kinematics.step_wheels(current_pose, travel);
                        println!("Step {:>2}: travel {} -> Pose: {}", i + 1, travel, current_pose);
                    }
                    Err(e) => {
                        eprintln!("Error during simulation step {}: {}", i + 1, e);
                        break;
                    }
                }
            }

            println!("\nSimulation complete.");
            println!("Final Pose: {:?}", current_pose);
        }
        Err(e) => {
            eprintln!("Failed to initialize kinematics: {}", e);
            eprintln!(
                "Please ensure wheel_diameter ({}) and axis_length ({}) are positive.",
                wheel_diameter, axis_length
            );
        }
    }
}
