use pibot_track::map::raster::VALUE_PER_INTENSITY;
use pibot_track::{intensity_to_value, PixelPoint, TrackRaster, WorldPoint};

fn main() {
    // A 2m x 1m track at 100 px/m with a 4cm wide black line down the middle.
    let raster = TrackRaster::from_fn(200, 100, 100.0, |x, _| if (98..102).contains(&x) { 0 } else { 255 })
        .expect("valid raster parameters");

    println!("{}", raster);
    println!("Value per intensity step: {:.4}", VALUE_PER_INTENSITY);

    // Demonstrate world coordinate conversion
    let world_p = WorldPoint::new(1.0, 0.5);
    let pixel_p = raster.world_to_pixel(world_p);
    println!("\nWorld position ({:.2}, {:.2}) maps to pixel {}", world_p.x, world_p.y, pixel_p);
    let back = raster.pixel_to_world(pixel_p);
    println!("Pixel {} maps back to world position ({:.2}, {:.2})", pixel_p, back.x, back.y);

    // Sweep a sensor across the line
    println!("\nSensor sweep across the line at y = 0.5 m:");
    for i in 0..=12 {
        let x = 0.94 + f64::from(i) * 0.01;
        let intensity = raster.sample_clamped(WorldPoint::new(x, 0.5));
        println!("  x = {:.2} m -> intensity {:3} -> value {:4}", x, intensity, intensity_to_value(intensity));
    }

    // Points off the raster are clamped when sampling but are not on the track
    let outside = WorldPoint::new(-0.5, 0.5);
    println!(
        "\nWorld ({:.2}, {:.2}) is on the track: {}, clamped pixel: {:?}, value: {}",
        outside.x,
        outside.y,
        raster.contains(outside),
        raster.clamp_pixel(PixelPoint::new(-50, 50)),
        intensity_to_value(raster.sample_clamped(outside)),
    );
}
