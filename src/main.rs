use anyhow::Context;
use bvh_pose::parse::load_bvh_from_file;
use bvh_pose::pose::evaluate;
use env_logger::Builder;
use log::LevelFilter;

const DEFAULT_BVH_FILE: &str = "./animation.bvh";

fn log_level() -> LevelFilter {
    match dotenv::var("LOG").unwrap_or_default().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    Builder::new()
        .filter(None, log_level())
        .default_format()
        .init();

    //// [file] [frame], falling back to BVH_FILE and frame 0
    let mut args = std::env::args().skip(1);
    let file_path = args
        .next()
        .or_else(|| dotenv::var("BVH_FILE").ok())
        .unwrap_or_else(|| DEFAULT_BVH_FILE.to_string());
    let requested_frame: usize = match args.next() {
        Some(frame) => frame
            .parse()
            .with_context(|| format!("invalid frame index `{}`", frame))?,
        None => 0,
    };

    let (skeleton, motion) = load_bvh_from_file(&file_path)
        .with_context(|| format!("failed to load {}", file_path))?;

    log::info!("File: {}", &file_path);
    log::info!("Joints: {}", skeleton.len());
    log::info!(
        "Frames: {} x {} channels, frame time {} s ({} fps)",
        motion.num_frames,
        motion.num_channels,
        motion.frame_time,
        motion.fps()
    );
    print!("{}", skeleton);

    if motion.num_frames == 0 {
        log::warn!("No frames to evaluate.");
        return Ok(());
    }

    // looping is the player's policy, the evaluator only accepts in-range frames
    let frame = requested_frame % motion.num_frames;
    if frame != requested_frame {
        log::info!("Frame {} wrapped to {}", requested_frame, frame);
    }

    let pose = evaluate(&skeleton, &motion, frame);
    println!("=============== WORLD POSITIONS AT FRAME {} ===============", frame);
    for joint in &skeleton.joints {
        let position = pose.world_position(joint.index);
        println!(
            "{:.<20} {:>10.3} {:>10.3} {:>10.3}",
            joint.name, position.x, position.y, position.z
        );
    }
    Ok(())
}
