use bvh_pose::parse::load_bvh_from_string;
use bvh_pose::pose::{evaluate_into, Pose};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// A single long chain of joints with `num_frames` rows of motion.
fn synthetic_bvh(num_joints: usize, num_frames: usize) -> String {
    let mut text = String::from("HIERARCHY\nROOT Root\n{\n  OFFSET 0 0 0\n  CHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation\n");
    for i in 1..num_joints {
        text += &format!(
            "JOINT Joint{}\n{{\n  OFFSET 0 1 0\n  CHANNELS 3 Zrotation Xrotation Yrotation\n",
            i
        );
    }
    text += "End Site\n{\n  OFFSET 0 1 0\n}\n";
    for _ in 0..num_joints {
        text += "}\n";
    }

    let num_channels = 6 + 3 * (num_joints - 1);
    text += &format!("MOTION\nFrames: {}\nFrame Time: 0.008333\n", num_frames);
    for frame in 0..num_frames {
        let row: Vec<String> = (0..num_channels)
            .map(|channel| format!("{:.4}", ((frame * 7 + channel * 13) % 360) as f64 - 180.0))
            .collect();
        text += &row.join(" ");
        text += "\n";
    }
    text
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let bvh_string = synthetic_bvh(60, 600);
    let (skeleton, motion) = load_bvh_from_string(&bvh_string).unwrap();

    let mut group = c.benchmark_group("sample-size-example");
    group.sample_size(10);
    group.bench_function("parse 60 joints x 600 frames", |b| {
        b.iter(|| load_bvh_from_string(black_box(&bvh_string)).unwrap())
    });
    group.bench_function("evaluate every frame", |b| {
        let mut pose = Pose::new();
        b.iter(|| {
            for frame in 0..motion.num_frames {
                evaluate_into(&skeleton, &motion, black_box(frame), &mut pose);
            }
        })
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
