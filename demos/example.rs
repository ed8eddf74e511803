use bvh_pose::parse::{load_bvh_from_file, load_bvh_from_string};
use bvh_pose::pose::{bone_segments, evaluate, evaluate_into, rest_pose, Pose};
use bvh_pose::types::{Channel, Joint, Motion, Position, Skeleton};

fn main() -> Result<(), bvh_pose::BvhError> {
    ////////////////////////////// loading .bvh ///////////////////////////////////////////
    // load bvh from a file
    let (skeleton, motion) = load_bvh_from_file("./tests/data/humanoid.bvh")?;

    // or from a string
    // (`include_str` works at compile time and so has a different base path than `load_bvh_from_file` - ignore the difference)
    let bvh_string: &str = include_str!("../tests/data/humanoid.bvh");
    let (skeleton_from_string, motion_from_string): (Skeleton, Motion) =
        load_bvh_from_string(bvh_string)?;
    assert_eq!(skeleton, skeleton_from_string);
    assert_eq!(motion, motion_from_string);

    //////////////////////////////// fields of Motion ////////////////
    {
        let num_frames: usize = motion.num_frames;
        let num_channels: usize = motion.num_channels;
        let frame_time: f64 = motion.frame_time;

        assert_eq!(num_frames, 3);
        assert_eq!(num_channels, 24);
        // fps is the reciprocal of frame_time (rounded to nearest integer, though)
        assert_eq!(motion.fps(), 120);
        assert!((1.0 / frame_time - motion.fps() as f64).abs() < 0.5);

        // one row per frame, `num_channels` values each
        let row: &[f64] = motion.frame(1);
        assert_eq!(row.len(), num_channels);
    }

    //////////////////////////////// fields of Joint ////////////////
    {
        let joint: &Joint = skeleton.find_joint_by_name("LeftUpLeg").expect("LeftUpLeg exists");
        assert_eq!(joint.index, 4);
        assert_eq!(joint.parent, Some(0));
        assert_eq!(joint.depth, 1);
        assert_eq!(joint.children, vec![5]);
        assert_eq!(joint.offset, Position::new(2.0, 0.0, 0.0));
        assert_eq!(
            joint.channels,
            vec![Channel::Zrotation, Channel::Xrotation, Channel::Yrotation]
        );
        // this joint reads columns 12, 13 and 14 of every motion row
        assert_eq!(joint.channel_range(), 12..15);
    }

    // End Sites are leaves without channels
    skeleton
        .joints
        .iter()
        .filter(|joint| joint.is_end_site)
        .for_each(|joint| {
            assert!(joint.children.is_empty());
            assert_eq!(joint.num_channels(), 0);
        });

    // print the hierarchy
    print!("{}", skeleton);

    //////////////////////////////// evaluating poses ////////////////
    // world matrices of all joints at frame 2
    let pose: Pose = evaluate(&skeleton, &motion, 2);
    let left_leg = skeleton.find_joint_by_name("LeftLeg").expect("LeftLeg exists").index;
    let position: Position = pose.world_position(left_leg);
    println!("LeftLeg at frame 2: {:?}", position);

    // reuse one Pose across a playback loop; looping is up to the caller
    let mut pose = Pose::new();
    for tick in 0..10 {
        evaluate_into(&skeleton, &motion, tick % motion.num_frames, &mut pose);
    }

    // line list for a renderer
    for (from, to) in bone_segments(&skeleton, &pose) {
        println!("{:6.2?} -> {:6.2?}", from, to);
    }

    // the bind pose ignores motion data entirely
    let rest = rest_pose(&skeleton);
    println!("Head rest position: {:?}", rest.world_position(2));

    // linestrips, one per limb
    for chain in skeleton.kinematic_chains() {
        let names: Vec<&str> = chain.iter().map(|&i| skeleton.joints[i].name.as_str()).collect();
        println!("{}", names.join(" -> "));
    }
    Ok(())
}
