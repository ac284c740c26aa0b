//! Property tests for the queue's ordering policy.

use framecut_common::MediaTime;
use framecut_project_model::geometry::{MirrorAxis, RotateDegree};
use framecut_render_engine::{Command, CommandQueue};
use proptest::prelude::*;

/// Arbitrary commands, trims included.
fn command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![
        (0u64..100, 100u64..200).prop_map(|(start, end)| Command::Trim {
            start: MediaTime::from_millis(start),
            end: MediaTime::from_millis(end),
        }),
        Just(Command::Rotate {
            degree: RotateDegree::Degree90
        }),
        Just(Command::Mirror {
            axis: MirrorAxis::Vertical
        }),
        (1u32..80).prop_map(|n| Command::ScaleTime {
            factor: f64::from(n) / 10.0
        }),
        (0u32..=100).prop_map(|n| Command::SetVolume {
            level: n as f32 / 100.0
        }),
    ]
}

proptest! {
    #[test]
    fn trims_are_stably_partitioned_last(
        commands in prop::collection::vec(command_strategy(), 0..40),
    ) {
        let mut queue = CommandQueue::new();
        for command in &commands {
            queue.enqueue(command.clone());
        }
        let order = queue.execution_order();
        prop_assert_eq!(order.len(), commands.len());

        let first_trim = order
            .iter()
            .position(|c| c.kind().runs_last())
            .unwrap_or(order.len());
        prop_assert!(order[first_trim..].iter().all(|c| c.kind().runs_last()));

        let expected_rest: Vec<&Command> =
            commands.iter().filter(|c| !c.kind().runs_last()).collect();
        let expected_trims: Vec<&Command> =
            commands.iter().filter(|c| c.kind().runs_last()).collect();
        prop_assert_eq!(&order[..first_trim], expected_rest.as_slice());
        prop_assert_eq!(&order[first_trim..], expected_trims.as_slice());
    }

    #[test]
    fn ordering_without_trims_is_request_order(
        commands in prop::collection::vec(command_strategy(), 0..40),
    ) {
        let commands: Vec<Command> = commands
            .into_iter()
            .filter(|c| !c.kind().runs_last())
            .collect();
        let mut queue = CommandQueue::new();
        for command in &commands {
            queue.enqueue(command.clone());
        }
        let expected: Vec<&Command> = commands.iter().collect();
        prop_assert_eq!(queue.execution_order(), expected);
    }
}
