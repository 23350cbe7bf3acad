mod common;

use swarm_view::{
    color_for, ChannelEvent, ClientContext, ControlChannel, Dispatch, DrawCommand, FrameFormat,
    PixelSurface, RecordingSurface, Rgb, Viewport,
};

fn recording_context() -> ClientContext<Vec<String>, RecordingSurface> {
    let mut ctx = ClientContext::new(
        ControlChannel::new(Vec::new(), FrameFormat::Snapshot),
        Viewport::new(1000, 600, 1.0),
        RecordingSurface::new(1000, 600),
    );
    ctx.handle(ChannelEvent::Opened);
    ctx
}

fn frame(json: &str) -> ChannelEvent {
    ChannelEvent::Frame(json.to_string())
}

#[test]
fn single_entity_frame_draws_one_circle_and_overlay() {
    let mut ctx = recording_context();
    assert_eq!(ctx.handle(frame(common::ONE_ENTITY)), Dispatch::Rendered);

    let commands = ctx.surface().commands();
    assert!(matches!(commands[0], DrawCommand::Clear));
    let circles: Vec<&DrawCommand> = commands
        .iter()
        .filter(|command| matches!(command, DrawCommand::Circle { .. }))
        .collect();
    assert_eq!(circles.len(), 1);
    assert_eq!(
        circles[0],
        &DrawCommand::Circle {
            x: 10.0,
            y: 10.0,
            radius: 5.0,
            color: Rgb::new(0xd9, 0x26, 0x26),
        }
    );
    assert_eq!(
        ctx.surface().texts(),
        vec!["Active Count: 1", "Team 0 Count: 1"]
    );
}

#[test]
fn single_team_snapshot_counts_both_entities() {
    let mut ctx = recording_context();
    assert_eq!(ctx.handle(frame(common::TWO_TEAM_ZERO)), Dispatch::Rendered);
    assert_eq!(
        ctx.surface().texts(),
        vec!["Active Count: 2", "Team 0 Count: 2"]
    );
}

#[test]
fn zero_team_count_is_rejected_and_previous_frame_kept() {
    let mut ctx = recording_context();
    ctx.handle(frame(common::ONE_ENTITY));
    let before = ctx.surface().commands().to_vec();

    let zero_teams = r#"{"Entities":[],"Foods":[],"TeamCount":0}"#;
    assert_eq!(ctx.handle(frame(zero_teams)), Dispatch::Rejected);
    assert_eq!(ctx.surface().commands(), before.as_slice());
    assert_eq!(ctx.stats().rejected_protocol, 1);
}

#[test]
fn food_and_entities_are_layered_back_to_front() {
    let mut ctx = recording_context();
    let mixed = r#"{
        "Entities":[
            {"X":1,"Y":1,"Width":2,"TeamID":1,"Active":true},
            {"X":2,"Y":2,"Width":2,"TeamID":0,"Active":false}
        ],
        "Foods":[
            {"X":3,"Y":3,"Size":1,"Active":true},
            {"X":4,"Y":4,"Size":1,"Active":false}
        ],
        "TeamCount":2
    }"#;
    assert_eq!(ctx.handle(frame(mixed)), Dispatch::Rendered);

    let layers: Vec<(f64, f64)> = ctx
        .surface()
        .commands()
        .iter()
        .filter_map(|command| match command {
            DrawCommand::Circle { x, y, .. } | DrawCommand::Diamond { x, y, .. } => Some((*x, *y)),
            _ => None,
        })
        .collect();
    assert_eq!(layers, vec![(2.0, 2.0), (4.0, 4.0), (3.0, 3.0), (1.0, 1.0)]);
    assert_eq!(
        ctx.surface().texts(),
        vec!["Active Count: 1", "Team 1 Count: 1"]
    );
}

#[test]
fn pixel_surface_paints_team_color_at_entity_center() {
    let scale = 2.0;
    let background = Rgb::new(0, 0, 0);
    let mut ctx = ClientContext::new(
        ControlChannel::new(Vec::new(), FrameFormat::Snapshot),
        Viewport::new(200, 200, scale),
        PixelSurface::new(200, 200, scale, background),
    );
    ctx.handle(ChannelEvent::Opened);
    let entity = r#"{"Entities":[{"X":100,"Y":100,"Width":10,"TeamID":1,"Active":true}],"TeamCount":2}"#;
    assert_eq!(ctx.handle(frame(entity)), Dispatch::Rendered);

    let team_one = color_for(1, std::num::NonZeroU32::new(2).unwrap(), false, false);
    assert_eq!(team_one, Rgb::new(0x26, 0xd9, 0xd9));
    assert_eq!(ctx.surface().pixel(50, 50), Some(team_one));
    assert_eq!(ctx.surface().pixel(99, 0), Some(background));
}
