//! Server stream -> client reconstruction, end to end
//!
//! A watcher client feeds every frame it receives into a `ClientView` and
//! renders frames at a steady rate while another client moves around.

use std::time::Duration;

use coin_arena::client::{ClientView, ConnectionPhase, Direction, InputTracker};
use coin_arena::game::{Arena, ArenaHandle, ArenaSettings, Frame, PlayerId, SequentialIds};
use coin_arena::ws::ServerMsg;
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};

fn start_arena() -> ArenaHandle {
    let (arena, handle) = Arena::new(
        ArenaSettings {
            latency: Duration::from_millis(200),
            seed: 7,
        },
        Box::new(SequentialIds::new()),
    );
    tokio::spawn(arena.run());
    handle
}

async fn connect(arena: &ArenaHandle) -> (PlayerId, mpsc::Receiver<Frame>) {
    let (tx, rx) = mpsc::channel(4096);
    let id = arena.join(tx).await.expect("arena running");
    (id, rx)
}

/// Feed frames into the view for `window`, rendering every 16 ms.
/// Returns the rendered x of `watched` for each frame where it was visible.
async fn watch(
    view: &mut ClientView,
    rx: &mut mpsc::Receiver<Frame>,
    watched: &PlayerId,
    window: Duration,
) -> Vec<f32> {
    let deadline = Instant::now() + window;
    let mut xs = Vec::new();
    let mut next_frame = Instant::now();

    while Instant::now() < deadline {
        match timeout_at(next_frame.min(deadline), rx.recv()).await {
            Ok(Some(frame)) => {
                let msg: ServerMsg = serde_json::from_str(&frame).expect("valid json");
                view.handle_message(msg, Instant::now().into_std());
            }
            Ok(None) => break,
            Err(_) => {
                let frame = view.render(Instant::now().into_std());
                if let Some(p) = frame.players.iter().find(|p| &p.id == watched) {
                    xs.push(p.x);
                }
                next_frame += Duration::from_millis(16);
            }
        }
    }
    xs
}

#[tokio::test(start_paused = true)]
async fn watcher_sees_smooth_motion_and_departure() {
    let arena = start_arena();
    let (watcher_id, mut watcher_rx) = connect(&arena).await;
    let (mover_id, _mover_rx) = connect(&arena).await;

    let mut view = ClientView::default();
    watch(&mut view, &mut watcher_rx, &mover_id, Duration::from_millis(600)).await;

    assert_eq!(view.phase(), ConnectionPhase::Live);
    assert_eq!(view.my_id(), Some(&watcher_id));
    assert_eq!(view.player_ids().count(), 2);

    let mut input = InputTracker::new();
    let msg = input.press(Direction::Right).expect("first press sends");
    arena.submit(mover_id.clone(), msg).await.unwrap();

    let xs = watch(&mut view, &mut watcher_rx, &mover_id, Duration::from_secs(2)).await;
    assert!(xs.len() > 60);

    // moving right at a constant rate: never backwards, and no single
    // rendered frame jumps further than a broadcast interval of movement
    for pair in xs.windows(2) {
        let step = pair[1] - pair[0];
        assert!(step >= -1e-3, "moved backwards: {pair:?}");
        assert!(step <= 15.0, "jumped: {pair:?}");
    }
    assert!(xs.last().unwrap() > xs.first().unwrap());

    arena.leave(mover_id.clone()).await.unwrap();
    watch(&mut view, &mut watcher_rx, &mover_id, Duration::from_secs(1)).await;

    let frame = view.render(Instant::now().into_std());
    let ids: Vec<_> = frame.players.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids, vec![watcher_id.clone()]);
    assert!(frame.players[0].is_self);
}
