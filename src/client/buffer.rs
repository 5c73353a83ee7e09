//! Snapshot buffer and render-time interpolation
//!
//! Snapshots are stored in arrival order. Reconstruction looks for the pair
//! of snapshots bracketing `render_time` and blends player positions between
//! them. It never extrapolates past the newest snapshot.

use std::collections::{BTreeMap, VecDeque};
use std::time::Instant;

use crate::game::world::{Player, PlayerId};

/// About two seconds of updates at 30 Hz
pub const SNAPSHOT_CAPACITY: usize = 60;

/// What the client knows about a player at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub color: String,
    pub score: u32,
}

impl From<&Player> for PlayerView {
    fn from(p: &Player) -> Self {
        Self {
            x: p.x,
            y: p.y,
            color: p.color.clone(),
            score: p.score,
        }
    }
}

pub type PlayerViews = BTreeMap<PlayerId, PlayerView>;

/// Player state as received at `timestamp`. Never modified once stored.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub timestamp: Instant,
    pub players: PlayerViews,
}

/// Bounded, time-ordered snapshot history
#[derive(Debug)]
pub struct SnapshotBuffer {
    snapshots: VecDeque<Snapshot>,
    capacity: usize,
}

impl Default for SnapshotBuffer {
    fn default() -> Self {
        Self::with_capacity(SNAPSHOT_CAPACITY)
    }
}

impl SnapshotBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Append a snapshot, evicting the oldest past capacity
    pub fn push(&mut self, snapshot: Snapshot) {
        if self.snapshots.len() == self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    /// Latest snapshot at or before `render_time` and the one right after it
    pub fn bracket(&self, render_time: Instant) -> Option<(&Snapshot, &Snapshot)> {
        let prev_idx = self
            .snapshots
            .iter()
            .rposition(|s| s.timestamp <= render_time)?;
        let next = self.snapshots.get(prev_idx + 1)?;
        Some((&self.snapshots[prev_idx], next))
    }

    /// Reconstruct player state at `render_time`.
    ///
    /// Falls back to the newest snapshot when no bracketing pair exists, and
    /// returns `None` only when the buffer is empty.
    pub fn reconstruct(&self, render_time: Option<Instant>) -> Option<PlayerViews> {
        if let Some(render_time) = render_time {
            if let Some((prev, next)) = self.bracket(render_time) {
                return Some(interpolate(prev, next, render_time));
            }
        }
        self.latest().map(|s| s.players.clone())
    }
}

/// Blend every player in `next` between `prev` and `next` at `render_time`.
/// Players missing from `prev` snap to their `next` state.
pub fn interpolate(prev: &Snapshot, next: &Snapshot, render_time: Instant) -> PlayerViews {
    let span = next.timestamp.saturating_duration_since(prev.timestamp);
    let ratio = if span.is_zero() {
        1.0
    } else {
        let elapsed = render_time.saturating_duration_since(prev.timestamp);
        (elapsed.as_secs_f64() / span.as_secs_f64()).clamp(0.0, 1.0) as f32
    };

    next.players
        .iter()
        .map(|(id, to)| {
            let view = match prev.players.get(id) {
                Some(from) => PlayerView {
                    x: from.x + (to.x - from.x) * ratio,
                    y: from.y + (to.y - from.y) * ratio,
                    color: to.color.clone(),
                    score: to.score,
                },
                None => to.clone(),
            };
            (id.clone(), view)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::time::Duration;

    fn pid(s: &str) -> PlayerId {
        PlayerId(s.into())
    }

    fn view(x: f32, y: f32, score: u32) -> PlayerView {
        PlayerView {
            x,
            y,
            color: format!("#00000{score}"),
            score,
        }
    }

    fn snapshot(at: Instant, players: &[(&str, PlayerView)]) -> Snapshot {
        Snapshot {
            timestamp: at,
            players: players
                .iter()
                .map(|(id, v)| (pid(id), v.clone()))
                .collect(),
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn halfway_between_snapshots() {
        let t0 = Instant::now();
        let mut buffer = SnapshotBuffer::default();
        buffer.push(snapshot(t0, &[("p", view(0.0, 0.0, 0))]));
        buffer.push(snapshot(t0 + ms(100), &[("p", view(10.0, 0.0, 1))]));

        let players = buffer.reconstruct(Some(t0 + ms(50))).unwrap();
        let p = &players[&pid("p")];
        assert_approx_eq!(p.x, 5.0, 1e-4);
        assert_approx_eq!(p.y, 0.0, 1e-4);
        // non-spatial fields come from the newer snapshot
        assert_eq!(p.score, 1);
    }

    #[test]
    fn single_snapshot_is_returned_unchanged() {
        let t0 = Instant::now();
        let mut buffer = SnapshotBuffer::default();
        buffer.push(snapshot(t0, &[("p", view(3.0, 4.0, 2))]));

        for render_time in [t0, t0 + ms(500)] {
            let players = buffer.reconstruct(Some(render_time)).unwrap();
            assert_eq!(players[&pid("p")], view(3.0, 4.0, 2));
        }
        assert_eq!(buffer.reconstruct(None).unwrap()[&pid("p")], view(3.0, 4.0, 2));
    }

    #[test]
    fn empty_buffer_has_nothing_to_reconstruct() {
        let buffer = SnapshotBuffer::default();
        assert!(buffer.reconstruct(Some(Instant::now())).is_none());
    }

    #[test]
    fn never_extrapolates_past_latest() {
        let t0 = Instant::now();
        let mut buffer = SnapshotBuffer::default();
        buffer.push(snapshot(t0, &[("p", view(0.0, 0.0, 0))]));
        buffer.push(snapshot(t0 + ms(100), &[("p", view(10.0, 0.0, 0))]));

        let players = buffer.reconstruct(Some(t0 + ms(1000))).unwrap();
        assert_eq!(players[&pid("p")].x, 10.0);
    }

    #[test]
    fn render_time_before_history_uses_latest() {
        let t0 = Instant::now() + ms(1000);
        let mut buffer = SnapshotBuffer::default();
        buffer.push(snapshot(t0, &[("p", view(0.0, 0.0, 0))]));
        buffer.push(snapshot(t0 + ms(100), &[("p", view(10.0, 0.0, 0))]));

        let players = buffer.reconstruct(Some(t0 - ms(10))).unwrap();
        assert_eq!(players[&pid("p")].x, 10.0);
    }

    #[test]
    fn new_player_snaps_in_and_departed_player_drops_out() {
        let t0 = Instant::now();
        let mut buffer = SnapshotBuffer::default();
        buffer.push(snapshot(
            t0,
            &[("old", view(0.0, 0.0, 0)), ("gone", view(1.0, 1.0, 0))],
        ));
        buffer.push(snapshot(
            t0 + ms(100),
            &[("old", view(20.0, 40.0, 0)), ("new", view(300.0, 200.0, 0))],
        ));

        let players = buffer.reconstruct(Some(t0 + ms(25))).unwrap();
        assert_approx_eq!(players[&pid("old")].x, 5.0, 1e-4);
        assert_approx_eq!(players[&pid("old")].y, 10.0, 1e-4);
        assert_eq!(players[&pid("new")], view(300.0, 200.0, 0));
        assert!(!players.contains_key(&pid("gone")));
    }

    #[test]
    fn picks_the_latest_bracketing_pair() {
        let t0 = Instant::now();
        let mut buffer = SnapshotBuffer::default();
        for i in 0..5u64 {
            buffer.push(snapshot(t0 + ms(i * 33), &[("p", view(i as f32 * 10.0, 0.0, 0))]));
        }

        let (prev, next) = buffer.bracket(t0 + ms(70)).unwrap();
        assert_eq!(prev.timestamp, t0 + ms(66));
        assert_eq!(next.timestamp, t0 + ms(99));
    }

    #[test]
    fn same_instant_snapshots_resolve_to_the_newer() {
        let t0 = Instant::now();
        let prev = snapshot(t0, &[("p", view(0.0, 0.0, 0))]);
        let next = snapshot(t0, &[("p", view(8.0, 6.0, 1))]);

        let players = interpolate(&prev, &next, t0);
        let p = &players[&pid("p")];
        assert!(!p.x.is_nan() && !p.y.is_nan());
        assert_eq!(p, &view(8.0, 6.0, 1));

        // a redundant snapshot never becomes the lower bracket
        let mut buffer = SnapshotBuffer::default();
        buffer.push(prev);
        buffer.push(next);
        buffer.push(snapshot(t0 + ms(30), &[("p", view(11.0, 6.0, 1))]));

        let (from, to) = buffer.bracket(t0).unwrap();
        assert_eq!(from.players[&pid("p")].x, 8.0);
        assert_eq!(to.timestamp, t0 + ms(30));

        let players = buffer.reconstruct(Some(t0 + ms(10))).unwrap();
        assert_approx_eq!(players[&pid("p")].x, 9.0, 1e-4);
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let t0 = Instant::now();
        let mut buffer = SnapshotBuffer::with_capacity(3);
        for i in 0..5u64 {
            buffer.push(snapshot(t0 + ms(i), &[]));
        }

        assert_eq!(buffer.len(), 3);
        assert!(buffer.bracket(t0 + ms(1)).is_none());
        assert_eq!(buffer.latest().unwrap().timestamp, t0 + ms(4));
    }

    #[test]
    fn default_capacity_holds_two_seconds() {
        let t0 = Instant::now();
        let mut buffer = SnapshotBuffer::default();
        for i in 0..100u64 {
            buffer.push(snapshot(t0 + ms(i * 33), &[]));
        }
        assert_eq!(buffer.len(), SNAPSHOT_CAPACITY);
    }
}
