//! Hand-tracking frames from the local hand bridge.
//!
//! Hand trackers ship vendor SDKs rather than native Rust bindings, so the
//! demo reads palm frames from a small local bridge process that publishes
//! newline-delimited JSON on a TCP port:
//!
//! ```text
//! {"palm":[12.5,240.0,-30.2],"grab":0.85}
//! ```
//!
//! `palm` is the palm position in tracker millimeters, `grab` is how closed
//! the hand is (0 open, 1 fist). A background thread owns the connection and
//! reconnects with a delay while the bridge is absent; the frame loop only
//! ever drains a channel. The newest frame wins, and a frame older than
//! [`STALE_AFTER`] means the hand has been lost.

use std::io::{BufRead, BufReader};
use std::net::TcpStream;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use glam::Vec3;
use serde::Deserialize;

/// Default bridge address.
pub const DEFAULT_HAND_ADDR: &str = "127.0.0.1:9437";

/// Tracker millimeters to scene units.
const PALM_SCALE: f32 = 1.0 / 50.0;

/// Scene-space offset applied after scaling; the tracker sits below the
/// volume, so its y origin maps well under the box floor.
const PALM_OFFSET: Vec3 = Vec3::new(0.0, -5.0, 0.0);

/// A frame older than this means the hand left the tracking volume.
const STALE_AFTER: Duration = Duration::from_millis(250);

/// How long to wait before re-dialing an absent bridge.
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Wire format of one bridge line.
#[derive(Debug, Deserialize)]
struct WireFrame {
    palm: [f32; 3],
    grab: f32,
}

/// One hand-tracking sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandFrame {
    /// Palm position in tracker millimeters.
    pub palm_mm: Vec3,
    /// Grab strength, clamped to 0..=1.
    pub grab: f32,
}

impl HandFrame {
    /// Parse one bridge line. Malformed or non-finite frames are dropped.
    pub fn parse(line: &str) -> Option<Self> {
        let wire: WireFrame = serde_json::from_str(line).ok()?;
        let palm = Vec3::from_array(wire.palm);
        if !palm.is_finite() || !wire.grab.is_finite() {
            return None;
        }
        Some(Self {
            palm_mm: palm,
            grab: wire.grab.clamp(0.0, 1.0),
        })
    }

    /// Palm position mapped into scene space.
    pub fn scene_position(&self) -> Vec3 {
        self.palm_mm * PALM_SCALE + PALM_OFFSET
    }
}

/// Receiving end of the hand bridge.
pub struct HandFeed {
    rx: Receiver<HandFrame>,
    latest: Option<(HandFrame, Instant)>,
}

impl HandFeed {
    /// Spawn the reader thread and return the feed.
    ///
    /// The thread outlives the feed if the bridge never connects; it exits
    /// on the first send after the feed is dropped.
    pub fn connect(addr: &str) -> Self {
        let (tx, rx) = bounded(64);
        let addr = addr.to_string();
        let spawned = thread::Builder::new()
            .name("hand-feed".into())
            .spawn(move || reader_loop(&addr, tx));
        if let Err(e) = spawned {
            log::warn!("could not spawn hand feed thread: {}", e);
        }
        Self { rx, latest: None }
    }

    #[cfg(test)]
    fn from_receiver(rx: Receiver<HandFrame>) -> Self {
        Self { rx, latest: None }
    }

    /// The freshest hand frame, or `None` when no hand is visible.
    pub fn latest(&mut self) -> Option<HandFrame> {
        let now = Instant::now();
        while let Ok(frame) = self.rx.try_recv() {
            self.latest = Some((frame, now));
        }
        match self.latest {
            Some((frame, at)) if now.duration_since(at) < STALE_AFTER => Some(frame),
            _ => None,
        }
    }
}

fn reader_loop(addr: &str, tx: Sender<HandFrame>) {
    loop {
        if let Ok(stream) = TcpStream::connect(addr) {
            log::info!("hand bridge connected at {}", addr);
            let reader = BufReader::new(stream);
            for line in reader.lines() {
                let Ok(line) = line else { break };
                let Some(frame) = HandFrame::parse(&line) else {
                    continue;
                };
                // Latest-wins: a full queue just drops this frame.
                if let Err(TrySendError::Disconnected(_)) = tx.try_send(frame) {
                    return;
                }
            }
            log::warn!("hand bridge at {} dropped, reconnecting", addr);
        }
        thread::sleep(RECONNECT_DELAY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_frame() {
        let frame = HandFrame::parse(r#"{"palm":[12.5,240.0,-30.0],"grab":0.85}"#).unwrap();
        assert_eq!(frame.palm_mm, Vec3::new(12.5, 240.0, -30.0));
        assert_eq!(frame.grab, 0.85);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(HandFrame::parse("").is_none());
        assert!(HandFrame::parse("not json").is_none());
        assert!(HandFrame::parse(r#"{"palm":[1.0,2.0],"grab":0.5}"#).is_none());
        assert!(HandFrame::parse(r#"{"grab":0.5}"#).is_none());
    }

    #[test]
    fn test_parse_rejects_non_finite() {
        assert!(HandFrame::parse(r#"{"palm":[1.0,null,3.0],"grab":0.5}"#).is_none());
    }

    #[test]
    fn test_parse_clamps_grab() {
        let frame = HandFrame::parse(r#"{"palm":[0.0,0.0,0.0],"grab":1.7}"#).unwrap();
        assert_eq!(frame.grab, 1.0);
    }

    #[test]
    fn test_scene_position_mapping() {
        // 250 mm above the tracker lands at the scene origin.
        let frame = HandFrame {
            palm_mm: Vec3::new(0.0, 250.0, 0.0),
            grab: 0.0,
        };
        assert!(frame.scene_position().length() < 1e-6);

        let frame = HandFrame {
            palm_mm: Vec3::new(50.0, 250.0, -50.0),
            grab: 0.0,
        };
        assert_eq!(frame.scene_position(), Vec3::new(1.0, 0.0, -1.0));
    }

    #[test]
    fn test_latest_returns_fresh_frame() {
        let (tx, rx) = bounded(4);
        let mut feed = HandFeed::from_receiver(rx);

        assert!(feed.latest().is_none());

        let frame = HandFrame {
            palm_mm: Vec3::new(1.0, 2.0, 3.0),
            grab: 0.5,
        };
        tx.send(frame).unwrap();
        assert_eq!(feed.latest(), Some(frame));

        // Channel empty again, but the frame is still fresh.
        assert_eq!(feed.latest(), Some(frame));
    }

    #[test]
    fn test_latest_drains_to_newest() {
        let (tx, rx) = bounded(4);
        let mut feed = HandFeed::from_receiver(rx);

        for grab in [0.1, 0.2, 0.9] {
            tx.send(HandFrame {
                palm_mm: Vec3::ZERO,
                grab,
            })
            .unwrap();
        }
        assert_eq!(feed.latest().unwrap().grab, 0.9);
    }

    #[test]
    fn test_stale_frame_means_no_hand() {
        let (_tx, rx) = bounded::<HandFrame>(4);
        let mut feed = HandFeed::from_receiver(rx);
        feed.latest = Some((
            HandFrame {
                palm_mm: Vec3::ZERO,
                grab: 0.0,
            },
            Instant::now() - STALE_AFTER * 2,
        ));
        assert!(feed.latest().is_none());
    }
}
