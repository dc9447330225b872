//! Demo command implementation

use crate::session::Session;
use rft8xx_core::bringup::DisplayTiming;
use rft8xx_core::cmd::{self, TextOptions};
use rft8xx_core::dl::{self, ClearFlags, Primitive};
use rft8xx_core::fifo::CommandStream;

const BLACK: u32 = 0x00_0000;
const WHITE: u32 = 0xFF_FFFF;
const BLUE: u32 = 0x00_00FF;

/// Default drain timeout per frame
const FRAME_TIMEOUT_MS: u32 = 1000;

/// A point bouncing off the screen edges, in 1/16 pixel units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ball {
    x: i32,
    y: i32,
    dx: i32,
    dy: i32,
    radius: i32,
}

impl Ball {
    fn new() -> Self {
        Self {
            x: 96 * 16,
            y: 136 * 16,
            dx: 31,
            dy: 47,
            radius: 24 * 16,
        }
    }

    /// Move one step, reversing direction at the edges
    fn advance(&mut self, width: i32, height: i32) {
        self.x += self.dx;
        if self.x + self.radius >= width * 16 || self.x - self.radius < 0 {
            self.dx = -self.dx;
        }
        self.y += self.dy;
        if self.y + self.radius >= height * 16 || self.y - self.radius < 0 {
            self.dy = -self.dy;
        }
    }
}

/// Draw `frames` frames of the bouncing point animation
///
/// Each frame is built in the command FIFO, published, and drained before
/// the next one starts.
pub fn run_demo(session: &mut Session, frames: u32) -> Result<(), Box<dyn std::error::Error>> {
    let timing = DisplayTiming::WQVGA;
    let policy = session.drain_policy(Some(FRAME_TIMEOUT_MS));
    let title = format!("{} demo", session.map.name);
    let mut ball = Ball::new();

    let mut stream = CommandStream::resume(&mut session.acc, &session.fifo);
    for frame in 0..frames {
        stream
            .word(cmd::CMD_DLSTART)
            .word(dl::clear_color_rgb(BLACK))
            .word(dl::clear(ClearFlags::ALL))
            .word(dl::color_rgb(WHITE));
        stream.text(
            (timing.width / 2) as i16,
            (timing.height / 2) as i16,
            31,
            TextOptions::CENTER,
            &title,
        )?;
        stream
            .word(dl::color_rgb(BLUE))
            .word(dl::point_size(ball.radius as u32))
            .word(dl::begin(Primitive::Points))
            .word(dl::vertex2f(ball.x, ball.y))
            .word(dl::end())
            .word(dl::display())
            .word(cmd::CMD_SWAP);
        stream.finish(&policy)?;

        log::debug!("demo: frame {} at ({}, {})", frame, ball.x / 16, ball.y / 16);
        ball.advance(timing.width as i32, timing.height as i32);
    }

    println!("Drew {} frames", frames);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ball_bounces() {
        let mut ball = Ball {
            x: 100,
            y: 100,
            dx: -50,
            dy: 10,
            radius: 40,
        };
        ball.advance(480, 272);
        assert_eq!((ball.x, ball.dx), (50, -50));
        ball.advance(480, 272);
        // x - radius went negative, direction flips
        assert_eq!((ball.x, ball.dx), (0, 50));
        assert_eq!(ball.dy, 10);
    }

    #[cfg(feature = "sim")]
    #[test]
    fn test_demo_sim() {
        let mut session = crate::session::sim_session();
        run_demo(&mut session, 5).unwrap();
        assert!(!session.acc.is_poisoned());
    }
}
