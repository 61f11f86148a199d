//! Terminal rendering of animation frames.

use std::io;

use console::{style, Style, Term};
use dogmail_core::animation::{AnimationState, Frame, Pose};
use dogmail_core::constants::WAG_AMPLITUDE_DEG;

/// Width of the tilt gauge, odd so 0° sits in the middle
const TILT_GAUGE_WIDTH: usize = 11;

/// Shown while the submission request is in flight
pub const PENDING_MESSAGE: &str = "Sending treat...";

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Warm yellow used for excited phases
const EXCITED_ANSI: u8 = 214;
const CALM_ANSI: u8 = 67;

fn pose_glyph(pose: Pose) -> &'static str {
    match pose {
        Pose::Sitting => "(•ᴥ•)",
        Pose::SittingHeadTilt => "(•ᴥ•)>",
        Pose::Standing => "ʕ•ᴥ•ʔ",
        Pose::SittingTongueOut => "(•ᴥ•)P",
        Pose::StandingTongueOut => "ʕ•ᴥ•ʔP",
    }
}

fn pose_name(pose: Pose) -> &'static str {
    pose.asset().trim_start_matches('/').trim_end_matches(".svg")
}

fn tilt_gauge(rotation_deg: f32) -> String {
    let span = (TILT_GAUGE_WIDTH - 1) as f32;
    let normalized = ((rotation_deg + WAG_AMPLITUDE_DEG) / (2.0 * WAG_AMPLITUDE_DEG)).clamp(0.0, 1.0);
    let marker = (normalized * span).round() as usize;

    (0..TILT_GAUGE_WIDTH)
        .map(|i| if i == marker { '|' } else { '·' })
        .collect()
}

/// One plain-text status line for `frame`.
pub fn render_frame(frame: &Frame) -> String {
    format!(
        "{:<7} {:<26} {:<14} scale {:.2}  tilt [{}] {:+5.1}°  lift {:+5.1}",
        pose_glyph(frame.pose),
        pose_name(frame.pose),
        frame.state.label(),
        frame.scale,
        tilt_gauge(frame.rotation_deg),
        frame.rotation_deg,
        frame.offset_y,
    )
}

/// Spinner line for the `tick`-th redraw while a request is pending.
pub fn pending_line(tick: usize) -> String {
    format!("{} {}", SPINNER_FRAMES[tick % SPINNER_FRAMES.len()], PENDING_MESSAGE)
}

fn phase_style(state: AnimationState) -> Style {
    match state {
        AnimationState::Idle | AnimationState::Settle => Style::new().color256(CALM_ANSI),
        _ => Style::new().color256(EXCITED_ANSI).bold(),
    }
}

/// Redraws a single terminal line per frame.
pub struct FrameRenderer {
    term: Term,
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRenderer {
    pub fn new() -> Self {
        Self { term: Term::stdout() }
    }

    pub fn draw(&self, frame: &Frame) -> io::Result<()> {
        let line = render_frame(frame);
        if self.term.is_term() {
            self.term.clear_line()?;
            self.term.write_str(&phase_style(frame.state).apply_to(line).to_string())
        } else {
            self.term.write_line(&line)
        }
    }

    pub fn draw_pending(&self, tick: usize) -> io::Result<()> {
        if !self.term.is_term() {
            // one line instead of a spinner when piped
            return if tick == 0 {
                self.term.write_line(PENDING_MESSAGE)
            } else {
                Ok(())
            };
        }
        let line = pending_line(tick);
        self.term.clear_line()?;
        self.term.write_str(&Style::new().cyan().apply_to(line).to_string())
    }

    pub fn finish(&self, message: &str) -> io::Result<()> {
        if self.term.is_term() {
            self.term.clear_line()?;
        }
        self.term.write_line(&style(message).green().bold().to_string())
    }

    pub fn error(&self, message: &str) -> io::Result<()> {
        if self.term.is_term() {
            self.term.clear_line()?;
        }
        self.term.write_line(&style(message).red().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frame(state: AnimationState, pose: Pose, rotation_deg: f32) -> Frame {
        Frame {
            state,
            pose,
            scale: state.scale_target(),
            rotation_deg,
            offset_y: state.offset_target(),
        }
    }

    #[test]
    fn test_tilt_gauge_extremes() {
        assert_eq!(tilt_gauge(-5.0), "|··········");
        assert_eq!(tilt_gauge(0.0), "·····|·····");
        assert_eq!(tilt_gauge(5.0), "··········|");
        assert_eq!(tilt_gauge(40.0), "··········|");
    }

    #[test]
    fn test_pending_line_cycles_frames() {
        assert_eq!(pending_line(0), "⠋ Sending treat...");
        assert_eq!(pending_line(1), "⠙ Sending treat...");
        assert_eq!(pending_line(10), pending_line(0));
    }

    #[test]
    fn test_render_frame_names_pose_and_phase() {
        let line = render_frame(&frame(AnimationState::Wag, Pose::StandingTongueOut, -5.0));
        assert!(line.contains("Standing_with_tongue_out"), "{line}");
        assert!(line.contains("wag"), "{line}");
        assert!(line.contains("scale 1.10"), "{line}");
        assert!(line.contains("-5.0°"), "{line}");

        let idle = render_frame(&frame(AnimationState::Idle, Pose::Sitting, 0.0));
        assert!(idle.contains("Sitting "), "{idle}");
        assert!(idle.contains("scale 1.00"), "{idle}");
    }
}
