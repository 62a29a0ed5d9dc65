//! Frame skipping and stacking for visual observations.
use crate::error::CurioError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    collections::VecDeque,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`FrameStacker`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameStackConfig {
    /// Distance between two stacked frames, counted in raw frames.
    pub skip_frame: usize,

    /// Number of frames stacked into one observation.
    pub stack_frame: usize,

    /// Channels of a raw frame.
    pub channels: usize,

    /// Height of a raw frame in pixels.
    pub height: usize,

    /// Width of a raw frame in pixels.
    pub width: usize,
}

impl Default for FrameStackConfig {
    fn default() -> Self {
        Self {
            skip_frame: 4,
            stack_frame: 4,
            channels: 1,
            height: 84,
            width: 84,
        }
    }
}

impl FrameStackConfig {
    /// Sets the number of raw frames between two stacked frames.
    pub fn skip_frame(mut self, v: usize) -> Self {
        self.skip_frame = v;
        self
    }

    /// Sets the number of stacked frames.
    pub fn stack_frame(mut self, v: usize) -> Self {
        self.stack_frame = v;
        self
    }

    /// Sets the shape of a raw frame.
    pub fn frame_shape(mut self, channels: usize, height: usize, width: usize) -> Self {
        self.channels = channels;
        self.height = height;
        self.width = width;
        self
    }

    /// Constructs [`FrameStackConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`FrameStackConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Stacks every `skip_frame`-th raw frame into a single observation.
///
/// The stacker keeps a sliding window of the latest
/// `skip_frame * stack_frame` raw frames. The stacked observation consists
/// of `stack_frame` channel blocks, where block `i` is the frame
/// `skip_frame * i` raw steps before the newest one. Block 0 is always the
/// newest frame.
///
/// Frames are flat `u8` vectors of length `channels * height * width`;
/// the output has length `stack_frame * channels * height * width`.
pub struct FrameStacker {
    config: FrameStackConfig,
    frames: VecDeque<Vec<u8>>,
}

impl FrameStacker {
    /// Creates a [`FrameStacker`] with an empty window.
    ///
    /// [`FrameStacker::reset`] must be called before the first step of each
    /// episode.
    pub fn new(config: FrameStackConfig) -> Self {
        assert!(config.skip_frame >= 1);
        assert!(config.stack_frame >= 1);
        let window_len = config.skip_frame * config.stack_frame;
        Self {
            config,
            frames: VecDeque::with_capacity(window_len),
        }
    }

    /// Shape of the stacked observation, `[channels, height, width]`.
    pub fn shape(&self) -> [usize; 3] {
        [
            self.config.stack_frame * self.config.channels,
            self.config.height,
            self.config.width,
        ]
    }

    fn window_len(&self) -> usize {
        self.config.skip_frame * self.config.stack_frame
    }

    fn frame_len(&self) -> usize {
        self.config.channels * self.config.height * self.config.width
    }

    fn check_frame(&self, frame: &[u8]) -> Result<()> {
        if frame.len() != self.frame_len() {
            return Err(CurioError::ShapeMismatch {
                context: "frame_stack".to_string(),
                expected: vec![self.config.channels, self.config.height, self.config.width],
                got: vec![frame.len()],
            }
            .into());
        }
        Ok(())
    }

    /// Fills the window with copies of the first frame of an episode and
    /// returns the stacked observation.
    pub fn reset(&mut self, frame: &[u8]) -> Result<Vec<u8>> {
        self.check_frame(frame)?;
        self.frames.clear();
        for _ in 0..self.window_len() {
            self.frames.push_back(frame.to_vec());
        }
        Ok(self.stack())
    }

    /// Appends a raw frame, evicting the oldest one, and returns the stacked
    /// observation.
    ///
    /// Fails when the window has not been filled by [`FrameStacker::reset`].
    pub fn push_and_stack(&mut self, frame: &[u8]) -> Result<Vec<u8>> {
        self.check_frame(frame)?;
        if self.frames.len() != self.window_len() {
            return Err(CurioError::ShapeMismatch {
                context: "frame_stack window".to_string(),
                expected: vec![self.window_len()],
                got: vec![self.frames.len()],
            }
            .into());
        }
        self.frames.pop_front();
        self.frames.push_back(frame.to_vec());
        Ok(self.stack())
    }

    fn stack(&self) -> Vec<u8> {
        let newest = self.frames.len() - 1;
        let mut obs = Vec::with_capacity(self.config.stack_frame * self.frame_len());
        for i in 0..self.config.stack_frame {
            let ix = newest - self.config.skip_frame * i;
            obs.extend_from_slice(&self.frames[ix]);
        }
        obs
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameStackConfig, FrameStacker};

    fn config(skip: usize, stack: usize) -> FrameStackConfig {
        FrameStackConfig::default()
            .skip_frame(skip)
            .stack_frame(stack)
            .frame_shape(1, 2, 2)
    }

    fn frame(v: u8) -> Vec<u8> {
        vec![v; 4]
    }

    #[test]
    fn reset_prefills_window() {
        let mut stacker = FrameStacker::new(config(2, 2));
        let obs = stacker.reset(&frame(7)).unwrap();
        assert_eq!(obs, [vec![7; 4], vec![7; 4]].concat());
    }

    #[test]
    fn stacks_every_skip_th_frame() {
        let mut stacker = FrameStacker::new(config(1, 2));
        stacker.reset(&frame(0)).unwrap();
        stacker.push_and_stack(&frame(1)).unwrap();
        let obs = stacker.push_and_stack(&frame(2)).unwrap();
        // block 0 is the newest frame, block 1 the previous one
        assert_eq!(obs, [frame(2), frame(1)].concat());

        let mut stacker = FrameStacker::new(config(2, 2));
        stacker.reset(&frame(0)).unwrap();
        for v in 1..=3 {
            stacker.push_and_stack(&frame(v)).unwrap();
        }
        let obs = stacker.push_and_stack(&frame(4)).unwrap();
        assert_eq!(obs, [frame(4), frame(2)].concat());
    }

    #[test]
    fn is_deterministic() {
        let run = || {
            let mut stacker = FrameStacker::new(config(2, 3));
            stacker.reset(&frame(0)).unwrap();
            (1..10)
                .map(|v| stacker.push_and_stack(&frame(v)).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn push_before_reset_fails() {
        let mut stacker = FrameStacker::new(config(1, 2));
        assert!(stacker.push_and_stack(&frame(0)).is_err());
        stacker.reset(&frame(0)).unwrap();
        assert!(stacker.push_and_stack(&frame(1)).is_ok());
    }

    #[test]
    fn rejects_wrong_frame_shape() {
        let mut stacker = FrameStacker::new(config(1, 2));
        assert!(stacker.reset(&[0u8; 5]).is_err());
        stacker.reset(&frame(0)).unwrap();
        assert!(stacker.push_and_stack(&[0u8; 3]).is_err());
    }

    #[test]
    fn output_len_matches_shape() {
        let config = FrameStackConfig::default()
            .skip_frame(3)
            .stack_frame(4)
            .frame_shape(2, 3, 5);
        let mut stacker = FrameStacker::new(config);
        let obs = stacker.reset(&vec![0u8; 30]).unwrap();
        assert_eq!(obs.len(), 4 * 30);
        assert_eq!(stacker.shape(), [8, 3, 5]);
    }
}
