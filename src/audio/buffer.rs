/// Planar multi-channel audio: one `Vec<f32>` per channel, all the same length.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    pub channels: Vec<Vec<f32>>,
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        Self { channels, sample_rate }
    }

    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::new(vec![samples], sample_rate)
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn num_samples(&self) -> usize {
        self.channels.first().map_or(0, |c| c.len())
    }

    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.num_samples() as f64 / self.sample_rate as f64
    }

    /// Average all channels into one.
    pub fn to_mono(&self) -> Vec<f32> {
        match self.channels.len() {
            0 => Vec::new(),
            1 => self.channels[0].clone(),
            n => (0..self.num_samples())
                .map(|i| self.channels.iter().map(|ch| ch[i]).sum::<f32>() / n as f32)
                .collect(),
        }
    }

    /// Exactly two channels: mono is duplicated, extra channels are dropped.
    pub fn to_stereo(&self) -> AudioBuffer {
        let channels = match self.channels.len() {
            0 => vec![Vec::new(), Vec::new()],
            1 => vec![self.channels[0].clone(), self.channels[0].clone()],
            2 => self.channels.clone(),
            _ => self.channels[..2].to_vec(),
        };
        AudioBuffer::new(channels, self.sample_rate)
    }

    /// Zero-pad every channel at the end up to `len`. Never truncates.
    pub fn pad_to(&mut self, len: usize) {
        for ch in &mut self.channels {
            if ch.len() < len {
                ch.resize(len, 0.0);
            }
        }
    }

    pub fn peak(&self) -> f32 {
        self.channels.iter().map(|ch| peak(ch)).fold(0.0f32, f32::max)
    }

    pub fn scale(&mut self, factor: f32) {
        for ch in &mut self.channels {
            ch.iter_mut().for_each(|s| *s *= factor);
        }
    }
}

/// Maximum absolute sample value.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max)
}
