use std::path::Path;

use crate::foundation::error::{SpotDiffError, SpotDiffResult};
use crate::foundation::math::secs_to_samples;
use crate::media::clip::AudioSource;
use crate::media::probe::AudioPcm;
use crate::timeline::scene::AudioPlacement;

/// Mix timed placements additively into `duration` seconds of interleaved PCM.
///
/// Each placement contributes from `start` until the earlier of its clip end and its `until`
/// bound. The sum is hard-clipped to `[-1, 1]`.
pub fn mix_placements(
    placements: &[AudioPlacement],
    duration: f64,
    sample_rate: u32,
    channels: u16,
) -> AudioPcm {
    let total = secs_to_samples(duration, sample_rate) as usize;
    let mut out = vec![0.0f32; total * usize::from(channels)];

    for p in placements {
        mix_placement(&mut out, p, sample_rate, channels, total);
    }

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    AudioPcm {
        sample_rate,
        channels,
        interleaved_f32: out,
    }
}

fn mix_placement(out: &mut [f32], p: &AudioPlacement, rate: u32, channels: u16, total: usize) {
    if p.gain == 0.0 {
        return;
    }
    let stop = secs_to_samples(p.until, rate).min(total as u64);
    let mut offset = 0.0;
    for seg in p.clip.segments() {
        let len = (seg.src_end - seg.src_start).max(0.0);
        let seg_start = p.start + offset;
        offset += len;
        let AudioSource::Pcm(pcm) = &seg.source else {
            continue;
        };

        let dst0 = secs_to_samples(seg_start, rate);
        let dst1 = secs_to_samples(seg_start + len, rate).min(stop);
        let src0 = seg.src_start * f64::from(pcm.sample_rate);
        let step = f64::from(pcm.sample_rate) / f64::from(rate);
        for dst in dst0..dst1 {
            let src_frame = (src0 + (dst - dst0) as f64 * step + 1e-6).floor() as usize;
            let Some((l, r)) = frame_lr(pcm, src_frame) else {
                break;
            };
            let di = dst as usize * usize::from(channels);
            out[di] += l * p.gain;
            if channels > 1 {
                out[di + 1] += r * p.gain;
            }
        }
    }
}

fn frame_lr(pcm: &AudioPcm, frame: usize) -> Option<(f32, f32)> {
    let ch = usize::from(pcm.channels);
    if ch == 0 || frame >= pcm.frames() {
        return None;
    }
    let i = frame * ch;
    let l = pcm.interleaved_f32[i];
    let r = if ch > 1 { pcm.interleaved_f32[i + 1] } else { l };
    Some((l, r))
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
pub fn write_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> SpotDiffResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            SpotDiffError::render(format!(
                "failed to create audio mix directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        SpotDiffError::render(format!(
            "failed to write mixed audio '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
