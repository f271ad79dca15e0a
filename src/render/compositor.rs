use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::effects::chroma::ChromaKey;
use crate::effects::composite::{Pixels, blit_over};
use crate::foundation::core::Rgba8;
use crate::foundation::error::SpotDiffResult;
use crate::media::clip::VideoSource;
use crate::media::decode::{PreparedImage, solid_image};
use crate::overlay::generator::OverlayGenerator;
use crate::render::decoder::StreamingDecoder;
use crate::render::frame::FrameRGBA;
use crate::timeline::program::Program;
use crate::timeline::scene::{LayerContent, VideoLayer};

/// Decoders idle for this many frames are shut down.
const DECODER_IDLE_FRAMES: u64 = 90;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct DecoderKey {
    path: PathBuf,
    width: u32,
    height: u32,
    key: Option<(Rgba8, u64)>,
}

/// Stateful frame compositor for one program.
///
/// Owns the per-source decode streams and the caches for solids and procedural overlays.
pub struct Compositor {
    background: Rgba8,
    decoders: HashMap<DecoderKey, (StreamingDecoder, u64)>,
    solids: HashMap<(Rgba8, u32, u32), Arc<PreparedImage>>,
    overlays: HashMap<usize, (u64, Arc<PreparedImage>)>,
    tick: u64,
    retired_spawns: u64,
}

impl Compositor {
    /// Create a compositor that clears each frame to `background`.
    pub fn new(background: Rgba8) -> Self {
        Self {
            background,
            decoders: HashMap::new(),
            solids: HashMap::new(),
            overlays: HashMap::new(),
            tick: 0,
            retired_spawns: 0,
        }
    }

    /// Composite the program at absolute time `t` into `out`.
    pub fn render_into(&mut self, program: &Program, t: f64, out: &mut FrameRGBA) -> SpotDiffResult<()> {
        self.tick += 1;
        out.clear(self.background);

        if let Some((segment, local)) = program.segment_at(t) {
            for layer in &segment.layers {
                let Some(layer_t) = layer.local_time(local) else {
                    continue;
                };
                self.draw_layer(program, layer, layer_t, out)?;
            }
        }

        let tick = self.tick;
        let mut retired = 0;
        self.decoders.retain(|_, (decoder, last_used)| {
            let keep = tick - *last_used <= DECODER_IDLE_FRAMES;
            if !keep {
                retired += decoder.spawns();
            }
            keep
        });
        self.retired_spawns += retired;
        Ok(())
    }

    /// Render program time `t` into a new frame.
    pub fn render(&mut self, program: &Program, t: f64) -> SpotDiffResult<FrameRGBA> {
        let mut out = FrameRGBA::filled(program.canvas, self.background);
        self.render_into(program, t, &mut out)?;
        Ok(out)
    }

    /// Number of decoder processes currently running.
    pub fn live_decoders(&self) -> usize {
        self.decoders.len()
    }

    /// `ffmpeg` decode processes started so far, including ones already shut down.
    pub fn decoder_spawns(&self) -> u64 {
        self.retired_spawns + self.decoders.values().map(|(d, _)| d.spawns()).sum::<u64>()
    }

    fn draw_layer(
        &mut self,
        program: &Program,
        layer: &VideoLayer,
        layer_t: f64,
        out: &mut FrameRGBA,
    ) -> SpotDiffResult<()> {
        let (x, y) = layer.placement.sample(layer_t);
        let image = match &layer.content {
            LayerContent::Still(img) => img.clone(),
            LayerContent::Procedural(generator) => self.overlay_frame(generator, layer_t)?,
            LayerContent::Clip { clip, key } => {
                let Some((source, src_t)) = clip.locate(layer_t) else {
                    return Ok(());
                };
                match source {
                    VideoSource::Solid { color, .. } => self.solid(*color, layer.width, layer.height),
                    VideoSource::File(info) => {
                        let dk = DecoderKey {
                            path: info.source_path.clone(),
                            width: layer.width,
                            height: layer.height,
                            key: key.map(|k: ChromaKey| (k.color, k.threshold.to_bits())),
                        };
                        let tick = self.tick;
                        let fps = program.fps.as_f64().round() as u32;
                        let (decoder, last_used) = self.decoders.entry(dk).or_insert_with(|| {
                            (
                                StreamingDecoder::new(info.clone(), layer.width, layer.height, fps, *key),
                                tick,
                            )
                        });
                        *last_used = tick;
                        decoder.frame_at(src_t)?
                    }
                }
            }
        };

        blit_over(
            out.pixels_mut(),
            Pixels {
                width: image.width,
                height: image.height,
                data: &image.rgba8_premul,
            },
            x,
            y,
            1.0,
        )
    }

    fn solid(&mut self, color: Rgba8, width: u32, height: u32) -> Arc<PreparedImage> {
        self.solids
            .entry((color, width, height))
            .or_insert_with(|| Arc::new(solid_image(width, height, color)))
            .clone()
    }

    fn overlay_frame(
        &mut self,
        generator: &Arc<dyn OverlayGenerator>,
        t: f64,
    ) -> SpotDiffResult<Arc<PreparedImage>> {
        let id = Arc::as_ptr(generator) as *const () as usize;
        let key = generator.frame_key(t);
        if let Some((cached_key, img)) = self.overlays.get(&id)
            && *cached_key == key
        {
            return Ok(img.clone());
        }
        let img = Arc::new(generator.render(t)?);
        self.overlays.insert(id, (key, img.clone()));
        Ok(img)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
