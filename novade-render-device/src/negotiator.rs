//! Framebuffer configuration negotiation.

use khronos_egl as egl;
use tracing::debug;

use crate::backend::EglBackend;
use crate::error::{ErrorKind, RenderError};

/// `EGL_OPENGL_ES3_BIT`
pub const OPENGL_ES3_BIT: egl::Int = 0x0040;

/// Sample count used by [`RenderDevice::create`](crate::RenderDevice::create).
pub const DEFAULT_SAMPLE_COUNT: u32 = 1;

/// Attribute list for an RGBA8888 OpenGL ES 3 configuration.
///
/// Multisampling is requested only for `sample_count > 1`.
#[rustfmt::skip]
pub fn config_attributes(sample_count: u32) -> [egl::Int; 16] {
    let (sample_buffers, samples) = if sample_count > 1 {
        (1, egl::Int::try_from(sample_count).unwrap_or(egl::Int::MAX))
    } else {
        (0, 0)
    };
    [
        egl::RENDERABLE_TYPE, OPENGL_ES3_BIT,
        egl::RED_SIZE, 8,
        egl::GREEN_SIZE, 8,
        egl::BLUE_SIZE, 8,
        egl::ALPHA_SIZE, 8,
        egl::SAMPLE_BUFFERS, sample_buffers,
        egl::SAMPLES, samples,
        egl::NONE, egl::NONE,
    ]
}

/// Picks exactly one configuration; zero matches is a hard failure.
pub fn choose_config<B: EglBackend>(
    backend: &B,
    display: B::Display,
    sample_count: u32,
) -> Result<B::Config, RenderError> {
    let attribs = config_attributes(sample_count);
    let config = backend
        .choose_config(display, &attribs)
        .map_err(|e| {
            RenderError::new(ErrorKind::NoMatchingConfig, "choose_config", "could not choose config")
                .with_egl(e)
        })?
        .ok_or_else(|| {
            RenderError::new(
                ErrorKind::NoMatchingConfig,
                "choose_config",
                format!("no RGBA8888 ES3 config with {sample_count} sample(s)"),
            )
        })?;
    debug!(?config, sample_count, "surface config chosen");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn value_of(attribs: &[egl::Int], key: egl::Int) -> Option<egl::Int> {
        attribs
            .chunks(2)
            .take_while(|pair| pair[0] != egl::NONE)
            .find(|pair| pair[0] == key)
            .map(|pair| pair[1])
    }

    #[rstest]
    #[case(0, 0, 0)]
    #[case(1, 0, 0)]
    #[case(4, 1, 4)]
    #[case(8, 1, 8)]
    fn multisampling_only_above_one_sample(
        #[case] sample_count: u32,
        #[case] buffers: egl::Int,
        #[case] samples: egl::Int,
    ) {
        let attribs = config_attributes(sample_count);
        assert_eq!(value_of(&attribs, egl::SAMPLE_BUFFERS), Some(buffers));
        assert_eq!(value_of(&attribs, egl::SAMPLES), Some(samples));
    }

    #[test]
    fn requests_es3_and_eight_bit_channels() {
        let attribs = config_attributes(DEFAULT_SAMPLE_COUNT);
        assert_eq!(value_of(&attribs, egl::RENDERABLE_TYPE), Some(OPENGL_ES3_BIT));
        for channel in [egl::RED_SIZE, egl::GREEN_SIZE, egl::BLUE_SIZE, egl::ALPHA_SIZE] {
            assert_eq!(value_of(&attribs, channel), Some(8));
        }
        assert_eq!(attribs[14], egl::NONE);
    }
}
